use super::Environment;
use serde::{Deserialize, Serialize};

/// The `[cloudkit]` table of a build profile, exactly as authored.
///
/// Every field is optional; `Config::from_raw` fills in the defaults.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Raw {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_containers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_identifiers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_environment: Option<Environment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_key_value_store: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_value_store_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_remote_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_environment: Option<Environment>,
}

/// A build profile file. Tables other than `[cloudkit]` belong to other
/// steps and are ignored here.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ProfileFile {
    #[serde(default)]
    pub cloudkit: Option<Raw>,
}
