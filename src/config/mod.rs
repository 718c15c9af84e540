mod raw;

pub use self::raw::*;

use crate::opts::{Clobbering, Profile};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub static DEFAULT_FILE_NAME: &str = "cloudkit.toml";
pub static DEFAULT_KEY_VALUE_STORE_IDENTIFIER: &str =
    "$(TeamIdentifierPrefix)$(CFBundleIdentifier)";

/// Which CloudKit / APNs environment an entitlement points at.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Environment {
    /// Development for debug builds, Production for release builds.
    Auto,
    Development,
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        Self::Auto
    }
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Development => "Development",
            Self::Production => "Production",
        }
    }

    /// The literal value written into a document for this build pass.
    pub fn resolve(self, profile: Profile) -> &'static str {
        match self {
            Self::Auto if profile.debug() => Self::Development.as_str(),
            Self::Auto => Self::Production.as_str(),
            explicit => explicit.as_str(),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read build profile {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse build profile {path:?}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Build profile {0:?} already exists; pass `--force` to overwrite it")]
    AlreadyExists(PathBuf),
    #[error("Failed to serialize build profile: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("Failed to write build profile {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Serialize)]
struct ProfileFileRef<'a> {
    cloudkit: &'a Config,
}

/// CloudKit settings for a build pass. Read-only once loaded.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    use_containers: bool,
    container_identifiers: Vec<String>,
    container_environment: Environment,
    use_key_value_store: bool,
    key_value_store_identifier: String,
    use_remote_notifications: bool,
    notification_environment: Environment,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_raw(None)
    }
}

impl Config {
    pub fn from_raw(raw: Option<Raw>) -> Self {
        let raw = raw.unwrap_or_else(|| {
            log::info!("`{}` table not set; using defaults", crate::NAME);
            Raw::default()
        });
        let use_containers = raw.use_containers.unwrap_or_default();
        let container_identifiers = raw.container_identifiers.unwrap_or_default();
        if use_containers && container_identifiers.is_empty() {
            log::warn!(
                "`{}.use-containers` is enabled but `{}.container-identifiers` is empty",
                crate::NAME,
                crate::NAME
            );
        }
        Self {
            use_containers,
            container_identifiers,
            container_environment: raw.container_environment.unwrap_or_default(),
            use_key_value_store: raw.use_key_value_store.unwrap_or_default(),
            key_value_store_identifier: raw
                .key_value_store_identifier
                .unwrap_or_else(|| DEFAULT_KEY_VALUE_STORE_IDENTIFIER.to_owned()),
            use_remote_notifications: raw.use_remote_notifications.unwrap_or_default(),
            notification_environment: raw.notification_environment.unwrap_or_default(),
        }
    }

    pub fn from_toml_str(path: &Path, contents: &str) -> Result<Self, LoadError> {
        let file = toml::from_str::<ProfileFile>(contents).map_err(|source| {
            LoadError::ParseFailed {
                path: path.to_owned(),
                source,
            }
        })?;
        Ok(Self::from_raw(file.cloudkit))
    }

    /// Loads the `[cloudkit]` table from a build profile. A missing file
    /// yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !path.is_file() {
            log::info!("no build profile at {:?}; using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::ReadFailed {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(path, &contents)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&ProfileFileRef { cloudkit: self })
    }

    pub fn write(&self, path: impl AsRef<Path>, clobbering: Clobbering) -> Result<(), WriteError> {
        let path = path.as_ref();
        if path.exists() && !clobbering.allowed() {
            return Err(WriteError::AlreadyExists(path.to_owned()));
        }
        let contents = self.to_toml_string()?;
        std::fs::write(path, contents).map_err(|source| WriteError::WriteFailed {
            path: path.to_owned(),
            source,
        })?;
        log::info!("wrote build profile to {:?}", path);
        Ok(())
    }

    pub fn use_containers(&self) -> bool {
        self.use_containers
    }

    pub fn container_identifiers(&self) -> &[String] {
        &self.container_identifiers
    }

    pub fn container_environment(&self) -> Environment {
        self.container_environment
    }

    pub fn use_key_value_store(&self) -> bool {
        self.use_key_value_store
    }

    pub fn key_value_store_identifier(&self) -> &str {
        &self.key_value_store_identifier
    }

    pub fn use_remote_notifications(&self) -> bool {
        self.use_remote_notifications
    }

    pub fn notification_environment(&self) -> Environment {
        self.notification_environment
    }

    /// Whether any entitlement needs the CloudKit iCloud service.
    pub fn uses_cloudkit_service(&self) -> bool {
        self.use_containers || self.use_key_value_store
    }
}
