use super::{BuildStep, Error, Pass};
use crate::{
    assets::AssetResolver as _, config::Config, plist::Document, project::NativeProject,
    target::BuildTarget,
};

pub static ICLOUD_SERVICES_KEY: &str = "com.apple.developer.icloud-services";
pub static ICLOUD_CONTAINER_IDENTIFIERS_KEY: &str =
    "com.apple.developer.icloud-container-identifiers";
pub static ICLOUD_CONTAINER_ENVIRONMENT_KEY: &str =
    "com.apple.developer.icloud-container-environment";
pub static UBIQUITY_KVSTORE_IDENTIFIER_KEY: &str =
    "com.apple.developer.ubiquity-kvstore-identifier";
pub static APS_ENVIRONMENT_KEY: &str = "aps-environment";
pub static EXPORT_CONTAINER_ENVIRONMENT_KEY: &str = "iCloudContainerEnvironment";

pub static CLOUDKIT_SERVICE: &str = "CloudKit";
pub static CLOUDKIT_SYSTEM_FRAMEWORK: &str = "CloudKit.framework";

// Asset ids of the prebuilt wrapper frameworks.
pub static IOS_FRAMEWORK_ASSET: &str = "70a7dd15b96a743fab073e0abb6a46c7";
pub static TVOS_FRAMEWORK_ASSET: &str = "b7648eff34115496b8e60e928995dbd3";
pub static MACOS_FRAMEWORK_ASSET: &str = "bd51646559abb4a9ebdc2213e7e064d3";

/// Asset id of the prebuilt wrapper framework for `target`, if there is one.
pub fn framework_asset(target: BuildTarget) -> Option<&'static str> {
    match target {
        BuildTarget::Ios => Some(IOS_FRAMEWORK_ASSET),
        BuildTarget::TvOs => Some(TVOS_FRAMEWORK_ASSET),
        BuildTarget::MacOs => Some(MACOS_FRAMEWORK_ASSET),
        BuildTarget::VisionOs | BuildTarget::Android => None,
    }
}

/// Adds iCloud containers, the ubiquity key-value store, and push
/// notification entitlements, plus the CloudKit wrapper framework.
#[derive(Clone, Debug, Default)]
pub struct CloudKitStep {
    config: Config,
}

impl CloudKitStep {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl BuildStep for CloudKitStep {
    fn display_name(&self) -> &str {
        "CloudKit"
    }

    fn display_icon(&self) -> &str {
        "cloud.fill"
    }

    fn process_entitlements(
        &self,
        pass: &Pass<'_>,
        entitlements: &mut Document,
    ) -> Result<(), Error> {
        let config = &self.config;
        let context = pass.context;

        if config.uses_cloudkit_service() {
            entitlements
                .set_string_array(ICLOUD_SERVICES_KEY, std::iter::once(CLOUDKIT_SERVICE));
        }

        if config.use_containers() {
            entitlements.set_string_array(
                ICLOUD_CONTAINER_IDENTIFIERS_KEY,
                config
                    .container_identifiers()
                    .iter()
                    .map(|identifier| context.expand_bundle_identifier(identifier)),
            );
            entitlements.set_string(
                ICLOUD_CONTAINER_ENVIRONMENT_KEY,
                config.container_environment().resolve(context.profile()),
            );
        }

        if config.use_key_value_store() {
            entitlements.set_string(
                UBIQUITY_KVSTORE_IDENTIFIER_KEY,
                context.expand_team_and_bundle_identifier(config.key_value_store_identifier()),
            );
        }

        if config.use_remote_notifications() {
            if context.target().is_macos() {
                log::debug!(
                    "not setting {:?} since {} doesn't take it",
                    APS_ENVIRONMENT_KEY,
                    context.target()
                );
            } else {
                entitlements.set_string(
                    APS_ENVIRONMENT_KEY,
                    config.notification_environment().resolve(context.profile()),
                );
            }
        }

        Ok(())
    }

    fn process_frameworks(
        &self,
        pass: &Pass<'_>,
        project: &mut dyn NativeProject,
    ) -> Result<(), Error> {
        let target = pass.context.target();
        match framework_asset(target) {
            Some(id) => match pass.assets.resolve(id) {
                Some(binary) => project.copy_and_embed(&binary, target, pass.output_dir)?,
                None => log::warn!(
                    "CloudKit framework asset {:?} for {} couldn't be resolved; not embedding it",
                    id,
                    target
                ),
            },
            None => log::warn!(
                "no prebuilt CloudKit framework for {}; not embedding one",
                target
            ),
        }
        project.add_framework(CLOUDKIT_SYSTEM_FRAMEWORK, false, target)?;
        Ok(())
    }

    fn process_export_options(
        &self,
        pass: &Pass<'_>,
        export_options: &mut Document,
    ) -> Result<(), Error> {
        if self.config.use_containers() {
            export_options.set_string(
                EXPORT_CONTAINER_ENVIRONMENT_KEY,
                self.config
                    .container_environment()
                    .resolve(pass.context.profile()),
            );
        }
        Ok(())
    }
}
