use crate::{opts::Profile, target::BuildTarget};

pub static BUNDLE_IDENTIFIER_TOKEN: &str = "$(CFBundleIdentifier)";
pub static TEAM_IDENTIFIER_PREFIX_TOKEN: &str = "$(TeamIdentifierPrefix)";

/// Ambient settings of the build pass a step runs in.
///
/// `bundle_identifier` is the one resolved for the desktop platform group;
/// it's substituted on every target since non-Xcode macOS builds never get
/// `$(CFBundleIdentifier)` expanded for them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildContext {
    target: BuildTarget,
    profile: Profile,
    bundle_identifier: String,
    development_team: String,
}

impl BuildContext {
    pub fn new(
        target: BuildTarget,
        profile: Profile,
        bundle_identifier: impl Into<String>,
        development_team: impl Into<String>,
    ) -> Self {
        Self {
            target,
            profile,
            bundle_identifier: bundle_identifier.into(),
            development_team: development_team.into(),
        }
    }

    pub fn target(&self) -> BuildTarget {
        self.target
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn bundle_identifier(&self) -> &str {
        &self.bundle_identifier
    }

    pub fn development_team(&self) -> &str {
        &self.development_team
    }

    pub fn expand_bundle_identifier(&self, template: &str) -> String {
        let expanded = template.replace(BUNDLE_IDENTIFIER_TOKEN, &self.bundle_identifier);
        log::debug!("expanded {:?} to {:?}", template, expanded);
        expanded
    }

    pub fn expand_team_and_bundle_identifier(&self, template: &str) -> String {
        let expanded = template
            .replace(TEAM_IDENTIFIER_PREFIX_TOKEN, &self.development_team)
            .replace(BUNDLE_IDENTIFIER_TOKEN, &self.bundle_identifier);
        log::debug!("expanded {:?} to {:?}", template, expanded);
        expanded
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    fn context() -> BuildContext {
        BuildContext::new(BuildTarget::Ios, Profile::Debug, "com.studio.game", "ABCDE12345")
    }

    #[rstest(
        template,
        expected,
        case("$(CFBundleIdentifier)", "com.studio.game"),
        case("iCloud.$(CFBundleIdentifier).save", "iCloud.com.studio.game.save"),
        case(
            "$(CFBundleIdentifier)/$(CFBundleIdentifier)",
            "com.studio.game/com.studio.game"
        ),
        case("iCloud.$(TeamIdentifierPrefix)", "iCloud.$(TeamIdentifierPrefix)"),
        case("$(CFBundleIdentifier", "$(CFBundleIdentifier"),
        case("", "")
    )]
    fn expands_bundle_identifier_only(template: &str, expected: &str) {
        assert_eq!(context().expand_bundle_identifier(template), expected);
    }

    #[rstest(
        template,
        expected,
        case("$(TeamIdentifierPrefix)$(CFBundleIdentifier)", "ABCDE12345com.studio.game"),
        case("$(CFBundleIdentifier).$(TeamIdentifierPrefix)", "com.studio.game.ABCDE12345"),
        case("$(TeamIdentifierPrefix).kv.$(TeamIdentifierPrefix)", "ABCDE12345.kv.ABCDE12345"),
        case("plain.identifier", "plain.identifier")
    )]
    fn expands_team_and_bundle_identifier(template: &str, expected: &str) {
        let expanded = context().expand_team_and_bundle_identifier(template);
        assert_eq!(expanded, expected);
        assert!(!expanded.contains(BUNDLE_IDENTIFIER_TOKEN));
        assert!(!expanded.contains(TEAM_IDENTIFIER_PREFIX_TOKEN));
    }
}
