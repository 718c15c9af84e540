use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use thiserror::Error;

/// Platform a build pass produces a player for.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTarget {
    Ios,
    TvOs,
    MacOs,
    VisionOs,
    Android,
}

impl BuildTarget {
    pub const DEFAULT: Self = Self::Ios;

    pub fn all() -> &'static [Self] {
        &[
            Self::Ios,
            Self::TvOs,
            Self::MacOs,
            Self::VisionOs,
            Self::Android,
        ]
    }

    pub fn name_list() -> Vec<&'static str> {
        Self::all().iter().map(Self::name).collect()
    }

    pub fn for_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|target| target.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::TvOs => "tvos",
            Self::MacOs => "macos",
            Self::VisionOs => "visionos",
            Self::Android => "android",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ios => "iOS",
            Self::TvOs => "tvOS",
            Self::MacOs => "macOS",
            Self::VisionOs => "visionOS",
            Self::Android => "Android",
        }
    }

    pub fn is_macos(&self) -> bool {
        matches!(self, Self::MacOs)
    }
}

impl Default for BuildTarget {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Error)]
#[error("Target {name:?} is invalid; the possible targets are {possible:?}")]
pub struct TargetInvalid {
    pub(crate) name: String,
    pub(crate) possible: Vec<&'static str>,
}

impl FromStr for BuildTarget {
    type Err = TargetInvalid;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::for_name(name).ok_or_else(|| TargetInvalid {
            name: name.to_owned(),
            possible: Self::name_list(),
        })
    }
}
