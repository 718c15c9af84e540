use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub enum NoiseLevel {
    Polite,
    LoudAndProud,
    FranklyQuitePedantic,
}

impl Default for NoiseLevel {
    fn default() -> Self {
        Self::Polite
    }
}

impl NoiseLevel {
    pub fn from_occurrences(occurrences: u64) -> Self {
        match occurrences {
            0 => Self::Polite,
            1 => Self::LoudAndProud,
            _ => Self::FranklyQuitePedantic,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Clobbering {
    Forbid,
    Allow,
}

impl Default for Clobbering {
    fn default() -> Self {
        Self::Forbid
    }
}

impl Clobbering {
    pub fn from_flag(flag: bool) -> Self {
        if flag {
            Self::Allow
        } else {
            Self::Forbid
        }
    }

    pub fn allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// The build configuration type of the current pass.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Profile {
    Debug,
    Release,
}

impl Profile {
    pub fn from_flag(flag: bool) -> Self {
        if flag {
            Self::Release
        } else {
            Self::Debug
        }
    }

    pub fn debug(self) -> bool {
        matches!(self, Self::Debug)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest(
        occurrences,
        expected,
        case(0, NoiseLevel::Polite),
        case(1, NoiseLevel::LoudAndProud),
        case(2, NoiseLevel::FranklyQuitePedantic),
        case(7, NoiseLevel::FranklyQuitePedantic)
    )]
    fn noise_level_from_occurrences(occurrences: u64, expected: NoiseLevel) {
        assert_eq!(NoiseLevel::from_occurrences(occurrences), expected);
    }

    #[test]
    fn profile_from_flag() {
        assert!(Profile::from_flag(false).debug());
        assert_eq!(Profile::from_flag(true), Profile::Release);
        assert_eq!(Profile::Release.as_str(), "release");
    }
}
