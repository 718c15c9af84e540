use crate::target::BuildTarget;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Prebuilt framework {0:?} doesn't exist")]
    BinaryMissing(PathBuf),
    #[error("Prebuilt framework path {0:?} has no file name")]
    BinaryNameMissing(PathBuf),
    #[error("Failed to read project record {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse project record {path:?}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write project record {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize project record: {0}")]
    SerializeFailed(#[from] serde_json::Error),
}

/// The generated native project a build pass links and embeds into.
pub trait NativeProject {
    /// Stages a prebuilt framework to be copied into the built product and
    /// embedded in the app bundle.
    fn copy_and_embed(
        &mut self,
        binary: &Path,
        target: BuildTarget,
        output_dir: &Path,
    ) -> Result<(), Error>;

    /// Links a system framework such as `CloudKit.framework`.
    fn add_framework(&mut self, name: &str, weak: bool, target: BuildTarget)
        -> Result<(), Error>;
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Embed {
    pub source: PathBuf,
    pub target: BuildTarget,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Link {
    pub weak: bool,
    pub targets: Vec<BuildTarget>,
}

/// Records embed and link actions instead of editing a `.pbxproj`.
///
/// Embeds are keyed by destination and links by framework name, so staging
/// the same thing twice doesn't duplicate it.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StagedProject {
    embeds: IndexMap<PathBuf, Embed>,
    frameworks: IndexMap<String, Link>,
}

impl StagedProject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ReadFailed {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| Error::ParseFailed {
            path: path.to_owned(),
            source,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|source| Error::WriteFailed {
            path: path.to_owned(),
            source,
        })
    }

    pub fn embeds(&self) -> impl Iterator<Item = (&Path, &Embed)> {
        self.embeds
            .iter()
            .map(|(destination, embed)| (destination.as_path(), embed))
    }

    pub fn frameworks(&self) -> impl Iterator<Item = (&str, &Link)> {
        self.frameworks
            .iter()
            .map(|(name, link)| (name.as_str(), link))
    }

    pub fn framework(&self, name: &str) -> Option<&Link> {
        self.frameworks.get(name)
    }
}

impl NativeProject for StagedProject {
    fn copy_and_embed(
        &mut self,
        binary: &Path,
        target: BuildTarget,
        output_dir: &Path,
    ) -> Result<(), Error> {
        if !binary.exists() {
            return Err(Error::BinaryMissing(binary.to_owned()));
        }
        let file_name = binary
            .file_name()
            .ok_or_else(|| Error::BinaryNameMissing(binary.to_owned()))?;
        let destination = output_dir.join("Frameworks").join(file_name);
        log::info!("staging {:?} to be embedded at {:?}", binary, destination);
        self.embeds.insert(
            destination,
            Embed {
                source: binary.to_owned(),
                target,
            },
        );
        Ok(())
    }

    fn add_framework(
        &mut self,
        name: &str,
        weak: bool,
        target: BuildTarget,
    ) -> Result<(), Error> {
        log::info!(
            "linking {} for {} ({})",
            name,
            target,
            if weak { "weak" } else { "required" }
        );
        let link = self.frameworks.entry(name.to_owned()).or_insert(Link {
            weak,
            targets: Vec::new(),
        });
        link.weak = weak;
        if !link.targets.contains(&target) {
            link.targets.push(target);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "{}-project-{}-{}",
            crate::NAME,
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn refuses_missing_binary() {
        let mut project = StagedProject::new();
        let err = project
            .copy_and_embed(
                Path::new("/definitely/not/Wrapper.framework"),
                BuildTarget::Ios,
                Path::new("/build"),
            )
            .unwrap_err();
        assert!(matches!(err, Error::BinaryMissing(_)));
        assert_eq!(project.embeds().count(), 0);
    }

    #[test]
    fn staging_twice_is_idempotent() {
        let dir = scratch_dir("idempotent");
        let binary = dir.join("Wrapper.framework");
        std::fs::create_dir_all(&binary).unwrap();

        let mut project = StagedProject::new();
        for _ in 0..2 {
            project
                .copy_and_embed(&binary, BuildTarget::TvOs, Path::new("/build"))
                .unwrap();
            project
                .add_framework("CloudKit.framework", false, BuildTarget::TvOs)
                .unwrap();
        }
        std::fs::remove_dir_all(&dir).unwrap();

        let embeds = project.embeds().collect::<Vec<_>>();
        assert_eq!(embeds.len(), 1);
        assert_eq!(
            embeds[0].0,
            Path::new("/build/Frameworks/Wrapper.framework")
        );
        assert_eq!(embeds[0].1.target, BuildTarget::TvOs);
        assert_eq!(
            project.framework("CloudKit.framework"),
            Some(&Link {
                weak: false,
                targets: vec![BuildTarget::TvOs],
            })
        );
    }

    #[test]
    fn record_survives_a_save() {
        let dir = scratch_dir("save");
        let path = dir.join("project.json");
        let mut project = StagedProject::new();
        project
            .add_framework("CloudKit.framework", false, BuildTarget::MacOs)
            .unwrap();
        project.save(&path).unwrap();
        let loaded = StagedProject::load_or_default(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(loaded, project);
    }
}
