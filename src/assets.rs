use serde::Deserialize;
use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Resolves stable asset identifiers to files on disk.
pub trait AssetResolver {
    /// `None` when the identifier isn't known.
    fn resolve(&self, id: &str) -> Option<PathBuf>;
}

impl<T: AssetResolver + ?Sized> AssetResolver for &T {
    fn resolve(&self, id: &str) -> Option<PathBuf> {
        (**self).resolve(id)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read asset index {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse asset index {path:?}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct Raw {
    #[serde(default)]
    assets: BTreeMap<String, PathBuf>,
}

/// An asset table loaded from TOML:
///
/// ```toml
/// [assets]
/// 70a7dd15b96a743fab073e0abb6a46c7 = "Plugins/iOS/CloudKitWrapper.framework"
/// ```
///
/// Relative paths are taken relative to the directory holding the index.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AssetIndex {
    root: PathBuf,
    assets: BTreeMap<String, PathBuf>,
}

impl AssetIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            assets: Default::default(),
        }
    }

    pub fn with_asset(mut self, id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.insert(id, path);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, path: impl Into<PathBuf>) {
        self.assets.insert(id.into(), path.into());
    }

    pub fn from_toml_str(root: impl Into<PathBuf>, path: &Path, contents: &str) -> Result<Self, Error> {
        let raw = toml::from_str::<Raw>(contents).map_err(|source| Error::ParseFailed {
            path: path.to_owned(),
            source,
        })?;
        Ok(Self {
            root: root.into(),
            assets: raw.assets,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ReadFailed {
            path: path.to_owned(),
            source,
        })?;
        let root = path
            .parent()
            .map(Path::to_owned)
            .unwrap_or_default();
        let index = Self::from_toml_str(root, path, &contents)?;
        log::info!("loaded {} asset(s) from {:?}", index.len(), path);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetResolver for AssetIndex {
    fn resolve(&self, id: &str) -> Option<PathBuf> {
        self.assets.get(id).map(|path| self.root.join(path))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resolves_relative_to_index_dir() {
        let index = AssetIndex::from_toml_str(
            "/work/game",
            Path::new("/work/game/assets.toml"),
            r#"
[assets]
abc = "Plugins/iOS/Wrapper.framework"
def = "/opt/frameworks/Other.framework"
"#,
        )
        .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.resolve("abc"),
            Some(PathBuf::from("/work/game/Plugins/iOS/Wrapper.framework"))
        );
        assert_eq!(
            index.resolve("def"),
            Some(PathBuf::from("/opt/frameworks/Other.framework"))
        );
        assert_eq!(index.resolve("nope"), None);
    }

    #[test]
    fn empty_index_resolves_nothing() {
        let index =
            AssetIndex::from_toml_str("", Path::new("assets.toml"), "").unwrap();
        assert!(index.is_empty());
        assert_eq!(index.resolve("abc"), None);
    }

    #[test]
    fn missing_index_is_an_error() {
        let err = AssetIndex::load("/definitely/not/an/assets.toml").unwrap_err();
        assert!(matches!(err, Error::ReadFailed { .. }));
    }
}
