use ::plist::{Dictionary, Value};
use std::{
    io::Cursor,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read property list {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: ::plist::Error,
    },
    #[error("Property list {path:?} doesn't have a dictionary at its root")]
    RootNotDictionary { path: PathBuf },
    #[error("Failed to write property list {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: ::plist::Error,
    },
}

/// A property list with a dictionary root, such as an entitlements file or
/// an `ExportOptions.plist`.
///
/// Setters always overwrite whatever the key held before, so applying the
/// same settings twice leaves the document unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    root: Dictionary,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_value(path: &Path, value: Value) -> Result<Self, Error> {
        value
            .into_dictionary()
            .map(|root| Self { root })
            .ok_or_else(|| Error::RootNotDictionary {
                path: path.to_owned(),
            })
    }

    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self, Error> {
        let value = Value::from_reader(Cursor::new(bytes)).map_err(|source| Error::ReadFailed {
            path: path.to_owned(),
            source,
        })?;
        Self::from_value(path, value)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let value = Value::from_file(path).map_err(|source| Error::ReadFailed {
            path: path.to_owned(),
            source,
        })?;
        Self::from_value(path, value)
    }

    /// Loads `path`, or starts an empty document if nothing's there yet.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            log::info!("{:?} doesn't exist yet; starting from an empty document", path);
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        Value::Dictionary(self.root.clone())
            .to_file_xml(path)
            .map_err(|source| Error::WriteFailed {
                path: path.to_owned(),
                source,
            })
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.root.contains_key(key)
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        log::info!("setting {:?} to {:?}", key, value);
        self.root.insert(key.to_owned(), Value::String(value));
    }

    /// Replaces `key` with a fresh array holding `values` in order.
    pub fn set_string_array<I, S>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|value| Value::String(value.into()))
            .collect::<Vec<_>>();
        log::info!("setting {:?} to {} item(s)", key, values.len());
        self.root.insert(key.to_owned(), Value::Array(values));
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.root.get(key).and_then(Value::as_string)
    }

    /// The string items of the array at `key`; non-string items are skipped.
    pub fn get_string_array(&self, key: &str) -> Option<Vec<&str>> {
        self.root
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_string).collect())
    }
}
