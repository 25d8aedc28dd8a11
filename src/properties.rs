use alloc::{
    borrow::ToOwned as _,
    collections::{btree_map::Entry, BTreeMap},
    string::String,
};
use core::str::FromStr;

use crate::errors::PropertiesErrorKind;

/// Flat `key=value` property source.
///
/// One assignment per line, split on the first `=`, no escaping and no sections.
/// Key and value are trimmed and blank lines are skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    map: BTreeMap<String, String>,
}

impl Properties {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// - Returns [`PropertiesErrorKind::Malformed`] for a line without `=` or with an empty key
    /// - Returns [`PropertiesErrorKind::DuplicateKey`] if a key is assigned twice
    pub fn parse(text: &str) -> Result<Self, PropertiesErrorKind> {
        let mut map = BTreeMap::new();
        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(PropertiesErrorKind::Malformed { line: line_number });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(PropertiesErrorKind::Malformed { line: line_number });
            }

            match map.entry(key.to_owned()) {
                Entry::Vacant(entry) => {
                    entry.insert(value.trim().to_owned());
                }
                Entry::Occupied(entry) => {
                    return Err(PropertiesErrorKind::DuplicateKey {
                        key: entry.key().clone(),
                        line: line_number,
                    });
                }
            }
        }
        Ok(Self { map })
    }

    /// Reads the whole file once and parses it
    ///
    /// # Errors
    /// - Returns [`PropertiesErrorKind::Io`] if the file can't be read
    /// - Returns parse errors of [`Self::parse`]
    #[cfg(feature = "std")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, PropertiesErrorKind> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.map.insert(key.into(), value.into())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FromStr for Properties {
    type Err = PropertiesErrorKind;

    #[inline]
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
        }
    }
}
