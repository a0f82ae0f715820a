//! PyPI to conda package name translation.

use std::str::FromStr;

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Explicit PyPI name → conda name overrides.
///
/// Lookups are exact and case-sensitive: `PyQt5` and `pyqt5` are different
/// keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable(FxHashMap<String, String>);

impl NameTable {
    /// An empty table; every name falls through to normalization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an override.
    pub fn insert(&mut self, pypi: impl Into<String>, conda: impl Into<String>) {
        self.0.insert(pypi.into(), conda.into());
    }

    /// Look up the override for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Extend the table with the given overrides, later entries winning.
    pub fn extend<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (pypi, conda) in entries {
            self.insert(pypi, conda);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for NameTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

/// A malformed `pypi:conda` name pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid name difference `{0}`, expected `pypi-name:conda-name`")]
pub struct NamePairError(String);

impl FromStr for NameTable {
    type Err = NamePairError;

    /// Parse `PyQt5:pyqt,beautifulsoup4:beautiful-soup`. Pairs are separated
    /// by commas or newlines.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::project::split_list(s, ',')
            .into_iter()
            .map(|item| parse_pair(&item))
            .collect()
    }
}

fn parse_pair(item: &str) -> Result<(String, String), NamePairError> {
    let parts = crate::project::split_list(item, ':');
    match parts.as_slice() {
        [pypi, conda] => Ok((pypi.clone(), conda.clone())),
        _ => Err(NamePairError(item.to_owned())),
    }
}

/// Translate a PyPI package name into its conda name.
///
/// An exact match in `table` wins; anything else is lowercased with
/// underscores replaced by hyphens. Translating an already-translated name
/// that is not itself a key is a no-op.
pub fn translate_name(name: &str, table: &NameTable) -> String {
    match table.get(name) {
        Some(conda) => conda.to_owned(),
        None => name.to_lowercase().replace('_', "-"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_entry_wins() {
        let table = NameTable::from_iter([("PyQt5", "pyqt")]);
        assert_eq!(translate_name("PyQt5", &table), "pyqt");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = NameTable::from_iter([("PyQt5", "pyqt")]);
        assert_eq!(translate_name("pyqt5", &table), "pyqt5");
    }

    #[test]
    fn fallback_normalizes() {
        assert_eq!(translate_name("Foo_Bar", &NameTable::new()), "foo-bar");
    }

    #[test]
    fn translation_is_idempotent() {
        let table = NameTable::from_iter([("PyQt5", "pyqt")]);
        for name in ["Foo_Bar", "PyQt5", "zope.interface"] {
            let once = translate_name(name, &table);
            assert_eq!(translate_name(&once, &table), once);
        }
    }

    #[test]
    fn parse_pairs() {
        let table: NameTable = "PyQt5:pyqt, beautifulsoup4 : beautiful-soup\nfoo:bar"
            .parse()
            .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("PyQt5"), Some("pyqt"));
        assert_eq!(table.get("beautifulsoup4"), Some("beautiful-soup"));
        assert_eq!(table.get("foo"), Some("bar"));
    }

    #[test]
    fn parse_rejects_missing_colon() {
        let err = "PyQt5".parse::<NameTable>().unwrap_err();
        assert!(err.to_string().contains("`PyQt5`"));
    }

    #[test]
    fn parse_rejects_extra_colon() {
        assert!("a:b:c".parse::<NameTable>().is_err());
    }

    #[test]
    fn parse_empty_string() {
        assert!("".parse::<NameTable>().unwrap().is_empty());
    }
}
