use std::fmt::Display;

use indexmap::IndexMap;

use crate::models::entry::IniEntry;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IniSection {
    entries: IndexMap<String, String>,
}

impl IniSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_value_by_key(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = IniEntry<'_>> {
        self.entries.iter().map(|(key, value)| IniEntry { key: key.as_str(), value: value.as_str() })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Display for IniSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in self.entries() {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
