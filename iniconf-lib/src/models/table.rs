use indexmap::IndexMap;

use crate::models::section::IniSection;

/// Section name to section, ordered by first appearance. Entries before any header live under `""`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValueTable {
    sections: IndexMap<String, IniSection>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_section_by_name(&self, name: &str) -> Option<&IniSection> {
        self.sections.get(name)
    }

    pub fn set(&mut self, section: &str, key: impl Into<String>, value: impl Into<String>) {
        self.sections.entry(section.to_string()).or_default().set(key, value);
    }

    pub fn contains(&self, section: &str, key: &str) -> bool {
        self.get_section_by_name(section).is_some_and(|s| s.contains_key(key))
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &IniSection)> {
        self.sections.iter().map(|(name, section)| (name.as_str(), section))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
