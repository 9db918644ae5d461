use std::collections::HashMap;

/// Zero-based line of the last occurrence of each (section, key) seen while loading.
///
/// Derived from the raw lines; the serializer does not consult it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineIndex {
    lines: HashMap<String, HashMap<String, usize>>,
}

impl LineIndex {
    pub fn record(&mut self, section: &str, key: &str, line_number: usize) {
        self.lines
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), line_number);
    }

    pub fn get(&self, section: &str, key: &str) -> Option<usize> {
        self.lines.get(section)?.get(key).copied()
    }
}
