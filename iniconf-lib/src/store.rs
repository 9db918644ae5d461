use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::convert::{ConversionError, bool_to_string, double_to_string, int_to_string, parse_bool, parse_double, parse_int};
use crate::grammar::LineGrammar;
use crate::models::{IniSection, LineIndex, ValueTable};
use crate::parser::parse;
use crate::serializer::{NewKeyPolicy, render};
use crate::IniError;

/// The value table is authoritative for values, the raw lines for layout and order.
#[derive(Debug, Default, Clone)]
pub struct IniStore {
    path: Option<PathBuf>,
    table: ValueTable,
    lines: Vec<Vec<u8>>,
    line_index: LineIndex,
    pending_changes: bool,
    pub(crate) new_key_policy: NewKeyPolicy,
    pub(crate) atomic_save: bool,
}

impl IniStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, IniError> {
        let mut store = Self::with_path(path);
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        log::info!("File name set to {}", path.display());
        self.path = Some(path);
    }

    pub fn new_key_policy(&self) -> NewKeyPolicy {
        self.new_key_policy
    }

    /// A failed load leaves the store as it was.
    pub fn load(&mut self) -> Result<(), IniError> {
        let path = self.require_path()?;

        let content = fs::read(path).map_err(|source| {
            log::error!("Cannot open {} for reading: {source}", path.display());
            IniError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let parsed = parse(&content)?;
        log::info!("Loaded {} line(s) from {}", parsed.lines.len(), path.display());

        self.lines = parsed.lines;
        self.table = parsed.table;
        self.line_index = parsed.line_index;
        self.pending_changes = false;
        Ok(())
    }

    /// The raw lines are not updated, so the line index keeps describing the file as loaded.
    pub fn save(&self) -> Result<(), IniError> {
        let path = self.require_path()?;
        let rendered = render(LineGrammar::shared()?, &self.lines, &self.table, self.new_key_policy)?;

        let written = if self.atomic_save {
            write_atomically(path, &rendered)
        } else {
            fs::write(path, &rendered).map_err(|source| IniError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        if let Err(error) = &written {
            log::error!("Cannot write to {}: {error}", path.display());
        } else {
            log::info!("Saved {}", path.display());
        }
        written
    }

    pub fn commit_changes(&mut self) -> Result<(), IniError> {
        if !self.pending_changes {
            log::debug!("No pending changes to commit");
            return Ok(());
        }

        self.save()?;
        self.pending_changes = false;
        Ok(())
    }

    pub fn has_pending_changes(&self) -> bool {
        self.pending_changes
    }

    pub fn get_value(&self, section: &str, key: &str) -> Result<&str, IniError> {
        let Some(found_section) = self.table.get_section_by_name(section) else {
            log::warn!("Section not found: {section}");
            return Err(IniError::SectionNotFound(section.to_string()));
        };

        match found_section.get_value_by_key(key) {
            Some(value) => Ok(value),
            None => {
                log::warn!("Key not found in section {section}: {key}");
                Err(IniError::KeyNotFound {
                    section: section.to_string(),
                    key: key.to_string(),
                })
            }
        }
    }

    pub fn get_int_value(&self, section: &str, key: &str) -> Result<i64, IniError> {
        let value = self.get_value(section, key)?;
        parse_int(value).map_err(|error| conversion_error(section, key, value, "integer", error))
    }

    pub fn get_double_value(&self, section: &str, key: &str) -> Result<f64, IniError> {
        let value = self.get_value(section, key)?;
        parse_double(value).map_err(|error| conversion_error(section, key, value, "double", error))
    }

    pub fn get_bool_value(&self, section: &str, key: &str) -> Result<bool, IniError> {
        self.get_value(section, key).map(parse_bool)
    }

    pub fn set_string_value(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.table.set(section, key, value);
        self.pending_changes = true;
    }

    pub fn set_bool_value(&mut self, section: &str, key: &str, value: bool) {
        self.set_string_value(section, key, bool_to_string(value));
    }

    pub fn set_int_value(&mut self, section: &str, key: &str, value: i64) {
        self.set_string_value(section, key, int_to_string(value));
    }

    pub fn set_double_value(&mut self, section: &str, key: &str, value: f64) {
        self.set_string_value(section, key, double_to_string(value));
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.table.get_section_by_name(section).is_some()
    }

    pub fn has_key(&self, section: &str, key: &str) -> bool {
        self.table.contains(section, key)
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.table.sections().map(|(name, _)| name)
    }

    pub fn section(&self, section: &str) -> Result<&IniSection, IniError> {
        self.table
            .get_section_by_name(section)
            .ok_or_else(|| IniError::SectionNotFound(section.to_string()))
    }

    pub fn line_number(&self, section: &str, key: &str) -> Option<usize> {
        self.line_index.get(section, key)
    }

    fn require_path(&self) -> Result<&Path, IniError> {
        self.path.as_deref().ok_or_else(|| {
            log::error!("File name not set");
            IniError::NoFileName
        })
    }
}

fn conversion_error(section: &str, key: &str, value: &str, target: &'static str, error: ConversionError) -> IniError {
    log::warn!("Cannot read {section}/{key} = '{value}' as {target}: {error}");

    let (section, key, value) = (section.to_string(), key.to_string(), value.to_string());
    match error {
        ConversionError::InvalidFormat => IniError::InvalidFormat { section, key, value, target },
        ConversionError::OutOfRange => IniError::OutOfRange { section, key, value, target },
    }
}

/// Writes into a temporary file next to `path` and renames it over `path`, keeping its permissions.
fn write_atomically(path: &Path, content: &[u8]) -> Result<(), IniError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_error = |source: std::io::Error| IniError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut temporary = tempfile::NamedTempFile::new_in(directory).map_err(io_error)?;
    if let Ok(metadata) = fs::metadata(path) {
        temporary.as_file().set_permissions(metadata.permissions()).map_err(io_error)?;
    }
    temporary.write_all(content).map_err(io_error)?;
    temporary.as_file().sync_all().map_err(io_error)?;
    temporary.persist(path).map_err(|error| io_error(error.error))?;
    Ok(())
}
