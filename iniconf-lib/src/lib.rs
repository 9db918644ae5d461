mod builders;
mod convert;
mod grammar;
pub mod models;
mod parser;
mod serializer;
mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use crate::builders::IniStoreBuilder;
pub use crate::convert::{ConversionError, bool_to_string, double_to_string, int_to_string, parse_bool, parse_double, parse_int};
pub use crate::grammar::{Line, LineGrammar};
pub use crate::parser::{ParsedIni, parse};
pub use crate::serializer::{NewKeyPolicy, render};
pub use crate::store::IniStore;

pub const ENTRY_KEY_GROUP_NAME: &str = "key";
pub const ENTRY_VALUE_GROUP_NAME: &str = "value";
pub const SECTION_NAME_GROUP_NAME: &str = "section_name";

#[derive(Error, Debug)]
pub enum IniError {
    #[error("No file name has been set for this ini store")]
    NoFileName,
    #[error("Cannot open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Section '{0}' not found in ini file")]
    SectionNotFound(String),
    #[error("Key '{key}' not found in section '{section}'")]
    KeyNotFound { section: String, key: String },
    #[error("Value '{value}' of {section}/{key} is not a valid {target}")]
    InvalidFormat {
        section: String,
        key: String,
        value: String,
        target: &'static str,
    },
    #[error("Value '{value}' of {section}/{key} is out of range for {target}")]
    OutOfRange {
        section: String,
        key: String,
        value: String,
        target: &'static str,
    },
    #[error("Regex compilation error: {0}")]
    RegexCompilationError(#[from] regex::Error),
    #[error("The group {0} was not found in the provided regex")]
    RegexCaptureGroupNotFound(&'static str),
}

/// Payload-free tag of an [`IniError`], for callers that only branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoFileName,
    Io,
    SectionNotFound,
    KeyNotFound,
    InvalidFormat,
    OutOfRange,
    Grammar,
}

impl IniError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IniError::NoFileName => ErrorKind::NoFileName,
            IniError::Io { .. } => ErrorKind::Io,
            IniError::SectionNotFound(_) => ErrorKind::SectionNotFound,
            IniError::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            IniError::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            IniError::OutOfRange { .. } => ErrorKind::OutOfRange,
            IniError::RegexCompilationError(_) | IniError::RegexCaptureGroupNotFound(_) => ErrorKind::Grammar,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::{ErrorKind, IniError};

    #[test]
    fn error_kinds_are_distinguishable() {
        let section = IniError::SectionNotFound("Common".to_string());
        let key = IniError::KeyNotFound { section: "Common".to_string(), key: "TX Power".to_string() };

        assert_eq!(section.kind(), ErrorKind::SectionNotFound);
        assert_eq!(key.kind(), ErrorKind::KeyNotFound);
        assert_ne!(section.kind(), key.kind());
    }

    #[test]
    fn io_error_message_names_the_path() {
        let error = IniError::Io {
            path: "/nowhere/config.ini".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };

        assert_eq!(error.kind(), ErrorKind::Io);
        assert!(error.to_string().contains("/nowhere/config.ini"));
    }
}
