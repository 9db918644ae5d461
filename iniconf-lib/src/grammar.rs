use std::sync::LazyLock;

use regex::Regex;

use crate::models::IniEntry;
use crate::{ENTRY_KEY_GROUP_NAME, ENTRY_VALUE_GROUP_NAME, IniError, SECTION_NAME_GROUP_NAME};

const WHITESPACE: &[char] = &[' ', '\t', '\r', '\n'];
const COMMENT_MARKERS: &[char] = &[';', '#'];

static SHARED_GRAMMAR: LazyLock<Result<LineGrammar, regex::Error>> = LazyLock::new(LineGrammar::compile);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'content> {
    Blank,
    Comment,
    SectionHeader(&'content str),
    Entry(IniEntry<'content>),
    /// Anything else, including `=`-lines with an empty key. Kept verbatim, never parsed.
    Inert,
}

#[derive(Debug, Clone)]
pub struct LineGrammar {
    section_header_regex: Regex,
    key_value_regex: Regex,
}

impl LineGrammar {
    pub fn new() -> Result<Self, IniError> {
        Ok(Self::compile()?)
    }

    pub fn shared() -> Result<&'static Self, IniError> {
        SHARED_GRAMMAR
            .as_ref()
            .map_err(|error| IniError::RegexCompilationError(error.clone()))
    }

    fn compile() -> Result<Self, regex::Error> {
        // Applied to trimmed lines only. `[Foo] ; note` does not end in `]` and is not a header.
        let section_header_regex = Regex::new(&format!(r"(?s)^\[(?P<{SECTION_NAME_GROUP_NAME}>.*)\]$"))?;
        let key_value_regex = Regex::new(&format!(
            r"(?s)^(?P<{ENTRY_KEY_GROUP_NAME}>[^=]*)=(?P<{ENTRY_VALUE_GROUP_NAME}>.*)$"
        ))?;

        Ok(Self {
            section_header_regex,
            key_value_regex,
        })
    }

    pub fn classify<'content>(&self, raw_line: &'content str) -> Result<Line<'content>, IniError> {
        let line = trim(raw_line);

        if line.is_empty() {
            return Ok(Line::Blank);
        }

        if is_comment(line) {
            return Ok(Line::Comment);
        }

        if let Some(section_header_captures) = self.section_header_regex.captures(line) {
            return match section_header_captures.name(SECTION_NAME_GROUP_NAME) {
                Some(section_name) => Ok(Line::SectionHeader(section_name.as_str())),
                None => Err(IniError::RegexCaptureGroupNotFound(SECTION_NAME_GROUP_NAME)),
            };
        }

        if let Some(key_value_captures) = self.key_value_regex.captures(line) {
            let entry = IniEntry::try_from(key_value_captures)?;
            if !entry.key.is_empty() {
                return Ok(Line::Entry(entry));
            }
        }

        Ok(Line::Inert)
    }

    /// Whether `entry` written as `key = value` is read back under the same key.
    pub fn reads_back_as_entry(&self, entry: IniEntry<'_>) -> Result<bool, IniError> {
        if entry.key.contains('\n') || entry.value.contains('\n') {
            return Ok(false);
        }
        let line = entry.to_string();
        Ok(matches!(self.classify(&line)?, Line::Entry(parsed) if parsed.key == entry.key))
    }

    pub fn reads_back_as_header(&self, name: &str) -> Result<bool, IniError> {
        if name.contains('\n') {
            return Ok(false);
        }
        let line = format!("[{name}]");
        Ok(matches!(self.classify(&line)?, Line::SectionHeader(parsed) if parsed == name))
    }
}

/// Strips spaces, tabs, `\r` and `\n` from both ends, and nothing else.
pub fn trim(text: &str) -> &str {
    text.trim_matches(WHITESPACE)
}

pub fn is_comment(line: &str) -> bool {
    line.starts_with(COMMENT_MARKERS)
}

pub fn strip_inline_comment(value: &str) -> &str {
    match value.find(COMMENT_MARKERS) {
        Some(position) => trim(&value[..position]),
        None => value,
    }
}
