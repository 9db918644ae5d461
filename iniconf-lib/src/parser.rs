use crate::grammar::{Line, LineGrammar};
use crate::models::{LineIndex, ValueTable};
use crate::IniError;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedIni {
    /// Every line exactly as read, bytes included, with only the `\n` terminator removed.
    pub lines: Vec<Vec<u8>>,
    pub table: ValueTable,
    pub line_index: LineIndex,
}

/// Lines before the first header belong to the section named `""`. A repeated key overwrites
/// both its value and its recorded line number.
pub fn parse(content: &[u8]) -> Result<ParsedIni, IniError> {
    let grammar = LineGrammar::shared()?;
    let mut parsed = ParsedIni::default();
    let mut current_section = String::new();

    for (line_number, raw_line) in split_lines(content).enumerate() {
        // Invalid UTF-8 is replaced for classification only; the raw line keeps its bytes.
        let text = String::from_utf8_lossy(raw_line);
        log::debug!("Parsing line {line_number}: {text}");

        match grammar.classify(&text)? {
            Line::SectionHeader(name) => {
                log::debug!("Entering section [{name}]");
                current_section = name.to_string();
            }
            Line::Entry(entry) => {
                parsed.table.set(&current_section, entry.key, entry.value);
                parsed.line_index.record(&current_section, entry.key, line_number);
            }
            Line::Inert => log::debug!("Keeping unparsable line {line_number} as is"),
            Line::Blank | Line::Comment => (),
        }

        parsed.lines.push(raw_line.to_vec());
    }

    Ok(parsed)
}

/// Splits on `\n` like a line reader: a final terminator does not start another line.
fn split_lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = content.strip_suffix(b"\n").unwrap_or(content);
    let lines = (!content.is_empty()).then(|| body.split(|&byte| byte == b'\n'));
    lines.into_iter().flatten()
}

#[cfg(test)]
mod tests {
    use super::{ParsedIni, parse};

    fn text_lines(parsed: &ParsedIni) -> Vec<String> {
        parsed.lines.iter().map(|line| String::from_utf8(line.clone()).unwrap()).collect()
    }

    #[test]
    fn parse_sections_and_entries() {
        let parsed = parse(b"[Control]\nTransmit = false ; off by default\n\n[Common]\nCall Sign = AA0NT\nTX Power = 20\n").unwrap();

        assert_eq!(parsed.lines.len(), 6);
        assert_eq!(parsed.table.len(), 2);

        let control = parsed.table.get_section_by_name("Control").unwrap();
        assert_eq!(control.get_value_by_key("Transmit"), Some("false"));

        let common = parsed.table.get_section_by_name("Common").unwrap();
        assert_eq!(common.get_value_by_key("Call Sign"), Some("AA0NT"));
        assert_eq!(common.get_value_by_key("TX Power"), Some("20"));

        assert_eq!(parsed.line_index.get("Control", "Transmit"), Some(1));
        assert_eq!(parsed.line_index.get("Common", "TX Power"), Some(5));
    }

    #[test]
    fn entries_before_any_header_use_empty_section() {
        let parsed = parse(b"version = 3\n[A]\nk = v\n").unwrap();

        assert_eq!(parsed.table.get_section_by_name("").unwrap().get_value_by_key("version"), Some("3"));
        assert_eq!(parsed.table.sections().map(|(name, _)| name).collect::<Vec<_>>(), ["", "A"]);
    }

    #[test]
    fn last_occurrence_wins() {
        let parsed = parse(b"[A]\nk=1\nk=2\n").unwrap();

        assert_eq!(parsed.table.get_section_by_name("A").unwrap().get_value_by_key("k"), Some("2"));
        assert_eq!(parsed.line_index.get("A", "k"), Some(2));
    }

    #[test]
    fn header_with_comment_does_not_switch_section() {
        let parsed = parse(b"[A]\n[B] ; not a header\nk = v\n").unwrap();

        assert!(parsed.table.get_section_by_name("B").is_none());
        assert_eq!(parsed.table.get_section_by_name("A").unwrap().get_value_by_key("k"), Some("v"));
    }

    #[test]
    fn raw_lines_are_kept_verbatim() {
        let content = "; header comment\r\n[A]\r\n  k   =  v  \r\nnot an entry\r\n";
        let parsed = parse(content.as_bytes()).unwrap();

        assert_eq!(text_lines(&parsed), ["; header comment\r", "[A]\r", "  k   =  v  \r", "not an entry\r"]);
        assert_eq!(parsed.table.get_section_by_name("A").unwrap().get_value_by_key("k"), Some("v"));
    }

    #[test]
    fn missing_final_newline_and_empty_input() {
        assert_eq!(text_lines(&parse(b"[A]\nk = v").unwrap()), ["[A]", "k = v"]);
        assert!(parse(b"").unwrap().lines.is_empty());
        assert_eq!(text_lines(&parse(b"\n").unwrap()), [""]);
        assert_eq!(text_lines(&parse(b"a\n\n").unwrap()), ["a", ""]);
    }

    #[test]
    fn non_utf8_bytes_stay_in_raw_lines() {
        let parsed = parse(b"; Gr\xfc\xdfe\n[A]\nk = v\xe9\n").unwrap();

        assert_eq!(parsed.lines[0], b"; Gr\xfc\xdfe");
        assert_eq!(parsed.lines[2], b"k = v\xe9");
        assert_eq!(parsed.table.get_section_by_name("A").unwrap().get_value_by_key("k"), Some("v\u{fffd}"));
    }
}
