use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::grammar::{Line, LineGrammar, trim};
use crate::models::{IniEntry, ValueTable};
use crate::IniError;

/// What to do on save with keys that are tracked in memory but have no line in the file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NewKeyPolicy {
    #[default]
    Append,
    /// Keep them in memory only, until the next load.
    Drop,
}

pub fn render(grammar: &LineGrammar, lines: &[Vec<u8>], table: &ValueTable, policy: NewKeyPolicy) -> Result<Vec<u8>, IniError> {
    let texts: Vec<Cow<'_, str>> = lines.iter().map(|line| String::from_utf8_lossy(line)).collect();
    let mut output: Vec<Vec<u8>> = Vec::with_capacity(lines.len());
    let mut current_section = "";
    let mut written: HashSet<(&str, &str)> = HashSet::new();
    // Position in `output` where keys missing from a section's last block would go.
    let mut insert_positions: HashMap<&str, usize> = HashMap::from([("", 0)]);

    for (raw_line, text) in lines.iter().zip(&texts) {
        match grammar.classify(text)? {
            Line::SectionHeader(name) => {
                output.push(raw_line.clone());
                current_section = name;
                insert_positions.insert(name, output.len());
            }
            Line::Entry(IniEntry { key, .. }) => {
                match table.get_section_by_name(current_section).and_then(|s| s.get_value_by_key(key)) {
                    Some(value) => {
                        let patched = IniEntry { key, value }.to_string();
                        log::debug!("Writing [{current_section}] {patched}");
                        output.push(patched.into_bytes());
                        written.insert((current_section, key));
                    }
                    None => output.push(raw_line.clone()),
                }
                insert_positions.insert(current_section, output.len());
            }
            Line::Blank | Line::Comment | Line::Inert => output.push(raw_line.clone()),
        }
    }

    if policy == NewKeyPolicy::Append {
        append_new_keys(grammar, &mut output, table, &written, &insert_positions)?;
    }

    let mut rendered = Vec::with_capacity(output.iter().map(|line| line.len() + 1).sum());
    for line in output {
        rendered.extend_from_slice(&line);
        rendered.push(b'\n');
    }
    Ok(rendered)
}

fn append_new_keys(
    grammar: &LineGrammar,
    output: &mut Vec<Vec<u8>>,
    table: &ValueTable,
    written: &HashSet<(&str, &str)>,
    insert_positions: &HashMap<&str, usize>,
) -> Result<(), IniError> {
    let mut insertions: BTreeMap<usize, Vec<Vec<u8>>> = BTreeMap::new();
    let mut new_sections: Vec<Vec<u8>> = Vec::new();

    for (name, section) in table.sections() {
        let mut missing = Vec::new();
        for entry in section.entries().filter(|entry| !written.contains(&(name, entry.key))) {
            if grammar.reads_back_as_entry(entry)? {
                missing.push(entry.to_string().into_bytes());
            } else {
                log::warn!("Not writing [{name}] '{}': the key would not read back from the file", entry.key);
            }
        }

        if missing.is_empty() {
            continue;
        }

        match insert_positions.get(name) {
            Some(&position) => {
                log::debug!("Appending {} new key(s) to section [{name}]", missing.len());
                insertions.entry(position).or_default().extend(missing);
            }
            None if grammar.reads_back_as_header(name)? => {
                log::debug!("Appending new section [{name}]");
                new_sections.push(format!("[{name}]").into_bytes());
                new_sections.extend(missing);
                // Separates this section from the next new one.
                new_sections.push(Vec::new());
            }
            None => log::warn!("Not writing section '{name}': its header would not read back from the file"),
        }
    }

    for (position, lines) in insertions.into_iter().rev() {
        output.splice(position..position, lines);
    }

    if new_sections.is_empty() {
        return Ok(());
    }

    new_sections.pop();
    if output.last().is_some_and(|line| !trim(&String::from_utf8_lossy(line)).is_empty()) {
        output.push(Vec::new());
    }
    output.extend(new_sections);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewKeyPolicy, render};
    use crate::grammar::LineGrammar;
    use crate::parser::parse;

    fn round_trip(content: &str, policy: NewKeyPolicy, edit: impl FnOnce(&mut crate::models::ValueTable)) -> String {
        let mut parsed = parse(content.as_bytes()).unwrap();
        edit(&mut parsed.table);
        let rendered = render(LineGrammar::shared().unwrap(), &parsed.lines, &parsed.table, policy).unwrap();
        String::from_utf8(rendered).unwrap()
    }

    #[test]
    fn untouched_file_keeps_comments_and_normalizes_entries() {
        let content = "; top comment\n\n[A]\nkey=value\n  spaced   =   out  \n# note\nrandom text\n[B] ; inert\n = orphan\n";
        let rendered = round_trip(content, NewKeyPolicy::Append, |_| ());

        assert_eq!(
            rendered,
            "; top comment\n\n[A]\nkey = value\nspaced = out\n# note\nrandom text\n[B] ; inert\n = orphan\n"
        );
    }

    #[test]
    fn edited_value_drops_inline_comment() {
        let rendered = round_trip("[Control]\nTransmit = false ; off by default\n", NewKeyPolicy::Append, |table| {
            table.set("Control", "Transmit", "true")
        });

        assert_eq!(rendered, "[Control]\nTransmit = true\n");
    }

    #[test]
    fn duplicate_lines_all_get_current_value() {
        let rendered = round_trip("[A]\nk=1\nk=2\n", NewKeyPolicy::Append, |_| ());

        assert_eq!(rendered, "[A]\nk = 2\nk = 2\n");
    }

    #[test]
    fn carriage_returns_survive_on_verbatim_lines() {
        let rendered = round_trip("; c\r\n[A]\r\nk = v\r\n", NewKeyPolicy::Append, |_| ());

        assert_eq!(rendered, "; c\r\n[A]\r\nk = v\n");
    }

    #[test]
    fn drop_policy_leaves_new_keys_out() {
        let rendered = round_trip("[A]\nk = v\n", NewKeyPolicy::Drop, |table| {
            table.set("A", "new", "1");
            table.set("Fresh", "x", "y");
        });

        assert_eq!(rendered, "[A]\nk = v\n");
    }

    #[test]
    fn append_policy_places_new_keys_after_last_entry_of_section() {
        let content = "[A]\nk = v\n; trailing comment\n\n[B]\nb = 1\n";
        let rendered = round_trip(content, NewKeyPolicy::Append, |table| {
            table.set("A", "new", "1");
            table.set("B", "other", "2");
        });

        assert_eq!(rendered, "[A]\nk = v\nnew = 1\n; trailing comment\n\n[B]\nb = 1\nother = 2\n");
    }

    #[test]
    fn append_policy_uses_header_when_section_has_no_entries() {
        let rendered = round_trip("[Empty]\n; nothing yet\n", NewKeyPolicy::Append, |table| table.set("Empty", "k", "v"));

        assert_eq!(rendered, "[Empty]\nk = v\n; nothing yet\n");
    }

    #[test]
    fn append_policy_writes_unknown_sections_at_the_end() {
        let rendered = round_trip("[A]\nk = v\n", NewKeyPolicy::Append, |table| {
            table.set("NewSection", "NewKey", "NewValue");
            table.set("Other", "x", "1");
        });

        assert_eq!(rendered, "[A]\nk = v\n\n[NewSection]\nNewKey = NewValue\n\n[Other]\nx = 1\n");
    }

    #[test]
    fn append_policy_puts_global_keys_before_first_header() {
        let rendered = round_trip("[A]\nk = v\n", NewKeyPolicy::Append, |table| table.set("", "version", "2"));

        assert_eq!(rendered, "version = 2\n[A]\nk = v\n");
    }

    #[test]
    fn append_policy_on_empty_file() {
        let rendered = round_trip("", NewKeyPolicy::Append, |table| table.set("A", "k", "v"));

        assert_eq!(rendered, "[A]\nk = v\n");
    }

    #[test]
    fn append_policy_skips_keys_that_would_not_read_back() {
        let rendered = round_trip("[A]\nk = 1\n", NewKeyPolicy::Append, |table| {
            table.set("A", "a=b", "v");
            table.set("A", "", "e");
            table.set("A", "; note", "x");
            table.set("A", "[x", "]");
            table.set("A", "ok", "2");
        });

        assert_eq!(rendered, "[A]\nk = 1\nok = 2\n");
        assert_eq!(round_trip(&rendered, NewKeyPolicy::Append, |_| ()), rendered);
    }

    #[test]
    fn append_policy_skips_sections_that_would_not_read_back() {
        let rendered = round_trip("[A]\nk = 1\n", NewKeyPolicy::Append, |table| {
            table.set("two\nlines", "k", "v");
            table.set("Only Bad Keys", "a=b", "v");
        });

        assert_eq!(rendered, "[A]\nk = 1\n");
    }

    #[test]
    fn non_utf8_lines_are_written_back_unchanged() {
        let mut parsed = parse(b"; Gr\xfc\xdfe\n[A]\nk = v\n").unwrap();
        parsed.table.set("A", "k", "w");

        let rendered = render(LineGrammar::shared().unwrap(), &parsed.lines, &parsed.table, NewKeyPolicy::Append).unwrap();

        assert_eq!(rendered, b"; Gr\xfc\xdfe\n[A]\nk = w\n");
    }
}
