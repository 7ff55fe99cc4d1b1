//! Instruction (prompt) table
//!
//! Two-column delimited text, `id,instruction` or `id;instruction`. The
//! delimiter is picked from the header line: `;` unless the header holds more
//! commas than semicolons. Every row is reachable by its raw id and by the
//! normalized id.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::identifier::normalize;

/// Lookup from identifier to prompt text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionTable {
    entries: HashMap<String, String>,
}

/// Delimiter for a header line; semicolon wins ties
fn detect_delimiter(header: &str) -> u8 {
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons >= commas {
        b';'
    } else {
        b','
    }
}

impl InstructionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse table text (first line is the header)
    ///
    /// Rows with fewer than two fields or an empty id are skipped. Raw ids take
    /// precedence over normalized aliases when the two collide.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim_start_matches('\u{feff}');
        let header = text
            .lines()
            .next()
            .ok_or_else(|| Error::InstructionLoad("instruction table is empty".to_string()))?;
        let delimiter = detect_delimiter(header);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut raw = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                Error::InstructionLoad(format!("row {}: {}", line + 2, e))
            })?;
            let (Some(id), Some(instruction)) = (record.get(0), record.get(1)) else {
                continue;
            };
            if id.is_empty() {
                continue;
            }
            raw.push((id.to_string(), instruction.to_string()));
        }

        let mut entries = HashMap::new();
        for (id, instruction) in &raw {
            entries.insert(id.clone(), instruction.clone());
        }
        for (id, instruction) in raw {
            entries.entry(normalize(&id)).or_insert(instruction);
        }

        debug!(
            rows = entries.len(),
            delimiter = %(delimiter as char),
            "Instruction table parsed"
        );

        Ok(Self { entries })
    }

    /// Read and parse a table file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::InstructionLoad(format!("{}: {}", path.display(), e)))?;
        Self::parse(&text)
    }

    /// Prompt for an identifier, trying the raw form then the normalized form
    pub fn lookup(&self, id: &str) -> Option<&str> {
        self.entries
            .get(id)
            .or_else(|| self.entries.get(&normalize(id)))
            .map(String::as_str)
    }

    /// Number of keys (raw ids and normalized aliases)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_semicolon_table_registers_raw_and_normalized() {
        let table = InstructionTable::parse("id;instruction\n001;Draw a cat\n").unwrap();
        assert_eq!(table.lookup("001"), Some("Draw a cat"));
        assert_eq!(table.lookup("1"), Some("Draw a cat"));
    }

    #[test]
    fn test_comma_table() {
        let table = InstructionTable::parse("id,instruction\n7,A red bicycle\n08,A boat\n").unwrap();
        assert_eq!(table.lookup("7"), Some("A red bicycle"));
        assert_eq!(table.lookup("8"), Some("A boat"));
        assert_eq!(table.lookup("008"), Some("A boat"));
    }

    #[test]
    fn test_delimiter_detection() {
        assert_eq!(detect_delimiter("id;instruction"), b';');
        assert_eq!(detect_delimiter("id,instruction"), b',');
        assert_eq!(detect_delimiter("id;instruction,extra"), b';');
        assert_eq!(detect_delimiter("id,instruction,notes;x"), b',');
        assert_eq!(detect_delimiter("id instruction"), b';');
    }

    #[test]
    fn test_quoted_fields_unwrapped() {
        let table =
            InstructionTable::parse("id,instruction\n\"3\",\"A dog, sitting\"\n").unwrap();
        assert_eq!(table.lookup("3"), Some("A dog, sitting"));
    }

    #[test]
    fn test_semicolon_rows_may_contain_commas() {
        let table = InstructionTable::parse("id;instruction\n4;Fog, rain and snow\n").unwrap();
        assert_eq!(table.lookup("4"), Some("Fog, rain and snow"));
    }

    #[test]
    fn test_short_and_blank_rows_skipped() {
        let table = InstructionTable::parse("id;instruction\n5\n;orphan\n6;ok\n").unwrap();
        assert_eq!(table.lookup("5"), None);
        assert_eq!(table.lookup("6"), Some("ok"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_raw_id_wins_over_normalized_alias() {
        let table = InstructionTable::parse("id;instruction\n001;first\n1;second\n").unwrap();
        assert_eq!(table.lookup("1"), Some("second"));
        assert_eq!(table.lookup("001"), Some("first"));
    }

    #[test]
    fn test_lookup_normalizes_query() {
        let table = InstructionTable::parse("id;instruction\n12;twelve\n").unwrap();
        assert_eq!(table.lookup("0012"), Some("twelve"));
        assert_eq!(table.lookup("13"), None);
    }

    #[test]
    fn test_windows_line_endings_and_bom() {
        let table = InstructionTable::parse("\u{feff}id;instruction\r\n2;two\r\n").unwrap();
        assert_eq!(table.lookup("2"), Some("two"));
    }

    #[test]
    fn test_empty_text_is_load_failure() {
        assert!(matches!(
            InstructionTable::parse(""),
            Err(Error::InstructionLoad(_))
        ));
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let table = InstructionTable::parse("id;instruction\n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = InstructionTable::load(Path::new("/nonexistent/instructions.csv")).unwrap_err();
        assert!(matches!(err, Error::InstructionLoad(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id;instruction").unwrap();
        writeln!(file, "010;Lighthouse at dusk").unwrap();
        let table = InstructionTable::load(file.path()).unwrap();
        assert_eq!(table.lookup("10"), Some("Lighthouse at dusk"));
    }
}
