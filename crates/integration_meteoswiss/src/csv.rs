//! Semicolon-delimited CSV decoding and parsing
//!
//! Upstream files are served without a charset and contain accented
//! station names in a legacy 8-bit encoding. Decoding tries an ordered
//! list of candidates and accepts the first one yielding a plausible
//! number of lines.

use std::collections::HashMap;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use tracing::debug;

use crate::error::MeteoSwissError;

/// Candidate encodings, tried in order
pub const DEFAULT_ENCODINGS: [&Encoding; 2] = [WINDOWS_1252, UTF_8];

/// A candidate must produce more lines than this to be accepted outright
pub const MIN_ACCEPTED_LINES: usize = 10;

/// Header plus at least one data row
const MIN_LINES: usize = 2;

/// Decode raw bytes with [`DEFAULT_ENCODINGS`]
///
/// # Errors
///
/// Returns [`MeteoSwissError::Decode`] when no candidate decodes the input
/// or the decoded text has fewer than two lines.
pub fn decode(bytes: &[u8]) -> Result<String, MeteoSwissError> {
    decode_with(bytes, &DEFAULT_ENCODINGS)
}

/// Decode raw bytes trying `encodings` in order
///
/// A byte order mark overrides the candidate list. Decoding is strict: a
/// candidate that would need replacement characters is skipped. The first
/// candidate producing more than [`MIN_ACCEPTED_LINES`] lines wins;
/// otherwise the last candidate that decoded at all is used, provided it
/// yields a header and one data row.
///
/// # Errors
///
/// Returns [`MeteoSwissError::Decode`] when no candidate decodes the input
/// or the decoded text has fewer than two lines.
pub fn decode_with(bytes: &[u8], encodings: &[&'static Encoding]) -> Result<String, MeteoSwissError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let text = strict_decode(encoding, &bytes[bom_len..]).ok_or_else(|| {
            MeteoSwissError::Decode(format!("invalid {} after byte order mark", encoding.name()))
        })?;
        return check_line_count(text, encoding);
    }

    let mut fallback: Option<(String, &'static Encoding)> = None;
    for &encoding in encodings {
        let Some(text) = strict_decode(encoding, bytes) else {
            debug!(encoding = encoding.name(), "Encoding candidate rejected");
            continue;
        };
        let lines = line_count(&text);
        if lines > MIN_ACCEPTED_LINES {
            debug!(encoding = encoding.name(), lines, "Decoded CSV");
            return Ok(text);
        }
        debug!(encoding = encoding.name(), lines, "Encoding candidate produced too few lines");
        fallback = Some((text, encoding));
    }

    match fallback {
        Some((text, encoding)) => check_line_count(text, encoding),
        None => Err(MeteoSwissError::Decode(
            "no candidate encoding could decode the content".to_string(),
        )),
    }
}

fn strict_decode(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(std::borrow::Cow::into_owned)
}

fn check_line_count(text: String, encoding: &'static Encoding) -> Result<String, MeteoSwissError> {
    let lines = line_count(&text);
    if lines < MIN_LINES {
        return Err(MeteoSwissError::Decode(format!(
            "decoded {} content has {lines} line(s), need at least {MIN_LINES}",
            encoding.name()
        )));
    }
    Ok(text)
}

fn line_count(text: &str) -> usize {
    text.trim().lines().count()
}

/// Strip surrounding whitespace and quote characters from a field
pub fn clean_field(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'')
}

/// Parse a numeric field, absent when empty or unparsable
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = clean_field(raw);
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One data row keyed by header name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    fields: HashMap<String, String>,
}

impl CsvRow {
    /// Non-empty field value
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Numeric field value, fail soft
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(parse_number)
    }

    /// First non-empty value among alternative column names
    pub fn first_of(&self, columns: &[&str]) -> Option<&str> {
        columns.iter().find_map(|c| self.get(c))
    }

    /// True when every field is empty
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(String::is_empty)
    }
}

/// Parsed CSV document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    /// Cleaned header names in file order
    pub headers: Vec<String>,
    /// Data rows in file order
    pub rows: Vec<CsvRow>,
}

impl CsvTable {
    /// Parse decoded semicolon-delimited text; the first line is the header
    ///
    /// Blank lines are skipped. Short rows leave trailing columns absent and
    /// surplus fields are dropped.
    pub fn parse(text: &str) -> Self {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let Some(header_line) = lines.next() else {
            return Self::default();
        };

        let headers: Vec<String> = header_line
            .split(';')
            .map(|h| clean_field(h).to_string())
            .collect();

        let rows = lines
            .map(|line| {
                let fields = headers
                    .iter()
                    .zip(line.split(';'))
                    .filter(|(name, _)| !name.is_empty())
                    .map(|(name, value)| (name.clone(), clean_field(value).to_string()))
                    .collect();
                CsvRow { fields }
            })
            .collect();

        Self { headers, rows }
    }

    /// Decode bytes and parse them
    ///
    /// # Errors
    ///
    /// Returns [`MeteoSwissError::Decode`] when decoding fails.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MeteoSwissError> {
        decode(bytes).map(|text| Self::parse(&text))
    }

    /// True if a column with this name exists
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Most recent row carrying at least one non-empty value in `columns`
    pub fn latest_with_any(&self, columns: &[&str]) -> Option<&CsvRow> {
        self.rows
            .iter()
            .rev()
            .find(|row| columns.iter().any(|c| row.get(c).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn latin1_sample(rows: usize) -> Vec<u8> {
        let mut text = String::from("station_abbr;station_name;station_canton\n");
        for i in 0..rows {
            text.push_str(&format!("S{i:02};Zürich Fluntern {i};ZH\n"));
        }
        let (bytes, _, unmappable) = WINDOWS_1252.encode(&text);
        assert!(!unmappable);
        bytes.into_owned()
    }

    #[test]
    fn test_latin1_bytes_select_latin1() {
        let bytes = latin1_sample(12);
        assert!(std::str::from_utf8(&bytes).is_err());

        let text = decode(&bytes).unwrap();
        assert!(line_count(&text) > MIN_ACCEPTED_LINES);
        assert!(text.contains("Zürich Fluntern 0"));
    }

    #[test]
    fn test_candidates_continue_past_short_decodes() {
        let bytes = "a;b\n1;2\n".as_bytes();
        let text = decode_with(bytes, &[WINDOWS_1252, UTF_8]).unwrap();
        assert_eq!(text, "a;b\n1;2\n");
    }

    #[test]
    fn test_strict_candidate_is_skipped() {
        let bytes = latin1_sample(12);
        let text = decode_with(&bytes, &[UTF_8, WINDOWS_1252]).unwrap();
        assert!(text.contains("Zürich"));
    }

    #[test]
    fn test_no_candidate_decodes() {
        let bytes = latin1_sample(12);
        let err = decode_with(&bytes, &[UTF_8]).unwrap_err();
        assert!(matches!(err, MeteoSwissError::Decode(_)));
    }

    #[test]
    fn test_single_line_is_rejected() {
        let err = decode(b"only;a;header\n").unwrap_err();
        assert!(matches!(err, MeteoSwissError::Decode(_)));
        assert!(matches!(decode(b""), Err(MeteoSwissError::Decode(_))));
    }

    #[test]
    fn test_utf8_bom_wins() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("name\nGenève\n".as_bytes());
        let text = decode(&bytes).unwrap();
        assert_eq!(text, "name\nGenève\n");
    }

    #[test]
    fn test_parse_maps_rows_by_header() {
        let table = CsvTable::parse(
            "\"station_abbr\"; reference_timestamp ;tre200s0\r\nSMA;01.07.2025 12:00; 21.4 \r\n\r\nSMA;01.07.2025 12:10\n",
        );
        assert_eq!(table.headers, vec!["station_abbr", "reference_timestamp", "tre200s0"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("station_abbr"), Some("SMA"));
        assert_eq!(table.rows[0].number("tre200s0"), Some(21.4));
        assert_eq!(table.rows[1].get("tre200s0"), None);
        assert!(table.has_column("tre200s0"));
    }

    #[test]
    fn test_numbers_fail_soft() {
        assert_eq!(parse_number(" 3.5 "), Some(3.5));
        assert_eq!(parse_number("-2"), Some(-2.0));
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_latest_with_any_skips_trailing_empty_rows() {
        let table = CsvTable::parse("t;x;y\n1;1.0;\n2;;2.0\n3;;\n");
        let row = table.latest_with_any(&["x", "y"]).unwrap();
        assert_eq!(row.get("t"), Some("2"));
        assert!(table.rows[2].get("x").is_none());
        assert!(table.latest_with_any(&["z"]).is_none());
    }

    #[test]
    fn test_first_of_and_blank_rows() {
        let table = CsvTable::parse("a;b\n;value\n;\n");
        assert_eq!(table.rows[0].first_of(&["a", "b"]), Some("value"));
        assert!(table.rows[1].is_blank());
    }

    proptest! {
        #[test]
        fn prop_clean_field_strips_padding(
            core in "[A-Za-z0-9.][A-Za-z0-9. _-]{0,20}[A-Za-z0-9.]",
            pad_left in "[ \t\"']{0,4}",
            pad_right in "[ \t\"']{0,4}",
        ) {
            let raw = format!("{pad_left}{core}{pad_right}");
            prop_assert_eq!(clean_field(&raw), core.as_str());
        }

        #[test]
        fn prop_parsed_fields_never_carry_padding(value in "[ \"]{0,3}[a-z0-9]{1,8}[ \"]{0,3}") {
            let table = CsvTable::parse(&format!("col\n{value}\n"));
            let field = table.rows[0].get("col").unwrap();
            prop_assert!(!field.starts_with(' ') && !field.ends_with('"'));
        }
    }
}
