//! Tabular parsing of decoded text into a header row and raw data rows.
//!
//! Parsing is forgiving where column assignment stays determinable: a row
//! shorter than the header is padded with empties and recorded as a
//! recoverable anomaly. A row with extra fields (an unescaped delimiter) or
//! broken quoting makes column assignment ambiguous, so those escalate to a
//! failed parse: `parse_ok = false` and no data rows are kept.
//!
//! Quoting anomalies are caught by a physical-line scan before record
//! iteration. An unterminated quote would otherwise make the reader swallow
//! every following line into one field, losing rows without any error.

use csv::ReaderBuilder;
use serde::Serialize;

use crate::decode::DecodedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseIssueCode {
    UndetectableDelimiter,
    TooFewFields,
    TooManyFields,
    MissingQuotes,
    EmptyFile,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseIssue {
    pub code: ParseIssueCode,
    pub message: String,
    /// 1-indexed data-row number, absent for file-level issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

/// One data row: 1-indexed line number (relative to the first data row) and
/// values aligned to the header width.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub line: usize,
    pub values: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub parse_ok: bool,
    pub parse_errors: Vec<ParseIssue>,
}

impl ParsedTable {
    fn failed(code: ParseIssueCode, message: impl Into<String>) -> Self {
        ParsedTable {
            headers: Vec::new(),
            rows: Vec::new(),
            parse_ok: false,
            parse_errors: vec![ParseIssue {
                code,
                message: message.into(),
                row: None,
            }],
        }
    }
}

/// Splits decoded text into header + data rows using the sniffed delimiter.
pub fn parse_table(decoded: &DecodedFile) -> ParsedTable {
    if decoded.text.trim().is_empty() {
        return ParsedTable::failed(ParseIssueCode::EmptyFile, "input contains no rows");
    }
    let Some(delimiter) = decoded.delimiter else {
        return ParsedTable::failed(
            ParseIssueCode::UndetectableDelimiter,
            "no delimiter candidate produced more than one column",
        );
    };

    let mut parse_errors: Vec<ParseIssue> = Vec::new();

    // Record iteration cannot see an unterminated quote: the reader folds
    // everything after it into one field. Doubled quotes inside a quoted
    // field keep the per-line count even, so an odd count marks the line
    // where quoting broke.
    let mut ordinal = 0usize; // 0 is the header line
    for line in decoded.text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.bytes().filter(|b| *b == b'"').count() % 2 != 0 {
            parse_errors.push(ParseIssue {
                code: ParseIssueCode::MissingQuotes,
                message: "unterminated quote on the line".to_string(),
                row: (ordinal > 0).then_some(ordinal),
            });
        }
        ordinal += 1;
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(decoded.text.as_bytes());

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<RawRow> = Vec::new();

    for record in reader.records() {
        // The reader runs over in-memory UTF-8 text in flexible mode, so it
        // cannot fail here; quoting anomalies are caught by the line scan.
        let Ok(record) = record else { continue };
        let mut values: Vec<String> = record.iter().map(|v| v.to_string()).collect();
        // Only a truly empty line is skipped; a delimiter-only row is data
        // whose fields happen to be empty.
        if values.len() <= 1 && values.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        if headers.is_empty() {
            headers = values.into_iter().map(|h| h.trim().to_string()).collect();
            continue;
        }
        let line = rows.len() + 1;
        if values.len() < headers.len() {
            parse_errors.push(ParseIssue {
                code: ParseIssueCode::TooFewFields,
                message: format!(
                    "row has {} field(s), header has {}",
                    values.len(),
                    headers.len()
                ),
                row: Some(line),
            });
            values.resize(headers.len(), String::new());
        } else if values.len() > headers.len() {
            parse_errors.push(ParseIssue {
                code: ParseIssueCode::TooManyFields,
                message: format!(
                    "row has {} field(s), header has {}",
                    values.len(),
                    headers.len()
                ),
                row: Some(line),
            });
            values.truncate(headers.len());
        }
        rows.push(RawRow { line, values });
    }

    if headers.is_empty() {
        return ParsedTable::failed(ParseIssueCode::EmptyFile, "input contains no header row");
    }

    let fatal = parse_errors.iter().any(|error| {
        matches!(
            error.code,
            ParseIssueCode::TooManyFields | ParseIssueCode::MissingQuotes
        )
    });
    if fatal {
        rows.clear();
    }

    ParsedTable {
        headers,
        rows,
        parse_ok: !fatal,
        parse_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    fn table(input: &str) -> ParsedTable {
        parse_table(&decode(input.as_bytes()).unwrap())
    }

    #[test]
    fn header_and_rows_are_split() {
        let parsed = table("numero;voie_nom\n1;rue Haute\n2;rue Basse\n");
        assert!(parsed.parse_ok);
        assert_eq!(parsed.headers, vec!["numero", "voie_nom"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].line, 1);
        assert_eq!(parsed.rows[1].values, vec!["2", "rue Basse"]);
    }

    #[test]
    fn short_rows_are_padded_and_reported() {
        let parsed = table("numero;voie_nom;commune_nom\n1;rue Haute\n");
        assert!(parsed.parse_ok);
        assert_eq!(parsed.rows[0].values.len(), 3);
        assert_eq!(parsed.parse_errors.len(), 1);
        assert_eq!(parsed.parse_errors[0].code, ParseIssueCode::TooFewFields);
        assert_eq!(parsed.parse_errors[0].row, Some(1));
    }

    #[test]
    fn extra_fields_escalate_to_parse_failure() {
        let parsed = table("numero;voie_nom\n1;rue Haute;extra\n");
        assert!(!parsed.parse_ok);
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.parse_errors[0].code, ParseIssueCode::TooManyFields);
        assert_eq!(parsed.parse_errors[0].row, Some(1));
    }

    #[test]
    fn undeterminable_delimiter_fails_parse() {
        let parsed = table("numero\n1\n");
        assert!(!parsed.parse_ok);
        assert!(parsed.rows.is_empty());
        assert_eq!(
            parsed.parse_errors[0].code,
            ParseIssueCode::UndetectableDelimiter
        );
    }

    #[test]
    fn header_only_file_parses_with_zero_rows() {
        let parsed = table("numero;voie_nom\n");
        assert!(parsed.parse_ok);
        assert!(parsed.rows.is_empty());
        assert!(parsed.parse_errors.is_empty());
    }

    #[test]
    fn unterminated_quote_is_a_structural_failure() {
        // Without the line scan the reader folds the second data row into
        // the first row's quoted field and reports nothing.
        let parsed = table("numero;voie_nom\n1;\"rue Haute\n2;rue Basse\n");
        assert!(!parsed.parse_ok);
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.parse_errors[0].code, ParseIssueCode::MissingQuotes);
        assert_eq!(parsed.parse_errors[0].row, Some(1));
    }

    #[test]
    fn doubled_quotes_in_a_quoted_field_are_fine() {
        let parsed = table("numero;voie_nom\n1;\"rue \"\"des Halles\"\"\"\n");
        assert!(parsed.parse_ok);
        assert!(parsed.parse_errors.is_empty());
        assert_eq!(parsed.rows[0].values[1], "rue \"des Halles\"");
    }

    #[test]
    fn delimiter_only_rows_are_kept_as_data() {
        let parsed = table("numero;voie_nom\n;\n1;rue Haute\n");
        assert!(parsed.parse_ok);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].values, vec!["", ""]);
        assert_eq!(parsed.rows[1].values, vec!["1", "rue Haute"]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let parsed = table("numero;voie_nom\n\n1;rue Haute\n\n");
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].line, 1);
    }

    #[test]
    fn quoted_delimiters_stay_in_one_field() {
        let parsed = table("numero;voie_nom\n1;\"rue du Pont; aile Nord\"\n");
        assert!(parsed.parse_ok);
        assert!(parsed.parse_errors.is_empty());
        assert_eq!(parsed.rows[0].values[1], "rue du Pont; aile Nord");
    }
}
