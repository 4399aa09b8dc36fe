//! Byte-level sniffing: character encoding, column delimiter, line-break
//! style. Every fallback is an explicit, ordered decision (BOM, then UTF-8
//! validity, then windows-1252 with a confidence bar) so tie-break behavior
//! is pinned by tests rather than left to library heuristics.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::debug;

use crate::error::ValidatorError;

/// Delimiter candidates, tried in this order. The BAL standard delimiter
/// comes first so ties resolve toward it.
pub const DELIMITER_CANDIDATES: &[u8] = &[b';', b',', b'\t'];

/// Number of leading lines sampled for delimiter detection.
const DELIMITER_SAMPLE_LINES: usize = 10;

/// Share of bytes >= 0x80 above which a non-UTF-8 buffer is considered
/// binary rather than legacy text.
const HIGH_BYTE_REJECT_PERCENT: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreak {
    Lf,
    CrLf,
    Cr,
    Mixed,
}

impl LineBreak {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineBreak::Lf => "\n",
            LineBreak::CrLf => "\r\n",
            LineBreak::Cr => "\r",
            LineBreak::Mixed => "mixed",
        }
    }
}

/// Decoder findings for one input buffer. The delimiter is absent when no
/// candidate produced more than one column on the sample.
#[derive(Debug, Clone)]
pub struct DecodedFile {
    pub text: String,
    pub encoding: &'static Encoding,
    pub delimiter: Option<u8>,
    pub linebreak: LineBreak,
}

/// Sniffs encoding, delimiter, and line-break style, then decodes `bytes`
/// to text with the BOM stripped. Fails only on undecodable input.
pub fn decode(bytes: &[u8]) -> Result<DecodedFile, ValidatorError> {
    let encoding = detect_encoding(bytes)?;
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ValidatorError::Encoding(format!(
            "buffer does not decode cleanly as {}",
            encoding.name()
        )));
    }
    let text = strip_bom(&text).to_owned();
    let linebreak = detect_linebreak(&text);
    let delimiter = detect_delimiter(&text);
    debug!(
        "Detected encoding {}, delimiter {:?}, linebreak {:?}",
        encoding.name(),
        delimiter.map(|d| d as char),
        linebreak
    );
    Ok(DecodedFile {
        text,
        encoding,
        delimiter,
        linebreak,
    })
}

/// Ordered detection ladder: BOM first, UTF-8 validity second,
/// windows-1252 last with a confidence bar rejecting binary-looking input.
fn detect_encoding(bytes: &[u8]) -> Result<&'static Encoding, ValidatorError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        if encoding == UTF_8 {
            return Ok(UTF_8);
        }
        return Err(ValidatorError::Encoding(format!(
            "unsupported byte-order mark for {}",
            encoding.name()
        )));
    }
    if std::str::from_utf8(bytes).is_ok() {
        return Ok(UTF_8);
    }
    if bytes.contains(&0) {
        return Err(ValidatorError::Encoding(
            "binary content (NUL byte) cannot be processed".to_string(),
        ));
    }
    let high = bytes.iter().filter(|b| **b >= 0x80).count();
    if !bytes.is_empty() && high * 100 / bytes.len() > HIGH_BYTE_REJECT_PERCENT {
        return Err(ValidatorError::Encoding(
            "no supported encoding clears the confidence threshold".to_string(),
        ));
    }
    Ok(WINDOWS_1252)
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

fn detect_linebreak(text: &str) -> LineBreak {
    let mut lf = 0usize;
    let mut crlf = 0usize;
    let mut cr = 0usize;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                crlf += 1;
                i += 2;
                continue;
            }
            b'\r' => cr += 1,
            b'\n' => lf += 1,
            _ => {}
        }
        i += 1;
    }
    match (lf, crlf, cr) {
        (0, 0, 0) => LineBreak::Lf,
        (_, 0, 0) => LineBreak::Lf,
        (0, _, 0) => LineBreak::CrLf,
        (0, 0, _) => LineBreak::Cr,
        _ => LineBreak::Mixed,
    }
}

/// Picks the candidate yielding the most sample lines agreeing on a field
/// count greater than one. Ties keep the earlier candidate, so the standard
/// delimiter wins when counts are equal.
fn detect_delimiter(text: &str) -> Option<u8> {
    let sample: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(DELIMITER_SAMPLE_LINES)
        .collect();
    if sample.is_empty() {
        return None;
    }

    let mut best: Option<(u8, usize)> = None;
    for &candidate in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| naive_field_count(line, candidate))
            .collect();
        let (modal, agreeing) = modal_count(&counts);
        if modal <= 1 {
            continue;
        }
        if best.is_none_or(|(_, prev)| agreeing > prev) {
            best = Some((candidate, agreeing));
        }
    }
    best.map(|(delimiter, _)| delimiter)
}

/// Field count ignoring quoting; good enough for the sniffing sample.
fn naive_field_count(line: &str, delimiter: u8) -> usize {
    line.as_bytes().iter().filter(|b| **b == delimiter).count() + 1
}

/// Returns (most frequent count, number of lines carrying it).
fn modal_count(counts: &[usize]) -> (usize, usize) {
    let mut best = (0usize, 0usize);
    for &count in counts {
        let occurrences = counts.iter().filter(|c| **c == count).count();
        if occurrences > best.1 || (occurrences == best.1 && count > best.0) {
            best = (count, occurrences);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_without_bom_is_detected() {
        let decoded = decode("numero;voie_nom\n1;rue de l'Église\n".as_bytes()).unwrap();
        assert_eq!(decoded.encoding, UTF_8);
        assert_eq!(decoded.delimiter, Some(b';'));
        assert_eq!(decoded.linebreak, LineBreak::Lf);
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"numero;voie_nom\n");
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.encoding, UTF_8);
        assert!(decoded.text.starts_with("numero"));
    }

    #[test]
    fn latin1_falls_back_to_windows_1252() {
        // "Église" encoded in windows-1252: 0xC9 for É.
        let bytes = b"numero;voie_nom\n1;rue de l'\xC9glise\n";
        let decoded = decode(bytes).unwrap();
        assert_eq!(decoded.encoding, WINDOWS_1252);
        assert!(decoded.text.contains("Église"));
    }

    #[test]
    fn nul_bytes_are_fatal() {
        let err = decode(b"nume\x00ro;voie\xC9\n").unwrap_err();
        assert!(matches!(err, ValidatorError::Encoding(_)));
    }

    #[test]
    fn utf16_bom_is_unsupported() {
        let err = decode(&[0xFF, 0xFE, b'a', 0x00]).unwrap_err();
        assert!(matches!(err, ValidatorError::Encoding(_)));
    }

    #[test]
    fn comma_delimiter_is_detected() {
        let decoded = decode(b"numero,voie_nom\n1,rue Haute\n2,rue Basse\n").unwrap();
        assert_eq!(decoded.delimiter, Some(b','));
    }

    #[test]
    fn standard_delimiter_wins_ties() {
        // Each line has exactly one ';' and one ','.
        let decoded = decode(b"a;b,c\n1;2,3\n").unwrap();
        assert_eq!(decoded.delimiter, Some(b';'));
    }

    #[test]
    fn single_column_yields_no_delimiter() {
        let decoded = decode(b"numero\n1\n2\n").unwrap();
        assert_eq!(decoded.delimiter, None);
    }

    #[test]
    fn crlf_is_detected() {
        let decoded = decode(b"numero;voie_nom\r\n1;rue Haute\r\n").unwrap();
        assert_eq!(decoded.linebreak, LineBreak::CrLf);
    }

    #[test]
    fn mixed_terminators_are_flagged() {
        let decoded = decode(b"numero;voie_nom\r\n1;rue Haute\n").unwrap();
        assert_eq!(decoded.linebreak, LineBreak::Mixed);
    }
}
