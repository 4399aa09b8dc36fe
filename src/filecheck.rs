//! Validity judgment of the decoder's findings against the BAL standard:
//! UTF-8 encoding, semicolon delimiter, LF or CRLF line breaks. This module
//! only flags conformance; severity classification belongs to the profiles.

use encoding_rs::UTF_8;
use serde::Serialize;

use crate::decode::{DecodedFile, LineBreak};

pub const NON_STANDARD_ENCODING: &str = "file.encoding.non_standard";
pub const NON_STANDARD_DELIMITER: &str = "file.delimiter.non_standard";
pub const NON_STANDARD_LINEBREAK: &str = "file.linebreak.non_standard";

/// The BAL standard column delimiter.
pub const STANDARD_DELIMITER: u8 = b';';

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyCheck {
    pub value: String,
    pub is_valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileCheck {
    pub encoding: PropertyCheck,
    pub delimiter: PropertyCheck,
    pub linebreak: PropertyCheck,
}

impl FileCheck {
    /// Error codes for every non-conformant property.
    pub fn error_codes(&self) -> Vec<&'static str> {
        let mut codes = Vec::new();
        if !self.encoding.is_valid {
            codes.push(NON_STANDARD_ENCODING);
        }
        if !self.delimiter.is_valid {
            codes.push(NON_STANDARD_DELIMITER);
        }
        if !self.linebreak.is_valid {
            codes.push(NON_STANDARD_LINEBREAK);
        }
        codes
    }
}

pub fn check_file(decoded: &DecodedFile) -> FileCheck {
    FileCheck {
        encoding: PropertyCheck {
            value: decoded.encoding.name().to_lowercase(),
            is_valid: decoded.encoding == UTF_8,
        },
        delimiter: PropertyCheck {
            value: decoded
                .delimiter
                .map(|d| (d as char).to_string())
                .unwrap_or_default(),
            is_valid: decoded.delimiter == Some(STANDARD_DELIMITER),
        },
        linebreak: PropertyCheck {
            value: decoded.linebreak.as_str().to_string(),
            is_valid: matches!(decoded.linebreak, LineBreak::Lf | LineBreak::CrLf),
        },
    }
}
