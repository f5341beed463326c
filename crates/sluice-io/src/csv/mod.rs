//! CSV codec: progressively-typed decoder and minimal-quoting encoder.

mod decoder;
mod encoder;
pub mod field;
pub mod parse;
pub mod scan;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use decoder::CsvDecoder;
pub use encoder::CsvEncoder;

pub const DECODE_OP: &str = "codec.csv.decode";
pub const ENCODE_OP: &str = "codec.csv.encode";

fn delimiter_byte(delimiter: &str) -> Result<u8> {
    match delimiter.as_bytes() {
        [] => Ok(b','),
        [b, ..] if b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r' => Ok(*b),
        _ => Err(Error::Options(format!(
            "unsupported delimiter '{}'",
            delimiter.escape_default()
        ))),
    }
}

/// Arguments of `codec.csv.decode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvDecodeOptions {
    /// First byte is used; empty means `,`.
    pub delimiter: String,
    /// First record names the columns.
    pub header: bool,
    /// Rows per batch; falls back to `EngineConfig::batch_size`.
    pub batch_size: Option<usize>,
}

impl Default for CsvDecodeOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            header: true,
            batch_size: None,
        }
    }
}

impl CsvDecodeOptions {
    pub fn delimiter_byte(&self) -> Result<u8> {
        delimiter_byte(&self.delimiter)
    }
}

/// Arguments of `codec.csv.encode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvEncodeOptions {
    pub delimiter: String,
    pub header: bool,
}

impl Default for CsvEncodeOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            header: true,
        }
    }
}

impl CsvEncodeOptions {
    pub fn delimiter_byte(&self) -> Result<u8> {
        delimiter_byte(&self.delimiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_from_empty_json() {
        let opts: CsvDecodeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, CsvDecodeOptions::default());
        assert_eq!(opts.delimiter_byte().unwrap(), b',');
    }

    #[test]
    fn delimiter_takes_first_byte() {
        let opts: CsvEncodeOptions = serde_json::from_str(r#"{"delimiter":"|"}"#).unwrap();
        assert_eq!(opts.delimiter_byte().unwrap(), b'|');
        assert_eq!(delimiter_byte("\t").unwrap(), b'\t');
        assert_eq!(delimiter_byte("").unwrap(), b',');
    }

    #[test]
    fn quote_delimiter_rejected() {
        assert!(delimiter_byte("\"").is_err());
        assert!(delimiter_byte("é").is_err());
    }

    #[test]
    fn unknown_option_rejected() {
        assert!(serde_json::from_str::<CsvDecodeOptions>(r#"{"delim":";"}"#).is_err());
    }
}
