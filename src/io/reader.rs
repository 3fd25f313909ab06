//! Sales file reader
//!
//! Loads the raw export and normalizes its encoding so the core only ever sees
//! `&str` lines.
//!
//! # Encoding
//!
//! The file is read as bytes and decoded as UTF-8 (a leading byte-order mark
//! is dropped). If the bytes are not valid UTF-8 the file is decoded as
//! Latin-1 instead, which maps every byte to a character, so decoding itself
//! can never fail.
//!
//! # Error Handling
//!
//! - A missing file is `SalesError::FileNotFound`
//! - Any other read failure is `SalesError::IoError`

use crate::types::SalesError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

const UTF8_BOM: char = '\u{feff}';

/// Read a sales file into lines
///
/// Line terminators (`\n` or `\r\n`) are removed; nothing else is trimmed.
///
/// # Examples
///
/// ```no_run
/// use sales_analytics::io::read_sales_lines;
/// use std::path::Path;
///
/// let lines = read_sales_lines(Path::new("data/sales_data.txt")).unwrap();
/// println!("read {} lines", lines.len());
/// ```
pub fn read_sales_lines(path: &Path) -> Result<Vec<String>, SalesError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SalesError::file_not_found(path),
        _ => SalesError::IoError {
            message: format!("Failed to read '{}': {}", path.display(), e),
        },
    })?;

    let text = decode(bytes);
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    debug!("Read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// Decode raw bytes as UTF-8, falling back to Latin-1
pub fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => match text.strip_prefix(UTF8_BOM) {
            Some(stripped) => stripped.to_string(),
            None => text,
        },
        Err(error) => {
            warn!("Input is not valid UTF-8, decoding as Latin-1");
            error.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary file with raw content
    fn create_temp_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_reads_utf8_lines() {
        let file = create_temp_file("a|b\nc|d\r\ne|f".as_bytes());
        let lines = read_sales_lines(file.path()).unwrap();
        assert_eq!(lines, vec!["a|b", "c|d", "e|f"]);
    }

    #[test]
    fn test_strips_byte_order_mark() {
        let file = create_temp_file("\u{feff}TransactionID|Date\nT1|2024-01-01\n".as_bytes());
        let lines = read_sales_lines(file.path()).unwrap();
        assert_eq!(lines[0], "TransactionID|Date");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_falls_back_to_latin1() {
        // "Café" in Latin-1: 0xE9 is not valid UTF-8 on its own
        let file = create_temp_file(b"T1|Caf\xe9\n");
        let lines = read_sales_lines(file.path()).unwrap();
        assert_eq!(lines, vec!["T1|Café"]);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = read_sales_lines(Path::new("nonexistent_sales.txt"));
        assert_eq!(
            result.unwrap_err(),
            SalesError::FileNotFound {
                path: "nonexistent_sales.txt".to_string()
            }
        );
    }

    #[test]
    fn test_empty_file_has_no_lines() {
        let file = create_temp_file(b"");
        assert!(read_sales_lines(file.path()).unwrap().is_empty());
    }
}
