//! Text decoding shared by CSV and document inputs.

use crate::error::{IngestError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decodes text-extracted document bytes as UTF-8.
///
/// A UTF-8 byte order mark is stripped; UTF-16 input is rejected.
pub fn decode_document(bytes: &[u8]) -> Result<&str> {
    // Check for UTF-16 BOM (not supported)
    if bytes.len() >= 2 {
        if bytes[0..2] == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                encoding: "UTF-16 LE",
            });
        }
        if bytes[0..2] == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                encoding: "UTF-16 BE",
            });
        }
    }
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|e| IngestError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_utf8_bom() {
        assert_eq!(decode_document(b"\xEF\xBB\xBFInvoice #1").unwrap(), "Invoice #1");
    }

    #[test]
    fn rejects_utf16() {
        assert!(matches!(
            decode_document(&[0xFF, 0xFE, b'a', 0]),
            Err(IngestError::UnsupportedEncoding {
                encoding: "UTF-16 LE"
            })
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(matches!(
            decode_document(&[b'o', b'k', 0xC3, 0x28]),
            Err(IngestError::InvalidUtf8 { valid_up_to: 2 })
        ));
    }
}
