//! Text decoding for linked documents.

use crate::{NgoscopeError, Result};

/// Turns the raw bytes of a linked document into plain text.
///
/// Decoding is CPU-bound; the pipeline runs it on the blocking pool.
pub trait TextDecoder: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// Decodes PDF documents with `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextDecoder;

impl TextDecoder for PdfTextDecoder {
    #[cfg(feature = "pdf")]
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        if !bytes.starts_with(b"%PDF") {
            return Err(NgoscopeError::DecodeError("missing PDF header".to_string()));
        }
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| NgoscopeError::DecodeError(e.to_string()))
    }

    #[cfg(not(feature = "pdf"))]
    fn extract_text(&self, _bytes: &[u8]) -> Result<String> {
        Err(NgoscopeError::DecodeError("PDF support not enabled: rebuild with --features pdf".to_string()))
    }
}

/// Treats documents as UTF-8 text. Used for plain-text mirrors and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8TextDecoder;

impl TextDecoder for Utf8TextDecoder {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| NgoscopeError::DecodeError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_decoder_rejects_garbage() {
        let result = PdfTextDecoder.extract_text(b"<html>not a pdf</html>");
        assert!(matches!(result, Err(NgoscopeError::DecodeError(_))));
    }

    #[test]
    fn test_utf8_decoder() {
        assert_eq!(Utf8TextDecoder.extract_text(b"Founded in 1994").unwrap(), "Founded in 1994");
        assert!(Utf8TextDecoder.extract_text(&[0xff, 0xfe]).is_err());
    }
}
