//! PDF text source.

use url::Url;

use crate::evidence::{EvidenceFragment, SourceKind};
use crate::parse::collapse_whitespace;

/// Emit decoded document text as one untagged fragment.
///
/// Lines are whitespace-collapsed and blank lines dropped, which keeps the
/// line structure address matching relies on.
pub fn extract(text: &str, origin: &Url) -> Vec<EvidenceFragment> {
    let cleaned = text
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if cleaned.is_empty() {
        return Vec::new();
    }

    vec![EvidenceFragment::text(SourceKind::PdfText, cleaned, origin.clone())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_text_fragment() {
        let origin = Url::parse("https://example.org/annual-report.pdf").unwrap();
        let fragments = extract("Annual   Report\n\n\x0cThe trust was established in 1987.\n", &origin);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].source_kind, SourceKind::PdfText);
        assert_eq!(fragments[0].raw_text, "Annual Report\nThe trust was established in 1987.");
        assert!(fragments[0].markup.is_none());
    }

    #[test]
    fn test_empty_pdf_text() {
        let origin = Url::parse("https://example.org/a.pdf").unwrap();
        assert!(extract(" \n \x0c ", &origin).is_empty());
    }
}
