//! Rendered page text source.

use crate::evidence::{EvidenceFragment, SourceKind};
use crate::fetch::DomSnapshot;
use crate::parse::Document;

/// Emit the visible text of a rendered page as one untagged fragment.
///
/// The cleaned markup rides along so structural matchers can inspect lists,
/// navigation and form controls. `kind` is [`SourceKind::PageText`] for the
/// root page and [`SourceKind::SubpageText`] for discovered sub-pages.
pub fn extract(snapshot: &DomSnapshot, kind: SourceKind) -> Vec<EvidenceFragment> {
    let Ok(doc) = Document::parse_with_preprocessing(&snapshot.html, Some(snapshot.url.clone())) else {
        return Vec::new();
    };

    let text = doc.visible_text();
    let markup = doc.as_string();
    if text.is_empty() && doc.title().is_none() {
        return Vec::new();
    }

    vec![EvidenceFragment::text(kind, text, snapshot.url.clone()).with_markup(markup)]
}
