//! Evidence fragments and the tiers they belong to.
//!
//! Every signal source turns what it read into [`EvidenceFragment`]s. A
//! fragment is immutable once produced and lives only as long as the
//! [`EvidenceSet`] of the organization being extracted.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::{NgoscopeError, Result};

/// The signal source a fragment came from.
///
/// Variants are declared in resolution priority order, so the derived
/// `Ord` sorts higher-priority tiers first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Machine-readable metadata blocks (JSON-LD).
    StructuredData,
    /// Visible text of the root page.
    PageText,
    /// Visible text of a discovered sub-page.
    SubpageText,
    /// Text decoded from a linked PDF document.
    PdfText,
}

impl SourceKind {
    /// All tiers in priority order.
    pub const PRIORITY: [SourceKind; 4] =
        [SourceKind::StructuredData, SourceKind::PageText, SourceKind::SubpageText, SourceKind::PdfText];

    /// Short label used in logs and text output.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::StructuredData => "structured data",
            SourceKind::PageText => "page text",
            SourceKind::SubpageText => "sub-page text",
            SourceKind::PdfText => "pdf text",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A target field of the organization record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Name,
    YearFounded,
    FieldsOfWork,
    OperationalAreas,
    Email,
    Phone,
    Address,
    WebsiteUrl,
}

impl FieldKind {
    /// Fields the resolution policy resolves from evidence.
    pub const RESOLVABLE: [FieldKind; 7] = [
        FieldKind::Name,
        FieldKind::YearFounded,
        FieldKind::FieldsOfWork,
        FieldKind::OperationalAreas,
        FieldKind::Email,
        FieldKind::Phone,
        FieldKind::Address,
    ];

    /// Key of this field in the output document.
    pub fn key(&self) -> &'static str {
        match self {
            FieldKind::Name => "ngo_name",
            FieldKind::YearFounded => "year_founded",
            FieldKind::FieldsOfWork => "fields_of_work",
            FieldKind::OperationalAreas => "operational_areas",
            FieldKind::Email => "contact_info.email",
            FieldKind::Phone => "contact_info.phone",
            FieldKind::Address => "contact_info.address",
            FieldKind::WebsiteUrl => "website_url",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FieldKind {
    type Err = NgoscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ngo_name" | "name" => Ok(FieldKind::Name),
            "year_founded" | "year" => Ok(FieldKind::YearFounded),
            "fields_of_work" => Ok(FieldKind::FieldsOfWork),
            "operational_areas" => Ok(FieldKind::OperationalAreas),
            "email" | "contact_info.email" => Ok(FieldKind::Email),
            "phone" | "contact_info.phone" => Ok(FieldKind::Phone),
            "address" | "contact_info.address" => Ok(FieldKind::Address),
            "website_url" => Ok(FieldKind::WebsiteUrl),
            other => Err(NgoscopeError::ConfigError(format!("Unknown field: {}", other))),
        }
    }
}

/// One unit of raw evidence attributed to a tier and an origin URL.
///
/// Page-shaped fragments also carry the cleaned DOM snapshot in `markup` so
/// that structural extractors (lists, navigation, form controls, links) can
/// inspect it; `raw_text` is always the text a pattern search runs over.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceFragment {
    pub source_kind: SourceKind,
    pub field_hint: Option<FieldKind>,
    pub raw_text: String,
    pub markup: Option<Arc<str>>,
    pub origin: Url,
}

impl EvidenceFragment {
    /// A fragment produced by the structured metadata source for a known field.
    pub fn structured(field: FieldKind, raw_text: impl Into<String>, origin: Url) -> Self {
        Self {
            source_kind: SourceKind::StructuredData,
            field_hint: Some(field),
            raw_text: raw_text.into(),
            markup: None,
            origin,
        }
    }

    /// An untagged text fragment.
    pub fn text(source_kind: SourceKind, raw_text: impl Into<String>, origin: Url) -> Self {
        Self { source_kind, field_hint: None, raw_text: raw_text.into(), markup: None, origin }
    }

    /// Attach the DOM snapshot the text was rendered from.
    pub fn with_markup(mut self, markup: impl Into<Arc<str>>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    /// Whether the structured source tagged this fragment for `field`.
    pub fn hints(&self, field: FieldKind) -> bool {
        self.field_hint == Some(field)
    }
}

/// The immutable evidence gathered for one organization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvidenceSet {
    fragments: Vec<EvidenceFragment>,
}

impl EvidenceSet {
    /// Build a set, keeping fragments in priority order.
    ///
    /// The sort is stable, so discovery order is preserved within a tier.
    pub fn new(mut fragments: Vec<EvidenceFragment>) -> Self {
        fragments.sort_by_key(|fragment| fragment.source_kind);
        Self { fragments }
    }

    /// Fragments of one tier, in discovery order.
    pub fn tier(&self, kind: SourceKind) -> Vec<&EvidenceFragment> {
        self.fragments.iter().filter(|fragment| fragment.source_kind == kind).collect()
    }

    /// All fragments in priority order.
    pub fn fragments(&self) -> &[EvidenceFragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://example.org/").unwrap()
    }

    #[test]
    fn test_priority_order_matches_ord() {
        let mut kinds = vec![SourceKind::PdfText, SourceKind::StructuredData, SourceKind::SubpageText];
        kinds.sort();
        assert_eq!(kinds, vec![SourceKind::StructuredData, SourceKind::SubpageText, SourceKind::PdfText]);
        assert!(SourceKind::PRIORITY.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_evidence_set_sorts_by_tier_stably() {
        let set = EvidenceSet::new(vec![
            EvidenceFragment::text(SourceKind::SubpageText, "first sub-page", origin()),
            EvidenceFragment::text(SourceKind::PageText, "main", origin()),
            EvidenceFragment::structured(FieldKind::YearFounded, "1994", origin()),
            EvidenceFragment::text(SourceKind::SubpageText, "second sub-page", origin()),
        ]);

        assert_eq!(set.fragments()[0].source_kind, SourceKind::StructuredData);
        let subpages = set.tier(SourceKind::SubpageText);
        assert_eq!(subpages.len(), 2);
        assert_eq!(subpages[0].raw_text, "first sub-page");
        assert!(set.tier(SourceKind::PdfText).is_empty());
    }

    #[test]
    fn test_field_kind_parsing() {
        assert_eq!("ngo_name".parse::<FieldKind>().unwrap(), FieldKind::Name);
        assert_eq!("contact_info.phone".parse::<FieldKind>().unwrap(), FieldKind::Phone);
        assert_eq!(" Year_Founded ".parse::<FieldKind>().unwrap(), FieldKind::YearFounded);
        assert!("budget".parse::<FieldKind>().is_err());
    }

    #[test]
    fn test_structured_fragment_hint() {
        let fragment = EvidenceFragment::structured(FieldKind::Email, "info@example.org", origin());
        assert!(fragment.hints(FieldKind::Email));
        assert!(!fragment.hints(FieldKind::Phone));
        assert_eq!(fragment.source_kind, SourceKind::StructuredData);
    }
}
