//! Organization name.

use url::Url;

use super::{FieldExtractor, Matcher, MatcherChain, Resolution, rejected};
use crate::Result;
use crate::evidence::{EvidenceFragment, FieldKind};
use crate::parse::{Document, collapse_whitespace};

/// Titles that say nothing about who runs the site.
const GENERIC_TITLES: &[&str] =
    &["home", "homepage", "home page", "index", "untitled", "welcome", "default", "about", "about us", "contact us"];

const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " – ", " — ", " :: ", " » ", " : "];

const MAX_NAME_LEN: usize = 200;

/// Whether a title or heading only restates the site's host or a placeholder.
pub fn is_generic_name(candidate: &str, origin: &Url) -> bool {
    let lower = candidate.trim().to_lowercase();
    if lower.is_empty() || GENERIC_TITLES.contains(&lower.as_str()) {
        return true;
    }

    let Some(host) = origin.host_str().map(str::to_lowercase) else {
        return false;
    };
    let bare = host.trim_start_matches("www.");
    let label = bare.split('.').next().unwrap_or(bare);

    lower == host || lower == bare || lower == label || lower.trim_start_matches("www.") == bare
}

fn check_name(value: &str) -> Result<()> {
    if value.is_empty() {
        Err(rejected(FieldKind::Name, "empty name"))
    } else if value.chars().count() > MAX_NAME_LEN {
        Err(rejected(FieldKind::Name, "longer than a name"))
    } else {
        Ok(())
    }
}

/// `name` from structured metadata.
pub struct StructuredName;

impl Matcher<String> for StructuredName {
    fn name(&self) -> &'static str {
        "structured_name"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<String> {
        if fragment.hints(FieldKind::Name) {
            vec![collapse_whitespace(&fragment.raw_text)]
        } else {
            Vec::new()
        }
    }

    fn validate(&self, value: &String) -> Result<()> {
        check_name(value)
    }
}

/// The `<title>` element, split on common separators with generic parts dropped.
pub struct DocumentTitle;

impl Matcher<String> for DocumentTitle {
    fn name(&self) -> &'static str {
        "document_title"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<String> {
        let Some(markup) = fragment.markup.as_deref() else {
            return Vec::new();
        };
        let Some(title) = Document::parse(markup).ok().and_then(|doc| doc.title()) else {
            return Vec::new();
        };

        let mut segments = vec![title];
        for separator in TITLE_SEPARATORS {
            segments = segments.iter().flat_map(|s| s.split(*separator)).map(|s| s.trim().to_string()).collect();
        }

        segments.into_iter().filter(|segment| !is_generic_name(segment, &fragment.origin)).take(1).collect()
    }

    fn validate(&self, value: &String) -> Result<()> {
        check_name(value)
    }
}

/// The first `<h1>` that is not generic.
pub struct FirstHeading;

impl Matcher<String> for FirstHeading {
    fn name(&self) -> &'static str {
        "first_heading"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<String> {
        let Some(markup) = fragment.markup.as_deref() else {
            return Vec::new();
        };
        let Ok(doc) = Document::parse(markup) else {
            return Vec::new();
        };

        doc.select("h1")
            .map(|headings| {
                headings
                    .iter()
                    .map(|h| h.normalized_text())
                    .filter(|text| !is_generic_name(text, &fragment.origin))
                    .take(1)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn validate(&self, value: &String) -> Result<()> {
        check_name(value)
    }
}

/// Resolves `ngo_name`: structured name, then page title, then first heading.
pub struct NameExtractor {
    chain: MatcherChain<String>,
}

impl NameExtractor {
    pub fn new() -> Self {
        Self { chain: MatcherChain::new(FieldKind::Name).with(StructuredName).with(DocumentTitle).with(FirstHeading) }
    }
}

impl Default for NameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NameExtractor {
    type Output = String;

    fn field(&self) -> FieldKind {
        FieldKind::Name
    }

    fn resolve(&self, fragments: &[&EvidenceFragment]) -> Resolution<String> {
        self.chain.resolve(fragments)
    }

    fn from_selection(&self, texts: &[String]) -> Option<String> {
        texts.iter().map(|t| collapse_whitespace(t)).find(|t| check_name(t).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::SourceKind;
    use rstest::rstest;

    fn page(markup: &str) -> EvidenceFragment {
        EvidenceFragment::text(SourceKind::PageText, "", Url::parse("https://www.asha.org/").unwrap())
            .with_markup(markup)
    }

    #[rstest]
    #[case("<title>Asha Trust</title>", "Asha Trust", "document_title")]
    #[case("<title>Home | Asha Trust</title>", "Asha Trust", "document_title")]
    #[case("<title>Asha Trust - Every child in school</title>", "Asha Trust", "document_title")]
    #[case("<title>www.asha.org</title><h1>Asha Education Trust</h1>", "Asha Education Trust", "first_heading")]
    #[case("<title>  </title><h1>Welcome</h1><h1>Asha Trust</h1>", "Asha Trust", "first_heading")]
    #[case("<title>asha</title><body><h1>Asha Trust</h1></body>", "Asha Trust", "first_heading")]
    fn test_name_sources(#[case] markup: &str, #[case] expected: &str, #[case] matcher: &str) {
        let fragment = page(&format!("<html><head>{}</head></html>", markup));
        let resolution = NameExtractor::new().resolve(&[&fragment]);
        assert_eq!(resolution.value().map(String::as_str), Some(expected));
        assert_eq!(resolution.matcher(), Some(matcher));
    }

    #[test]
    fn test_structured_name_preferred() {
        let origin = Url::parse("https://asha.org/").unwrap();
        let structured = EvidenceFragment::structured(FieldKind::Name, "Asha  Trust", origin);
        let title = page("<title>Something Else</title>");
        let resolution = NameExtractor::new().resolve(&[&structured, &title]);
        assert_eq!(resolution.value().map(String::as_str), Some("Asha Trust"));
        assert_eq!(resolution.matcher(), Some("structured_name"));
    }

    #[test]
    fn test_unresolved_without_markup() {
        let fragment =
            EvidenceFragment::text(SourceKind::PdfText, "Asha Trust", Url::parse("https://asha.org/a.pdf").unwrap());
        assert_eq!(NameExtractor::new().resolve(&[&fragment]), Resolution::Unresolved);
    }

    #[test]
    fn test_generic_names() {
        let origin = Url::parse("https://www.asha.org/").unwrap();
        assert!(is_generic_name("asha.org", &origin));
        assert!(is_generic_name("WWW.ASHA.ORG", &origin));
        assert!(is_generic_name("Home", &origin));
        assert!(!is_generic_name("Asha Trust", &origin));
    }
}
