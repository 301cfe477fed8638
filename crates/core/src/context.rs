//! Per-organization run state.

use std::collections::BTreeSet;

use url::Url;

use crate::NgoscopeError;
use crate::discovery::Discovery;
use crate::evidence::FieldKind;

/// State of one organization's extraction.
///
/// Created when a run starts and dropped with it; contexts are never shared
/// between organizations.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionContext {
    /// The input exactly as supplied.
    pub root_input: String,
    pub root_url: Url,
    /// Sub-pages to visit, deduplicated, in visiting order.
    pub subpages: Vec<Url>,
    pub pdfs: Vec<Url>,
    /// Fields whose value sits behind an interactive control.
    pub interactive: BTreeSet<FieldKind>,
    /// Fetch and decode failures that shrank the evidence, as `url: error`.
    pub failures: Vec<String>,
}

impl ExtractionContext {
    pub fn new(root_input: impl Into<String>, root_url: Url) -> Self {
        Self {
            root_input: root_input.into(),
            root_url,
            subpages: Vec::new(),
            pdfs: Vec::new(),
            interactive: BTreeSet::new(),
            failures: Vec::new(),
        }
    }

    pub fn record_discovery(&mut self, discovery: Discovery) {
        for url in discovery.subpages {
            if !self.subpages.contains(&url) {
                self.subpages.push(url);
            }
        }
        for url in discovery.pdfs {
            if !self.pdfs.contains(&url) {
                self.pdfs.push(url);
            }
        }
    }

    pub fn mark_interactive(&mut self, field: FieldKind) {
        self.interactive.insert(field);
    }

    pub fn is_interactive(&self, field: FieldKind) -> bool {
        self.interactive.contains(&field)
    }

    pub fn record_failure(&mut self, url: &Url, error: &NgoscopeError) {
        self.failures.push(format!("{}: {}", url, error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_is_deduplicated() {
        let root = Url::parse("https://asha.org/").unwrap();
        let about = root.join("/about").unwrap();
        let mut context = ExtractionContext::new("https://asha.org", root.clone());

        context.record_discovery(Discovery { subpages: vec![about.clone()], pdfs: vec![] });
        context.record_discovery(Discovery { subpages: vec![about.clone()], pdfs: vec![] });
        assert_eq!(context.subpages, vec![about]);

        context.mark_interactive(FieldKind::Phone);
        assert!(context.is_interactive(FieldKind::Phone));
        assert!(!context.is_interactive(FieldKind::Email));

        context.record_failure(&root, &NgoscopeError::Timeout { timeout: 30 });
        assert_eq!(context.failures, vec!["https://asha.org/: Timed out after 30 seconds".to_string()]);
    }
}
