//! Fields of work.

use super::sections::find_section_lists;
use super::{FieldExtractor, Matcher, MatcherChain, Resolution, rejected};
use crate::Result;
use crate::evidence::{EvidenceFragment, FieldKind};
use crate::parse::collapse_whitespace;
use crate::pipeline::PipelineConfig;

/// Longest text accepted as a single field of work.
const MAX_ITEM_LEN: usize = 120;

fn check_items(items: &[String], min_items: usize) -> Result<()> {
    if items.len() < min_items {
        return Err(rejected(FieldKind::FieldsOfWork, format!("{} items, need {}", items.len(), min_items)));
    }
    if let Some(long) = items.iter().find(|item| item.chars().count() > MAX_ITEM_LEN) {
        return Err(rejected(FieldKind::FieldsOfWork, format!("item too long to be a label: {:.40}…", long)));
    }
    Ok(())
}

/// `knowsAbout` from structured metadata, one topic per line.
pub struct StructuredWork {
    min_items: usize,
}

impl Matcher<Vec<String>> for StructuredWork {
    fn name(&self) -> &'static str {
        "structured_work"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<Vec<String>> {
        if !fragment.hints(FieldKind::FieldsOfWork) {
            return Vec::new();
        }
        let items: Vec<String> =
            fragment.raw_text.lines().map(collapse_whitespace).filter(|line| !line.is_empty()).collect();
        vec![items]
    }

    fn validate(&self, value: &Vec<String>) -> Result<()> {
        check_items(value, self.min_items)
    }
}

/// A list under a heading mentioning programmes, initiatives or projects.
pub struct HeadingList {
    keywords: Vec<String>,
    min_items: usize,
}

impl Matcher<Vec<String>> for HeadingList {
    fn name(&self) -> &'static str {
        "heading_list"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<Vec<String>> {
        let Some(markup) = fragment.markup.as_deref() else {
            return Vec::new();
        };
        find_section_lists(markup, &self.keywords, self.min_items).into_iter().map(|section| section.items).collect()
    }

    fn validate(&self, value: &Vec<String>) -> Result<()> {
        check_items(value, self.min_items)
    }
}

/// Resolves `fields_of_work`. There is no free-text fallback: without a
/// qualifying list the field stays unresolved.
pub struct WorkExtractor {
    chain: MatcherChain<Vec<String>>,
}

impl WorkExtractor {
    pub fn new(config: &PipelineConfig) -> Self {
        let min_items = config.min_list_items;
        Self {
            chain: MatcherChain::new(FieldKind::FieldsOfWork)
                .with(StructuredWork { min_items })
                .with(HeadingList { keywords: config.work_keywords.clone(), min_items }),
        }
    }
}

impl FieldExtractor for WorkExtractor {
    type Output = Vec<String>;

    fn field(&self) -> FieldKind {
        FieldKind::FieldsOfWork
    }

    fn resolve(&self, fragments: &[&EvidenceFragment]) -> Resolution<Vec<String>> {
        self.chain.resolve(fragments)
    }

    fn from_selection(&self, texts: &[String]) -> Option<Vec<String>> {
        let mut items: Vec<String> = Vec::new();
        for text in texts.iter().map(|t| collapse_whitespace(t)) {
            if !text.is_empty() && !items.contains(&text) {
                items.push(text);
            }
        }
        (!items.is_empty()).then_some(items)
    }
}
