//! Operational areas.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::sections::find_section_lists;
use super::{FieldExtractor, Matcher, MatcherChain, Resolution, rejected};
use crate::Result;
use crate::evidence::{EvidenceFragment, FieldKind};
use crate::locale::CompiledLocale;
use crate::parse::collapse_whitespace;
use crate::pipeline::PipelineConfig;

type Areas = BTreeSet<String>;

fn check_areas(areas: &Areas) -> Result<()> {
    if areas.is_empty() { Err(rejected(FieldKind::OperationalAreas, "no recognized region")) } else { Ok(()) }
}

/// `areaServed` from structured metadata.
///
/// Entries naming a gazetteer place are canonicalized; other entries are
/// kept as written.
pub struct StructuredAreas {
    locale: Arc<CompiledLocale>,
}

impl Matcher<Areas> for StructuredAreas {
    fn name(&self) -> &'static str {
        "structured_areas"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<Areas> {
        if !fragment.hints(FieldKind::OperationalAreas) {
            return Vec::new();
        }

        let gazetteer = &self.locale.gazetteer;
        let names = fragment.raw_text.lines().map(collapse_whitespace).flat_map(|line| {
            let known = gazetteer.matches_in(&line);
            if known.is_empty() { vec![line] } else { known }
        });
        vec![gazetteer.refine(names)]
    }

    fn validate(&self, value: &Areas) -> Result<()> {
        check_areas(value)
    }
}

/// Items of a list under a "where we work"-style heading, matched against the gazetteer.
pub struct SectionAreas {
    locale: Arc<CompiledLocale>,
    keywords: Vec<String>,
}

impl Matcher<Areas> for SectionAreas {
    fn name(&self) -> &'static str {
        "section_areas"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<Areas> {
        let Some(markup) = fragment.markup.as_deref() else {
            return Vec::new();
        };

        let gazetteer = &self.locale.gazetteer;
        find_section_lists(markup, &self.keywords, 1)
            .into_iter()
            .map(|section| gazetteer.refine(section.items.iter().flat_map(|item| gazetteer.matches_in(item))))
            .collect()
    }

    fn validate(&self, value: &Areas) -> Result<()> {
        check_areas(value)
    }
}

/// Every gazetteer place mentioned anywhere in the fragment text.
pub struct GazetteerScan {
    locale: Arc<CompiledLocale>,
}

impl Matcher<Areas> for GazetteerScan {
    fn name(&self) -> &'static str {
        "gazetteer_scan"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<Areas> {
        let gazetteer = &self.locale.gazetteer;
        vec![gazetteer.refine(gazetteer.matches_in(&fragment.raw_text))]
    }

    fn validate(&self, value: &Areas) -> Result<()> {
        check_areas(value)
    }
}

/// Resolves `operational_areas` with generic supersets dropped whenever a
/// specific place is present.
pub struct AreasExtractor {
    chain: MatcherChain<Areas>,
    locale: Arc<CompiledLocale>,
}

impl AreasExtractor {
    pub fn new(config: &PipelineConfig, locale: Arc<CompiledLocale>) -> Self {
        let mut chain = MatcherChain::new(FieldKind::OperationalAreas)
            .with(StructuredAreas { locale: locale.clone() })
            .with(SectionAreas { locale: locale.clone(), keywords: config.area_keywords.clone() });
        if config.scan_text_for_areas {
            chain = chain.with(GazetteerScan { locale: locale.clone() });
        }
        Self { chain, locale }
    }
}

impl FieldExtractor for AreasExtractor {
    type Output = Areas;

    fn field(&self) -> FieldKind {
        FieldKind::OperationalAreas
    }

    fn resolve(&self, fragments: &[&EvidenceFragment]) -> Resolution<Areas> {
        self.chain.resolve(fragments)
    }

    fn from_selection(&self, texts: &[String]) -> Option<Areas> {
        let gazetteer = &self.locale.gazetteer;
        let names = texts.iter().map(|t| collapse_whitespace(t)).flat_map(|text| {
            let known = gazetteer.matches_in(&text);
            if known.is_empty() { vec![text] } else { known }
        });
        let areas = gazetteer.refine(names);
        check_areas(&areas).ok().map(|_| areas)
    }
}
