//! Resolution policy.
//!
//! Fields are resolved tier by tier in [`SourceKind::PRIORITY`] order. The
//! first tier whose evidence yields a validated value freezes the field;
//! later tiers are not consulted for it. Fields are independent, so
//! different fields of one record may come from different tiers.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::Result;
use crate::evidence::{EvidenceSet, FieldKind, SourceKind};
use crate::extractors::{Extractors, FieldExtractor, Phone, Resolution};
use crate::overrides::SiteOverrides;
use crate::parse::Document;
use crate::record::Provenance;

/// A field value that can be set once.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot<T> {
    value: Option<T>,
    provenance: Option<Provenance>,
}

impl<T> Default for FieldSlot<T> {
    fn default() -> Self {
        Self { value: None, provenance: None }
    }
}

impl<T> FieldSlot<T> {
    pub fn is_frozen(&self) -> bool {
        self.value.is_some()
    }

    /// Offer a value. Returns `false` and leaves the slot untouched when it is
    /// already frozen.
    pub fn offer(&mut self, value: T, provenance: Provenance) -> bool {
        if self.is_frozen() {
            return false;
        }
        self.value = Some(value);
        self.provenance = Some(provenance);
        true
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }
}

/// Resolved values for every resolvable field of one organization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFields {
    pub name: FieldSlot<String>,
    pub year_founded: FieldSlot<i32>,
    pub fields_of_work: FieldSlot<Vec<String>>,
    pub operational_areas: FieldSlot<BTreeSet<String>>,
    pub email: FieldSlot<String>,
    pub phone: FieldSlot<Phone>,
    pub address: FieldSlot<String>,
}

impl ResolvedFields {
    pub fn is_frozen(&self, field: FieldKind) -> bool {
        self.provenance_of(field).is_some()
    }

    pub fn provenance_of(&self, field: FieldKind) -> Option<&Provenance> {
        match field {
            FieldKind::Name => self.name.provenance(),
            FieldKind::YearFounded => self.year_founded.provenance(),
            FieldKind::FieldsOfWork => self.fields_of_work.provenance(),
            FieldKind::OperationalAreas => self.operational_areas.provenance(),
            FieldKind::Email => self.email.provenance(),
            FieldKind::Phone => self.phone.provenance(),
            FieldKind::Address => self.address.provenance(),
            FieldKind::WebsiteUrl => None,
        }
    }

    /// Provenance of every frozen field.
    pub fn provenance(&self) -> BTreeMap<FieldKind, Provenance> {
        FieldKind::RESOLVABLE
            .into_iter()
            .filter_map(|field| self.provenance_of(field).map(|p| (field, p.clone())))
            .collect()
    }
}

/// Texts an operator selector matches on a page.
///
/// Each element contributes its normalized text; anchors additionally
/// contribute `mailto:` / `tel:` targets so a selector pointing at a contact
/// link works even when the link text is an icon.
pub fn selection_texts(doc: &Document, selector: &str) -> Result<Vec<String>> {
    let mut texts = Vec::new();
    for element in doc.select(selector)? {
        if let Some(href) = element.attr("href") {
            let href = href.trim();
            for scheme in ["mailto:", "tel:"] {
                if let Some(prefix) = href.get(..scheme.len())
                    && prefix.eq_ignore_ascii_case(scheme)
                {
                    let target = href[scheme.len()..].split('?').next().unwrap_or_default().trim();
                    if !target.is_empty() {
                        texts.push(target.to_string());
                    }
                }
            }
        }

        let text = element.normalized_text();
        if !text.is_empty() {
            texts.push(text);
        }
    }
    Ok(texts)
}

/// Orders the extractors over the evidence tiers.
pub struct ResolutionPolicy<'a> {
    extractors: &'a Extractors,
}

impl<'a> ResolutionPolicy<'a> {
    pub fn new(extractors: &'a Extractors) -> Self {
        Self { extractors }
    }

    /// Freeze fields whose override selector yields a valid value on `page`.
    pub fn apply_overrides(&self, fields: &mut ResolvedFields, overrides: &SiteOverrides, page: &Document) {
        let Some(origin) = page.base_url().cloned() else {
            return;
        };
        let ex = self.extractors;

        for (field, selector) in overrides.iter() {
            let texts = match selection_texts(page, selector) {
                Ok(texts) => texts,
                Err(e) => {
                    tracing::warn!(field = %field, selector, error = %e, "ignoring override");
                    continue;
                }
            };
            let provenance = Provenance::overridden(selector, origin.clone());

            let applied = match field {
                FieldKind::Name => offer_selection(&ex.name, &mut fields.name, &texts, provenance),
                FieldKind::YearFounded => offer_selection(&ex.year, &mut fields.year_founded, &texts, provenance),
                FieldKind::FieldsOfWork => offer_selection(&ex.work, &mut fields.fields_of_work, &texts, provenance),
                FieldKind::OperationalAreas => {
                    offer_selection(&ex.areas, &mut fields.operational_areas, &texts, provenance)
                }
                FieldKind::Email => offer_selection(&ex.email, &mut fields.email, &texts, provenance),
                FieldKind::Phone => offer_selection(&ex.phone, &mut fields.phone, &texts, provenance),
                FieldKind::Address => offer_selection(&ex.address, &mut fields.address, &texts, provenance),
                FieldKind::WebsiteUrl => false,
            };

            if applied {
                debug!(field = %field, selector, "field set by override");
            } else {
                debug!(field = %field, selector, "override matched no valid value, extracting automatically");
            }
        }
    }

    /// Resolve every field that is not frozen yet.
    pub fn resolve(&self, evidence: &EvidenceSet, fields: &mut ResolvedFields) {
        let ex = self.extractors;
        resolve_tiers(&ex.name, &mut fields.name, evidence);
        resolve_tiers(&ex.year, &mut fields.year_founded, evidence);
        resolve_tiers(&ex.work, &mut fields.fields_of_work, evidence);
        resolve_tiers(&ex.areas, &mut fields.operational_areas, evidence);
        resolve_tiers(&ex.email, &mut fields.email, evidence);
        resolve_tiers(&ex.phone, &mut fields.phone, evidence);
        resolve_tiers(&ex.address, &mut fields.address, evidence);
    }
}

fn offer_selection<E: FieldExtractor>(
    extractor: &E, slot: &mut FieldSlot<E::Output>, texts: &[String], provenance: Provenance,
) -> bool {
    match extractor.from_selection(texts) {
        Some(value) => slot.offer(value, provenance),
        None => false,
    }
}

fn resolve_tiers<E: FieldExtractor>(extractor: &E, slot: &mut FieldSlot<E::Output>, evidence: &EvidenceSet) {
    let field = extractor.field();
    for kind in SourceKind::PRIORITY {
        if slot.is_frozen() {
            return;
        }

        let tier = evidence.tier(kind);
        if tier.is_empty() {
            continue;
        }

        match extractor.resolve(&tier) {
            Resolution::Found(found) => {
                debug!(field = %field, tier = %kind, matcher = found.matcher, origin = %found.origin, "field resolved");
                slot.offer(found.value, Provenance::tier(kind, found.matcher, found.origin));
            }
            Resolution::Unresolved => debug!(field = %field, tier = %kind, "tier yielded nothing"),
        }
    }

    if !slot.is_frozen() {
        debug!(field = %field, "field unresolved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::EvidenceFragment;
    use crate::locale::Locale;
    use crate::pipeline::PipelineConfig;
    use crate::record::Source;
    use std::sync::Arc;
    use url::Url;

    fn extractors() -> Extractors {
        let config = PipelineConfig::builder().max_year(2026).build();
        Extractors::new(&config, Arc::new(Locale::india().compile().unwrap())).unwrap()
    }

    fn origin(path: &str) -> Url {
        Url::parse("https://asha.org/").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_slot_freezes_on_first_offer() {
        let mut slot = FieldSlot::default();
        assert!(slot.offer(1994, Provenance::tier(SourceKind::StructuredData, "structured_year", origin("/"))));
        assert!(!slot.offer(2001, Provenance::tier(SourceKind::PageText, "anchored_year", origin("/"))));
        assert_eq!(slot.value(), Some(&1994));
        assert_eq!(slot.provenance().unwrap().matcher, "structured_year");
    }

    #[test]
    fn test_structured_year_beats_page_text() {
        let extractors = extractors();
        let evidence = EvidenceSet::new(vec![
            EvidenceFragment::text(SourceKind::PageText, "Founded in 2001 by volunteers.", origin("/")),
            EvidenceFragment::structured(FieldKind::YearFounded, "1994-01-01", origin("/")),
        ]);

        let mut fields = ResolvedFields::default();
        ResolutionPolicy::new(&extractors).resolve(&evidence, &mut fields);

        assert_eq!(fields.year_founded.value(), Some(&1994));
        let provenance = fields.year_founded.provenance().unwrap();
        assert_eq!(provenance.source, Source::Tier(SourceKind::StructuredData));
    }

    #[test]
    fn test_fields_resolve_from_different_tiers() {
        let extractors = extractors();
        let evidence = EvidenceSet::new(vec![
            EvidenceFragment::text(SourceKind::PageText, "Write to info@asha.org", origin("/")),
            EvidenceFragment::text(SourceKind::SubpageText, "Asha was established in 1987.", origin("/about")),
        ]);

        let mut fields = ResolvedFields::default();
        ResolutionPolicy::new(&extractors).resolve(&evidence, &mut fields);

        assert_eq!(fields.email.provenance().unwrap().source, Source::Tier(SourceKind::PageText));
        assert_eq!(fields.year_founded.provenance().unwrap().source, Source::Tier(SourceKind::SubpageText));
        assert_eq!(fields.year_founded.value(), Some(&1987));
        assert!(!fields.is_frozen(FieldKind::FieldsOfWork));
    }

    #[test]
    fn test_override_freezes_field_before_evidence() {
        let extractors = extractors();
        let page = Document::parse_with_preprocessing(
            r#"<html><body><p class="helpline">Call +91 98765 43210</p><p>Since 1990</p></body></html>"#,
            Some(origin("/")),
        )
        .unwrap();
        let mut overrides = SiteOverrides::new();
        overrides.set(FieldKind::Phone, ".helpline");
        overrides.set(FieldKind::YearFounded, ".missing");

        let policy = ResolutionPolicy::new(&extractors);
        let mut fields = ResolvedFields::default();
        policy.apply_overrides(&mut fields, &overrides, &page);

        assert_eq!(fields.phone.value(), Some(&Phone::Number("+91 98765 43210".to_string())));
        assert_eq!(fields.phone.provenance().unwrap().matcher, "override");
        assert!(!fields.is_frozen(FieldKind::YearFounded));

        let evidence = EvidenceSet::new(vec![EvidenceFragment::text(
            SourceKind::PageText,
            "Call 022-24567890. Since 1990",
            origin("/"),
        )]);
        policy.resolve(&evidence, &mut fields);
        assert_eq!(fields.phone.value(), Some(&Phone::Number("+91 98765 43210".to_string())));
        assert_eq!(fields.year_founded.value(), Some(&1990));
    }

    #[test]
    fn test_selection_texts_include_link_targets() {
        let page = Document::parse(r#"<a class="m" href="mailto:hello@asha.org?subject=Hi"><i></i></a>"#).unwrap();
        assert_eq!(selection_texts(&page, "a.m").unwrap(), vec!["hello@asha.org".to_string()]);
        assert!(selection_texts(&page, "a[").is_err());
    }

    #[test]
    fn test_empty_evidence_leaves_everything_unresolved() {
        let extractors = extractors();
        let mut fields = ResolvedFields::default();
        ResolutionPolicy::new(&extractors).resolve(&EvidenceSet::default(), &mut fields);
        assert!(fields.provenance().is_empty());
    }
}
