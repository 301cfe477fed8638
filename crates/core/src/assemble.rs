//! Record assembly and cross-field cleanup.

use std::sync::Arc;

use regex::{Captures, Regex};

use crate::context::ExtractionContext;
use crate::evidence::FieldKind;
use crate::extractors::Phone;
use crate::locale::CompiledLocale;
use crate::parse::collapse_whitespace;
use crate::policy::ResolvedFields;
use crate::record::{ContactField, ContactInfo, OrganizationRecord};
use crate::{NgoscopeError, Result};

const YEAR_PHRASE: &str =
    r"(?i)\b(?:founded|established|estd|since|started|registered|incorporated)\b\.?(?:\s+(?:in|on))?\s*:?\s*(\d{4})\b[,;.]?";

/// Composes resolved fields into the final [`OrganizationRecord`].
pub struct RecordAssembler {
    locale: Arc<CompiledLocale>,
    year_phrase: Regex,
}

impl RecordAssembler {
    pub fn new(locale: Arc<CompiledLocale>) -> Result<Self> {
        let year_phrase = Regex::new(YEAR_PHRASE).map_err(|e| NgoscopeError::ConfigError(e.to_string()))?;
        Ok(Self { locale, year_phrase })
    }

    pub fn assemble(&self, fields: &ResolvedFields, context: &ExtractionContext) -> OrganizationRecord {
        let year = fields.year_founded.value().copied();

        let phone = match fields.phone.value() {
            Some(Phone::Number(number)) => ContactField::Found(number.clone()),
            Some(Phone::CheckManually) => ContactField::CheckManually,
            None if context.is_interactive(FieldKind::Phone) => ContactField::CheckManually,
            None => ContactField::NotFound,
        };

        let address = match fields.address.value() {
            Some(address) => self.clean_address(address, year),
            None => ContactField::NotFound,
        };

        OrganizationRecord {
            ngo_name: fields.name.value().cloned(),
            year_founded: year.map(|y| format!("{:04}", y)),
            fields_of_work: fields.fields_of_work.value().cloned(),
            operational_areas: fields.operational_areas.value().cloned(),
            contact_info: ContactInfo {
                email: fields.email.value().map_or(ContactField::NotFound, |e| ContactField::Found(e.clone())),
                phone,
                address,
            },
            website_url: context.root_input.clone(),
            provenance: fields.provenance(),
        }
    }

    /// Strip a captured founding-year phrase from an address.
    ///
    /// Only phrases naming the resolved year are removed; a house number that
    /// happens to equal the year stays. An address that no longer reads as one after
    /// stripping becomes [`ContactField::NotFound`].
    pub fn clean_address(&self, address: &str, year: Option<i32>) -> ContactField {
        let Some(year) = year else {
            return ContactField::Found(address.to_string());
        };
        let year = format!("{:04}", year);

        let stripped = self.year_phrase.replace_all(address, |caps: &Captures<'_>| {
            if caps[1] == year { String::new() } else { caps[0].to_string() }
        });
        let cleaned = collapse_whitespace(&stripped)
            .replace(" ,", ",")
            .trim_matches(|c: char| matches!(c, ',' | ';' | '.' | '-' | ':') || c.is_whitespace())
            .to_string();

        if cleaned == address {
            return ContactField::Found(cleaned);
        }
        if cleaned.is_empty() {
            return ContactField::NotFound;
        }
        if self.locale.looks_like_address(address) && !self.locale.looks_like_address(&cleaned) {
            return ContactField::NotFound;
        }

        tracing::debug!(before = address, after = %cleaned, "stripped founding year from address");
        ContactField::Found(cleaned)
    }
}
