//! The organization record produced for every input URL.
//!
//! Every key is always present in the serialized document. Unresolved
//! structured fields serialize as `null`; unresolved contact fields carry a
//! descriptive sentinel string an operator is expected to fill in.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};
use url::Url;

use crate::evidence::{FieldKind, SourceKind};

/// Sentinel for a contact field that was checked and not found.
pub const NOT_FOUND: &str = "not found";

/// Sentinel for a contact field hidden behind an interactive control.
pub const CHECK_MANUALLY: &str = "not found automatically, check manually";

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// An operator-supplied selector for this domain.
    Override { selector: String },
    /// An evidence tier.
    Tier(SourceKind),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Override { selector } => write!(f, "override `{}`", selector),
            Source::Tier(kind) => f.write_str(kind.label()),
        }
    }
}

/// Provenance of one resolved field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub source: Source,
    /// Name of the matcher that fired, `"override"` for overrides.
    pub matcher: &'static str,
    /// Page or document the value was read from.
    pub origin: Url,
}

impl Provenance {
    pub fn tier(kind: SourceKind, matcher: &'static str, origin: Url) -> Self {
        Self { source: Source::Tier(kind), matcher, origin }
    }

    pub fn overridden(selector: impl Into<String>, origin: Url) -> Self {
        Self { source: Source::Override { selector: selector.into() }, matcher: "override", origin }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {} ({})", self.source, self.matcher, self.origin)
    }
}

/// A contact value or one of its sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContactField {
    Found(String),
    #[default]
    NotFound,
    /// The value is only reachable through an interactive control.
    CheckManually,
}

impl ContactField {
    pub fn as_str(&self) -> &str {
        match self {
            ContactField::Found(value) => value,
            ContactField::NotFound => NOT_FOUND,
            ContactField::CheckManually => CHECK_MANUALLY,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ContactField::Found(_))
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ContactField {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ContactInfo {
    pub email: ContactField,
    pub phone: ContactField,
    pub address: ContactField,
}

/// The final, immutable result for one organization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationRecord {
    pub ngo_name: Option<String>,
    /// Four-digit year, e.g. `"1994"`.
    pub year_founded: Option<String>,
    pub fields_of_work: Option<Vec<String>>,
    pub operational_areas: Option<BTreeSet<String>>,
    pub contact_info: ContactInfo,
    /// The input URL exactly as supplied.
    pub website_url: String,
    #[serde(skip)]
    pub provenance: BTreeMap<FieldKind, Provenance>,
}

impl OrganizationRecord {
    /// A record with every field unresolved.
    pub fn unresolved(website_url: impl Into<String>) -> Self {
        Self {
            ngo_name: None,
            year_founded: None,
            fields_of_work: None,
            operational_areas: None,
            contact_info: ContactInfo::default(),
            website_url: website_url.into(),
            provenance: BTreeMap::new(),
        }
    }

    /// Whether `field` holds a real value rather than a sentinel.
    pub fn is_resolved(&self, field: FieldKind) -> bool {
        match field {
            FieldKind::Name => self.ngo_name.is_some(),
            FieldKind::YearFounded => self.year_founded.is_some(),
            FieldKind::FieldsOfWork => self.fields_of_work.is_some(),
            FieldKind::OperationalAreas => self.operational_areas.is_some(),
            FieldKind::Email => self.contact_info.email.is_found(),
            FieldKind::Phone => self.contact_info.phone.is_found(),
            FieldKind::Address => self.contact_info.address.is_found(),
            FieldKind::WebsiteUrl => true,
        }
    }

    /// Resolvable fields still holding a sentinel.
    pub fn unresolved_fields(&self) -> Vec<FieldKind> {
        FieldKind::RESOLVABLE.into_iter().filter(|field| !self.is_resolved(*field)).collect()
    }

    /// Human-readable value of one field, `None` when unresolved.
    pub fn display_value(&self, field: FieldKind) -> Option<String> {
        match field {
            FieldKind::Name => self.ngo_name.clone(),
            FieldKind::YearFounded => self.year_founded.clone(),
            FieldKind::FieldsOfWork => self.fields_of_work.as_ref().map(|items| items.join("; ")),
            FieldKind::OperationalAreas => {
                self.operational_areas.as_ref().map(|areas| areas.iter().cloned().collect::<Vec<_>>().join(", "))
            }
            FieldKind::Email => self.contact_info.email.is_found().then(|| self.contact_info.email.to_string()),
            FieldKind::Phone => self.contact_info.phone.is_found().then(|| self.contact_info.phone.to_string()),
            FieldKind::Address => self.contact_info.address.is_found().then(|| self.contact_info.address.to_string()),
            FieldKind::WebsiteUrl => Some(self.website_url.clone()),
        }
    }
}
