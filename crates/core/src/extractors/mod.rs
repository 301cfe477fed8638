//! Field extractors.
//!
//! Every field is resolved by an ordered chain of named [`Matcher`]s. A
//! matcher proposes candidates from one fragment and validates them with
//! its own predicate; the first validated candidate wins. Extractors never
//! fail: anything a matcher cannot read yields no candidates, and a chain
//! with no validated candidate returns [`Resolution::Unresolved`].

pub mod areas;
pub mod contact;
pub mod name;
pub mod sections;
pub mod work;
pub mod year;

use std::sync::Arc;

use url::Url;

use crate::Result;
use crate::evidence::{EvidenceFragment, FieldKind};
use crate::locale::CompiledLocale;
use crate::pipeline::PipelineConfig;

pub use areas::AreasExtractor;
pub use contact::{AddressExtractor, EmailExtractor, Phone, PhoneExtractor};
pub use name::NameExtractor;
pub use work::WorkExtractor;
pub use year::YearExtractor;

/// A validated value and the matcher that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<T> {
    pub value: T,
    pub matcher: &'static str,
    pub origin: Url,
}

/// Outcome of resolving one field against a set of fragments.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Found(Match<T>),
    Unresolved,
}

impl<T> Resolution<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Resolution::Found(found) => Some(&found.value),
            Resolution::Unresolved => None,
        }
    }

    /// Name of the matcher that fired, if any.
    pub fn matcher(&self) -> Option<&'static str> {
        match self {
            Resolution::Found(found) => Some(found.matcher),
            Resolution::Unresolved => None,
        }
    }
}

/// One named strategy for finding a field value in a fragment.
pub trait Matcher<T>: Send + Sync {
    /// Stable name, reported as provenance.
    fn name(&self) -> &'static str;

    /// Candidate values found in `fragment`, best first.
    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<T>;

    /// Field-specific sanity check for a candidate.
    ///
    /// Rejections are [`NgoscopeError::ValidationError`](crate::NgoscopeError::ValidationError)s.
    fn validate(&self, value: &T) -> Result<()>;
}

/// An ordered list of matchers for one field.
pub struct MatcherChain<T> {
    field: FieldKind,
    matchers: Vec<Box<dyn Matcher<T>>>,
}

impl<T: std::fmt::Debug> MatcherChain<T> {
    pub fn new(field: FieldKind) -> Self {
        Self { field, matchers: Vec::new() }
    }

    /// Append a matcher; matchers run in insertion order.
    pub fn with<M: Matcher<T> + 'static>(mut self, matcher: M) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Matcher names in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// Run the chain over fragments in the order given.
    ///
    /// Fragments tagged for a different field are skipped. Within a fragment
    /// matchers run in chain order.
    pub fn resolve(&self, fragments: &[&EvidenceFragment]) -> Resolution<T> {
        for fragment in fragments {
            if fragment.field_hint.is_some_and(|hint| hint != self.field) {
                continue;
            }

            for matcher in &self.matchers {
                for candidate in matcher.candidates(fragment) {
                    match matcher.validate(&candidate) {
                        Ok(()) => {
                            return Resolution::Found(Match {
                                value: candidate,
                                matcher: matcher.name(),
                                origin: fragment.origin.clone(),
                            });
                        }
                        Err(e) => {
                            tracing::trace!(
                                field = %self.field,
                                matcher = matcher.name(),
                                ?candidate,
                                error = %e,
                                "candidate rejected"
                            );
                        }
                    }
                }
            }
        }

        Resolution::Unresolved
    }
}

/// Common contract of the per-field extractors.
pub trait FieldExtractor: Send + Sync {
    type Output;

    fn field(&self) -> FieldKind;

    /// Resolve the field from fragments ordered by source priority.
    fn resolve(&self, fragments: &[&EvidenceFragment]) -> Resolution<Self::Output>;

    /// Interpret the texts an operator-supplied selector matched.
    ///
    /// Returns `None` when the selection holds no valid value, in which case
    /// automatic extraction proceeds.
    fn from_selection(&self, texts: &[String]) -> Option<Self::Output>;
}

/// Build a [`crate::NgoscopeError::ValidationError`] for `field`.
pub(crate) fn rejected(field: FieldKind, reason: impl Into<String>) -> crate::NgoscopeError {
    crate::NgoscopeError::ValidationError { field: field.key().to_string(), reason: reason.into() }
}

/// The full set of field extractors, built once per pipeline.
pub struct Extractors {
    pub name: NameExtractor,
    pub year: YearExtractor,
    pub work: WorkExtractor,
    pub areas: AreasExtractor,
    pub email: EmailExtractor,
    pub phone: PhoneExtractor,
    pub address: AddressExtractor,
}

impl Extractors {
    pub fn new(config: &PipelineConfig, locale: Arc<CompiledLocale>) -> Result<Self> {
        Ok(Self {
            name: NameExtractor::new(),
            year: YearExtractor::new(config)?,
            work: WorkExtractor::new(config),
            areas: AreasExtractor::new(config, locale.clone()),
            email: EmailExtractor::new()?,
            phone: PhoneExtractor::new(locale.clone())?,
            address: AddressExtractor::new(locale)?,
        })
    }
}
