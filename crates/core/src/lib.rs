//! Multi-source extraction of organizational facts from NGO websites.
//!
//! A [`Pipeline`] renders an organization's root page, discovers sub-pages
//! and linked reports, and reconciles four evidence tiers (structured
//! metadata, page text, sub-page text, PDF text) into one
//! [`OrganizationRecord`]. Every field is resolved independently by an
//! ordered chain of named matchers; unresolved fields carry explicit
//! sentinels instead of being omitted.

pub mod assemble;
pub mod context;
pub mod decode;
pub mod discovery;
pub mod error;
pub mod evidence;
pub mod extractors;
pub mod fetch;
pub mod formatters;
pub mod locale;
pub mod overrides;
pub mod parse;
pub mod pipeline;
pub mod policy;
pub mod preprocess;
pub mod record;
pub mod sources;

pub use assemble::RecordAssembler;
pub use context::ExtractionContext;
pub use decode::{PdfTextDecoder, TextDecoder, Utf8TextDecoder};
pub use discovery::{Discovery, discover};
pub use error::{NgoscopeError, Result};
pub use evidence::{EvidenceFragment, EvidenceSet, FieldKind, SourceKind};
pub use extractors::{FieldExtractor, Match, Matcher, MatcherChain, Phone, Resolution};
#[cfg(feature = "fetch")]
pub use fetch::HttpFetcher;
pub use fetch::{DomSnapshot, FetchConfig, Fetcher, local_url};
pub use formatters::{JsonConfig, JsonFormatter, JsonSink, TextConfig, TextFormatter};
pub use formatters::{convert_to_json, convert_to_jsonl, convert_to_text};
pub use locale::{CompiledLocale, Gazetteer, Locale};
pub use overrides::{FileOverrideStore, MemoryOverrideStore, OverrideStore, SiteOverrides};
pub use parse::Document;
pub use pipeline::{Extraction, Pipeline, PipelineConfig, PipelineConfigBuilder, parse_root};
pub use policy::{FieldSlot, ResolutionPolicy, ResolvedFields};
#[doc(hidden)]
pub use preprocess::PreprocessConfig;
pub use preprocess::preprocess_html;
pub use record::{CHECK_MANUALLY, ContactField, ContactInfo, NOT_FOUND, OrganizationRecord, Provenance, Source};
