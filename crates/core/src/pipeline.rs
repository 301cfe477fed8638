//! The extraction pipeline.
//!
//! One run per organization: render the root page, discover sub-pages and
//! PDF reports, gather evidence from every source, resolve each field tier
//! by tier and assemble the record. Fetch and decode failures shrink the
//! evidence for their tier and never fail the run.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ngoscope_core::{FetchConfig, HttpFetcher, MemoryOverrideStore, PdfTextDecoder, Pipeline, PipelineConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::builder().max_subpages(5).wait_for_js(true).build();
//! let pipeline = Pipeline::with_config(config)?;
//! let fetcher = HttpFetcher::new(FetchConfig::default())?;
//! let overrides = MemoryOverrideStore::new();
//!
//! let extraction = pipeline.run("https://example.org", &fetcher, Arc::new(PdfTextDecoder), &overrides).await?;
//! println!("{}", serde_json::to_string_pretty(&extraction.record)?);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{Level, debug, error, instrument, warn};
use url::Url;

use crate::assemble::RecordAssembler;
use crate::context::ExtractionContext;
use crate::decode::TextDecoder;
use crate::discovery::{Discovery, discover};
use crate::evidence::{EvidenceSet, FieldKind, SourceKind};
use crate::extractors::{Extractors, FieldExtractor, Phone};
use crate::fetch::{DomSnapshot, Fetcher, with_timeout};
use crate::locale::{CompiledLocale, Locale};
use crate::overrides::{OverrideStore, SiteOverrides};
use crate::parse::Document;
use crate::policy::{ResolutionPolicy, ResolvedFields, selection_texts};
use crate::record::OrganizationRecord;
use crate::sources;
use crate::{NgoscopeError, Result};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Configuration for the extraction pipeline.
///
/// # Example
///
/// ```rust
/// use ngoscope_core::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .max_subpages(5)
///     .max_pdfs(2)
///     .min_list_items(2)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sub-pages followed per organization (default: 3).
    pub max_subpages: usize,

    /// PDF documents decoded per organization (default: 1).
    pub max_pdfs: usize,

    /// Only follow sub-pages on the root page's site (default: true).
    pub same_host_subpages: bool,

    /// Budget for rendering one page or fetching one document (default: 30s).
    pub render_timeout: Duration,

    /// Budget for decoding one document to text (default: 20s).
    pub decode_timeout: Duration,

    /// Ask the fetcher to let client-side scripts run (default: false).
    pub wait_for_js: bool,

    /// Characters after a founding keyword searched for a year (default: 40).
    pub year_window: usize,

    /// Maximum distance in characters between a year and a founding keyword (default: 100).
    pub year_proximity: usize,

    /// Earliest plausible founding year (default: 1800).
    pub min_year: i32,

    /// Latest plausible founding year (default: the current year when the config was built).
    pub max_year: i32,

    /// Minimum list length accepted as fields of work (default: 3).
    pub min_list_items: usize,

    /// Fall back to scanning free text for gazetteer places (default: true).
    pub scan_text_for_areas: bool,

    /// Link keywords that qualify a sub-page.
    pub subpage_keywords: Vec<String>,

    /// Link keywords that qualify a PDF document.
    pub pdf_keywords: Vec<String>,

    /// Heading keywords that introduce a fields-of-work list.
    pub work_keywords: Vec<String>,

    /// Heading keywords that introduce an operational-areas list.
    pub area_keywords: Vec<String>,

    /// Region-specific gazetteer and contact patterns (default: India).
    pub locale: Locale,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_subpages: 3,
            max_pdfs: 1,
            same_host_subpages: true,
            render_timeout: Duration::from_secs(30),
            decode_timeout: Duration::from_secs(20),
            wait_for_js: false,
            year_window: 40,
            year_proximity: 100,
            min_year: 1800,
            max_year: time::OffsetDateTime::now_utc().year(),
            min_list_items: 3,
            scan_text_for_areas: true,
            subpage_keywords: strings(&[
                "about",
                "history",
                "our story",
                "founding",
                "who we are",
                "mission",
                "team",
                "contact",
                "get in touch",
                "reach us",
                "program",
                "initiative",
                "project",
                "where we work",
            ]),
            pdf_keywords: strings(&["annual report", "annual", "report", "history", "founded"]),
            work_keywords: strings(&[
                "program",
                "initiative",
                "project",
                "what we do",
                "our work",
                "focus area",
                "areas of focus",
                "fields of work",
            ]),
            area_keywords: strings(&[
                "where we work",
                "operational areas",
                "our presence",
                "locations",
                "regions",
                "our reach",
                "states",
            ]),
            locale: Locale::india(),
        }
    }
}

impl PipelineConfig {
    /// Creates a new builder for PipelineConfig.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

/// Builder for PipelineConfig.
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: PipelineConfig::default() }
    }

    pub fn max_subpages(mut self, value: usize) -> Self {
        self.config.max_subpages = value;
        self
    }

    pub fn max_pdfs(mut self, value: usize) -> Self {
        self.config.max_pdfs = value;
        self
    }

    pub fn same_host_subpages(mut self, value: bool) -> Self {
        self.config.same_host_subpages = value;
        self
    }

    pub fn render_timeout(mut self, value: Duration) -> Self {
        self.config.render_timeout = value;
        self
    }

    pub fn decode_timeout(mut self, value: Duration) -> Self {
        self.config.decode_timeout = value;
        self
    }

    pub fn wait_for_js(mut self, value: bool) -> Self {
        self.config.wait_for_js = value;
        self
    }

    pub fn year_window(mut self, value: usize) -> Self {
        self.config.year_window = value;
        self
    }

    pub fn year_proximity(mut self, value: usize) -> Self {
        self.config.year_proximity = value;
        self
    }

    pub fn min_year(mut self, value: i32) -> Self {
        self.config.min_year = value;
        self
    }

    pub fn max_year(mut self, value: i32) -> Self {
        self.config.max_year = value;
        self
    }

    pub fn min_list_items(mut self, value: usize) -> Self {
        self.config.min_list_items = value;
        self
    }

    pub fn scan_text_for_areas(mut self, value: bool) -> Self {
        self.config.scan_text_for_areas = value;
        self
    }

    /// Replaces the sub-page link keywords.
    pub fn subpage_keywords(mut self, value: Vec<String>) -> Self {
        self.config.subpage_keywords = value;
        self
    }

    /// Replaces the PDF link keywords.
    pub fn pdf_keywords(mut self, value: Vec<String>) -> Self {
        self.config.pdf_keywords = value;
        self
    }

    /// Replaces the fields-of-work heading keywords.
    pub fn work_keywords(mut self, value: Vec<String>) -> Self {
        self.config.work_keywords = value;
        self
    }

    /// Replaces the operational-areas heading keywords.
    pub fn area_keywords(mut self, value: Vec<String>) -> Self {
        self.config.area_keywords = value;
        self
    }

    pub fn locale(mut self, value: Locale) -> Self {
        self.config.locale = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The outcome of one organization's run.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: OrganizationRecord,
    pub context: ExtractionContext,
    /// The rendered root page, when it could be fetched.
    pub main: Option<DomSnapshot>,
    pub evidence: EvidenceSet,
}

/// Multi-source extraction pipeline.
///
/// Holds only immutable configuration and compiled extractors, so one
/// pipeline can serve any number of concurrent runs.
pub struct Pipeline {
    config: PipelineConfig,
    extractors: Extractors,
    assembler: RecordAssembler,
}

impl Pipeline {
    /// Create a pipeline with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline, compiling the configured locale.
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        let locale: Arc<CompiledLocale> = Arc::new(config.locale.compile()?);
        let extractors = Extractors::new(&config, locale.clone())?;
        let assembler = RecordAssembler::new(locale)?;
        Ok(Self { config, extractors, assembler })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Discover sub-page and PDF candidates on a rendered page.
    pub fn discover(&self, page: &DomSnapshot) -> Discovery {
        match Document::parse_with_preprocessing(&page.html, Some(page.url.clone())) {
            Ok(doc) => discover(&doc, &page.url, &self.config),
            Err(e) => {
                warn!(url = %page.url, error = %e, "cannot parse page for discovery");
                Discovery::default()
            }
        }
    }

    /// Run every signal source over the fetched material.
    ///
    /// Structured metadata is read from the root page first, then from each
    /// sub-page in visiting order.
    pub fn gather_evidence(
        &self, main: Option<&DomSnapshot>, subpages: &[DomSnapshot], documents: &[(Url, String)],
    ) -> EvidenceSet {
        let mut fragments = Vec::new();

        for page in main.into_iter().chain(subpages) {
            fragments.extend(sources::structured::extract(&page.html, &page.url));
        }
        if let Some(main) = main {
            fragments.extend(sources::page::extract(main, SourceKind::PageText));
        }
        for page in subpages {
            fragments.extend(sources::page::extract(page, SourceKind::SubpageText));
        }
        for (url, text) in documents {
            fragments.extend(sources::pdf::extract(text, url));
        }

        let evidence = EvidenceSet::new(fragments);
        debug!(fragments = evidence.len(), "evidence gathered");
        evidence
    }

    /// Apply overrides against the root page, then resolve remaining fields tier by tier.
    pub fn resolve(
        &self, evidence: &EvidenceSet, overrides: &SiteOverrides, main: Option<&DomSnapshot>,
    ) -> ResolvedFields {
        let policy = ResolutionPolicy::new(&self.extractors);
        let mut fields = ResolvedFields::default();

        if let Some(main) = main
            && !overrides.is_empty()
        {
            match Document::parse_with_preprocessing(&main.html, Some(main.url.clone())) {
                Ok(page) => policy.apply_overrides(&mut fields, overrides, &page),
                Err(e) => warn!(url = %main.url, error = %e, "cannot parse page for overrides"),
            }
        }

        policy.resolve(evidence, &mut fields);
        fields
    }

    /// Assemble the record, flagging a manual-check phone on the context.
    pub fn assemble(&self, fields: &ResolvedFields, context: &mut ExtractionContext) -> OrganizationRecord {
        if fields.phone.value() == Some(&Phone::CheckManually) {
            context.mark_interactive(FieldKind::Phone);
        }
        self.assembler.assemble(fields, context)
    }

    /// Extract from material that was already fetched.
    ///
    /// Deterministic: the same inputs always produce the same record.
    pub fn extract_offline(
        &self, root_input: &str, main: &DomSnapshot, subpages: &[DomSnapshot], documents: &[(Url, String)],
        overrides: &SiteOverrides,
    ) -> Result<Extraction> {
        let root = parse_root(root_input)?;
        let mut context = ExtractionContext::new(root_input, root);
        context.record_discovery(self.discover(main));

        let evidence = self.gather_evidence(Some(main), subpages, documents);
        let fields = self.resolve(&evidence, overrides, Some(main));
        let record = self.assemble(&fields, &mut context);
        Ok(Extraction { record, context, main: Some(main.clone()), evidence })
    }

    /// Re-resolve an earlier extraction with a new set of overrides.
    ///
    /// Evidence is reused as is; nothing is fetched.
    pub fn reresolve(&self, extraction: Extraction, overrides: &SiteOverrides) -> Extraction {
        let Extraction { mut context, main, evidence, .. } = extraction;
        context.interactive.clear();
        let fields = self.resolve(&evidence, overrides, main.as_ref());
        let record = self.assemble(&fields, &mut context);
        Extraction { record, context, main, evidence }
    }

    /// The value `selector` yields for `field` on a rendered page, as display text.
    pub fn preview_selector(&self, page: &DomSnapshot, field: FieldKind, selector: &str) -> Result<Option<String>> {
        let doc = Document::parse_with_preprocessing(&page.html, Some(page.url.clone()))?;
        let texts = selection_texts(&doc, selector)?;
        let ex = &self.extractors;

        let preview = match field {
            FieldKind::Name => ex.name.from_selection(&texts),
            FieldKind::YearFounded => ex.year.from_selection(&texts).map(|y| format!("{:04}", y)),
            FieldKind::FieldsOfWork => ex.work.from_selection(&texts).map(|items| items.join("; ")),
            FieldKind::OperationalAreas => {
                ex.areas.from_selection(&texts).map(|areas| areas.into_iter().collect::<Vec<_>>().join(", "))
            }
            FieldKind::Email => ex.email.from_selection(&texts),
            FieldKind::Phone => ex.phone.from_selection(&texts).map(|phone| match phone {
                Phone::Number(number) => number,
                Phone::CheckManually => crate::record::CHECK_MANUALLY.to_string(),
            }),
            FieldKind::Address => ex.address.from_selection(&texts),
            FieldKind::WebsiteUrl => {
                return Err(NgoscopeError::OverrideError("website_url cannot be overridden".to_string()));
            }
        };
        Ok(preview)
    }

    /// Extract one organization.
    ///
    /// Only an unusable `input` is an error. Every other failure is logged,
    /// recorded on the returned context and degrades its tier.
    #[instrument(skip(self, input, fetcher, decoder, overrides), fields(url = %input))]
    pub async fn run(
        &self, input: &str, fetcher: &dyn Fetcher, decoder: Arc<dyn TextDecoder>, overrides: &dyn OverrideStore,
    ) -> Result<Extraction> {
        let root = parse_root(input)?;
        let mut context = ExtractionContext::new(input, root.clone());

        let site_overrides = match root.host_str() {
            Some(host) => overrides.lookup(host).unwrap_or_else(|e| {
                warn!(host, error = %e, "cannot read overrides");
                SiteOverrides::default()
            }),
            None => SiteOverrides::default(),
        };

        let main = match self.render(fetcher, &root).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "root page unavailable, record will carry sentinels");
                context.record_failure(&root, &e);
                None
            }
        };

        if let Some(main) = &main {
            context.record_discovery(self.discover(main));
        }

        let mut subpages = Vec::new();
        for url in context.subpages.clone() {
            match self.render(fetcher, &url).await {
                Ok(snapshot) => subpages.push(snapshot),
                Err(e) => {
                    log_skipped("sub-page", &url, &e);
                    context.record_failure(&url, &e);
                }
            }
        }

        let mut documents = Vec::new();
        for url in context.pdfs.clone() {
            match self.decode_document(fetcher, decoder.clone(), &url).await {
                Ok(text) => documents.push((url, text)),
                Err(e) => {
                    log_skipped("document", &url, &e);
                    context.record_failure(&url, &e);
                }
            }
        }

        let evidence = self.gather_evidence(main.as_ref(), &subpages, &documents);
        let fields = self.resolve(&evidence, &site_overrides, main.as_ref());
        let record = self.assemble(&fields, &mut context);

        debug!(unresolved = ?record.unresolved_fields(), failures = context.failures.len(), "extraction finished");
        Ok(Extraction { record, context, main, evidence })
    }

    async fn render(&self, fetcher: &dyn Fetcher, url: &Url) -> Result<DomSnapshot> {
        let timeout = self.config.render_timeout;
        with_timeout(timeout, fetcher.render(url, self.config.wait_for_js, timeout)).await
    }

    async fn decode_document(&self, fetcher: &dyn Fetcher, decoder: Arc<dyn TextDecoder>, url: &Url) -> Result<String> {
        let timeout = self.config.render_timeout;
        let bytes = with_timeout(timeout, fetcher.fetch_document(url, timeout)).await?;

        let task = tokio::task::spawn_blocking(move || decoder.extract_text(&bytes));
        match tokio::time::timeout(self.config.decode_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(NgoscopeError::DecodeError(join.to_string())),
            Err(_) => Err(NgoscopeError::Timeout { timeout: self.config.decode_timeout.as_secs() }),
        }
    }
}

/// Level a skipped source is logged at: transient failures warn, anything else is an error.
fn skip_level(e: &NgoscopeError) -> Level {
    if e.is_recoverable() { Level::WARN } else { Level::ERROR }
}

fn log_skipped(source: &str, url: &Url, e: &NgoscopeError) {
    if skip_level(e) == Level::WARN {
        warn!(%url, error = %e, "skipping {}", source);
    } else {
        error!(%url, error = %e, "skipping {}", source);
    }
}

/// Parse a root input, accepting `http`, `https` and `file` URLs.
pub fn parse_root(input: &str) -> Result<Url> {
    let url = Url::parse(input.trim()).map_err(|e| NgoscopeError::InvalidUrl(format!("{}: {}", input, e)))?;
    match url.scheme() {
        "http" | "https" | "file" => Ok(url),
        other => Err(NgoscopeError::InvalidUrl(format!("unsupported scheme {:?} in {}", other, input))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(url: &str, html: &str) -> DomSnapshot {
        DomSnapshot { url: Url::parse(url).unwrap(), html: html.to_string() }
    }

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_subpages, 3);
        assert_eq!(config.max_pdfs, 1);
        assert_eq!(config.min_year, 1800);
        assert!(config.max_year >= 2024);
        assert_eq!(config.min_list_items, 3);
        assert_eq!(config.render_timeout, Duration::from_secs(30));
        assert!(config.subpage_keywords.iter().any(|k| k == "history"));
        assert_eq!(config.locale.name, "india");
    }

    #[test]
    fn test_pipeline_config_builder() {
        let config = PipelineConfig::builder()
            .max_subpages(5)
            .max_pdfs(0)
            .wait_for_js(true)
            .render_timeout(Duration::from_secs(5))
            .work_keywords(vec!["causes".to_string()])
            .build();

        assert_eq!(config.max_subpages, 5);
        assert_eq!(config.max_pdfs, 0);
        assert!(config.wait_for_js);
        assert_eq!(config.render_timeout, Duration::from_secs(5));
        assert_eq!(config.work_keywords, vec!["causes".to_string()]);
    }

    #[test]
    fn test_invalid_year_range_is_config_error() {
        let config = PipelineConfig::builder().min_year(2000).max_year(1990).build();
        assert!(matches!(Pipeline::with_config(config), Err(NgoscopeError::ConfigError(_))));
    }

    #[test]
    fn test_parse_root() {
        assert!(parse_root("https://asha.org").is_ok());
        assert!(parse_root("file:///tmp/site/index.html").is_ok());
        assert!(matches!(parse_root("ftp://asha.org"), Err(NgoscopeError::InvalidUrl(_))));
        assert!(matches!(parse_root("asha.org"), Err(NgoscopeError::InvalidUrl(_))));
    }

    #[test]
    fn test_skip_level() {
        assert_eq!(skip_level(&NgoscopeError::Timeout { timeout: 30 }), Level::WARN);
        assert_eq!(skip_level(&NgoscopeError::DecodeError("truncated xref".into())), Level::WARN);
        assert_eq!(skip_level(&NgoscopeError::ConfigError("bad pattern".into())), Level::ERROR);
    }

    #[test]
    fn test_extract_offline_uses_every_tier() {
        let pipeline = Pipeline::with_config(PipelineConfig::builder().max_year(2026).build()).unwrap();
        let main = snapshot(
            "https://asha.org/",
            r#"<html><head><title>Asha Trust | Home</title></head><body>
                <a href="/about-us">About</a>
                <p>Write to <a href="mailto:info@asha.org">us</a>.</p></body></html>"#,
        );
        let about = snapshot(
            "https://asha.org/about-us",
            r#"<html><body><p>Asha Trust was established in 1987 in Pune.</p></body></html>"#,
        );

        let extraction =
            pipeline.extract_offline("https://asha.org", &main, &[about], &[], &SiteOverrides::default()).unwrap();

        let record = &extraction.record;
        assert_eq!(record.ngo_name.as_deref(), Some("Asha Trust"));
        assert_eq!(record.year_founded.as_deref(), Some("1987"));
        assert_eq!(record.contact_info.email.as_str(), "info@asha.org");
        assert_eq!(record.website_url, "https://asha.org");
        assert_eq!(extraction.context.subpages, vec![Url::parse("https://asha.org/about-us").unwrap()]);
    }

    #[test]
    fn test_preview_selector() {
        let pipeline = Pipeline::new().unwrap();
        let page = snapshot("https://asha.org/", r#"<footer><span class="since">Serving since 1992</span></footer>"#);

        let preview = pipeline.preview_selector(&page, FieldKind::YearFounded, ".since").unwrap();
        assert_eq!(preview.as_deref(), Some("1992"));
        assert_eq!(pipeline.preview_selector(&page, FieldKind::Email, ".since").unwrap(), None);
        assert!(pipeline.preview_selector(&page, FieldKind::WebsiteUrl, ".since").is_err());
        assert!(pipeline.preview_selector(&page, FieldKind::Name, "span[").is_err());
    }

    #[test]
    fn test_reresolve_applies_new_override() {
        let pipeline = Pipeline::new().unwrap();
        let main = snapshot("https://asha.org/", r#"<html><body><div id="tel">Helpline 98765 43210</div></body></html>"#);
        let extraction = pipeline.extract_offline("https://asha.org", &main, &[], &[], &SiteOverrides::default()).unwrap();
        let first = extraction.record.contact_info.phone.clone();

        let mut overrides = SiteOverrides::default();
        overrides.set(FieldKind::Name, "#tel");
        let extraction = pipeline.reresolve(extraction, &overrides);

        assert_eq!(extraction.record.ngo_name.as_deref(), Some("Helpline 98765 43210"));
        assert_eq!(extraction.record.contact_info.phone, first);
    }
}
