//! Sub-page and PDF discovery.
//!
//! Scans the anchors of a rendered page for links likely to carry history,
//! programme or contact details, and for linked PDF reports. Nothing is
//! fetched here; the pipeline visits the returned URLs in order.

use url::Url;

use crate::parse::{Document, collapse_whitespace};
use crate::pipeline::PipelineConfig;

/// Candidate URLs found on one page, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discovery {
    pub subpages: Vec<Url>,
    pub pdfs: Vec<Url>,
}

/// A link target together with the visible text of its anchor.
#[derive(Debug, Clone)]
struct Link {
    url: Url,
    text: String,
}

/// Discover sub-page and PDF candidates on a rendered page.
///
/// Keywords are matched as case-insensitive substrings of the anchor text or
/// of the resolved URL's path and query. The host is left out of the match so
/// that a domain such as `aboutchildren.org` does not qualify every link.
/// Results are deduplicated by absolute URL (fragment removed) and capped at
/// `max_subpages` / `max_pdfs`.
pub fn discover(doc: &Document, base: &Url, config: &PipelineConfig) -> Discovery {
    let mut discovery = Discovery::default();
    let base = without_fragment(base);

    for link in links(doc, &base) {
        let haystack = format!("{} {}", link.text.to_lowercase(), target_text(&link.url));

        if is_pdf(&link.url) {
            if discovery.pdfs.len() < config.max_pdfs
                && contains_any(&haystack, &config.pdf_keywords)
                && !discovery.pdfs.contains(&link.url)
            {
                discovery.pdfs.push(link.url);
            }
            continue;
        }

        if discovery.subpages.len() >= config.max_subpages
            || link.url == base
            || discovery.subpages.contains(&link.url)
            || (config.same_host_subpages && !same_site(&link.url, &base))
        {
            continue;
        }

        if contains_any(&haystack, &config.subpage_keywords) {
            discovery.subpages.push(link.url);
        }
    }

    tracing::debug!(
        base = %base,
        subpages = discovery.subpages.len(),
        pdfs = discovery.pdfs.len(),
        "discovered candidate links"
    );

    discovery
}

/// Followable anchors in document order, resolved against `base`.
fn links(doc: &Document, base: &Url) -> Vec<Link> {
    let Ok(anchors) = doc.select("a[href]") else {
        return Vec::new();
    };

    anchors
        .iter()
        .filter_map(|anchor| {
            let href = anchor.attr("href")?.trim();
            let lower = href.to_lowercase();
            if href.is_empty()
                || href.starts_with('#')
                || lower.starts_with("mailto:")
                || lower.starts_with("tel:")
                || lower.starts_with("javascript:")
            {
                return None;
            }

            let url = base.join(href).ok()?;
            if !matches!(url.scheme(), "http" | "https" | "file") {
                return None;
            }

            Some(Link { url: without_fragment(&url), text: collapse_whitespace(&anchor.text()) })
        })
        .collect()
}

fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

/// Lowercased path and query of a URL, the part keywords are matched against.
fn target_text(url: &Url) -> String {
    let mut text = url.path().to_lowercase();
    if let Some(query) = url.query() {
        text.push('?');
        text.push_str(&query.to_lowercase());
    }
    text.replace(['-', '_', '/'], " ")
}

fn is_pdf(url: &Url) -> bool {
    url.path().to_lowercase().ends_with(".pdf")
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(&keyword.to_lowercase()))
}

/// Hosts are compared with a leading `www.` removed.
fn same_site(url: &Url, base: &Url) -> bool {
    fn bare(url: &Url) -> Option<String> {
        url.host_str().map(|host| host.trim_start_matches("www.").to_lowercase())
    }

    let web = |u: &Url| matches!(u.scheme(), "http" | "https");
    let same_scheme = url.scheme() == base.scheme() || (web(url) && web(base));

    same_scheme && bare(url) == bare(base)
}
