use regex::Regex;
use url::Url;

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove script tags (including JSON-LD blocks)
    pub remove_scripts: bool,
    /// Whether to remove style tags
    pub remove_styles: bool,
    /// Whether to remove noscript and template tags
    pub remove_noscript: bool,
    /// Whether to remove iframe tags
    pub remove_iframes: bool,
    /// Whether to remove svg and canvas tags
    pub remove_graphics: bool,
    /// Whether to remove elements hidden with inline styles or the `hidden` attribute
    pub remove_hidden: bool,
    /// Whether to convert relative link targets to absolute
    pub convert_urls: bool,
    /// Base URL for converting relative URLs
    pub base_url: Option<Url>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            remove_scripts: true,
            remove_styles: true,
            remove_noscript: true,
            remove_iframes: true,
            remove_graphics: true,
            remove_hidden: true,
            convert_urls: true,
            base_url: None,
        }
    }
}

/// Preprocess a rendered DOM snapshot so that only what a visitor sees remains.
///
/// Structure (lists, navigation, form controls, anchors) is preserved because
/// the field extractors reason about it.
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut processed = html.to_string();

    if config.remove_scripts
        || config.remove_styles
        || config.remove_noscript
        || config.remove_iframes
        || config.remove_graphics
    {
        processed = remove_unwanted_tags(&processed, config);
    }

    processed = remove_comments(&processed);

    if config.remove_hidden {
        processed = remove_hidden_elements(&processed);
    }

    if config.convert_urls
        && let Some(base_url) = &config.base_url
    {
        processed = convert_relative_urls(&processed, base_url);
    }

    normalize_whitespace(processed)
}

/// Remove script, style, noscript, template, iframe, svg and canvas tags from HTML
fn remove_unwanted_tags(html: &str, config: &PreprocessConfig) -> String {
    let mut selectors = Vec::new();
    if config.remove_scripts {
        selectors.push("script");
    }
    if config.remove_styles {
        selectors.push("style");
    }
    if config.remove_noscript {
        selectors.extend(["noscript", "template"]);
    }
    if config.remove_iframes {
        selectors.push("iframe");
    }
    if config.remove_graphics {
        selectors.extend(["svg", "canvas"]);
    }

    let handlers = selectors
        .into_iter()
        .map(|selector| {
            lol_html::element!(selector, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    if output.is_empty() { html.to_string() } else { output }
}

/// Remove HTML comments from the document
fn remove_comments(html: &str) -> String {
    let re = Regex::new(r"(?s)<!--.*?-->").unwrap();
    re.replace_all(html, "").to_string()
}

/// Remove elements with display:none, visibility:hidden or the `hidden` attribute
fn remove_hidden_elements(html: &str) -> String {
    let hidden_pattern = Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").unwrap();

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("*", |el| {
                if el.has_attribute("hidden") {
                    el.remove();
                    return Ok(());
                }
                if let Some(style) = el.get_attribute("style")
                    && hidden_pattern.is_match(&style)
                {
                    el.remove();
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    if output.is_empty() { html.to_string() } else { output }
}

/// Convert relative link targets to absolute URLs
///
/// `mailto:` and `tel:` targets are absolute already and pass through unchanged.
pub fn convert_relative_urls(html: &str, base_url: &Url) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("a[href]", |el| {
                if let Some(href) = el.get_attribute("href")
                    && let Ok(absolute) = base_url.join(href.trim())
                {
                    el.set_attribute("href", absolute.as_str()).ok();
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    if output.is_empty() { html.to_string() } else { output }
}

/// Normalize whitespace in HTML
fn normalize_whitespace(html: String) -> String {
    let re = Regex::new(r"\s+").unwrap();
    re.replace_all(&html, " ").to_string()
}
