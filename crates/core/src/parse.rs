//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! rendered DOM snapshots and navigating them with CSS selectors, ancestry
//! and sibling walks.
//!
//! # Example
//!
//! ```rust
//! use ngoscope_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h2>Our Programs</h2>
//!             <ul><li>Education</li><li>Health</li></ul>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let heading = &doc.select("h2").unwrap()[0];
//! let list = heading.following_siblings().next().unwrap();
//! assert_eq!(list.tag_name(), "ul");
//! ```

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::preprocess::{self, PreprocessConfig};
use crate::{NgoscopeError, Result};

/// Elements that start a new line in visible text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset", "figcaption", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "table", "td", "th", "tr", "ul",
];

/// Elements whose content a browser never shows as page text.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "select", "datalist", "option", "head"];

/// Represents a parsed HTML document.
///
/// A Document wraps a DOM snapshot and provides methods for querying elements
/// using CSS selectors and reading its visible text.
///
/// # Example
///
/// ```rust
/// use ngoscope_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string without preprocessing.
    ///
    /// Script blocks are kept, which is what the structured metadata source
    /// needs to read JSON-LD.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html, base_url: None })
    }

    /// Parses HTML from a string with preprocessing.
    ///
    /// Non-visible markup is stripped and relative links are made absolute
    /// against `base_url` when one is given.
    pub fn parse_with_preprocessing(html: &str, base_url: Option<Url>) -> Result<Self> {
        let config = PreprocessConfig { base_url: base_url.clone(), ..Default::default() };

        let cleaned = preprocess::preprocess_html(html, &config);
        let html = Html::parse_document(&cleaned);

        Ok(Self { html, base_url })
    }

    /// Gets the base URL used for preprocessing.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Gets the entire HTML as a string.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`NgoscopeError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ngoscope_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Gets the trimmed, whitespace-collapsed `<title>` text.
    ///
    /// Returns `None` when the title is missing or blank.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|title| !title.is_empty())
    }

    /// Gets all text nodes of the document concatenated.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }

    /// Gets the text a browser would show, one block element per line.
    ///
    /// Scripts, styles and form option lists are skipped; whitespace inside a
    /// line is collapsed and blank lines are dropped.
    pub fn visible_text(&self) -> String {
        let mut raw = String::new();
        push_visible_text(self.html.root_element(), &mut raw);

        raw.lines()
            .map(collapse_whitespace)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if SKIPPED_TAGS.contains(&name) {
        return;
    }

    let block = BLOCK_TAGS.contains(&name);
    if block {
        out.push('\n');
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            push_visible_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            out.extend(text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }));
        }
    }

    if block {
        out.push('\n');
    }
}

/// Parse a CSS selector, mapping failures into [`NgoscopeError::HtmlParseError`].
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| NgoscopeError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A wrapper around scraper's ElementRef for easier DOM navigation.
///
/// # Example
///
/// ```rust
/// use ngoscope_core::parse::Document;
///
/// let html = r#"<a href="https://example.org">Link text</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.org"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the inner HTML of this element.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// Gets the outer HTML of this element.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the text content of this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text content trimmed and with whitespace collapsed.
    pub fn normalized_text(&self) -> String {
        collapse_whitespace(&self.text())
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Whether this is a `h1`-`h6` heading element.
    pub fn is_heading(&self) -> bool {
        matches!(self.element.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
    }

    /// Whether this is an `ul` or `ol` list element.
    pub fn is_list(&self) -> bool {
        matches!(self.element.value().name(), "ul" | "ol")
    }

    /// Gets the `id` and `class` attribute values joined by a space.
    pub fn id_and_class(&self) -> String {
        let value = self.element.value();
        let mut out = String::new();
        if let Some(id) = value.id() {
            out.push_str(id);
        }
        for class in value.classes() {
            out.push(' ');
            out.push_str(class);
        }
        out
    }

    /// Gets the parent element, if any.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(|element| Element { element })
    }

    /// Iterates ancestors from the parent upwards.
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        self.element.ancestors().filter_map(ElementRef::wrap).map(|element| Element { element })
    }

    /// Iterates the element siblings that follow this element.
    pub fn following_siblings(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        self.element.next_siblings().filter_map(ElementRef::wrap).map(|element| Element { element })
    }

    /// Iterates direct element children.
    pub fn child_elements(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        self.element.children().filter_map(ElementRef::wrap).map(|element| Element { element })
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`NgoscopeError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}
