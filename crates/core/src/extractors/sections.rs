//! Keyword-headed list sections.
//!
//! Shared by the fields-of-work and operational-area extractors: find a
//! heading whose text carries a keyword, then the list structure that
//! belongs to it. Lists that sit inside navigation are never returned.

use regex::Regex;
use std::sync::LazyLock;

use crate::parse::{Document, Element};

static NAV_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:nav|navbar|navigation|menu|menubar|submenu|breadcrumbs?|dropdown|mega-?menu)\b")
        .unwrap()
});

/// Items typical of site menus rather than content lists.
const NAV_VOCABULARY: &[&str] = &[
    "home",
    "about",
    "about us",
    "contact",
    "contact us",
    "donate",
    "donate now",
    "blog",
    "news",
    "careers",
    "login",
    "sign in",
    "gallery",
    "media",
    "get involved",
    "volunteer",
    "faq",
];

/// How many ancestor levels to climb looking for the list after a heading.
const MAX_CLIMB: usize = 2;

/// A list found under a keyword heading.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionList {
    pub heading: String,
    pub items: Vec<String>,
}

/// Whether an element is, or sits inside, a navigation or menu structure.
///
/// `body` and `html` are not inspected; themes put layout flags such as
/// `has-main-navigation` on them.
pub fn in_navigation(element: &Element<'_>) -> bool {
    std::iter::once(element.clone()).chain(element.ancestors()).any(|el| {
        if matches!(el.tag_name().as_str(), "body" | "html") {
            return false;
        }
        let role = el.attr("role").unwrap_or_default().to_lowercase();
        el.tag_name() == "nav"
            || matches!(role.as_str(), "navigation" | "menu" | "menubar" | "menuitem")
            || NAV_CLASS.is_match(&el.id_and_class())
    })
}

/// Whether most items read like menu entries.
fn looks_like_menu(items: &[String]) -> bool {
    let menu_items = items.iter().filter(|item| NAV_VOCABULARY.contains(&item.to_lowercase().as_str())).count();
    menu_items * 2 >= items.len() && menu_items > 0
}

/// Direct `li` children, whitespace-collapsed, blanks and repeats dropped.
fn list_items(list: &Element<'_>) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in list.child_elements().filter(|child| child.tag_name() == "li") {
        let text = item.normalized_text();
        if !text.is_empty() && !items.contains(&text) {
            items.push(text);
        }
    }
    items
}

/// The first list among `element`'s following siblings, stopping at the next heading.
fn list_after<'a>(element: &Element<'a>) -> Option<Element<'a>> {
    for sibling in element.following_siblings() {
        if sibling.is_heading() {
            return None;
        }
        if sibling.is_list() {
            return Some(sibling);
        }
        if let Ok(nested) = sibling.select("h1, h2, h3, h4, h5, h6, ul, ol")
            && let Some(first) = nested.into_iter().next()
        {
            return if first.is_list() { Some(first) } else { None };
        }
    }
    None
}

/// The list associated with a heading: a following sibling list, or one that
/// follows a wrapper of the heading up to [`MAX_CLIMB`] levels up.
fn associated_list<'a>(heading: &Element<'a>) -> Option<Element<'a>> {
    if let Some(list) = list_after(heading) {
        return Some(list);
    }

    let mut current = heading.clone();
    for _ in 0..MAX_CLIMB {
        current = current.parent()?;
        if matches!(current.tag_name().as_str(), "body" | "html") {
            return None;
        }
        if let Some(list) = list_after(&current) {
            return Some(list);
        }
    }
    None
}

/// Lists under headings containing any of `keywords` (case-insensitive).
///
/// Lists with fewer than `min_items` items, lists inside navigation and
/// lists made mostly of menu vocabulary are skipped.
pub fn find_section_lists(markup: &str, keywords: &[String], min_items: usize) -> Vec<SectionList> {
    let Ok(doc) = Document::parse(markup) else {
        return Vec::new();
    };
    let Ok(headings) = doc.select("h1, h2, h3, h4, h5, h6") else {
        return Vec::new();
    };

    let mut sections = Vec::new();
    for heading in headings {
        let title = heading.normalized_text();
        let lower = title.to_lowercase();
        if !keywords.iter().any(|keyword| lower.contains(&keyword.to_lowercase())) {
            continue;
        }

        let Some(list) = associated_list(&heading) else {
            continue;
        };

        if in_navigation(&heading) || in_navigation(&list) {
            tracing::trace!(heading = %title, "skipping list inside navigation");
            continue;
        }

        let items = list_items(&list);
        if items.len() < min_items || looks_like_menu(&items) {
            continue;
        }

        sections.push(SectionList { heading: title, items });
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        vec!["program".to_string()]
    }

    #[test]
    fn test_sibling_list() {
        let html = r#"<h2>Our Programs</h2><p>Intro</p><ul><li>Education</li><li>Health</li><li>Livelihood</li></ul>"#;
        let sections = find_section_lists(html, &keywords(), 3);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].items, vec!["Education", "Health", "Livelihood"]);
    }

    #[test]
    fn test_list_after_wrapped_heading() {
        let html = r#"
            <section>
              <div class="title"><h3>Key Programmes</h3></div>
              <div class="grid"><ul><li>Water</li><li>Sanitation</li><li>Hygiene</li></ul></div>
            </section>"#;
        let sections = find_section_lists(html, &keywords(), 3);
        assert_eq!(sections[0].items, vec!["Water", "Sanitation", "Hygiene"]);
    }

    #[test]
    fn test_stops_at_next_heading() {
        let html = r#"<h2>Programs</h2><p>Coming soon</p><h2>Partners</h2><ul><li>A</li><li>B</li><li>C</li></ul>"#;
        assert!(find_section_lists(html, &keywords(), 3).is_empty());
    }

    #[test]
    fn test_navigation_excluded_structurally() {
        let html = r#"
            <nav><h2>Programs</h2><ul><li>Education</li><li>Health</li><li>Women</li></ul></nav>
            <div class="main-menu"><h2>Programs</h2><ul><li>Education</li><li>Health</li><li>Women</li></ul></div>
            <div role="navigation"><h4>Programs</h4><ol><li>A</li><li>B</li><li>C</li></ol></div>"#;
        assert!(find_section_lists(html, &keywords(), 3).is_empty());
    }

    #[test]
    fn test_menu_vocabulary_rejected() {
        let html = r#"<h2>Programs</h2><ul><li>Home</li><li>About Us</li><li>Contact</li><li>Health</li></ul>"#;
        assert!(find_section_lists(html, &keywords(), 3).is_empty());
    }

    #[test]
    fn test_min_items() {
        let html = r#"<h2>Programs</h2><ul><li>Education</li><li>Health</li></ul>"#;
        assert!(find_section_lists(html, &keywords(), 3).is_empty());
        assert_eq!(find_section_lists(html, &keywords(), 2).len(), 1);
    }
}
