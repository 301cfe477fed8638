use std::collections::BTreeMap;

use crate::evidence::FieldKind;
use crate::parse::parse_selector;
use crate::{NgoscopeError, Result};

/// A single override line: a CSS selector for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub field: FieldKind,
    pub selector: String,
}

/// Overrides for one domain, at most one selector per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteOverrides {
    selectors: BTreeMap<FieldKind, String>,
}

impl SiteOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directive; a later directive for the same field replaces the earlier one.
    pub fn add_directive(&mut self, directive: Directive) {
        self.selectors.insert(directive.field, directive.selector);
    }

    pub fn set(&mut self, field: FieldKind, selector: impl Into<String>) {
        self.selectors.insert(field, selector.into());
    }

    pub fn get(&self, field: FieldKind) -> Option<&str> {
        self.selectors.get(&field).map(String::as_str)
    }

    /// Fill fields this set has no selector for from `other`.
    ///
    /// Files are merged most specific first, so the more specific selector wins.
    pub fn merge(&mut self, other: &SiteOverrides) {
        for (field, selector) in &other.selectors {
            self.selectors.entry(*field).or_insert_with(|| selector.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKind, &str)> {
        self.selectors.iter().map(|(field, selector)| (*field, selector.as_str()))
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Render in the line format [`parse_directive`] reads.
    pub fn to_directive_string(&self) -> String {
        self.iter().map(|(field, selector)| format!("{}: {}\n", directive_key(field), selector)).collect()
    }
}

/// Key used for `field` in override files.
pub fn directive_key(field: FieldKind) -> &'static str {
    match field {
        FieldKind::Email => "email",
        FieldKind::Phone => "phone",
        FieldKind::Address => "address",
        other => other.key(),
    }
}

/// Parse a `field: selector` line.
pub fn parse_directive(line: &str) -> Result<Directive> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Err(NgoscopeError::OverrideError("Empty or comment line".to_string()));
    }

    let (key, selector) = line
        .split_once(':')
        .ok_or_else(|| NgoscopeError::OverrideError(format!("Invalid directive format: {}", line)))?;

    let field: FieldKind =
        key.parse().map_err(|_| NgoscopeError::OverrideError(format!("Unknown field: {}", key.trim())))?;
    if field == FieldKind::WebsiteUrl {
        return Err(NgoscopeError::OverrideError("website_url cannot be overridden".to_string()));
    }

    let selector = selector.trim();
    if selector.is_empty() {
        return Err(NgoscopeError::OverrideError(format!("Missing selector for {}", key.trim())));
    }
    parse_selector(selector).map_err(|e| NgoscopeError::OverrideError(format!("{}: {}", selector, e)))?;

    Ok(Directive { field, selector: selector.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directive_keeps_pseudo_class_colons() {
        let directive = parse_directive("phone: footer li:nth-child(2) span").unwrap();
        assert_eq!(directive.field, FieldKind::Phone);
        assert_eq!(directive.selector, "footer li:nth-child(2) span");
    }

    #[test]
    fn test_parse_directive_aliases() {
        assert_eq!(parse_directive("contact_info.email: .mail").unwrap().field, FieldKind::Email);
        assert_eq!(parse_directive("ngo_name: h1.brand").unwrap().field, FieldKind::Name);
    }

    #[test]
    fn test_parse_directive_errors() {
        assert!(parse_directive("# comment").is_err());
        assert!(parse_directive("no separator").is_err());
        assert!(parse_directive("budget: .x").is_err());
        assert!(parse_directive("website_url: a").is_err());
        assert!(parse_directive("email:   ").is_err());
        assert!(parse_directive("email: div[").is_err());
    }

    #[test]
    fn test_merge_prefers_existing() {
        let mut specific = SiteOverrides::new();
        specific.set(FieldKind::Email, ".contact a");
        let mut parent = SiteOverrides::new();
        parent.set(FieldKind::Email, "footer a");
        parent.set(FieldKind::Phone, ".tel");

        specific.merge(&parent);
        assert_eq!(specific.get(FieldKind::Email), Some(".contact a"));
        assert_eq!(specific.get(FieldKind::Phone), Some(".tel"));
        assert_eq!(specific.len(), 2);
    }

    #[test]
    fn test_directive_string_round_trips_through_parser() {
        let mut overrides = SiteOverrides::new();
        overrides.set(FieldKind::Address, "address");
        overrides.set(FieldKind::YearFounded, "#since");
        assert_eq!(overrides.to_directive_string(), "year_founded: #since\naddress: address\n");
    }
}
