//! Structured metadata source.
//!
//! Reads schema.org JSON-LD blocks and maps the organization keys it
//! recognizes to field-tagged fragments.

use serde_json::Value;
use url::Url;

use crate::NgoscopeError;
use crate::evidence::{EvidenceFragment, FieldKind};
use crate::parse::{Document, collapse_whitespace};

/// Extract field-tagged fragments from every organization JSON-LD block.
///
/// Malformed blocks are logged and skipped; a page without metadata yields
/// an empty sequence.
pub fn extract(html: &str, origin: &Url) -> Vec<EvidenceFragment> {
    let Ok(doc) = Document::parse(html) else {
        return Vec::new();
    };
    let Ok(scripts) = doc.select("script") else {
        return Vec::new();
    };

    let mut fragments = Vec::new();
    for script in scripts {
        let is_json_ld = script
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"));
        if !is_json_ld {
            continue;
        }

        match serde_json::from_str::<Value>(script.text().trim()) {
            Ok(value) => {
                for node in organization_nodes(&value) {
                    map_organization(node, origin, &mut fragments);
                }
            }
            Err(e) => {
                let err = NgoscopeError::DecodeError(format!("JSON-LD block: {}", e));
                tracing::debug!(%origin, error = %err, "skipping malformed structured metadata");
            }
        }
    }

    fragments
}

/// Organization-typed nodes, unwrapping top-level arrays and `@graph` containers.
fn organization_nodes(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().flat_map(organization_nodes).collect(),
        Value::Object(map) => {
            let mut nodes = Vec::new();
            if is_organization(value) {
                nodes.push(value);
            }
            if let Some(graph) = map.get("@graph") {
                nodes.extend(organization_nodes(graph));
            }
            nodes
        }
        _ => Vec::new(),
    }
}

fn is_organization(node: &Value) -> bool {
    let accepts = |t: &str| t.contains("Organization") || matches!(t, "NGO" | "Nonprofit" | "NonProfit");

    match node.get("@type") {
        Some(Value::String(t)) => accepts(t),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(accepts),
        _ => false,
    }
}

fn map_organization(node: &Value, origin: &Url, out: &mut Vec<EvidenceFragment>) {
    let mut push = |field: FieldKind, text: String| {
        let text = text.trim().to_string();
        if !text.is_empty() {
            out.push(EvidenceFragment::structured(field, text, origin.clone()));
        }
    };

    if let Some(name) = node.get("name").and_then(Value::as_str) {
        push(FieldKind::Name, collapse_whitespace(name));
    }

    if let Some(date) = node.get("foundingDate").and_then(scalar_text) {
        push(FieldKind::YearFounded, date);
    }

    if let Some(areas) = node.get("areaServed") {
        push(FieldKind::OperationalAreas, place_names(areas).join("\n"));
    }

    if let Some(topics) = node.get("knowsAbout") {
        push(FieldKind::FieldsOfWork, place_names(topics).join("\n"));
    }

    if let Some(email) = node.get("email").and_then(Value::as_str) {
        push(FieldKind::Email, strip_scheme(email, "mailto:"));
    }

    if let Some(phone) = node.get("telephone").and_then(scalar_text) {
        push(FieldKind::Phone, strip_scheme(&phone, "tel:"));
    }

    for point in each(node.get("contactPoint")) {
        if let Some(email) = point.get("email").and_then(Value::as_str) {
            push(FieldKind::Email, strip_scheme(email, "mailto:"));
        }
        if let Some(phone) = point.get("telephone").and_then(scalar_text) {
            push(FieldKind::Phone, strip_scheme(&phone, "tel:"));
        }
    }

    for address in each(node.get("address")) {
        if let Some(text) = address_text(address) {
            push(FieldKind::Address, text);
        }
    }
}

/// Iterate a value that may be a single item or an array of items.
fn each(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
        None => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Names from a string, a `Place`-like object or an array of either.
fn place_names(value: &Value) -> Vec<String> {
    let names: Vec<String> = match value {
        Value::String(s) => vec![collapse_whitespace(s)],
        Value::Object(map) => map.get("name").and_then(Value::as_str).map(collapse_whitespace).into_iter().collect(),
        Value::Array(items) => items.iter().flat_map(place_names).collect(),
        _ => Vec::new(),
    };

    names.into_iter().filter(|name| !name.is_empty()).collect()
}

fn address_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(collapse_whitespace(s)),
        Value::Object(map) => {
            let parts: Vec<String> =
                ["streetAddress", "addressLocality", "addressRegion", "postalCode", "addressCountry"]
                    .iter()
                    .filter_map(|key| map.get(*key).and_then(scalar_text))
                    .map(|part| collapse_whitespace(&part))
                    .filter(|part| !part.is_empty())
                    .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

fn strip_scheme(value: &str, scheme: &str) -> String {
    let value = value.trim();
    match value.get(..scheme.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(scheme) => value[scheme.len()..].to_string(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://example.org/").unwrap()
    }

    fn page(json: &str) -> String {
        format!(r#"<html><head><script type="application/ld+json">{}</script></head><body></body></html>"#, json)
    }

    fn texts(fragments: &[EvidenceFragment], field: FieldKind) -> Vec<String> {
        fragments.iter().filter(|f| f.hints(field)).map(|f| f.raw_text.clone()).collect()
    }

    #[test]
    fn test_founding_date_is_tagged() {
        let fragments = extract(&page(r#"{"@type":"NGO","foundingDate":"1994-01-01"}"#), &origin());
        assert_eq!(texts(&fragments, FieldKind::YearFounded), vec!["1994-01-01"]);
    }

    #[test]
    fn test_contact_points_and_address() {
        let json = r#"{
            "@context": "https://schema.org",
            "@type": ["Organization", "NGO"],
            "name": "Asha  Trust",
            "email": "mailto:info@asha.org",
            "contactPoint": [
                {"@type": "ContactPoint", "telephone": "+91-22-2345-6789"},
                {"@type": "ContactPoint", "email": "help@asha.org"}
            ],
            "address": {
                "@type": "PostalAddress",
                "streetAddress": "12 MG Road",
                "addressLocality": "Pune",
                "postalCode": "411001"
            },
            "areaServed": [{"@type": "State", "name": "Maharashtra"}, "Goa"]
        }"#;
        let fragments = extract(&page(json), &origin());

        assert_eq!(texts(&fragments, FieldKind::Name), vec!["Asha Trust"]);
        assert_eq!(texts(&fragments, FieldKind::Email), vec!["info@asha.org", "help@asha.org"]);
        assert_eq!(texts(&fragments, FieldKind::Phone), vec!["+91-22-2345-6789"]);
        assert_eq!(texts(&fragments, FieldKind::Address), vec!["12 MG Road, Pune, 411001"]);
        assert_eq!(texts(&fragments, FieldKind::OperationalAreas), vec!["Maharashtra\nGoa"]);
    }

    #[test]
    fn test_graph_container_and_foreign_types() {
        let json = r#"{"@graph": [
            {"@type": "WebPage", "name": "Home"},
            {"@type": "NGO", "name": "Seva"}
        ]}"#;
        let fragments = extract(&page(json), &origin());
        assert_eq!(texts(&fragments, FieldKind::Name), vec!["Seva"]);
    }

    #[test]
    fn test_malformed_block_yields_nothing() {
        let fragments = extract(&page(r#"{"@type": "NGO", "name": "#), &origin());
        assert!(fragments.is_empty());
        assert!(extract("<html><body>no metadata</body></html>", &origin()).is_empty());
    }
}
