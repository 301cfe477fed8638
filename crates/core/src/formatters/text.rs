use crate::evidence::FieldKind;
use crate::record::OrganizationRecord;

/// Configuration for plain text output
#[derive(Debug, Clone, Default)]
pub struct TextConfig {
    /// Append where each resolved value came from
    pub show_provenance: bool,
}

/// Plain text formatter for organization records
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, record: &OrganizationRecord) -> String {
        convert_to_text(record, &self.config)
    }
}

fn label(field: FieldKind) -> &'static str {
    match field {
        FieldKind::Name => "Name",
        FieldKind::YearFounded => "Year founded",
        FieldKind::FieldsOfWork => "Fields of work",
        FieldKind::OperationalAreas => "Operational areas",
        FieldKind::Email => "Email",
        FieldKind::Phone => "Phone",
        FieldKind::Address => "Address",
        FieldKind::WebsiteUrl => "Website",
    }
}

/// Render a record as an aligned, human-readable summary
pub fn convert_to_text(record: &OrganizationRecord, config: &TextConfig) -> String {
    let title = record.ngo_name.clone().unwrap_or_else(|| record.website_url.clone());
    let mut output = format!("{}\n{}\n", title, "=".repeat(title.chars().count()));

    let fields = std::iter::once(FieldKind::WebsiteUrl).chain(FieldKind::RESOLVABLE);
    for field in fields {
        let value = match field {
            FieldKind::Email => record.contact_info.email.to_string(),
            FieldKind::Phone => record.contact_info.phone.to_string(),
            FieldKind::Address => record.contact_info.address.to_string(),
            other => record.display_value(other).unwrap_or_else(|| "-".to_string()),
        };

        output.push_str(&format!("{:<18} {}", format!("{}:", label(field)), value));
        if config.show_provenance
            && let Some(provenance) = record.provenance.get(&field)
        {
            output.push_str(&format!("  [{}]", provenance));
        }
        output.push('\n');
    }

    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::SourceKind;
    use crate::record::{ContactField, Provenance};
    use url::Url;

    fn record() -> OrganizationRecord {
        let mut record = OrganizationRecord::unresolved("https://asha.org");
        record.ngo_name = Some("Asha Trust".to_string());
        record.year_founded = Some("1994".to_string());
        record.fields_of_work = Some(vec!["Education".to_string(), "Health".to_string()]);
        record.contact_info.phone = ContactField::CheckManually;
        record.provenance.insert(
            FieldKind::YearFounded,
            Provenance::tier(SourceKind::StructuredData, "structured_year", Url::parse("https://asha.org/").unwrap()),
        );
        record
    }

    #[test]
    fn test_convert_to_text() {
        let text = convert_to_text(&record(), &TextConfig::default());
        assert!(text.starts_with("Asha Trust\n=========="));
        assert!(text.contains("Year founded:      1994"));
        assert!(text.contains("Fields of work:    Education; Health"));
        assert!(text.contains("Operational areas: -"));
        assert!(text.contains("Phone:             not found automatically, check manually"));
        assert!(text.contains("Email:             not found"));
        assert!(!text.contains("structured_year"));
    }

    #[test]
    fn test_provenance_shown_on_request() {
        let text = convert_to_text(&record(), &TextConfig { show_provenance: true });
        assert!(text.contains("1994  [structured data via structured_year (https://asha.org/)]"));
    }

    #[test]
    fn test_unnamed_record_uses_url_as_title() {
        let text = convert_to_text(&OrganizationRecord::unresolved("https://b.org"), &TextConfig::default());
        assert!(text.starts_with("https://b.org\n============="));
    }
}
