use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::overrides::directives::{SiteOverrides, parse_directive};
use crate::{NgoscopeError, Result};

/// Override file parser
#[derive(Debug)]
pub struct OverrideParser;

impl OverrideParser {
    /// Parse a single override file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<SiteOverrides> {
        let file = std::fs::File::open(&path).map_err(|e| {
            NgoscopeError::OverrideError(format!("Cannot open file {}: {}", path.as_ref().display(), e))
        })?;

        Self::parse_reader(BufReader::new(file))
    }

    /// Parse overrides from a reader
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<SiteOverrides> {
        let mut overrides = SiteOverrides::new();

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line =
                line.map_err(|e| NgoscopeError::OverrideError(format!("Read error at line {}: {}", line_number, e)))?;
            Self::parse_line(&mut overrides, &line, line_number)?;
        }

        Ok(overrides)
    }

    /// Parse overrides from a string
    pub fn parse_string(content: &str) -> Result<SiteOverrides> {
        let mut overrides = SiteOverrides::new();

        for (index, line) in content.lines().enumerate() {
            Self::parse_line(&mut overrides, line, index + 1)?;
        }

        Ok(overrides)
    }

    fn parse_line(overrides: &mut SiteOverrides, line: &str, line_number: usize) -> Result<()> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let directive = parse_directive(line)
            .map_err(|e| NgoscopeError::OverrideError(format!("Parse error at line {}: {}", line_number, e)))?;
        overrides.add_directive(directive);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::FieldKind;
    use std::io::Cursor;

    #[test]
    fn test_parse_string_basic() {
        let content = r#"
# asha.org, set by hand
ngo_name: header .brand
email: .footer a[href^="mailto:"]
phone: #contact .tel
"#;

        let overrides = OverrideParser::parse_string(content).unwrap();
        assert_eq!(overrides.len(), 3);
        assert_eq!(overrides.get(FieldKind::Name), Some("header .brand"));
        assert_eq!(overrides.get(FieldKind::Email), Some(r#".footer a[href^="mailto:"]"#));
    }

    #[test]
    fn test_later_line_wins() {
        let overrides = OverrideParser::parse_string("phone: .a\nphone: .b\n").unwrap();
        assert_eq!(overrides.get(FieldKind::Phone), Some(".b"));
    }

    #[test]
    fn test_error_reports_line_number() {
        let err = OverrideParser::parse_string("email: .mail\n\nbudget: .money\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_parse_reader() {
        let reader = Cursor::new("address: address\n");
        let overrides = OverrideParser::parse_reader(reader).unwrap();
        assert_eq!(overrides.get(FieldKind::Address), Some("address"));
    }
}
