//! Founding year.

use regex::Regex;

use super::{FieldExtractor, Matcher, MatcherChain, Resolution, rejected};
use crate::evidence::{EvidenceFragment, FieldKind};
use crate::pipeline::PipelineConfig;
use crate::{NgoscopeError, Result};

const ANCHOR_PATTERN: &str = r"(?i)\b(?:year\s+founded|founded|established|estd\.?|since|started|incorporated|registered)\b\s*:?";
const PROXIMITY_PATTERN: &str = r"(?i)\b(?:founded|founding|established|since|start)";
const YEAR_PATTERN: &str = r"\b\d{4}\b";

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| NgoscopeError::ConfigError(e.to_string()))
}

/// Plausible range check shared by every year matcher.
#[derive(Debug, Clone, Copy)]
struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    fn check(&self, year: i32) -> Result<()> {
        if (self.min..=self.max).contains(&year) {
            Ok(())
        } else {
            Err(rejected(FieldKind::YearFounded, format!("{} outside {}..={}", year, self.min, self.max)))
        }
    }
}

/// Byte offset `chars` characters past `start`, clamped to the end of `text`.
fn advance(text: &str, start: usize, chars: usize) -> usize {
    text[start..].char_indices().nth(chars).map_or(text.len(), |(i, _)| start + i)
}

/// Byte offset `chars` characters before `end`, clamped to the start of `text`.
fn retreat(text: &str, end: usize, chars: usize) -> usize {
    if chars == 0 {
        return end;
    }
    text[..end].char_indices().rev().nth(chars - 1).map_or(0, |(i, _)| i)
}

/// `foundingDate` from structured metadata; its first 4-digit run.
pub struct StructuredYear {
    range: YearRange,
    year: Regex,
}

impl Matcher<i32> for StructuredYear {
    fn name(&self) -> &'static str {
        "structured_year"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<i32> {
        if !fragment.hints(FieldKind::YearFounded) {
            return Vec::new();
        }
        self.year.find(&fragment.raw_text).and_then(|m| m.as_str().parse().ok()).into_iter().collect()
    }

    fn validate(&self, value: &i32) -> Result<()> {
        self.range.check(*value)
    }
}

/// A 4-digit year within a bounded window after a founding keyword
/// ("founded in 1994", "since 2001", "Estd. 1987").
pub struct AnchoredYear {
    range: YearRange,
    window: usize,
    anchor: Regex,
    year: Regex,
}

impl Matcher<i32> for AnchoredYear {
    fn name(&self) -> &'static str {
        "anchored_year"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<i32> {
        let text = &fragment.raw_text;
        self.anchor
            .find_iter(text)
            .filter_map(|anchor| {
                let start = anchor.end();
                let end = advance(text, start, self.window);
                self.year
                    .find_iter(&text[start..end])
                    .find(|m| !text[start + m.end()..].starts_with(|c: char| c.is_ascii_digit()))
                    .and_then(|m| m.as_str().parse().ok())
            })
            .collect()
    }

    fn validate(&self, value: &i32) -> Result<()> {
        self.range.check(*value)
    }
}

/// Any plausible 4-digit number within a bounded distance of a founding keyword.
pub struct ProximityYear {
    range: YearRange,
    proximity: usize,
    keyword: Regex,
    year: Regex,
}

impl Matcher<i32> for ProximityYear {
    fn name(&self) -> &'static str {
        "proximity_year"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<i32> {
        let text = &fragment.raw_text;
        let keywords: Vec<(usize, usize)> = self.keyword.find_iter(text).map(|m| (m.start(), m.end())).collect();
        if keywords.is_empty() {
            return Vec::new();
        }

        self.year
            .find_iter(text)
            .filter(|year| {
                let from = retreat(text, year.start(), self.proximity);
                let to = advance(text, year.end(), self.proximity);
                keywords.iter().any(|&(start, end)| start < to && end > from)
            })
            .filter_map(|year| year.as_str().parse::<i32>().ok())
            .filter(|year| self.range.check(*year).is_ok())
            .collect()
    }

    fn validate(&self, value: &i32) -> Result<()> {
        self.range.check(*value)
    }
}

/// Resolves `year_founded`: structured date, anchored phrase, keyword proximity.
pub struct YearExtractor {
    chain: MatcherChain<i32>,
    range: YearRange,
    year: Regex,
}

impl YearExtractor {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        if config.min_year > config.max_year {
            return Err(NgoscopeError::ConfigError(format!(
                "min_year {} is after max_year {}",
                config.min_year, config.max_year
            )));
        }

        let range = YearRange { min: config.min_year, max: config.max_year };
        let chain = MatcherChain::new(FieldKind::YearFounded)
            .with(StructuredYear { range, year: compile(YEAR_PATTERN)? })
            .with(AnchoredYear {
                range,
                window: config.year_window,
                anchor: compile(ANCHOR_PATTERN)?,
                year: compile(YEAR_PATTERN)?,
            })
            .with(ProximityYear {
                range,
                proximity: config.year_proximity,
                keyword: compile(PROXIMITY_PATTERN)?,
                year: compile(YEAR_PATTERN)?,
            });

        Ok(Self { chain, range, year: compile(YEAR_PATTERN)? })
    }
}

impl FieldExtractor for YearExtractor {
    type Output = i32;

    fn field(&self) -> FieldKind {
        FieldKind::YearFounded
    }

    fn resolve(&self, fragments: &[&EvidenceFragment]) -> Resolution<i32> {
        self.chain.resolve(fragments)
    }

    fn from_selection(&self, texts: &[String]) -> Option<i32> {
        texts
            .iter()
            .flat_map(|text| self.year.find_iter(text).filter_map(|m| m.as_str().parse::<i32>().ok()))
            .find(|year| self.range.check(*year).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::SourceKind;
    use rstest::rstest;
    use url::Url;

    fn extractor() -> YearExtractor {
        YearExtractor::new(&PipelineConfig::builder().max_year(2026).build()).unwrap()
    }

    fn text(raw: &str) -> EvidenceFragment {
        EvidenceFragment::text(SourceKind::PageText, raw, Url::parse("https://example.org/").unwrap())
    }

    #[rstest]
    #[case("We were founded in 1994 by teachers.", Some(1994), Some("anchored_year"))]
    #[case("Serving Pune since 2001", Some(2001), Some("anchored_year"))]
    #[case("ESTD. 1987", Some(1987), Some("anchored_year"))]
    #[case("Year founded: 2010", Some(2010), Some("anchored_year"))]
    #[case("Registered under the Societies Act in 1999", Some(1999), Some("anchored_year"))]
    #[case("In 1972 a group of doctors decided to start a free clinic.", Some(1972), Some("proximity_year"))]
    #[case("Founded in 19", None, None)]
    #[case("Call 1800 123 4567 today", None, None)]
    #[case("Founded in 1492 according to legend", None, None)]
    #[case("Our 2023 report is out.", None, None)]
    fn test_year_matchers(#[case] raw: &str, #[case] expected: Option<i32>, #[case] matcher: Option<&str>) {
        let fragment = text(raw);
        let resolution = extractor().resolve(&[&fragment]);
        assert_eq!(resolution.value().copied(), expected);
        assert_eq!(resolution.matcher(), matcher);
    }

    #[test]
    fn test_structured_date() {
        let origin = Url::parse("https://example.org/").unwrap();
        let fragment = EvidenceFragment::structured(FieldKind::YearFounded, "1994-01-01", origin);
        let resolution = extractor().resolve(&[&fragment]);
        assert_eq!(resolution.value(), Some(&1994));
        assert_eq!(resolution.matcher(), Some("structured_year"));
    }

    #[test]
    fn test_anchor_window_is_bounded() {
        let far = format!("Founded {} 1994", "x".repeat(60));
        let fragment = text(&far);
        let resolution = extractor().resolve(&[&fragment]);
        assert_eq!(resolution.matcher(), Some("proximity_year"));
    }

    #[test]
    fn test_window_edge_does_not_split_numbers() {
        let config = PipelineConfig::builder().max_year(2026).year_window(7).build();
        let fragment = text("Founded in 19945 volunteers");
        let resolution = YearExtractor::new(&config).unwrap().resolve(&[&fragment]);
        assert_eq!(resolution, Resolution::Unresolved);
    }

    #[test]
    fn test_future_year_rejected() {
        let fragment = text("Established 2091");
        assert_eq!(extractor().resolve(&[&fragment]), Resolution::Unresolved);
    }

    #[test]
    fn test_from_selection() {
        let texts = vec!["Since".to_string(), "Est. 1921 (centenary 2021)".to_string()];
        assert_eq!(extractor().from_selection(&texts), Some(1921));
        assert_eq!(extractor().from_selection(&["19".to_string()]), None);
    }

    #[test]
    fn test_invalid_range_is_config_error() {
        let config = PipelineConfig::builder().min_year(2000).max_year(1990).build();
        assert!(matches!(YearExtractor::new(&config), Err(NgoscopeError::ConfigError(_))));
    }

    #[test]
    fn test_char_offsets_are_boundary_safe() {
        let text = "स्थापना founded — १९९४ 1994";
        assert!(text.is_char_boundary(advance(text, 0, 5)));
        assert!(text.is_char_boundary(retreat(text, text.len(), 7)));
        assert_eq!(advance(text, 0, 1000), text.len());
        assert_eq!(retreat(text, 3, 1000), 0);
    }
}
