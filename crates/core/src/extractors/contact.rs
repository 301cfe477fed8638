//! Contact details: email, phone and postal address.

use std::sync::Arc;

use regex::Regex;

use super::{FieldExtractor, Matcher, MatcherChain, Resolution, rejected};
use crate::evidence::{EvidenceFragment, FieldKind};
use crate::locale::CompiledLocale;
use crate::parse::{Document, Element, collapse_whitespace};
use crate::{NgoscopeError, Result};

const EMAIL_PATTERN: &str = r"(?i)\b[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}\b";
const EMAIL_EXACT: &str = r"(?i)^[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}$";
const REGION_PROMPT: &str =
    r"(?i)\bselect\s+(?:your\s+|a\s+|the\s+)?(?:state|region|city|location|branch|office|district)\b";
const ADDRESS_LABEL: &str = r"(?i)^(?:registered\s+office|head\s+office|office|address|reach\s+us|visit\s+us)\s*[:\-]\s*";

/// File extensions that show up in `name@2x.png`-style asset names.
const ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".css", ".js"];

const CONTACT_CUE: &str =
    r"(?i)\b(?:contact|helpline|get\s+in\s+touch|reach\s+us|call\s+us|our\s+offices?|find\s+us|locate\s+us)\b";

/// Words that mark a form control as a region or branch picker.
const REGION_WORDS: &[&str] = &[
    "state", "states", "region", "regions", "city", "cities", "location", "locations", "branch", "branches", "office",
    "offices", "district", "districts",
];

/// Containers a region picker or prompt is judged within.
const SECTION_TAGS: &[&str] = &["section", "article", "aside", "footer", "header", "main", "body"];

/// Elements whose text may hold a "Select your state" prompt.
const PROMPT_HOLDERS: &str = "p, span, label, li, td, strong, em, small, h1, h2, h3, h4, h5, h6";

const MAX_ADDRESS_LEN: usize = 200;
const MAX_STRUCTURED_ADDRESS_LEN: usize = 300;

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| NgoscopeError::ConfigError(e.to_string()))
}

/// Targets of anchors whose `href` uses `scheme`, with the scheme and any query removed.
fn link_targets(fragment: &EvidenceFragment, scheme: &str) -> Vec<String> {
    let Some(markup) = fragment.markup.as_deref() else {
        return Vec::new();
    };
    let Ok(doc) = Document::parse(markup) else {
        return Vec::new();
    };
    let Ok(anchors) = doc.select("a[href]") else {
        return Vec::new();
    };

    anchors
        .iter()
        .filter_map(|anchor| {
            let href = anchor.attr("href")?.trim();
            let prefix = href.get(..scheme.len())?;
            if !prefix.eq_ignore_ascii_case(scheme) {
                return None;
            }
            let target = href[scheme.len()..].split('?').next().unwrap_or_default().trim();
            (!target.is_empty()).then(|| target.to_string())
        })
        .collect()
}

/// Email address checks shared by every email matcher.
struct EmailShape {
    exact: Regex,
}

impl EmailShape {
    fn check(&self, value: &str) -> Result<()> {
        if !self.exact.is_match(value) {
            return Err(rejected(FieldKind::Email, format!("{:?} is not an address", value)));
        }
        let lower = value.to_lowercase();
        if ASSET_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
            return Err(rejected(FieldKind::Email, format!("{:?} looks like an asset file", value)));
        }
        Ok(())
    }
}

/// `email` / `contactPoint.email` from structured metadata.
pub struct StructuredEmail {
    shape: Arc<EmailShape>,
}

impl Matcher<String> for StructuredEmail {
    fn name(&self) -> &'static str {
        "structured_email"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<String> {
        if fragment.hints(FieldKind::Email) { vec![fragment.raw_text.trim().to_string()] } else { Vec::new() }
    }

    fn validate(&self, value: &String) -> Result<()> {
        self.shape.check(value)
    }
}

/// `mailto:` link targets.
pub struct MailtoLink {
    shape: Arc<EmailShape>,
}

impl Matcher<String> for MailtoLink {
    fn name(&self) -> &'static str {
        "mailto_link"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<String> {
        link_targets(fragment, "mailto:")
    }

    fn validate(&self, value: &String) -> Result<()> {
        self.shape.check(value)
    }
}

/// Addresses anywhere in the fragment text.
pub struct EmailPattern {
    shape: Arc<EmailShape>,
    pattern: Regex,
}

impl Matcher<String> for EmailPattern {
    fn name(&self) -> &'static str {
        "email_pattern"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<String> {
        self.pattern.find_iter(&fragment.raw_text).map(|m| m.as_str().to_string()).collect()
    }

    fn validate(&self, value: &String) -> Result<()> {
        self.shape.check(value)
    }
}

/// Resolves `contact_info.email`: structured, `mailto:` links, text pattern.
pub struct EmailExtractor {
    chain: MatcherChain<String>,
    shape: Arc<EmailShape>,
    pattern: Regex,
}

impl EmailExtractor {
    pub fn new() -> Result<Self> {
        let shape = Arc::new(EmailShape { exact: compile(EMAIL_EXACT)? });
        let chain = MatcherChain::new(FieldKind::Email)
            .with(StructuredEmail { shape: shape.clone() })
            .with(MailtoLink { shape: shape.clone() })
            .with(EmailPattern { shape: shape.clone(), pattern: compile(EMAIL_PATTERN)? });
        Ok(Self { chain, shape, pattern: compile(EMAIL_PATTERN)? })
    }
}

impl FieldExtractor for EmailExtractor {
    type Output = String;

    fn field(&self) -> FieldKind {
        FieldKind::Email
    }

    fn resolve(&self, fragments: &[&EvidenceFragment]) -> Resolution<String> {
        self.chain.resolve(fragments)
    }

    fn from_selection(&self, texts: &[String]) -> Option<String> {
        texts
            .iter()
            .flat_map(|text| self.pattern.find_iter(text).map(|m| m.as_str().to_string()).collect::<Vec<_>>())
            .find(|candidate| self.shape.check(candidate).is_ok())
    }
}

/// A resolved phone value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phone {
    /// A number as written on the site, whitespace-collapsed.
    Number(String),
    /// The number is behind an interactive region selector and needs a human.
    CheckManually,
}

fn digit_count(value: &str) -> usize {
    value.chars().filter(char::is_ascii_digit).count()
}

fn check_phone(value: &Phone, locale: &CompiledLocale) -> Result<()> {
    match value {
        Phone::CheckManually => Ok(()),
        Phone::Number(number) => {
            let digits = digit_count(number);
            if locale.phone_digits.contains(&digits) {
                Ok(())
            } else {
                Err(rejected(
                    FieldKind::Phone,
                    format!("{:?} has {} digits, expected {:?}", number, digits, locale.phone_digits),
                ))
            }
        }
    }
}

fn tidy_number(raw: &str) -> String {
    collapse_whitespace(raw).trim_matches(|c: char| matches!(c, '-' | '.' | ',' | '/' | ':')).trim().to_string()
}

/// `telephone` / `contactPoint.telephone` from structured metadata.
pub struct StructuredPhone {
    locale: Arc<CompiledLocale>,
}

impl Matcher<Phone> for StructuredPhone {
    fn name(&self) -> &'static str {
        "structured_phone"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<Phone> {
        if fragment.hints(FieldKind::Phone) { vec![Phone::Number(tidy_number(&fragment.raw_text))] } else { Vec::new() }
    }

    fn validate(&self, value: &Phone) -> Result<()> {
        check_phone(value, &self.locale)
    }
}

/// `tel:` link targets.
pub struct TelLink {
    locale: Arc<CompiledLocale>,
}

impl Matcher<Phone> for TelLink {
    fn name(&self) -> &'static str {
        "tel_link"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<Phone> {
        link_targets(fragment, "tel:").iter().map(|target| Phone::Number(tidy_number(target))).collect()
    }

    fn validate(&self, value: &Phone) -> Result<()> {
        check_phone(value, &self.locale)
    }
}

/// A region or branch selector standing in for static contact details.
///
/// Fires on a `<select>` whose name, id, label or first option names a region
/// as a whole word (or whose options list at least two gazetteer places), or
/// on a "Select your state" prompt. Either must sit in a contact section, and
/// a number shown in that section wins over the selector.
pub struct InteractiveRegion {
    locale: Arc<CompiledLocale>,
    prompt: Regex,
    contact: Regex,
}

impl InteractiveRegion {
    fn names_region(text: &str) -> bool {
        text.split(|c: char| !c.is_alphanumeric())
            .any(|token| REGION_WORDS.iter().any(|word| token.eq_ignore_ascii_case(word)))
    }

    fn is_region_picker(&self, doc: &Document, select: &Element<'_>) -> bool {
        let mut descriptors = vec![
            select.attr("name").unwrap_or_default().to_string(),
            select.id_and_class(),
            select.attr("aria-label").unwrap_or_default().to_string(),
        ];
        if let Some(id) = select.attr("id")
            && let Ok(labels) = doc.select(&format!("label[for=\"{}\"]", id.replace('"', "")))
        {
            descriptors.extend(labels.iter().map(|label| label.normalized_text()));
        }

        let options: Vec<String> = select
            .select("option")
            .map(|options| options.iter().map(|o| o.normalized_text()).collect())
            .unwrap_or_default();

        let described = descriptors.iter().chain(options.iter().take(1)).any(|text| Self::names_region(text));
        let places = options.iter().filter(|o| !self.locale.gazetteer.matches_in(o).is_empty()).count();

        described || places >= 2
    }

    /// The nearest section-like container of `element`, falling back to `body`.
    fn section_of<'a>(element: &Element<'a>) -> Option<Element<'a>> {
        element.ancestors().find(|ancestor| {
            SECTION_TAGS.contains(&ancestor.tag_name().as_str())
                || ancestor.id_and_class().to_lowercase().contains("contact")
        })
    }

    fn is_contact_section(&self, section: &Element<'_>) -> bool {
        section.id_and_class().to_lowercase().contains("contact")
            || section
                .select("h1, h2, h3, h4, h5, h6, legend")
                .is_ok_and(|headings| headings.iter().any(|h| self.contact.is_match(&h.normalized_text())))
    }

    fn shows_number(&self, text: &str) -> bool {
        self.locale.phone_patterns.iter().any(|pattern| {
            pattern
                .find_iter(text)
                .any(|m| check_phone(&Phone::Number(tidy_number(m.as_str())), &self.locale).is_ok())
        })
    }

    /// Whether a region picker or prompt stands in for the number of a
    /// contact section that shows none itself.
    fn stands_in_for_phone(&self, markup: &str) -> bool {
        let Ok(doc) = Document::parse(markup) else {
            return false;
        };

        let pickers = doc
            .select("select")
            .unwrap_or_default()
            .into_iter()
            .filter(|select| self.is_region_picker(&doc, select))
            .filter_map(|select| Self::section_of(&select))
            .filter(|section| self.is_contact_section(section));

        let prompts = doc
            .select(PROMPT_HOLDERS)
            .unwrap_or_default()
            .into_iter()
            .filter(|holder| self.prompt.is_match(&holder.normalized_text()))
            .filter_map(|holder| {
                let section = Self::section_of(&holder)?;
                (self.contact.is_match(&holder.normalized_text()) || self.is_contact_section(&section))
                    .then_some(section)
            });

        pickers.chain(prompts).any(|section| !self.shows_number(&section.normalized_text()))
    }
}

impl Matcher<Phone> for InteractiveRegion {
    fn name(&self) -> &'static str {
        "interactive_region"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<Phone> {
        let stands_in = match fragment.markup.as_deref() {
            Some(markup) => self.stands_in_for_phone(markup),
            None => self.prompt.is_match(&fragment.raw_text) && !self.shows_number(&fragment.raw_text),
        };
        if stands_in { vec![Phone::CheckManually] } else { Vec::new() }
    }

    fn validate(&self, value: &Phone) -> Result<()> {
        check_phone(value, &self.locale)
    }
}

/// The locale's phone number patterns, tried in order.
pub struct LocalePhonePattern {
    locale: Arc<CompiledLocale>,
}

impl Matcher<Phone> for LocalePhonePattern {
    fn name(&self) -> &'static str {
        "locale_phone_pattern"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<Phone> {
        self.locale
            .phone_patterns
            .iter()
            .flat_map(|pattern| pattern.find_iter(&fragment.raw_text).map(|m| Phone::Number(tidy_number(m.as_str()))))
            .collect()
    }

    fn validate(&self, value: &Phone) -> Result<()> {
        check_phone(value, &self.locale)
    }
}

/// Resolves `contact_info.phone`: structured, `tel:` links, interactive
/// region selector, locale patterns.
pub struct PhoneExtractor {
    chain: MatcherChain<Phone>,
    locale: Arc<CompiledLocale>,
}

impl PhoneExtractor {
    pub fn new(locale: Arc<CompiledLocale>) -> Result<Self> {
        let chain = MatcherChain::new(FieldKind::Phone)
            .with(StructuredPhone { locale: locale.clone() })
            .with(TelLink { locale: locale.clone() })
            .with(InteractiveRegion {
                locale: locale.clone(),
                prompt: compile(REGION_PROMPT)?,
                contact: compile(CONTACT_CUE)?,
            })
            .with(LocalePhonePattern { locale: locale.clone() });
        Ok(Self { chain, locale })
    }
}

impl FieldExtractor for PhoneExtractor {
    type Output = Phone;

    fn field(&self) -> FieldKind {
        FieldKind::Phone
    }

    fn resolve(&self, fragments: &[&EvidenceFragment]) -> Resolution<Phone> {
        self.chain.resolve(fragments)
    }

    fn from_selection(&self, texts: &[String]) -> Option<Phone> {
        let from_patterns = texts.iter().flat_map(|text| {
            self.locale
                .phone_patterns
                .iter()
                .flat_map(|pattern| pattern.find_iter(text).map(|m| tidy_number(m.as_str())))
                .collect::<Vec<_>>()
        });
        let verbatim = texts.iter().map(|text| tidy_number(text));

        from_patterns
            .chain(verbatim)
            .map(Phone::Number)
            .find(|phone| check_phone(phone, &self.locale).is_ok())
    }
}

/// `address` from structured metadata, accepted as authored.
pub struct StructuredAddress;

impl Matcher<String> for StructuredAddress {
    fn name(&self) -> &'static str {
        "structured_address"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<String> {
        if fragment.hints(FieldKind::Address) { vec![collapse_whitespace(&fragment.raw_text)] } else { Vec::new() }
    }

    fn validate(&self, value: &String) -> Result<()> {
        if value.is_empty() || value.chars().count() > MAX_STRUCTURED_ADDRESS_LEN {
            Err(rejected(FieldKind::Address, "empty or oversized structured address"))
        } else {
            Ok(())
        }
    }
}

/// One to three consecutive lines holding both a street suffix and a postal
/// code, cut after the postal code.
pub struct AddressPattern {
    locale: Arc<CompiledLocale>,
    label: Regex,
}

impl AddressPattern {
    /// Trim a window to end at its first postal code and drop a leading label.
    fn shape(&self, window: &str) -> Option<String> {
        let postal = self.locale.postal_code.find(window)?;
        let cut = window[..postal.end()].trim_end_matches([',', ' ']);
        let cut = self.label.replace(cut.trim(), "");
        let cut = cut.trim_start_matches([',', ' ', ':']).trim();
        (!cut.is_empty()).then(|| cut.to_string())
    }
}

impl Matcher<String> for AddressPattern {
    fn name(&self) -> &'static str {
        "address_pattern"
    }

    fn candidates(&self, fragment: &EvidenceFragment) -> Vec<String> {
        let lines: Vec<&str> = fragment.raw_text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let mut candidates = Vec::new();

        for start in 0..lines.len() {
            let first = lines[start];
            if !self.locale.street_suffix.is_match(first) && !first.chars().any(|c| c.is_ascii_digit()) {
                continue;
            }

            for span in 1..=3 {
                let Some(window) = lines.get(start..start + span) else {
                    break;
                };
                let joined = window.join(", ");
                if self.locale.looks_like_address(&joined)
                    && let Some(candidate) = self.shape(&joined)
                {
                    candidates.push(candidate);
                    break;
                }
            }
        }

        candidates
    }

    fn validate(&self, value: &String) -> Result<()> {
        if !self.locale.looks_like_address(value) {
            return Err(rejected(FieldKind::Address, "needs a street suffix and a postal code"));
        }
        if value.chars().count() > MAX_ADDRESS_LEN {
            return Err(rejected(FieldKind::Address, "longer than an address"));
        }
        Ok(())
    }
}

/// Resolves `contact_info.address`.
pub struct AddressExtractor {
    chain: MatcherChain<String>,
    locale: Arc<CompiledLocale>,
}

impl AddressExtractor {
    pub fn new(locale: Arc<CompiledLocale>) -> Result<Self> {
        let chain = MatcherChain::new(FieldKind::Address)
            .with(StructuredAddress)
            .with(AddressPattern { locale: locale.clone(), label: compile(ADDRESS_LABEL)? });
        Ok(Self { chain, locale })
    }

    /// Whether `value` still reads as an address for the configured locale.
    pub fn looks_like_address(&self, value: &str) -> bool {
        self.locale.looks_like_address(value)
    }
}

impl FieldExtractor for AddressExtractor {
    type Output = String;

    fn field(&self) -> FieldKind {
        FieldKind::Address
    }

    fn resolve(&self, fragments: &[&EvidenceFragment]) -> Resolution<String> {
        self.chain.resolve(fragments)
    }

    fn from_selection(&self, texts: &[String]) -> Option<String> {
        let joined = texts.iter().map(|t| collapse_whitespace(t)).filter(|t| !t.is_empty()).collect::<Vec<_>>();
        let joined = joined.join(", ");
        (!joined.is_empty() && joined.chars().count() <= MAX_STRUCTURED_ADDRESS_LEN).then_some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::SourceKind;
    use crate::locale::Locale;
    use rstest::rstest;
    use url::Url;

    fn locale() -> Arc<CompiledLocale> {
        Arc::new(Locale::india().compile().unwrap())
    }

    fn page(text: &str, markup: &str) -> EvidenceFragment {
        EvidenceFragment::text(SourceKind::PageText, text, Url::parse("https://example.org/").unwrap())
            .with_markup(markup)
    }

    fn text(raw: &str) -> EvidenceFragment {
        EvidenceFragment::text(SourceKind::PageText, raw, Url::parse("https://example.org/").unwrap())
    }

    #[rstest]
    #[case("Write to info@asha.org today", Some("info@asha.org"))]
    #[case("logo@2x.png and team@asha.org", Some("team@asha.org"))]
    #[case("no address here @ all", None)]
    fn test_email_pattern(#[case] raw: &str, #[case] expected: Option<&str>) {
        let fragment = text(raw);
        let resolution = EmailExtractor::new().unwrap().resolve(&[&fragment]);
        assert_eq!(resolution.value().map(String::as_str), expected);
    }

    #[test]
    fn test_mailto_before_text() {
        let fragment = page(
            "Questions? careers@asha.org",
            r#"<a href="MAILTO:contact@asha.org?subject=Hi">Write to us</a>"#,
        );
        let resolution = EmailExtractor::new().unwrap().resolve(&[&fragment]);
        assert_eq!(resolution.value().map(String::as_str), Some("contact@asha.org"));
        assert_eq!(resolution.matcher(), Some("mailto_link"));
    }

    #[rstest]
    #[case("Call +91 98765 43210 now", "+91 98765 43210")]
    #[case("Phone: 022-24567890", "022-24567890")]
    #[case("Toll free 1800-123-4567", "1800-123-4567")]
    #[case("Mobile 9876543210.", "9876543210")]
    fn test_phone_patterns(#[case] raw: &str, #[case] expected: &str) {
        let fragment = text(raw);
        let resolution = PhoneExtractor::new(locale()).unwrap().resolve(&[&fragment]);
        assert_eq!(resolution.value(), Some(&Phone::Number(expected.to_string())));
        assert_eq!(resolution.matcher(), Some("locale_phone_pattern"));
    }

    #[test]
    fn test_tel_link_first() {
        let fragment = page("Office 022-24567890", r#"<a href="tel:+919876543210">Call</a>"#);
        let resolution = PhoneExtractor::new(locale()).unwrap().resolve(&[&fragment]);
        assert_eq!(resolution.value(), Some(&Phone::Number("+919876543210".to_string())));
        assert_eq!(resolution.matcher(), Some("tel_link"));
    }

    #[test]
    fn test_region_selector_means_manual_check() {
        let fragment = page(
            "Contact our offices\nChoose",
            r#"<section><h2>Contact our offices</h2><form><label for="st">Choose</label>
               <select id="st" name="state"><option>Select</option><option>Delhi</option></select></form></section>"#,
        );
        let resolution = PhoneExtractor::new(locale()).unwrap().resolve(&[&fragment]);
        assert_eq!(resolution.value(), Some(&Phone::CheckManually));
        assert_eq!(resolution.matcher(), Some("interactive_region"));
    }

    #[test]
    fn test_number_in_contact_section_beats_region_selector() {
        let fragment = page(
            "Contact us\nHead office: +91 98765 43210",
            r#"<section><h2>Contact us</h2>
               <select name="state"><option>Select state</option><option>Delhi</option></select>
               <p>Head office: +91 98765 43210</p></section>"#,
        );
        let resolution = PhoneExtractor::new(locale()).unwrap().resolve(&[&fragment]);
        assert_eq!(resolution.value(), Some(&Phone::Number("+91 98765 43210".to_string())));
        assert_eq!(resolution.matcher(), Some("locale_phone_pattern"));
    }

    #[test]
    fn test_donation_form_state_select_keeps_footer_phone() {
        let fragment = page(
            "Support us\nState\nCall +91 98765 43210",
            r#"<section id="donate"><h2>Support us</h2><form>
                 <label for="st">State</label>
                 <select id="st" name="state"><option>Maharashtra</option><option>Goa</option></select>
               </form></section>
               <footer><h3>Contact</h3><p>Call +91 98765 43210</p></footer>"#,
        );
        let resolution = PhoneExtractor::new(locale()).unwrap().resolve(&[&fragment]);
        assert_eq!(resolution.value(), Some(&Phone::Number("+91 98765 43210".to_string())));
    }

    #[test]
    fn test_capacity_select_is_not_a_region_picker() {
        let fragment = page(
            "Contact us\nCall +91 98765 43210",
            r#"<section class="contact"><h2>Contact us</h2>
                 <select name="event_capacity"><option>50</option><option>100</option></select></section>
               <footer><p>Call +91 98765 43210</p></footer>"#,
        );
        let resolution = PhoneExtractor::new(locale()).unwrap().resolve(&[&fragment]);
        assert_eq!(resolution.value(), Some(&Phone::Number("+91 98765 43210".to_string())));
    }

    #[rstest]
    #[case("state", true)]
    #[case("select_state", true)]
    #[case("Choose a city", true)]
    #[case("branch-picker", true)]
    #[case("event_capacity", false)]
    #[case("officer", false)]
    #[case("lang", false)]
    fn test_region_words_match_whole_tokens(#[case] descriptor: &str, #[case] expected: bool) {
        assert_eq!(InteractiveRegion::names_region(descriptor), expected);
    }

    #[test]
    fn test_region_prompt_text() {
        let fragment = text("Select your state to see the nearest office\n   \n");
        let resolution = PhoneExtractor::new(locale()).unwrap().resolve(&[&fragment]);
        assert_eq!(resolution.value(), Some(&Phone::CheckManually));
    }

    #[test]
    fn test_unrelated_select_ignored() {
        let fragment = page(
            "Call 9876543210",
            r#"<select name="lang"><option>English</option><option>Hindi</option></select>"#,
        );
        let resolution = PhoneExtractor::new(locale()).unwrap().resolve(&[&fragment]);
        assert_eq!(resolution.value(), Some(&Phone::Number("9876543210".to_string())));
    }

    #[test]
    fn test_short_numbers_rejected() {
        let origin = Url::parse("https://example.org/").unwrap();
        let structured = EvidenceFragment::structured(FieldKind::Phone, "12345", origin);
        let page = text("Ref no. 12345 / 678");
        let resolution = PhoneExtractor::new(locale()).unwrap().resolve(&[&structured, &page]);
        assert_eq!(resolution, Resolution::Unresolved);
    }

    #[rstest]
    #[case("Address: 12, MG Road, Pune 411001, India", Some("12, MG Road, Pune 411001"))]
    #[case("Registered Office\n4th Floor, Sona Building\nAndheri East, Mumbai 400 069", Some("4th Floor, Sona Building, Andheri East, Mumbai 400 069"))]
    #[case("We reached 411001 children across the state", None)]
    #[case("Our 25 volunteers walk down every road", None)]
    fn test_address_pattern(#[case] raw: &str, #[case] expected: Option<&str>) {
        let fragment = text(raw);
        let resolution = AddressExtractor::new(locale()).unwrap().resolve(&[&fragment]);
        assert_eq!(resolution.value().map(String::as_str), expected);
    }

    #[test]
    fn test_from_selection() {
        let phone = PhoneExtractor::new(locale()).unwrap();
        assert_eq!(
            phone.from_selection(&["Helpline: +91 98765 43210".to_string()]),
            Some(Phone::Number("+91 98765 43210".to_string()))
        );
        assert_eq!(phone.from_selection(&["   ".to_string()]), None);

        let email = EmailExtractor::new().unwrap();
        assert_eq!(email.from_selection(&["mail: hello@asha.org".to_string()]), Some("hello@asha.org".to_string()));
    }
}
