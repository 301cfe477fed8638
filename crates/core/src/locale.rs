//! Locale-specific matching data.
//!
//! A [`Locale`] is plain configuration: the gazetteer of region names, the
//! phone number shapes, the postal code shape and the street suffixes used
//! to recognize addresses. The extraction core only sees the compiled form,
//! [`CompiledLocale`], so other regions plug in by supplying a different
//! `Locale` (for example from a JSON file) without touching the matchers.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{NgoscopeError, Result};

/// Serializable locale definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locale {
    /// Human-readable name, e.g. "india".
    pub name: String,
    /// Specific place names (states, cities) recognized as operational areas.
    pub regions: Vec<String>,
    /// Country/continent supersets that only stand when nothing specific matched.
    pub generic_regions: Vec<String>,
    /// Phone number regexes, tried in order.
    pub phone_patterns: Vec<String>,
    /// Minimum digit count of an accepted phone number.
    pub phone_min_digits: usize,
    /// Maximum digit count of an accepted phone number.
    pub phone_max_digits: usize,
    /// Regex for a postal code token.
    pub postal_code_pattern: String,
    /// Street-suffix tokens (matched as whole words, case-insensitive).
    pub street_suffixes: Vec<String>,
}

impl Default for Locale {
    fn default() -> Self {
        Self::india()
    }
}

impl Locale {
    /// The built-in Indian locale.
    pub fn india() -> Self {
        let regions = [
            "Delhi",
            "Mumbai",
            "Pune",
            "Bangalore",
            "Bengaluru",
            "Kolkata",
            "Chennai",
            "Hyderabad",
            "Ahmedabad",
            "Jaipur",
            "Lucknow",
            "Patna",
            "Bhopal",
            "Ranchi",
            "Guwahati",
            "Bhubaneswar",
            "Nagpur",
            "Indore",
            "Surat",
            "Kochi",
            "Varanasi",
            "Dehradun",
            "Noida",
            "Gurugram",
            "Odisha",
            "Maharashtra",
            "Karnataka",
            "Tamil Nadu",
            "Kerala",
            "Goa",
            "Gujarat",
            "Rajasthan",
            "Uttar Pradesh",
            "Uttarakhand",
            "Himachal Pradesh",
            "Bihar",
            "Jharkhand",
            "Chhattisgarh",
            "Assam",
            "Meghalaya",
            "Manipur",
            "Mizoram",
            "Nagaland",
            "Tripura",
            "Sikkim",
            "Arunachal Pradesh",
            "Punjab",
            "Haryana",
            "Madhya Pradesh",
            "West Bengal",
            "Telangana",
            "Andhra Pradesh",
            "Jammu and Kashmir",
            "Ladakh",
        ];

        Self {
            name: "india".to_string(),
            regions: regions.iter().map(|r| r.to_string()).collect(),
            generic_regions: ["India", "Bharat", "South Asia", "Asia", "Global", "Worldwide"]
                .iter()
                .map(|r| r.to_string())
                .collect(),
            phone_patterns: vec![
                r"\+91[\s\-]?\d{5}[\s\-]?\d{5}".to_string(),
                r"\+91[\s\-]?\(?0?\d{2,4}\)?[\s\-]?\d{6,8}".to_string(),
                r"\b1800[\s\-]?\d{3}[\s\-]?\d{4}\b".to_string(),
                r"\b0\d{2,4}[\s\-]?\d{6,8}\b".to_string(),
                r"\b[6-9]\d{4}[\s\-]?\d{5}\b".to_string(),
            ],
            phone_min_digits: 10,
            phone_max_digits: 13,
            postal_code_pattern: r"\b[1-9]\d{2}\s?\d{3}\b".to_string(),
            street_suffixes: [
                "Road", "Rd", "Street", "St", "Marg", "Lane", "Avenue", "Nagar", "Colony", "Sector", "Block", "Chowk",
                "Bazaar", "Bazar", "Gali", "Path", "Cross", "Layout", "Enclave", "Vihar", "Floor", "Building",
                "Complex",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    /// Parse a locale from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| NgoscopeError::ConfigError(format!("Invalid locale: {}", e)))
    }

    /// Read a locale from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(NgoscopeError::FileNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Compile the patterns once for use by the extractors.
    pub fn compile(&self) -> Result<CompiledLocale> {
        if self.phone_min_digits == 0 || self.phone_min_digits > self.phone_max_digits {
            return Err(NgoscopeError::ConfigError(format!(
                "Invalid phone digit range {}..={}",
                self.phone_min_digits, self.phone_max_digits
            )));
        }

        let phone_patterns = self.phone_patterns.iter().map(|p| compile_pattern(p)).collect::<Result<Vec<_>>>()?;

        let suffixes = self.street_suffixes.iter().map(|s| regex::escape(s)).collect::<Vec<_>>().join("|");
        let street_suffix = compile_pattern(&format!(r"(?i)\b(?:{})\b", suffixes))?;

        Ok(CompiledLocale {
            name: self.name.clone(),
            gazetteer: Gazetteer::new(&self.regions, &self.generic_regions)?,
            phone_patterns,
            phone_digits: self.phone_min_digits..=self.phone_max_digits,
            postal_code: compile_pattern(&self.postal_code_pattern)?,
            street_suffix,
        })
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| NgoscopeError::ConfigError(format!("Invalid pattern {}: {}", pattern, e)))
}

/// A region name with its whole-word matcher.
#[derive(Debug, Clone)]
struct Place {
    name: String,
    pattern: Regex,
}

impl Place {
    fn new(name: &str) -> Result<Self> {
        let words = name.split_whitespace().map(regex::escape).collect::<Vec<_>>().join(r"\s+");
        Ok(Self { name: name.to_string(), pattern: compile_pattern(&format!(r"(?i)\b{}\b", words))? })
    }
}

/// Recognized place names, split into specific entries and generic supersets.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    specific: Vec<Place>,
    generic: Vec<Place>,
}

impl Gazetteer {
    pub fn new(specific: &[String], generic: &[String]) -> Result<Self> {
        Ok(Self {
            specific: specific.iter().map(|name| Place::new(name)).collect::<Result<_>>()?,
            generic: generic.iter().map(|name| Place::new(name)).collect::<Result<_>>()?,
        })
    }

    /// Canonical names of every gazetteer entry mentioned in `text`.
    pub fn matches_in(&self, text: &str) -> Vec<String> {
        self.specific
            .iter()
            .chain(self.generic.iter())
            .filter(|place| place.pattern.is_match(text))
            .map(|place| place.name.clone())
            .collect()
    }

    /// Whether `name` is one of the generic supersets.
    pub fn is_generic(&self, name: &str) -> bool {
        self.generic.iter().any(|place| place.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Apply the specific-over-generic rule.
    ///
    /// Generic entries are dropped whenever at least one non-generic name is
    /// present; otherwise they stand. Blank names are discarded.
    pub fn refine<I>(&self, names: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = String>,
    {
        let names: BTreeSet<String> =
            names.into_iter().map(|n| n.trim().to_string()).filter(|n| !n.is_empty()).collect();

        if names.iter().any(|name| !self.is_generic(name)) {
            names.into_iter().filter(|name| !self.is_generic(name)).collect()
        } else {
            names
        }
    }
}

/// A locale with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledLocale {
    pub name: String,
    pub gazetteer: Gazetteer,
    pub phone_patterns: Vec<Regex>,
    pub phone_digits: RangeInclusive<usize>,
    pub postal_code: Regex,
    pub street_suffix: Regex,
}

impl CompiledLocale {
    /// Whether `text` carries both a street-suffix token and a postal code.
    pub fn looks_like_address(&self, text: &str) -> bool {
        self.street_suffix.is_match(text) && self.postal_code.is_match(text)
    }
}
