use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use crate::evidence::FieldKind;
use crate::overrides::directives::{SiteOverrides, directive_key};
use crate::overrides::parser::OverrideParser;
use crate::parse::parse_selector;
use crate::{NgoscopeError, Result};

/// Per-domain override storage.
///
/// Passed into the pipeline by reference; the pipeline only ever reads
/// through [`lookup`](OverrideStore::lookup). Operators write through
/// [`save`](OverrideStore::save).
pub trait OverrideStore: Send + Sync {
    /// Overrides for `domain`, empty when none are stored.
    fn lookup(&self, domain: &str) -> Result<SiteOverrides>;

    /// Store `selector` for `field` on `domain`.
    fn save(&self, domain: &str, field: FieldKind, selector: &str) -> Result<()>;
}

/// Labels that form a public suffix together with a two-letter country code
/// (`org.in`, `co.uk`).
const SECOND_LEVEL_LABELS: &[&str] = &["ac", "co", "com", "edu", "firm", "gen", "gov", "ind", "net", "nic", "or", "org", "res"];

/// Trailing labels making up the registrable domain.
fn registrable_len(parts: &[&str]) -> usize {
    match parts {
        [.., second, tld] if tld.len() == 2 && SECOND_LEVEL_LABELS.contains(second) => 3,
        _ => 2,
    }
}

/// Domains to consult for `domain`, most specific first.
///
/// `www.ngo.example.org` yields itself, `ngo.example.org` and `example.org`.
/// Parents stop at the registrable domain, so `asha.org.in` never falls back
/// to `org.in`.
pub fn domain_candidates(domain: &str) -> Vec<String> {
    let domain = domain.trim().trim_end_matches('.').to_lowercase();
    let mut names = vec![domain.clone()];

    let bare = domain.strip_prefix("www.").unwrap_or(&domain);
    let parts: Vec<&str> = bare.split('.').collect();
    for i in 0..=parts.len().saturating_sub(registrable_len(&parts)) {
        let parent = parts[i..].join(".");
        if !names.contains(&parent) {
            names.push(parent);
        }
    }

    names
}

/// The key a domain's own overrides are saved under.
fn storage_key(domain: &str) -> Result<String> {
    let domain = domain.trim().trim_end_matches('.').to_lowercase();
    let key = domain.strip_prefix("www.").unwrap_or(&domain).to_string();
    if key.is_empty() || key.starts_with('.') || key.contains(['/', '\\']) || key.contains("..") {
        return Err(NgoscopeError::OverrideError(format!("Invalid domain: {:?}", domain)));
    }
    Ok(key)
}

fn check_selector(field: FieldKind, selector: &str) -> Result<()> {
    if field == FieldKind::WebsiteUrl {
        return Err(NgoscopeError::OverrideError("website_url cannot be overridden".to_string()));
    }
    parse_selector(selector).map_err(|e| NgoscopeError::OverrideError(format!("{}: {}", selector, e)))?;
    Ok(())
}

/// Overrides held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryOverrideStore {
    entries: RwLock<HashMap<String, SiteOverrides>>,
}

impl MemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverrideStore for MemoryOverrideStore {
    fn lookup(&self, domain: &str) -> Result<SiteOverrides> {
        let entries = self.entries.read().map_err(|e| NgoscopeError::OverrideError(e.to_string()))?;
        let mut merged = SiteOverrides::new();
        for name in domain_candidates(domain) {
            if let Some(overrides) = entries.get(&name) {
                merged.merge(overrides);
            }
        }
        Ok(merged)
    }

    fn save(&self, domain: &str, field: FieldKind, selector: &str) -> Result<()> {
        check_selector(field, selector)?;
        let key = storage_key(domain)?;
        let mut entries = self.entries.write().map_err(|e| NgoscopeError::OverrideError(e.to_string()))?;
        entries.entry(key).or_default().set(field, selector.trim());
        Ok(())
    }
}

/// Overrides stored one file per domain (`<domain>.txt`) in a directory.
#[derive(Debug)]
pub struct FileOverrideStore {
    dir: PathBuf,
    cache: Mutex<HashMap<String, SiteOverrides>>,
}

impl FileOverrideStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), cache: Mutex::new(HashMap::new()) }
    }

    /// Default override directory (~/.config/ngoscope/overrides)
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("ngoscope").join("overrides"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `domain`'s own overrides.
    pub fn path_for(&self, domain: &str) -> Result<PathBuf> {
        Ok(self.dir.join(format!("{}.txt", storage_key(domain)?)))
    }

    fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

impl OverrideStore for FileOverrideStore {
    fn lookup(&self, domain: &str) -> Result<SiteOverrides> {
        let cache_key = domain.trim().to_lowercase();
        if let Ok(cache) = self.cache.lock()
            && let Some(overrides) = cache.get(&cache_key)
        {
            return Ok(overrides.clone());
        }

        let mut merged = SiteOverrides::new();
        for name in domain_candidates(domain) {
            let path = self.dir.join(format!("{}.txt", name));
            if !path.exists() {
                continue;
            }
            match OverrideParser::parse_file(&path) {
                Ok(overrides) => merged.merge(&overrides),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable override file"),
            }
        }

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(cache_key, merged.clone());
        }
        Ok(merged)
    }

    fn save(&self, domain: &str, field: FieldKind, selector: &str) -> Result<()> {
        check_selector(field, selector)?;
        let path = self.path_for(domain)?;

        let mut overrides = if path.exists() { OverrideParser::parse_file(&path)? } else { SiteOverrides::new() };
        overrides.set(field, selector.trim());

        fs::create_dir_all(&self.dir)?;
        let content = format!("# ngoscope overrides for {}\n{}", storage_key(domain)?, overrides.to_directive_string());
        fs::write(&path, content)?;

        tracing::debug!(path = %path.display(), field = directive_key(field), "override saved");
        self.clear_cache();
        Ok(())
    }
}
