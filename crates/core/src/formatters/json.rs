use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use crate::record::OrganizationRecord;
use crate::{NgoscopeError, Result};

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Pretty print JSON output
    pub pretty: bool,
}

/// JSON formatter for organization records
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, record: &OrganizationRecord) -> Result<String> {
        convert_to_json(record, &self.config)
    }
}

/// Serialize one record as a flat JSON document
pub fn convert_to_json(record: &OrganizationRecord, config: &JsonConfig) -> Result<String> {
    let output = if config.pretty { serde_json::to_string_pretty(record) } else { serde_json::to_string(record) };
    output.map_err(|e| NgoscopeError::ConfigError(format!("Cannot serialize record: {}", e)))
}

/// Serialize records as JSON Lines, one compact document per line
pub fn convert_to_jsonl(records: &[OrganizationRecord]) -> Result<String> {
    let mut output = String::new();
    for record in records {
        output.push_str(&convert_to_json(record, &JsonConfig { pretty: false })?);
        output.push('\n');
    }
    Ok(output)
}

/// File stem for a record: the domain without `www.`.
///
/// Local inputs have no domain; they use the site directory name for an
/// `index` page and the file stem otherwise.
pub fn record_stem(website_url: &str) -> String {
    let local = match Url::parse(website_url) {
        Ok(url) if url.scheme() != "file" => {
            if let Some(host) = url.host_str() {
                return sanitize(host.strip_prefix("www.").unwrap_or(host));
            }
            None
        }
        Ok(url) => url.to_file_path().ok(),
        Err(_) => Some(PathBuf::from(website_url)),
    };

    let Some(path) = local else {
        return "record".to_string();
    };

    let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let name = if stem.eq_ignore_ascii_case("index") || stem.is_empty() {
        path.parent().and_then(Path::file_name).map(|s| s.to_string_lossy().to_string()).unwrap_or_default()
    } else {
        stem
    };

    if name.is_empty() { "record".to_string() } else { sanitize(&name) }
}

fn sanitize(name: &str) -> String {
    name.chars().map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' }).collect()
}

/// Writes one `<domain>.json` file per record into a directory.
#[derive(Debug, Clone)]
pub struct JsonSink {
    out_dir: PathBuf,
}

impl JsonSink {
    pub fn new<P: AsRef<Path>>(out_dir: P) -> Self {
        Self { out_dir: out_dir.as_ref().to_path_buf() }
    }

    pub fn path_for(&self, record: &OrganizationRecord) -> PathBuf {
        self.out_dir.join(format!("{}.json", record_stem(&record.website_url)))
    }

    /// Write `record`, replacing an earlier file for the same domain.
    pub fn write(&self, record: &OrganizationRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.path_for(record);
        let mut json = convert_to_json(record, &JsonConfig { pretty: true })?;
        json.push('\n');
        fs::write(&path, json)?;
        Ok(path)
    }
}
