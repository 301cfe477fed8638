pub mod json;
pub mod text;

pub use json::{JsonConfig, JsonFormatter, JsonSink, convert_to_json, convert_to_jsonl, record_stem};
pub use text::{TextConfig, TextFormatter, convert_to_text};
