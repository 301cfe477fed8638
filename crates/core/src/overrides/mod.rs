//! Per-domain manual overrides.
//!
//! An override is a CSS selector an operator supplied for one field of one
//! domain. Overrides are read before automatic extraction; a selector that
//! yields a valid value freezes the field, otherwise automatic extraction
//! proceeds as usual.
//!
//! Files use one `field: selector` directive per line, with `#` comments:
//!
//! ```text
//! # asha.org
//! phone: footer .helpline
//! fields_of_work: #causes li h3
//! ```

pub mod directives;
pub mod parser;
pub mod store;

pub use directives::{Directive, SiteOverrides, directive_key, parse_directive};
pub use parser::OverrideParser;
pub use store::{FileOverrideStore, MemoryOverrideStore, OverrideStore, domain_candidates};
