//! Signal sources.
//!
//! Each source turns one input (a DOM snapshot or decoded document text)
//! into evidence fragments. Sources never fail: unreadable input produces no
//! fragments.

pub mod page;
pub mod pdf;
pub mod structured;
