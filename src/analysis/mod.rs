//! Analysis-side derivations.
//!
//! The sentiment itself is computed by the backend; this module only turns
//! its category map into chart-ready records.

pub mod aggregator;

pub use aggregator::*;
