//! Page view output.

pub mod generator;

pub use generator::{generate_json_view, generate_text_view};
