//! Validation modules

pub mod upload;

pub use upload::{content_type_for, sanitize_extension, validate_file_name, validate_tags};
