//! Shared helpers for the `inspecta` command line tool.

pub use inspecta_api_client as api_client;

use inspecta_api_client::{PictureRecord, UploadOutcome};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// One table row per picture: id, checklist position, sequence number, name, key.
pub fn picture_row(picture: &PictureRecord) -> String {
    format!(
        "{:<10} {:>3}.{:<3}.{:<3} {:>4}  {:<32} {}",
        picture.id,
        picture.category_sort_order,
        picture.sub_category_sort_order,
        picture.sub_item_sort_order,
        picture.sequence_no,
        truncate_string(&picture.original_file_name, 32),
        picture.storage_key
    )
}

pub fn outcome_row(outcome: &UploadOutcome) -> String {
    match outcome {
        UploadOutcome::Success { s3_key, file_name } => {
            format!("OK      {:<32} {}", truncate_string(file_name, 32), s3_key)
        }
        UploadOutcome::Failure { file_name, cause } => {
            format!("FAILED  {:<32} {}", truncate_string(file_name, 32), cause)
        }
    }
}

/// Initialize tracing for the CLI.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
