//! File name, extension and tag checks for picture uploads

use crate::constants::{
    DEFAULT_EXTENSION, MAX_EXTENSION_LENGTH, MAX_FILE_NAME_LENGTH, MAX_TAGS_PER_PICTURE,
    MAX_TAG_LENGTH,
};
use crate::error::AppError;

/// Lowercase ASCII-alphanumeric extension of `file_name`, or `bin`.
///
/// Anything that could escape a key segment (separators, dots, unicode) yields the default.
pub fn sanitize_extension(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LENGTH
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// MIME type the client sends with the presigned PUT
pub fn content_type_for(file_name: &str) -> &'static str {
    match sanitize_extension(file_name).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

pub fn validate_file_name(file_name: &str) -> Result<(), AppError> {
    if file_name.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "File name must not be empty".to_string(),
        ));
    }
    if file_name.len() > MAX_FILE_NAME_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "File name exceeds {} characters",
            MAX_FILE_NAME_LENGTH
        )));
    }
    if file_name.chars().any(|c| c.is_control()) {
        return Err(AppError::InvalidInput(
            "File name must not contain control characters".to_string(),
        ));
    }
    Ok(())
}

/// Trims tags, drops empties and duplicates, and enforces count and length limits.
pub fn validate_tags(tags: &[String]) -> Result<Vec<String>, AppError> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(AppError::InvalidInput(format!(
                "Tag exceeds {} characters",
                MAX_TAG_LENGTH
            )));
        }
        if !cleaned.iter().any(|t| t == tag) {
            cleaned.push(tag.to_string());
        }
    }
    if cleaned.len() > MAX_TAGS_PER_PICTURE {
        return Err(AppError::InvalidInput(format!(
            "At most {} tags are allowed",
            MAX_TAGS_PER_PICTURE
        )));
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(sanitize_extension("Boiler Room.JPG"), "jpg");
        assert_eq!(sanitize_extension("scan.final.png"), "png");
    }

    #[test]
    fn unusable_extensions_fall_back_to_bin() {
        assert_eq!(sanitize_extension("README"), "bin");
        assert_eq!(sanitize_extension(".bashrc"), "bin");
        assert_eq!(sanitize_extension("photo."), "bin");
        assert_eq!(sanitize_extension("photo.j/pg"), "bin");
        assert_eq!(sanitize_extension("photo.ünï"), "bin");
        assert_eq!(sanitize_extension("photo.averyveryverylongext"), "bin");
        assert_eq!(sanitize_extension("dir.d/photo"), "bin");
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.PNG"), "image/png");
        assert_eq!(content_type_for("a"), "application/octet-stream");
    }

    #[test]
    fn file_name_rules() {
        assert!(validate_file_name("kitchen.jpg").is_ok());
        assert!(validate_file_name("  ").is_err());
        assert!(validate_file_name("bad\nname.jpg").is_err());
        assert!(validate_file_name(&"x".repeat(300)).is_err());
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = vec![
            " rust ".to_string(),
            "rust".to_string(),
            "".to_string(),
            "leak".to_string(),
        ];
        assert_eq!(validate_tags(&tags).unwrap(), vec!["rust", "leak"]);
    }
}
