//! Shared constants

/// Root prefix under which every picture object lives in the store.
pub const PICTURE_KEY_ROOT: &str = "inspections";

/// Fallback extension for file names without a usable one.
pub const DEFAULT_EXTENSION: &str = "bin";

pub const MAX_EXTENSION_LENGTH: usize = 10;
pub const MAX_FILE_NAME_LENGTH: usize = 255;
pub const MAX_TAGS_PER_PICTURE: usize = 32;
pub const MAX_TAG_LENGTH: usize = 64;

/// Upper bound on an opaque cursor token; anything longer is rejected unread.
pub const MAX_CURSOR_TOKEN_LENGTH: usize = 512;
