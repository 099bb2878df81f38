//! Domain error types.
//!
//! Application edges use `anyhow`; these enums cover failures that callers
//! match on or turn into user-facing replies.

use thiserror::Error;

/// Why the engine could not produce an image.
#[allow(dead_code)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("image decode failed: {0}")]
    ImageDecode(String),

    #[error("image encode failed: {0}")]
    ImageEncode(String),

    #[error("missing image asset: {0}")]
    AssetMissing(String),

    #[error("invalid meme options: {0}")]
    Deserialize(String),

    #[error("wrong number of images, expected {}, got {actual}", expected(.min, .max))]
    ImageNumberMismatch { min: usize, max: usize, actual: usize },

    #[error("wrong number of texts, expected {}, got {actual}", expected(.min, .max))]
    TextNumberMismatch { min: usize, max: usize, actual: usize },

    #[error("text too long: {}", truncate_text(.0))]
    TextOverLength(String),

    #[error("{0}")]
    Feedback(String),

    #[error("engine returned nothing")]
    Empty,
}

/// `n` when both ends agree, `min ~ max` otherwise.
pub fn count_range(min: usize, max: usize) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{} ~ {}", min, max)
    }
}

fn expected(min: &usize, max: &usize) -> String {
    count_range(*min, *max)
}

fn truncate_text(text: &str) -> String {
    if text.chars().count() <= 10 {
        text.to_string()
    } else {
        let head: String = text.chars().take(10).collect();
        format!("{}...", head)
    }
}

/// Disabled-list management failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("meme '{0}' does not exist")]
    UnknownKeyword(String),

    #[error("meme '{0}' is already disabled")]
    AlreadyDisabled(String),

    #[error("meme '{0}' is not disabled")]
    NotDisabled(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_mismatch_messages() {
        let err = GenerateError::ImageNumberMismatch { min: 1, max: 1, actual: 3 };
        assert_eq!(err.to_string(), "wrong number of images, expected 1, got 3");

        let err = GenerateError::TextNumberMismatch { min: 1, max: 2, actual: 0 };
        assert_eq!(err.to_string(), "wrong number of texts, expected 1 ~ 2, got 0");
    }

    #[test]
    fn test_long_text_truncated() {
        let err = GenerateError::TextOverLength("abcdefghijklmnop".to_string());
        assert_eq!(err.to_string(), "text too long: abcdefghij...");

        let err = GenerateError::TextOverLength("short".to_string());
        assert_eq!(err.to_string(), "text too long: short");
    }
}
