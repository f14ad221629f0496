//! Structured error types for the vitae engine.
//!
//! Parsing, import validation, storage and rendering each get a variant.
//! Editing never fails: reducer actions that reference unknown ids are
//! no-ops, so there is no variant for them.

use thiserror::Error;

/// The unified error type returned by all public vitae API functions.
#[derive(Debug, Error)]
pub enum VitaeError {
    /// JSON input failed to parse as a CV document, style or bundle.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    ParseError {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// An import bundle was structurally valid JSON but not a usable CV.
    /// The message is meant to be shown to the user as-is.
    #[error("Could not import CV: {0}")]
    ImportError(String),

    /// A document violates a model invariant (duplicate ids and the like).
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A storage backend could not be written.
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Layout or PDF/HTML generation failed.
    #[error("Render error: {0}")]
    RenderError(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for VitaeError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the CV schema. Check field names and section types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        VitaeError::ParseError { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_carry_a_hint() {
        let err: VitaeError = serde_json::from_str::<serde_json::Value>("{,}")
            .unwrap_err()
            .into();
        let text = err.to_string();
        assert!(text.starts_with("Failed to parse document"));
        assert!(text.contains("Hint: Check for trailing commas"));
    }

    #[test]
    fn import_error_is_user_facing() {
        let err = VitaeError::ImportError("missing field `style`".to_string());
        assert_eq!(err.to_string(), "Could not import CV: missing field `style`");
    }
}
