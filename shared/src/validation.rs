//! Input validation functions
//!
//! Post bodies are free-form, but `title` and `body` carry the same
//! validators the document store applies on every write.

use crate::errors::PostValidationError;
use crate::models::Document;
use serde_json::Value;

/// Keys owned by the store; never accepted from clients
pub const RESERVED_KEYS: &[&str] = &["id", "_id"];

/// Fields that every new post must carry
pub const REQUIRED_POST_FIELDS: &[&str] = &["title", "body"];

/// Which write a document is validated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Full document, required fields must be present
    Create,
    /// Partial patch, only supplied fields are checked
    Update,
}

/// Drop store-owned keys from a client document
pub fn strip_reserved_keys(doc: &mut Document) {
    for key in RESERVED_KEYS {
        doc.remove(*key);
    }
}

/// Validate a post document for the given write
pub fn validate_post_document(doc: &Document, mode: WriteMode) -> Result<(), PostValidationError> {
    for field in REQUIRED_POST_FIELDS {
        match doc.get(*field) {
            None if mode == WriteMode::Create => {
                return Err(PostValidationError::MissingField(*field));
            }
            None => {}
            Some(Value::String(s)) if !s.is_empty() => {}
            Some(_) => {
                return Err(PostValidationError::InvalidField(*field));
            }
        }
    }
    Ok(())
}

/// Interpret an arbitrary JSON value as a post document
pub fn as_document(value: Value) -> Result<Document, PostValidationError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(PostValidationError::NotAnObject),
    }
}
