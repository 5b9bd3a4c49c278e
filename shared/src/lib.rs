//! Blog Shared Library
//!
//! This crate contains the wire types, document models and validation
//! rules shared between the backend and its tests.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{Document, Post, UserProfile};
pub use types::*;
