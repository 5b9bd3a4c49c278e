//! API request and response types

use crate::models::{Post, UserProfile};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Value of the `status` field in every envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Failed,
}

/// Uniform JSON wrapper used for every API response.
///
/// Success: `{ "status": "success", "results"?: N, "data"?: {...} }`
/// Failure: `{ "status": "failed", "message"?: "..." }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    pub status: EnvelopeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Success envelope carrying a data payload
    pub fn success(data: T) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            results: None,
            data: Some(data),
            message: None,
        }
    }

    /// Success envelope carrying a payload and a result count
    pub fn success_with_results(results: usize, data: T) -> Self {
        Self {
            results: Some(results),
            ..Self::success(data)
        }
    }

    /// Success envelope with no payload at all
    pub fn empty() -> Self {
        Self {
            status: EnvelopeStatus::Success,
            results: None,
            data: None,
            message: None,
        }
    }

    /// Failure envelope, optionally with a human-readable message
    pub fn failed(message: Option<String>) -> Self {
        Self {
            status: EnvelopeStatus::Failed,
            results: None,
            data: None,
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }
}

/// Signup request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 64, message = "username must be 1-64 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "password must be 1-128 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `data` payload of the signup response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub user: UserProfile,
}

/// `data` payload for single-post responses; `post` is null when absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostData {
    pub post: Option<Post>,
}

/// `data` payload of the list response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostsData {
    pub posts: Vec<Post>,
}
