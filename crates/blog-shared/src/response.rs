//! Error bodies as RFC 7807 Problem Details.
//!
//! See: https://datatracker.ietf.org/doc/html/rfc7807

use serde::{Deserialize, Serialize};

/// Base of the `type` URI for entity-specific problems.
pub const PROBLEM_BASE_URL: &str = "https://blog.example/problem";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// URI identifying the problem type.
    #[serde(rename = "type")]
    pub problem_type: String,

    pub title: String,

    pub status: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Entity the problem concerns, e.g. `entry`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// Stable machine-readable key, e.g. `idexists`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_key: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            problem_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
            entity_name: None,
            error_key: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Tag the problem with the entity and error key, and derive its type URI.
    pub fn for_entity(mut self, entity_name: impl Into<String>, error_key: impl Into<String>) -> Self {
        let error_key = error_key.into();
        self.problem_type = format!("{PROBLEM_BASE_URL}/{error_key}");
        self.entity_name = Some(entity_name.into());
        self.error_key = Some(error_key);
        self
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, "Bad Request").with_detail(detail)
    }

    pub fn unauthorized() -> Self {
        Self::new(401, "Unauthorized")
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, "Not Found").with_detail(detail)
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::new(409, "Conflict").with_detail(detail)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}
