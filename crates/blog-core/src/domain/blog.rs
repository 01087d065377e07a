use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Blog entity - a named collection of entries owned by one user.
///
/// When a blog is embedded in an [`Entry`](super::Entry) request body only
/// `id` is meaningful, so every other field defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl Blog {
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            handle: handle.into(),
            user_id: None,
        }
    }

    /// Reference to an existing blog by id.
    pub fn reference(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::new("", "")
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().chars().count() < 3 {
            return Err(DomainError::Validation(
                "Blog name must be at least 3 characters".to_string(),
            ));
        }
        if self.handle.trim().chars().count() < 2 {
            return Err(DomainError::Validation(
                "Blog handle must be at least 2 characters".to_string(),
            ));
        }
        Ok(())
    }
}
