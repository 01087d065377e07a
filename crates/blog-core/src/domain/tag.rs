use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Tag entity - a label attached to any number of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn reference(id: i64) -> Self {
        Self {
            id: Some(id),
            name: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().chars().count() < 2 {
            return Err(DomainError::Validation(
                "Tag name must be at least 2 characters".to_string(),
            ));
        }
        Ok(())
    }
}
