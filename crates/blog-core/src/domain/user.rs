use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity - an account that can own blogs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub login: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a not-yet-persisted user; the store assigns the id.
    pub fn new(login: String, email: String, password_hash: String) -> Self {
        Self {
            id: None,
            login,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }
}
