use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Sum of every prize the user has taken home
    pub balance: i64,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Leaderboard entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub balance: i64,
}

impl User {
    pub fn to_summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            balance: self.balance,
        }
    }

    pub fn validate_name(name: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if name.trim().is_empty() {
            errors.add("name", "can't be blank");
        } else if name.chars().count() > 35 {
            errors.add("name", "is too long (maximum is 35 characters)");
        }
        errors.into_result()
    }
}
