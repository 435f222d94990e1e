use serde::{Deserialize, Serialize};
use std::fmt;

/// A user row that passed validation and is ready to be stored.
///
/// Fields are private: the only way to obtain one is through the record
/// validator, so every `UserRecord` has a non-empty name, a syntactically
/// valid email and an age in `0..=120`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    name: String,
    email: String,
    age: i64,
}

impl UserRecord {
    pub(crate) fn from_validated(name: String, email: String, age: i64) -> Self {
        Self { name, email, age }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn age(&self) -> i64 {
        self.age
    }
}

/// Persisted user, as owned by the store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserPage {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub users: Vec<User>,
}
