use crate::domain::error::Result;
use crate::domain::user::UserPage;
use crate::infrastructure::db::users::UserRepository;
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 500;

/// Read side over imported users.
pub struct UserDirectoryUseCase {
    repository: Arc<UserRepository>,
}

impl UserDirectoryUseCase {
    pub fn new(repository: Arc<UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_users(&self, limit: Option<i64>, offset: Option<i64>) -> Result<UserPage> {
        let limit = match limit {
            Some(value) if value > 0 => value.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        let offset = offset.filter(|value| *value > 0).unwrap_or(0);

        let total = self.repository.count_users().await?;
        let users = self.repository.list_users(limit, offset).await?;

        Ok(UserPage {
            total,
            limit,
            offset,
            users,
        })
    }
}
