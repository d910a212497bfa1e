mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{SavedRecipe, User};

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A unique key (user email) is already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored JSON column could not be read back
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Users keyed by id, with a unique secondary index on email
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Returns whether a user was removed
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
}

/// Saved recipes keyed by (id, created_at), with a secondary index on user id
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn save(&self, recipe: &SavedRecipe) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<SavedRecipe>, RepositoryError>;

    /// Every readable recipe owned by the user; unreadable rows are skipped
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<SavedRecipe>, RepositoryError>;

    /// Returns whether a recipe was removed
    async fn delete(&self, id: &str, created_at: DateTime<Utc>) -> Result<bool, RepositoryError>;

    /// Returns the number of recipes removed
    async fn delete_by_user(&self, user_id: &str) -> Result<u64, RepositoryError>;
}
