use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::{RecipeRepository, RepositoryError, UserRepository};
use crate::logging::Logger;
use crate::model::{Recipe, SavedRecipe, User};

const SCHEMA: [&str; 4] = [
    r"CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    r"CREATE UNIQUE INDEX IF NOT EXISTS users_email_idx ON users (email)",
    r"CREATE TABLE IF NOT EXISTS recipes (
        id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        cuisine TEXT NOT NULL,
        cooking_time TEXT NOT NULL,
        difficulty TEXT NOT NULL,
        ingredients TEXT NOT NULL,
        instructions TEXT NOT NULL,
        nutrition TEXT,
        tips TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (id, created_at)
    )",
    r"CREATE INDEX IF NOT EXISTS recipes_user_id_idx ON recipes (user_id)",
];

/// SQLite-backed user and recipe store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    logger: Logger,
}

impl SqliteStore {
    /// Connect to the database at `url` and create tables if needed
    pub async fn connect(url: &str, logger: Logger) -> Result<Self, RepositoryError> {
        let pool = SqlitePoolOptions::new().max_connections(5).connect(url).await?;
        Self::with_pool(pool, logger).await
    }

    /// A private in-memory database, gone once the store is dropped
    pub async fn in_memory(logger: Logger) -> Result<Self, RepositoryError> {
        // Every connection to :memory: is a separate database, so hold exactly one
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool, logger).await
    }

    async fn with_pool(pool: SqlitePool, logger: Logger) -> Result<Self, RepositoryError> {
        let store = SqliteStore {
            pool,
            logger: logger.scoped("ingredient_recognition::storage"),
        };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User, RepositoryError> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_recipe(row: &SqliteRow) -> Result<SavedRecipe, RepositoryError> {
    let ingredients: String = row.try_get("ingredients")?;
    let instructions: String = row.try_get("instructions")?;

    Ok(SavedRecipe {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        recipe: Recipe {
            name: row.try_get("name")?,
            cuisine: row.try_get("cuisine")?,
            cooking_time: row.try_get("cooking_time")?,
            difficulty: row.try_get("difficulty")?,
            ingredients: serde_json::from_str(&ingredients)?,
            instructions: serde_json::from_str(&instructions)?,
            nutrition: row.try_get("nutrition")?,
            tips: row.try_get("tips")?,
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::Conflict(format!(
                "user with email {} already exists",
                user.email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RecipeRepository for SqliteStore {
    async fn save(&self, saved: &SavedRecipe) -> Result<(), RepositoryError> {
        self.logger.debug(format_args!(
            "Saving recipe {} for user {}",
            saved.id, saved.user_id
        ));

        let recipe = &saved.recipe;
        sqlx::query(
            "INSERT INTO recipes (id, user_id, name, cuisine, cooking_time, difficulty,
                ingredients, instructions, nutrition, tips, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&saved.id)
        .bind(&saved.user_id)
        .bind(&recipe.name)
        .bind(&recipe.cuisine)
        .bind(&recipe.cooking_time)
        .bind(&recipe.difficulty)
        .bind(serde_json::to_string(&recipe.ingredients)?)
        .bind(serde_json::to_string(&recipe.instructions)?)
        .bind(&recipe.nutrition)
        .bind(&recipe.tips)
        .bind(saved.created_at)
        .bind(saved.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<SavedRecipe>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM recipes WHERE id = ? LIMIT 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_recipe).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<SavedRecipe>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM recipes WHERE user_id = ? ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let mut recipes = Vec::with_capacity(rows.len());
        for row in &rows {
            match row_to_recipe(row) {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => {
                    let id: String = row.try_get("id").unwrap_or_default();
                    self.logger.warn(format_args!(
                        "Skipping unreadable recipe {} for user {}: {}",
                        id, user_id, e
                    ));
                }
            }
        }

        self.logger.debug(format_args!(
            "Retrieved {} recipes for user {}",
            recipes.len(),
            user_id
        ));
        Ok(recipes)
    }

    async fn delete(&self, id: &str, created_at: DateTime<Utc>) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ? AND created_at = ?")
            .bind(id)
            .bind(created_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_user(&self, user_id: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM recipes WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::testing::Capture;
    use log::Level;
    use std::sync::Arc;

    fn user(id: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Cook".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn saved(id: &str, user_id: &str) -> SavedRecipe {
        let now = Utc::now();
        SavedRecipe {
            id: id.to_string(),
            user_id: user_id.to_string(),
            recipe: Recipe {
                name: "Fried Rice".to_string(),
                cuisine: "Chinese".to_string(),
                cooking_time: "20 minutes".to_string(),
                difficulty: "Easy".to_string(),
                ingredients: vec!["rice".to_string(), "egg".to_string()],
                instructions: vec!["fry egg".to_string(), "add rice".to_string()],
                nutrition: Some("450 kcal".to_string()),
                tips: None,
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_user_lookup_by_id_and_email() {
        let store = SqliteStore::in_memory(Logger::discard()).await.unwrap();
        let alice = user("u-1", "alice@example.com");
        store.create(&alice).await.unwrap();

        let by_id = UserRepository::get_by_id(&store, "u-1").await.unwrap().unwrap();
        assert_eq!(by_id.email, "alice@example.com");
        assert_eq!(by_id.password_hash, "hash");

        let by_email = store.get_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, "u-1");

        assert!(store.get_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = SqliteStore::in_memory(Logger::discard()).await.unwrap();
        store.create(&user("u-1", "same@example.com")).await.unwrap();

        let err = store
            .create(&user("u-2", "same@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let store = SqliteStore::in_memory(Logger::discard()).await.unwrap();
        store.create(&user("u-1", "gone@example.com")).await.unwrap();

        assert!(UserRepository::delete(&store, "u-1").await.unwrap());
        assert!(!UserRepository::delete(&store, "u-1").await.unwrap());
        assert!(UserRepository::get_by_id(&store, "u-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recipe_round_trip() {
        let store = SqliteStore::in_memory(Logger::discard()).await.unwrap();
        let original = saved("r-1", "u-1");
        store.save(&original).await.unwrap();

        let loaded = RecipeRepository::get_by_id(&store, "r-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.user_id, original.user_id);
        assert_eq!(loaded.recipe, original.recipe);
    }

    #[tokio::test]
    async fn test_list_and_delete_by_key() {
        let store = SqliteStore::in_memory(Logger::discard()).await.unwrap();
        store.save(&saved("r-1", "u-1")).await.unwrap();
        store.save(&saved("r-2", "u-1")).await.unwrap();
        store.save(&saved("r-3", "u-2")).await.unwrap();

        assert_eq!(store.list_by_user("u-1").await.unwrap().len(), 2);
        assert_eq!(store.list_by_user("u-2").await.unwrap().len(), 1);
        assert!(store.list_by_user("u-3").await.unwrap().is_empty());

        let r1 = RecipeRepository::get_by_id(&store, "r-1")
            .await
            .unwrap()
            .unwrap();
        assert!(RecipeRepository::delete(&store, "r-1", r1.created_at)
            .await
            .unwrap());
        assert!(RecipeRepository::get_by_id(&store, "r-1")
            .await
            .unwrap()
            .is_none());

        assert_eq!(store.delete_by_user("u-1").await.unwrap(), 1);
        assert!(store.list_by_user("u-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_recipe_is_skipped_and_logged() {
        let capture = Arc::new(Capture::default());
        let store = SqliteStore::in_memory(Logger::new(capture.clone()))
            .await
            .unwrap();
        store.save(&saved("r-good", "u-1")).await.unwrap();

        sqlx::query(
            "INSERT INTO recipes (id, user_id, name, cuisine, cooking_time, difficulty,
                ingredients, instructions, nutrition, tips, created_at, updated_at)
             VALUES ('r-bad', 'u-1', 'Broken', '', '', '', 'not json', '[]', NULL, NULL, ?, ?)",
        )
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(store.pool())
        .await
        .unwrap();

        let recipes = store.list_by_user("u-1").await.unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id, "r-good");

        let warnings = capture.lines(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("r-bad"));
    }
}
