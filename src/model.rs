use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// An ingredient recognised in a photo. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Ingredient {
            name: name.into(),
            quantity,
            unit: unit.into(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "ingredient name cannot be empty".to_string(),
            ));
        }
        if self.quantity.is_nan() || self.quantity <= 0.0 {
            return Err(AppError::InvalidInput(
                "ingredient quantity must be greater than zero".to_string(),
            ));
        }
        if self.unit.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "ingredient unit cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A single recipe as produced by the language model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub cooking_time: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
}

/// Recipe suggestions generated for one set of ingredients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeRecommendation {
    pub recipes: Vec<Recipe>,
    pub total_recipes: usize,
    pub generated_at: String,
    pub ingredient_count: usize,
    pub used_ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_ingredients: Option<Vec<String>>,
}

/// A recipe persisted for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecipe {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub recipe: Recipe,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Never leaves the server
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Copy of the user with the password hash blanked
    pub fn sanitized(&self) -> Self {
        User {
            password_hash: String::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendRequest {
    pub ingredients: Vec<String>,
}
