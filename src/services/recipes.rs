use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::logging::Logger;
use crate::model::{Recipe, RecipeRecommendation, SavedRecipe};
use crate::providers::{build_recipe_prompt, LlmProvider};
use crate::storage::RecipeRepository;

#[async_trait]
pub trait RecipeService: Send + Sync {
    /// Ask the language model for recipes that use the given ingredients
    async fn recommend(&self, ingredients: Vec<String>) -> Result<RecipeRecommendation, AppError>;

    async fn save(&self, user_id: &str, recipe: Recipe) -> Result<SavedRecipe, AppError>;

    async fn list_saved(&self, user_id: &str) -> Result<Vec<SavedRecipe>, AppError>;

    /// A recipe the user owns; anything else is `NotFound`
    async fn get_saved(&self, id: &str, user_id: &str) -> Result<SavedRecipe, AppError>;

    async fn delete_saved(&self, id: &str, user_id: &str) -> Result<(), AppError>;
}

/// The model may answer with the documented object or a bare list
#[derive(Deserialize)]
#[serde(untagged)]
enum RecipePayload {
    Wrapped {
        #[serde(deserialize_with = "null_as_empty")]
        recipes: Vec<Recipe>,
        #[serde(default)]
        missing_ingredients: Option<Vec<String>>,
    },
    Bare(Vec<Recipe>),
}

impl RecipePayload {
    fn into_parts(self) -> (Vec<Recipe>, Option<Vec<String>>) {
        match self {
            RecipePayload::Wrapped {
                recipes,
                missing_ingredients,
            } => (recipes, missing_ingredients),
            RecipePayload::Bare(recipes) => (recipes, None),
        }
    }
}

/// `"recipes": null` reads as no recipes
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Recipe>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Recipe>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Turn raw model text into a recommendation for `ingredients`
pub fn parse_recommendation(
    text: &str,
    ingredients: Vec<String>,
    now: DateTime<Utc>,
) -> Result<RecipeRecommendation, AppError> {
    let json = extract_json(text)?;
    let (recipes, missing_ingredients) = serde_json::from_str::<RecipePayload>(json)
        .map_err(|e| AppError::Parse(format!("failed to parse recipes: {e}")))?
        .into_parts();

    Ok(RecipeRecommendation {
        total_recipes: recipes.len(),
        recipes,
        generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        ingredient_count: ingredients.len(),
        used_ingredients: ingredients,
        missing_ingredients,
    })
}

pub struct RecipeRecommender {
    llm: Arc<dyn LlmProvider>,
    recipes: Arc<dyn RecipeRepository>,
    logger: Logger,
}

impl RecipeRecommender {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        recipes: Arc<dyn RecipeRepository>,
        logger: Logger,
    ) -> Self {
        RecipeRecommender {
            llm,
            recipes,
            logger: logger.scoped("ingredient_recognition::recipes"),
        }
    }
}

#[async_trait]
impl RecipeService for RecipeRecommender {
    async fn recommend(&self, ingredients: Vec<String>) -> Result<RecipeRecommendation, AppError> {
        if ingredients.is_empty() {
            return Err(AppError::InvalidInput(
                "at least one ingredient is required".to_string(),
            ));
        }

        self.logger.info(format_args!(
            "Generating recipe recommendations for {} ingredients using {}",
            ingredients.len(),
            self.llm.provider_name()
        ));

        let prompt = build_recipe_prompt(&ingredients);
        let text = self.llm.complete(&prompt).await?;

        let recommendation = parse_recommendation(&text, ingredients, Utc::now()).map_err(|e| {
            self.logger
                .error(format_args!("Failed to read model reply: {}", e));
            e
        })?;

        self.logger.info(format_args!(
            "Generated {} recipe recommendations",
            recommendation.total_recipes
        ));
        Ok(recommendation)
    }

    async fn save(&self, user_id: &str, recipe: Recipe) -> Result<SavedRecipe, AppError> {
        if recipe.name.trim().is_empty() {
            return Err(AppError::InvalidInput("recipe name is required".to_string()));
        }

        let now = Utc::now();
        let saved = SavedRecipe {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            recipe,
            created_at: now,
            updated_at: now,
        };
        self.recipes.save(&saved).await?;

        self.logger.info(format_args!(
            "Saved recipe {} for user {}",
            saved.id, user_id
        ));
        Ok(saved)
    }

    async fn list_saved(&self, user_id: &str) -> Result<Vec<SavedRecipe>, AppError> {
        Ok(self.recipes.list_by_user(user_id).await?)
    }

    async fn get_saved(&self, id: &str, user_id: &str) -> Result<SavedRecipe, AppError> {
        match self.recipes.get_by_id(id).await? {
            Some(saved) if saved.user_id == user_id => Ok(saved),
            _ => Err(AppError::NotFound("recipe not found".to_string())),
        }
    }

    async fn delete_saved(&self, id: &str, user_id: &str) -> Result<(), AppError> {
        let saved = self.get_saved(id, user_id).await?;
        if !self.recipes.delete(&saved.id, saved.created_at).await? {
            return Err(AppError::NotFound("recipe not found".to_string()));
        }

        self.logger.info(format_args!(
            "Deleted recipe {} for user {}",
            id, user_id
        ));
        Ok(())
    }
}
