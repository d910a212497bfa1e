//! Turns vision labels into ingredients.
//!
//! Both detection paths share one allow-list of food keywords but match it
//! differently: stock labels are free text ("Granny Smith Apple") and match
//! when they contain a keyword, custom-model labels are trained class names
//! and must equal a keyword.

use crate::model::Ingredient;
use crate::vision::ScoredLabel;

pub const FOOD_KEYWORDS: [&str; 24] = [
    "apple",
    "banana",
    "orange",
    "bread",
    "cheese",
    "milk",
    "egg",
    "tomato",
    "carrot",
    "potato",
    "onion",
    "garlic",
    "chicken",
    "beef",
    "fish",
    "rice",
    "pasta",
    "vegetable",
    "fruit",
    "meat",
    "butter",
    "oil",
    "salt",
    "pepper",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Lower-cased label contains a keyword as a substring
    Contains,
    /// Lower-cased label equals a keyword
    Exact,
}

/// Case-insensitive food keyword filter
#[derive(Debug, Clone)]
pub struct FoodAllowList {
    keywords: Vec<String>,
}

impl Default for FoodAllowList {
    fn default() -> Self {
        Self::new(FOOD_KEYWORDS)
    }
}

impl FoodAllowList {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        FoodAllowList {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn matches(&self, label: &str, policy: MatchPolicy) -> bool {
        let label = label.to_lowercase();
        match policy {
            MatchPolicy::Contains => self.keywords.iter().any(|k| label.contains(k.as_str())),
            MatchPolicy::Exact => self.keywords.iter().any(|k| *k == label),
        }
    }

    /// Stock labels: substring match, one unit each
    pub fn classify_labels(&self, labels: &[String]) -> Vec<Ingredient> {
        labels
            .iter()
            .filter(|label| self.matches(label, MatchPolicy::Contains))
            .map(|label| Ingredient::new(label.clone(), 1.0, "unit"))
            .collect()
    }

    /// Custom-model labels: exact match, quantity carries the confidence
    pub fn classify_scored(&self, labels: &[ScoredLabel]) -> Vec<Ingredient> {
        labels
            .iter()
            .filter(|label| self.matches(&label.name, MatchPolicy::Exact))
            .map(|label| Ingredient::new(label.name.clone(), label.confidence, "confidence"))
            .filter(|ingredient| ingredient.validate().is_ok())
            .collect()
    }
}
