use async_trait::async_trait;
use std::sync::Arc;

use crate::classifier::FoodAllowList;
use crate::config::CustomLabelsConfig;
use crate::error::AppError;
use crate::logging::Logger;
use crate::model::Ingredient;
use crate::vision::LabelDetector;

#[async_trait]
pub trait DetectorService: Send + Sync {
    /// Ingredients visible in an uploaded photo
    async fn detect_ingredients(&self, image: &[u8]) -> Result<Vec<Ingredient>, AppError>;
}

/// Runs label detection and keeps the food labels.
///
/// With a custom model configured the trained model is queried and each
/// ingredient carries its confidence, otherwise stock labels are used.
pub struct VisionDetectorService {
    detector: Arc<dyn LabelDetector>,
    custom_labels: Option<CustomLabelsConfig>,
    allow_list: FoodAllowList,
    logger: Logger,
}

impl VisionDetectorService {
    pub fn new(
        detector: Arc<dyn LabelDetector>,
        custom_labels: Option<CustomLabelsConfig>,
        logger: Logger,
    ) -> Self {
        VisionDetectorService {
            detector,
            custom_labels,
            allow_list: FoodAllowList::default(),
            logger: logger.scoped("ingredient_recognition::detector"),
        }
    }

    pub fn with_allow_list(mut self, allow_list: FoodAllowList) -> Self {
        self.allow_list = allow_list;
        self
    }
}

#[async_trait]
impl DetectorService for VisionDetectorService {
    async fn detect_ingredients(&self, image: &[u8]) -> Result<Vec<Ingredient>, AppError> {
        if image.is_empty() {
            return Err(AppError::InvalidInput("image is empty".to_string()));
        }

        let ingredients = match &self.custom_labels {
            Some(model) => {
                self.logger.info(format_args!(
                    "Detecting ingredients with custom model {}",
                    model.model
                ));
                let labels = self.detector.detect_custom_labels(image, model).await?;
                self.allow_list.classify_scored(&labels)
            }
            None => {
                self.logger.info(format_args!(
                    "Detecting ingredients in {} byte image",
                    image.len()
                ));
                let labels = self.detector.detect_labels(image).await?;
                self.allow_list.classify_labels(&labels)
            }
        };

        self.logger
            .info(format_args!("Detected {} ingredients", ingredients.len()));
        Ok(ingredients)
    }
}
