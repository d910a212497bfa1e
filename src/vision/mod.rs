mod google;

pub use google::GoogleVisionDetector;

use async_trait::async_trait;

use crate::config::CustomLabelsConfig;
use crate::error::AppError;

/// A label returned by a custom model, with its confidence in percent
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLabel {
    pub name: String,
    pub confidence: f64,
}

impl ScoredLabel {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        ScoredLabel {
            name: name.into(),
            confidence,
        }
    }
}

/// Image label detection backed by a cloud vision service
#[async_trait]
pub trait LabelDetector: Send + Sync {
    /// Stock labels for the image, strongest first
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<String>, AppError>;

    /// Labels from a trained model, with confidence scores
    async fn detect_custom_labels(
        &self,
        image: &[u8],
        model: &CustomLabelsConfig,
    ) -> Result<Vec<ScoredLabel>, AppError>;
}
