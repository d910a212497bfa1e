use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde_json::{json, Value};

use super::{LabelDetector, ScoredLabel};
use crate::config::{CustomLabelsConfig, VisionConfig};
use crate::error::AppError;
use crate::logging::Logger;

/// Label detection through the Google Cloud Vision `images:annotate` API
pub struct GoogleVisionDetector {
    client: Client,
    api_key: String,
    base_url: String,
    max_labels: u32,
    min_confidence: f64,
    logger: Logger,
}

impl GoogleVisionDetector {
    pub fn new(config: &VisionConfig, logger: Logger) -> Result<Self, AppError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                AppError::Internal("GOOGLE_API_KEY not found in config or environment".into())
            })?;

        Ok(GoogleVisionDetector {
            client: Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_labels: config.max_labels,
            min_confidence: config.min_confidence,
            logger: logger.scoped("ingredient_recognition::vision"),
        })
    }

    /// Run LABEL_DETECTION and return (description, score in percent) pairs
    async fn annotate(
        &self,
        image: &[u8],
        model: Option<&str>,
    ) -> Result<Vec<ScoredLabel>, AppError> {
        let mut feature = json!({
            "type": "LABEL_DETECTION",
            "maxResults": self.max_labels,
        });
        if let Some(model) = model {
            feature["model"] = json!(model);
        }

        let request_body = json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image) },
                "features": [feature]
            }]
        });

        self.logger.debug(format_args!(
            "Sending label detection request ({} bytes)",
            image.len()
        ));

        let response = self
            .client
            .post(format!("{}/v1/images:annotate", self.base_url))
            .query(&[("key", &self.api_key)])
            .header("Accept-Encoding", "identity")
            .json(&request_body)
            .send()
            .await?;

        // Check for HTTP errors
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            self.logger.error(format_args!(
                "Vision API error ({}): {}",
                status, error_text
            ));
            return Err(AppError::Upstream(format!(
                "Vision API error ({status}): {error_text}"
            )));
        }

        let response_body: Value = response.json().await?;
        self.logger
            .debug(format_args!("Vision API response: {:?}", response_body));

        let result = &response_body["responses"][0];
        if let Some(message) = result["error"]["message"].as_str() {
            return Err(AppError::Upstream(format!("Vision API error: {message}")));
        }

        // An image with nothing recognisable has no labelAnnotations at all
        let labels = result["labelAnnotations"]
            .as_array()
            .map(|annotations| {
                annotations
                    .iter()
                    .filter_map(|a| {
                        let name = a["description"].as_str()?;
                        let score = a["score"].as_f64()?;
                        Some(ScoredLabel::new(name, score * 100.0))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(labels)
    }
}

#[async_trait]
impl LabelDetector for GoogleVisionDetector {
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<String>, AppError> {
        let labels = self.annotate(image, None).await?;
        Ok(labels
            .into_iter()
            .filter(|l| l.confidence >= self.min_confidence)
            .map(|l| l.name)
            .collect())
    }

    async fn detect_custom_labels(
        &self,
        image: &[u8],
        model: &CustomLabelsConfig,
    ) -> Result<Vec<ScoredLabel>, AppError> {
        let labels = self.annotate(image, Some(&model.model)).await?;
        Ok(labels
            .into_iter()
            .filter(|l| l.confidence >= model.min_confidence)
            .collect())
    }
}
