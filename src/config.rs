use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to
    #[serde(default = "default_server_address")]
    pub server_address: String,
    /// SQLite connection string for users and saved recipes
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Largest accepted image upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    pub auth: AuthConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub vision: VisionConfig,
}

/// Token signing and password hashing settings
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Symmetric secret used to sign tokens
    pub jwt_secret: String,
    /// Token lifetime in hours
    #[serde(default = "default_token_lifetime_hours")]
    pub token_lifetime_hours: i64,
    /// bcrypt work factor
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

/// Language model settings
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Model identifier (e.g., "claude-sonnet-4-5")
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// API key for authentication (can also be set via ANTHROPIC_API_KEY)
    pub api_key: Option<String>,
    /// Base URL for the messages endpoint (for proxies and tests)
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            api_key: None,
            base_url: default_llm_base_url(),
        }
    }
}

/// Label detection settings
#[derive(Debug, Deserialize, Clone)]
pub struct VisionConfig {
    /// API key for authentication (can also be set via GOOGLE_API_KEY)
    pub api_key: Option<String>,
    /// Base URL for the annotate endpoint (for proxies and tests)
    #[serde(default = "default_vision_base_url")]
    pub base_url: String,
    /// Maximum number of labels requested per image
    #[serde(default = "default_max_labels")]
    pub max_labels: u32,
    /// Minimum confidence (percent) for stock labels
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Trained model to use instead of stock labels
    #[serde(default)]
    pub custom_labels: Option<CustomLabelsConfig>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_vision_base_url(),
            max_labels: default_max_labels(),
            min_confidence: default_min_confidence(),
            custom_labels: None,
        }
    }
}

/// A trained label model and its confidence threshold
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CustomLabelsConfig {
    /// Model name passed to the detection feature
    pub model: String,
    /// Minimum confidence (percent) for a custom label to count
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

// Default value functions
fn default_server_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_database_url() -> String {
    "sqlite://ingredient-recognition.db?mode=rwc".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_token_lifetime_hours() -> i64 {
    24
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_llm_model() -> String {
    "claude-sonnet-4-5".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_vision_base_url() -> String {
    "https://vision.googleapis.com".to_string()
}

fn default_max_labels() -> u32 {
    100
}

fn default_min_confidence() -> f64 {
    50.0
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with INGREDIENT__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: INGREDIENT__AUTH__JWT_SECRET
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Same as [`AppConfig::load`] with an explicit config file stem
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("INGREDIENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
