mod auth;
mod detector;
mod recipes;
mod token;

pub use auth::{AuthService, TokenAuthService};
pub use detector::{DetectorService, VisionDetectorService};
pub use recipes::{parse_recommendation, RecipeRecommender, RecipeService};
pub use token::{Claims, TokenSigner};
