use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::token::TokenSigner;
use crate::error::AppError;
use crate::logging::Logger;
use crate::model::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::storage::{RecipeRepository, UserRepository};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and return a fresh token for it
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError>;

    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError>;

    /// Resolve a bearer token to the (sanitized) user it was issued for
    async fn user_from_token(&self, token: &str) -> Result<User, AppError>;

    /// Remove the user and everything they saved
    async fn delete_account(&self, user_id: &str) -> Result<(), AppError>;
}

/// Password + signed-token authentication
pub struct TokenAuthService {
    users: Arc<dyn UserRepository>,
    recipes: Arc<dyn RecipeRepository>,
    signer: TokenSigner,
    bcrypt_cost: u32,
    logger: Logger,
}

impl TokenAuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        recipes: Arc<dyn RecipeRepository>,
        signer: TokenSigner,
        bcrypt_cost: u32,
        logger: Logger,
    ) -> Self {
        TokenAuthService {
            users,
            recipes,
            signer,
            bcrypt_cost,
            logger: logger.scoped("ingredient_recognition::auth"),
        }
    }

    fn respond(&self, user: &User) -> Result<AuthResponse, AppError> {
        let token = self.signer.issue(&user.id).map_err(|e| {
            self.logger.error(format_args!(
                "Failed to generate token for user {}: {}",
                user.id, e
            ));
            e
        })?;

        Ok(AuthResponse {
            token,
            user: user.sanitized(),
        })
    }
}

fn validate_registration(request: &RegisterRequest) -> Result<(), AppError> {
    let email = &request.email;
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidInput("a valid email is required".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name is required".to_string()));
    }
    Ok(())
}

async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
}

async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("failed to verify password: {e}")))
}

#[async_trait]
impl AuthService for TokenAuthService {
    async fn register(&self, mut request: RegisterRequest) -> Result<AuthResponse, AppError> {
        request.email = request.email.trim().to_string();
        self.logger
            .info(format_args!("User registration attempt for {}", request.email));
        validate_registration(&request)?;

        if self.users.get_by_email(&request.email).await?.is_some() {
            self.logger.warn(format_args!(
                "Registration rejected, {} already exists",
                request.email
            ));
            return Err(AppError::AlreadyExists("user already exists".to_string()));
        }

        let password_hash = hash_password(request.password, self.bcrypt_cost).await?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: request.email,
            password_hash,
            name: request.name,
            created_at: now,
            updated_at: now,
        };

        // A concurrent registration can still win the race; the unique index reports it
        self.users.create(&user).await?;
        self.logger.info(format_args!("Registered user {}", user.id));

        self.respond(&user)
    }

    async fn login(&self, mut request: LoginRequest) -> Result<AuthResponse, AppError> {
        request.email = request.email.trim().to_string();
        self.logger
            .info(format_args!("User login attempt for {}", request.email));

        let user = self
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| {
                self.logger
                    .warn(format_args!("Login failed, no user {}", request.email));
                AppError::NotFound("user not found".to_string())
            })?;

        if !verify_password(request.password, user.password_hash.clone()).await? {
            self.logger
                .warn(format_args!("Login failed, bad password for {}", request.email));
            return Err(AppError::InvalidCredentials);
        }

        self.respond(&user)
    }

    async fn user_from_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.signer.verify(token)?;

        let user = self
            .users
            .get_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("user no longer exists".to_string()))?;

        Ok(user.sanitized())
    }

    async fn delete_account(&self, user_id: &str) -> Result<(), AppError> {
        let removed_recipes = self.recipes.delete_by_user(user_id).await?;
        if !self.users.delete(user_id).await? {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        self.logger.info(format_args!(
            "Deleted user {} and {} saved recipes",
            user_id, removed_recipes
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use chrono::Duration;

    const TEST_BCRYPT_COST: u32 = 4;

    async fn service() -> (TokenAuthService, TokenSigner) {
        let store = Arc::new(SqliteStore::in_memory(Logger::discard()).await.unwrap());
        let signer = TokenSigner::new("test-secret", Duration::hours(1));
        let service = TokenAuthService::new(
            store.clone(),
            store,
            signer.clone(),
            TEST_BCRYPT_COST,
            Logger::discard(),
        );
        (service, signer)
    }

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "hunter22".to_string(),
            name: "Test Cook".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_returns_token_and_sanitized_user() {
        let (service, _) = service().await;
        let response = service.register(registration("cook@example.com")).await.unwrap();

        assert!(!response.token.is_empty());
        assert_eq!(response.user.email, "cook@example.com");
        assert!(response.user.password_hash.is_empty());

        let user = service.user_from_token(&response.token).await.unwrap();
        assert_eq!(user.id, response.user.id);
        assert!(user.password_hash.is_empty());
    }

    #[tokio::test]
    async fn test_register_twice_is_already_exists() {
        let (service, _) = service().await;
        service.register(registration("dup@example.com")).await.unwrap();

        let err = service
            .register(registration("dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let (service, _) = service().await;

        let mut bad_email = registration("no-at-sign");
        assert!(matches!(
            service.register(bad_email.clone()).await,
            Err(AppError::InvalidInput(_))
        ));

        bad_email.email = "cook@example.com".to_string();
        bad_email.password = "short".to_string();
        assert!(matches!(
            service.register(bad_email.clone()).await,
            Err(AppError::InvalidInput(_))
        ));

        bad_email.password = "long enough".to_string();
        bad_email.name = "  ".to_string();
        assert!(matches!(
            service.register(bad_email).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_email_is_stored_trimmed() {
        let (service, _) = service().await;
        let response = service
            .register(registration("  padded@example.com "))
            .await
            .unwrap();
        assert_eq!(response.user.email, "padded@example.com");

        let err = service
            .register(registration("padded@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));

        let login = service
            .login(LoginRequest {
                email: " padded@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.user.id, response.user.id);
    }

    #[tokio::test]
    async fn test_login() {
        let (service, _) = service().await;
        service.register(registration("login@example.com")).await.unwrap();

        let ok = service
            .login(LoginRequest {
                email: "login@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();
        assert!(ok.user.password_hash.is_empty());

        let wrong = service
            .login(LoginRequest {
                email: "login@example.com".to_string(),
                password: "hunter23".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        let missing = service
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let (service, signer) = service().await;
        let response = service.register(registration("late@example.com")).await.unwrap();

        let stale = signer
            .issue_at(&response.user.id, Utc::now() - Duration::hours(2))
            .unwrap();
        assert!(matches!(
            service.user_from_token(&stale).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_is_unauthorized() {
        let (service, _) = service().await;
        let response = service.register(registration("bye@example.com")).await.unwrap();

        service.delete_account(&response.user.id).await.unwrap();

        assert!(matches!(
            service.user_from_token(&response.token).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.delete_account(&response.user.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
