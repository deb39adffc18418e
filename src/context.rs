/// Application context and service wiring
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::{
    account::CredentialManager,
    config::ServerConfig,
    db,
    error::AppResult,
    mailer::{EmailNotifier, SmtpMailer},
    services::{AuthService, PlatformService, ProfileService},
    token::TokenIssuer,
};

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub credentials: Arc<CredentialManager>,
    pub token_issuer: Arc<TokenIssuer>,
    pub mailer: Arc<dyn EmailNotifier>,
    pub auth_service: Arc<AuthService>,
    pub platform_service: Arc<PlatformService>,
    pub profile_service: Arc<ProfileService>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> AppResult<Self> {
        // Validate configuration; a missing or short JWT secret dies here.
        config.validate()?;

        let db = db::create_pool(&config.database.path, db::DatabaseOptions::default()).await?;
        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        let mailer = Arc::new(SmtpMailer::new(config.email.clone())?);

        Ok(Self::from_parts(Arc::new(config), db, mailer))
    }

    /// Wire services over an existing pool and notifier. Used by `new` and
    /// by tests running in-memory transports.
    pub fn from_parts(
        config: Arc<ServerConfig>,
        db: SqlitePool,
        mailer: Arc<dyn EmailNotifier>,
    ) -> Self {
        let credentials = Arc::new(CredentialManager::new(db.clone()));
        let token_issuer = Arc::new(TokenIssuer::new(&config.auth.jwt_secret));

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&credentials),
            Arc::clone(&token_issuer),
            Arc::clone(&mailer),
            Arc::clone(&config),
        ));
        let platform_service = Arc::new(PlatformService::new(db.clone()));
        let profile_service = Arc::new(ProfileService::new(db.clone()));

        Self {
            config,
            db,
            credentials,
            token_issuer,
            mailer,
            auth_service,
            platform_service,
            profile_service,
        }
    }
}
