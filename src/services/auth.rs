/// Authentication orchestration: registration, confirmation, login and
/// password reset
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::account::{CredentialManager, SignInOutcome, TokenPurpose, UserView};
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::mailer::EmailNotifier;
use crate::token::{AuthToken, TokenIssuer};

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 64, message = "First name is required."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 64, message = "Last name is required."))]
    pub last_name: String,
    pub invite_code: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    pub password: String,
}

/// Password reset request (step one: mail the link)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordForgotRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
}

/// Password reset request (step two: apply the new password)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

/// Service for user registration, login and token issuance
pub struct AuthService {
    credentials: Arc<CredentialManager>,
    issuer: Arc<TokenIssuer>,
    mailer: Arc<dyn EmailNotifier>,
    config: Arc<ServerConfig>,
}

impl AuthService {
    pub fn new(
        credentials: Arc<CredentialManager>,
        issuer: Arc<TokenIssuer>,
        mailer: Arc<dyn EmailNotifier>,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            credentials,
            issuer,
            mailer,
            config,
        }
    }

    /// Register a new user and mail the confirmation link.
    ///
    /// The invite code is a literal equality gate, a placeholder for a real
    /// invite-code registry. Returns the new user's id.
    pub async fn register(&self, req: &RegisterRequest) -> AppResult<Uuid> {
        if req.invite_code != self.config.auth.invite_code {
            return Err(AppError::validation("Invalid invite code"));
        }

        let user = self
            .credentials
            .create_user(&req.email, &req.first_name, &req.last_name, &req.password)
            .await?;

        let token = self
            .credentials
            .issue_token(user.id, TokenPurpose::ConfirmEmail)
            .await?;
        let link = self.confirmation_link(user.id, &token);

        self.mailer
            .send_confirmation_email(&user.email, &user.first_name, &user.last_name, &link)
            .await?;

        tracing::info!(user_id = %user.id, "user registered, confirmation mail sent");

        Ok(user.id)
    }

    /// Public view of a user.
    pub async fn get_user(&self, id: Uuid) -> AppResult<UserView> {
        let user = self
            .credentials
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Failed to retrieve user data.".to_string()))?;
        Ok(user.view())
    }

    /// Confirm a user with the emailed single-use token.
    pub async fn confirm_user(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let user = self
            .credentials
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User cannot be found.".to_string()))?;

        self.credentials.confirm_email(user.id, token).await
    }

    /// Authenticate and issue a bearer token.
    ///
    /// Any mismatch yields `Ok(None)`: callers cannot tell an unknown email
    /// from a wrong password, a lockout, or an unconfirmed address.
    pub async fn login(&self, req: &LoginRequest) -> AppResult<Option<AuthToken>> {
        match self.credentials.sign_in(&req.email, &req.password).await? {
            SignInOutcome::Success(user) => {
                let token = self.issuer.issue_login(&user.email)?;
                tracing::info!(user_id = %user.id, "user logged in");
                Ok(Some(token))
            }
            _ => {
                tracing::debug!("login rejected");
                Ok(None)
            }
        }
    }

    /// Issue a reset token and mail the reset link.
    ///
    /// A missed email lookup surfaces a failure response here, unlike
    /// login's uniform rejection. Known asymmetry, kept on purpose.
    pub async fn request_password_reset(&self, req: &PasswordForgotRequest) -> AppResult<()> {
        let user = self.credentials.find_by_email(&req.email).await?.ok_or_else(|| {
            AppError::validation("Failed to process password reset for the provided user.")
        })?;

        let token = self
            .credentials
            .issue_token(user.id, TokenPurpose::ResetPassword)
            .await?;
        let link = self.reset_link(&token);

        self.mailer
            .send_password_reset_email(&user.email, &link)
            .await?;

        tracing::info!(user_id = %user.id, "password reset mail sent");

        Ok(())
    }

    /// Apply a new password with the emailed single-use token.
    pub async fn process_password_reset(
        &self,
        req: &PasswordResetRequest,
        token: &str,
    ) -> AppResult<()> {
        let user = self.credentials.find_by_email(&req.email).await?.ok_or_else(|| {
            AppError::validation("Failed to process password reset for the provided user.")
        })?;

        self.credentials
            .reset_password(user.id, token, &req.password)
            .await
    }

    fn confirmation_link(&self, user_id: Uuid, token: &str) -> String {
        format!(
            "{}/account/{}/confirm/{}",
            self.config.service.client_base_url,
            user_id,
            urlencoding::encode(token)
        )
    }

    fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/account/reset-password/{}",
            self.config.service.client_base_url,
            urlencoding::encode(token)
        )
    }
}
