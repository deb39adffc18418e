/// Credential manager implementation using runtime queries
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::account::{SignInOutcome, TokenPurpose, User};
use crate::error::{AppError, AppResult};

/// Failed attempts allowed before the lockout window starts.
const MAX_FAILED_LOGINS: i64 = 5;
/// Length of the lockout window in minutes.
const LOCKOUT_MINUTES: i64 = 15;
/// Confirmation tokens live for a day, reset tokens for an hour.
const CONFIRM_TOKEN_HOURS: i64 = 24;
const RESET_TOKEN_HOURS: i64 = 1;

const TOKEN_LENGTH: usize = 32;
const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, password_hash, \
     email_confirmed, email_confirmed_at, failed_logins, lockout_until, created_at";

/// Credential store service over the users and email_tokens tables
pub struct CredentialManager {
    db: SqlitePool,
}

impl CredentialManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a new user, with the email doubling as the username.
    ///
    /// All validation failures (password policy, duplicate email) are
    /// aggregated into one `Validation` error.
    pub async fn create_user(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> AppResult<User> {
        let mut errors = validate_password(password);

        if self.find_by_email(email).await?.is_some() {
            errors.push("Email is already registered.".to_string());
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let password_hash = hash_password(password)?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: email.to_string(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            password_hash,
            email_confirmed: false,
            email_confirmed_at: None,
            failed_logins: 0,
            lockout_until: None,
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO users (id, username, email, first_name, last_name, password_hash, \
             email_confirmed, email_confirmed_at, failed_logins, lockout_until, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.email_confirmed)
        .bind(user.email_confirmed_at)
        .bind(user.failed_logins)
        .bind(user.lockout_until)
        .bind(user.created_at)
        .execute(&self.db)
        .await
        .map_err(AppError::Database)?;

        tracing::info!(user_id = %user.id, "user created");

        Ok(user)
    }

    /// Get user by id
    pub async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::Database)
    }

    /// Get user by email
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::Database)
    }

    /// Password sign-in check.
    ///
    /// Enforces, in order: the lockout window, the confirmed-email
    /// requirement, then password verification. Five failed attempts lock
    /// the account for fifteen minutes; a correct password inside the
    /// window still fails.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SignInOutcome> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(SignInOutcome::UnknownUser);
        };

        let now = Utc::now();
        if let Some(until) = user.lockout_until {
            if until > now {
                tracing::warn!(user_id = %user.id, "sign-in attempt during lockout");
                return Ok(SignInOutcome::LockedOut);
            }
        }

        if !user.email_confirmed {
            return Ok(SignInOutcome::NotConfirmed);
        }

        if verify_password(password, &user.password_hash)? {
            sqlx::query("UPDATE users SET failed_logins = 0, lockout_until = NULL WHERE id = ?1")
                .bind(user.id)
                .execute(&self.db)
                .await
                .map_err(AppError::Database)?;
            return Ok(SignInOutcome::Success(Box::new(user)));
        }

        let failed = user.failed_logins + 1;
        if failed >= MAX_FAILED_LOGINS {
            let until = now + Duration::minutes(LOCKOUT_MINUTES);
            sqlx::query("UPDATE users SET failed_logins = 0, lockout_until = ?1 WHERE id = ?2")
                .bind(until)
                .bind(user.id)
                .execute(&self.db)
                .await
                .map_err(AppError::Database)?;
            tracing::warn!(user_id = %user.id, "account locked out");
        } else {
            sqlx::query("UPDATE users SET failed_logins = ?1 WHERE id = ?2")
                .bind(failed)
                .bind(user.id)
                .execute(&self.db)
                .await
                .map_err(AppError::Database)?;
        }

        Ok(SignInOutcome::InvalidCredentials)
    }

    /// Generate and store a single-use token for the given purpose.
    pub async fn issue_token(&self, user_id: Uuid, purpose: TokenPurpose) -> AppResult<String> {
        let token = generate_token();
        let now = Utc::now();
        let hours = match purpose {
            TokenPurpose::ConfirmEmail => CONFIRM_TOKEN_HOURS,
            TokenPurpose::ResetPassword => RESET_TOKEN_HOURS,
        };

        sqlx::query(
            "INSERT INTO email_tokens (token, user_id, purpose, created_at, expires_at, used) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&token)
        .bind(user_id)
        .bind(purpose.as_str())
        .bind(now)
        .bind(now + Duration::hours(hours))
        .bind(false)
        .execute(&self.db)
        .await
        .map_err(AppError::Database)?;

        Ok(token)
    }

    /// Validate and burn a single-use token. The second application of the
    /// same token fails.
    pub async fn consume_token(
        &self,
        user_id: Uuid,
        token: &str,
        purpose: TokenPurpose,
    ) -> AppResult<()> {
        let row = sqlx::query_as::<_, crate::account::EmailToken>(
            "SELECT token, user_id, purpose, created_at, expires_at, used \
             FROM email_tokens WHERE token = ?1 AND purpose = ?2",
        )
        .bind(token)
        .bind(purpose.as_str())
        .fetch_optional(&self.db)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::TokenInvalid("Token does not exist.".to_string()))?;

        if row.user_id != user_id {
            return Err(AppError::TokenInvalid(
                "Token was not issued for this user.".to_string(),
            ));
        }

        if row.used {
            return Err(AppError::TokenInvalid(
                "Token has already been used.".to_string(),
            ));
        }

        if Utc::now() > row.expires_at {
            return Err(AppError::TokenInvalid("Token has expired.".to_string()));
        }

        sqlx::query("UPDATE email_tokens SET used = TRUE WHERE token = ?1")
            .bind(token)
            .execute(&self.db)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }

    /// Confirm a user's email address with a confirmation token.
    pub async fn confirm_email(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        self.consume_token(user_id, token, TokenPurpose::ConfirmEmail)
            .await?;

        sqlx::query(
            "UPDATE users SET email_confirmed = TRUE, email_confirmed_at = ?1 WHERE id = ?2",
        )
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(AppError::Database)?;

        tracing::info!(%user_id, "email confirmed");

        Ok(())
    }

    /// Apply a new password after validating the reset token.
    pub async fn reset_password(
        &self,
        user_id: Uuid,
        token: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let errors = validate_password(new_password);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        self.consume_token(user_id, token, TokenPurpose::ResetPassword)
            .await?;

        let password_hash = hash_password(new_password)?;
        sqlx::query(
            "UPDATE users SET password_hash = ?1, failed_logins = 0, lockout_until = NULL \
             WHERE id = ?2",
        )
        .bind(&password_hash)
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(AppError::Database)?;

        tracing::info!(%user_id, "password reset");

        Ok(())
    }
}

/// Collect every policy violation for a candidate password.
pub(crate) fn validate_password(password: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if password.len() < 8 {
        errors.push("Password must be at least 8 characters long.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain an uppercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain a lowercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain a digit.".to_string());
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push("Password must contain a non-alphanumeric character.".to_string());
    }

    errors
}

fn hash_password(plain: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(plain: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Malformed password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..TOKEN_CHARSET.len());
            TOKEN_CHARSET[idx] as char
        })
        .collect()
}
