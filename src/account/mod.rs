/// User identity management
///
/// Handles credential records, sign-in checks with lockout, and the
/// single-use tokens backing email confirmation and password reset.
mod manager;

pub use manager::CredentialManager;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User record in the database. Never exposed raw; project to `UserView`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub email_confirmed_at: Option<DateTime<Utc>>,
    pub failed_logins: i64,
    pub lockout_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Minimal public projection of a user.
    pub fn view(&self) -> UserView {
        UserView {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public view of a user returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Single-use token record for email confirmation and password reset
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EmailToken {
    pub token: String,
    pub user_id: Uuid,
    pub purpose: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

/// What a single-use token authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    ConfirmEmail,
    ResetPassword,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::ConfirmEmail => "confirm_email",
            TokenPurpose::ResetPassword => "reset_password",
        }
    }
}

/// Outcome of a sign-in check. Collapsed to a single failure at the API
/// boundary so callers cannot distinguish unknown users from bad passwords.
#[derive(Debug, Clone)]
pub enum SignInOutcome {
    Success(Box<User>),
    UnknownUser,
    NotConfirmed,
    LockedOut,
    InvalidCredentials,
}
