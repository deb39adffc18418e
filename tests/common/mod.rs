#![allow(dead_code)]
/// Shared test harness: in-memory database, recording mailer, wired context
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use shareon::config::{
    AuthConfig, DatabaseConfig, LoggingConfig, ServerConfig, ServiceConfig,
};
use shareon::context::AppContext;
use shareon::error::AppResult;
use shareon::mailer::EmailNotifier;

pub const TEST_INVITE_CODE: &str = "VALID_CODE";

/// What kind of mail a notifier call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    Confirmation,
    PasswordReset,
}

/// One recorded outbound email.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub kind: MailKind,
    pub to: String,
    pub link: String,
}

impl SentMail {
    /// The single-use token is the last path segment of the emailed link.
    pub fn token(&self) -> String {
        self.link
            .rsplit('/')
            .next()
            .expect("link has a token segment")
            .to_string()
    }
}

/// Notifier double that records instead of sending.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn sent_mails(&self) -> Vec<SentMail> {
        self.sent.lock().expect("mailer lock").clone()
    }
}

#[async_trait]
impl EmailNotifier for RecordingMailer {
    async fn send_confirmation_email(
        &self,
        to_email: &str,
        _first_name: &str,
        _last_name: &str,
        confirmation_link: &str,
    ) -> AppResult<()> {
        self.sent.lock().expect("mailer lock").push(SentMail {
            kind: MailKind::Confirmation,
            to: to_email.to_string(),
            link: confirmation_link.to_string(),
        });
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        to_email: &str,
        reset_link: &str,
    ) -> AppResult<()> {
        self.sent.lock().expect("mailer lock").push(SentMail {
            kind: MailKind::PasswordReset,
            to: to_email.to_string(),
            link: reset_link.to_string(),
        });
        Ok(())
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".into(),
            port: 0,
            client_base_url: "http://localhost:3000".into(),
        },
        database: DatabaseConfig {
            path: ":memory:".into(),
        },
        auth: AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".into(),
            invite_code: TEST_INVITE_CODE.into(),
        },
        email: None,
        logging: LoggingConfig {
            level: "debug".into(),
        },
    }
}

/// Context over a fresh in-memory database with a recording mailer.
///
/// The pool is pinned to one connection that never recycles: every pooled
/// connection to `:memory:` would otherwise open its own empty database.
pub async fn test_context() -> (AppContext, Arc<RecordingMailer>) {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let mailer = Arc::new(RecordingMailer::default());
    let ctx = AppContext::from_parts(Arc::new(test_config()), pool, mailer.clone());

    (ctx, mailer)
}
