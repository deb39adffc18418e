/// Email sending functionality
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Message},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

/// Outbound email collaborator. Failures are surfaced to the caller as
/// delivery errors and never retried.
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    /// Send the registration confirmation email with the confirmation link
    async fn send_confirmation_email(
        &self,
        to_email: &str,
        first_name: &str,
        last_name: &str,
        confirmation_link: &str,
    ) -> AppResult<()>;

    /// Send a password reset email with the reset link
    async fn send_password_reset_email(&self, to_email: &str, reset_link: &str) -> AppResult<()>;
}

/// SMTP mailer service
#[derive(Clone)]
pub struct SmtpMailer {
    config: Option<EmailConfig>,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    /// Create a new mailer from the optional SMTP configuration
    pub fn new(config: Option<EmailConfig>) -> AppResult<Self> {
        let transport = if let Some(ref email) = config {
            let credentials = Credentials::new(email.username.clone(), email.password.clone());

            let transport = if email.use_ssl {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&email.smtp_host)
                    .map_err(|e| AppError::Internal(format!("SMTP setup failed: {}", e)))?
                    .port(email.smtp_port)
                    .credentials(credentials)
                    .build()
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&email.smtp_host)
                    .port(email.smtp_port)
                    .credentials(credentials)
                    .build()
            };

            Some(transport)
        } else {
            None
        };

        Ok(Self { config, transport })
    }

    /// Check if email is configured
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Send a generic HTML email
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let (Some(transport), Some(config)) = (&self.transport, &self.config) else {
            return Err(AppError::Delivery(
                "Email transport is not configured".to_string(),
            ));
        };

        let email = Message::builder()
            .from(
                config
                    .from_address
                    .parse()
                    .map_err(|e| AppError::Delivery(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Delivery(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| AppError::Delivery(format!("Failed to build email: {}", e)))?;

        transport
            .send(email)
            .await
            .map_err(|e| AppError::Delivery(format!("Failed to send email: {}", e)))?;

        tracing::info!("sent email to {}: {}", to, subject);
        Ok(())
    }
}

#[async_trait]
impl EmailNotifier for SmtpMailer {
    async fn send_confirmation_email(
        &self,
        to_email: &str,
        first_name: &str,
        last_name: &str,
        confirmation_link: &str,
    ) -> AppResult<()> {
        let body = format!(
            r#"<html>
<body>
    <p>Dear {} {},</p>
    <p>Thank you for registering. Please confirm your email by clicking the link below:</p>
    <p><a href='{link}'>Confirm your email</a></p>
    <p>If you cannot click the link, please copy and paste the following URL into your browser:</p>
    <p>{link}</p>
    <p>Best regards,<br>Shareon</p>
</body>
</html>"#,
            first_name,
            last_name,
            link = confirmation_link
        );

        self.send_email(to_email, "Please Confirm Your Email Address", &body)
            .await
    }

    async fn send_password_reset_email(&self, to_email: &str, reset_link: &str) -> AppResult<()> {
        let body = format!(
            r#"<html>
<body>
    <p>Dear User,</p>
    <p>You have requested to reset your password. Please reset your password by clicking the link below:</p>
    <p><a href='{link}'>Reset your password</a></p>
    <p>If you cannot click the link, please copy and paste the following URL into your browser:</p>
    <p>{link}</p>
    <p>Best regards,<br>Shareon</p>
</body>
</html>"#,
            link = reset_link
        );

        self.send_email(to_email, "Reset Your Password", &body).await
    }
}
