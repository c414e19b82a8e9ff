// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP delivery via lettre's async transport (STARTTLS).

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reclaim_config::SmtpConfig;
use reclaim_core::{
    AdapterType, HealthStatus, MessageTransport, OutboundEmail, PluginAdapter, ReclaimError,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

/// Login for the relay. The password never appears in `Debug` output.
#[derive(Debug)]
pub struct SmtpLogin {
    pub username: String,
    pub password: SecretString,
}

pub struct SmtpTransport {
    host: String,
    from: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Build a STARTTLS transport. No connection is made until the first send.
    pub fn new(
        host: &str,
        port: u16,
        login: Option<SmtpLogin>,
        from: &str,
    ) -> Result<Self, ReclaimError> {
        let from: Mailbox = from
            .parse()
            .map_err(|e| ReclaimError::Config(format!("invalid smtp.from_address `{from}`: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| ReclaimError::Config(format!("invalid smtp.host `{host}`: {e}")))?
            .port(port);
        if let Some(login) = login {
            builder = builder.credentials(Credentials::new(
                login.username,
                login.password.expose_secret().to_string(),
            ));
        }

        Ok(Self {
            host: host.to_string(),
            from,
            mailer: builder.build(),
        })
    }

    /// Build from the `[smtp]` section. Host and sender are required.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, ReclaimError> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| ReclaimError::Config("smtp.host is required".into()))?;
        let from = config
            .from_address
            .as_deref()
            .ok_or_else(|| ReclaimError::Config("smtp.from_address is required".into()))?;
        let login = config.username.clone().map(|username| SmtpLogin {
            username,
            password: SecretString::from(config.password.clone().unwrap_or_default()),
        });
        Self::new(host, config.port, login, from)
    }
}

/// Render a reminder as a plain-text MIME message.
pub fn build_message(from: &Mailbox, email: &OutboundEmail) -> Result<Message, ReclaimError> {
    let to: Mailbox = email.recipient.parse().map_err(|e| ReclaimError::Transport {
        message: format!("invalid recipient `{}`", email.recipient),
        source: Some(Box::new(e)),
    })?;
    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|e| ReclaimError::Transport {
            message: "failed to build message".into(),
            source: Some(Box::new(e)),
        })
}

#[async_trait]
impl PluginAdapter for SmtpTransport {
    fn name(&self) -> &str {
        "smtp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, ReclaimError> {
        match self.mailer.test_connection().await {
            Ok(true) => Ok(HealthStatus::Healthy),
            Ok(false) => Ok(HealthStatus::Degraded(format!(
                "{} did not answer NOOP",
                self.host
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), ReclaimError> {
        Ok(())
    }
}

#[async_trait]
impl MessageTransport for SmtpTransport {
    async fn send(&self, message: &OutboundEmail) -> Result<(), ReclaimError> {
        let email = build_message(&self.from, message)?;
        let response = self
            .mailer
            .send(email)
            .await
            .map_err(|e| ReclaimError::Transport {
                message: format!("smtp delivery to {} failed", self.host),
                source: Some(Box::new(e)),
            })?;
        debug!(code = %response.code(), "smtp accepted message");
        info!(recipient = %message.recipient, "reminder handed to smtp relay");
        Ok(())
    }
}
