//! SMTP notifier using lettre's async transport.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, warn};

use super::{Notifier, NotifyError};

/// Transport security for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Implicit TLS (usually port 465).
    Tls,
    /// STARTTLS upgrade when offered (usually port 587).
    StartTls,
    None,
}

impl FromStr for TlsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tls" => Ok(TlsMode::Tls),
            "starttls" => Ok(TlsMode::StartTls),
            "none" => Ok(TlsMode::None),
            other => Err(format!(
                "invalid TLS mode '{other}', expected 'tls', 'starttls' or 'none'"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub tls: TlsMode,
    pub timeout: Duration,
}

pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Builds the transport. No connection is made until the first send.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable sender address or TLS setup error.
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::InvalidAddress {
                address: settings.from.clone(),
                reason: e.to_string(),
            })?;

        let tls = match settings.tls {
            TlsMode::Tls => Tls::Wrapper(tls_parameters(&settings.host)?),
            TlsMode::StartTls => Tls::Opportunistic(tls_parameters(&settings.host)?),
            TlsMode::None => Tls::None,
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            .port(settings.port)
            .timeout(Some(settings.timeout))
            .tls(tls);

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }
}

fn tls_parameters(host: &str) -> Result<TlsParameters, NotifyError> {
    TlsParameters::builder(host.to_string())
        .build()
        .map_err(|e| NotifyError::Build(format!("TLS configuration error: {e}")))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::InvalidAddress {
                address: recipient.to_string(),
                reason: e.to_string(),
            })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .singlepart(SinglePart::html(body.to_string()))
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        match self.mailer.send(message).await {
            Ok(response) => {
                debug!(recipient, code = %response.code(), "mail accepted");
                Ok(())
            }
            Err(e) => {
                warn!(recipient, error = %e, "mail delivery failed");
                Err(NotifyError::Transport(e.to_string()))
            }
        }
    }
}
