//! SMTP delivery of the rendered newsletter.
//!
//! The message is `multipart/alternative`: the plain-text rendition first,
//! the HTML one second, so clients pick the richest part they can show. It is
//! sent over STARTTLS with the sender's credentials.

use crate::config::EmailConfig;
use crate::error::{ConfigError, DeliveryError};
use crate::models::NewsletterDocument;
use crate::outputs::{display_date, html, text};
use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

/// Validated delivery settings.
#[derive(Clone)]
pub struct EmailSettings {
    smtp_server: String,
    smtp_port: u16,
    sender: Mailbox,
    password: String,
    recipients: Vec<Mailbox>,
}

impl std::fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSettings")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("sender", &self.sender)
            .field("recipients", &self.recipients)
            .finish_non_exhaustive()
    }
}

impl EmailSettings {
    /// Check the delivery settings once, before any article is processed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the sender, its password or the
    /// recipient list is missing, and [`ConfigError::InvalidAddress`] when an
    /// address does not parse.
    pub fn from_config(config: &EmailConfig) -> Result<Self, ConfigError> {
        let sender = match config.sender_email.as_deref().map(str::trim) {
            Some(address) if !address.is_empty() => parse_mailbox(address)?,
            _ => {
                return Err(ConfigError::invalid(
                    "email.sender_email",
                    "must be set (or SENDER_EMAIL) to send the newsletter",
                ));
            }
        };
        let password = match config.sender_password.as_deref() {
            Some(password) if !password.is_empty() => password.to_string(),
            _ => {
                return Err(ConfigError::invalid(
                    "email.sender_password",
                    "must be set (or SENDER_PASSWORD) to send the newsletter",
                ));
            }
        };
        if config.recipients.is_empty() {
            return Err(ConfigError::invalid(
                "email.recipients",
                "needs at least one address",
            ));
        }
        let recipients = config
            .recipients
            .iter()
            .map(|r| parse_mailbox(r.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        if config.smtp_server.trim().is_empty() {
            return Err(ConfigError::invalid("email.smtp_server", "must not be empty"));
        }

        Ok(Self {
            smtp_server: config.smtp_server.trim().to_string(),
            smtp_port: config.smtp_port,
            sender,
            password,
            recipients,
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, ConfigError> {
    address
        .parse()
        .map_err(|source| ConfigError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

/// Subject line for the newsletter of `date`, e.g. `Newsletter May 06, 2025`.
pub fn subject(date: NaiveDate) -> String {
    format!("Newsletter {}", display_date(date))
}

/// Assemble the text+HTML message for `doc`.
pub fn build_message(
    settings: &EmailSettings,
    doc: &NewsletterDocument,
    date: NaiveDate,
) -> Result<Message, DeliveryError> {
    let mut builder = Message::builder()
        .from(settings.sender.clone())
        .subject(subject(date));
    for recipient in &settings.recipients {
        builder = builder.to(recipient.clone());
    }

    let body = MultiPart::alternative()
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(text::render_text(doc, date)),
        )
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html::render_html(doc, date)),
        );
    Ok(builder.multipart(body)?)
}

/// Send the newsletter for `date` to every configured recipient.
#[instrument(level = "info", skip_all, fields(server = %settings.smtp_server, recipients = settings.recipients.len()))]
pub async fn send_newsletter(
    settings: &EmailSettings,
    doc: &NewsletterDocument,
    date: NaiveDate,
) -> Result<(), DeliveryError> {
    let message = build_message(settings, doc, date)?;

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_server)?
        .port(settings.smtp_port)
        .credentials(Credentials::new(
            settings.sender.email.to_string(),
            settings.password.clone(),
        ))
        .build();

    info!(subject = %subject(date), "Sending newsletter");
    let response = mailer.send(message).await?;
    info!(code = %response.code(), "Newsletter sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, CategorySection};

    fn email_config() -> EmailConfig {
        EmailConfig {
            sender_email: Some("digest@example.com".into()),
            sender_password: Some("app-password".into()),
            recipients: vec!["reader@example.com".into(), "Second Reader <second@example.org>".into()],
            ..EmailConfig::default()
        }
    }

    fn doc() -> NewsletterDocument {
        NewsletterDocument {
            sections: vec![CategorySection {
                category: "science".into(),
                articles: vec![
                    Article::new("Comet returns", "https://n.test/comet", "Wire", "science", None)
                        .with_summary("Seen at dawn"),
                ],
            }],
        }
    }

    #[test]
    fn test_settings_require_sender_password_and_recipients() {
        let mut config = email_config();
        config.sender_email = None;
        assert!(matches!(
            EmailSettings::from_config(&config),
            Err(ConfigError::Invalid { field: "email.sender_email", .. })
        ));

        let mut config = email_config();
        config.sender_password = Some(String::new());
        assert!(matches!(
            EmailSettings::from_config(&config),
            Err(ConfigError::Invalid { field: "email.sender_password", .. })
        ));

        let mut config = email_config();
        config.recipients.clear();
        assert!(matches!(
            EmailSettings::from_config(&config),
            Err(ConfigError::Invalid { field: "email.recipients", .. })
        ));

        let mut config = email_config();
        config.recipients = vec!["not an address".into()];
        assert!(matches!(
            EmailSettings::from_config(&config),
            Err(ConfigError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_subject_uses_display_date() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
        assert_eq!(subject(date), "Newsletter May 06, 2025");
    }

    #[test]
    fn test_message_is_text_and_html_alternative() {
        let settings = EmailSettings::from_config(&email_config()).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();

        let message = build_message(&settings, &doc(), date).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Newsletter May 06, 2025"));
        assert!(raw.contains("From: digest@example.com"));
        assert!(raw.contains("reader@example.com"));
        assert!(raw.contains("second@example.org"));
        assert!(raw.contains("multipart/alternative"));
        let plain = raw.find("text/plain").unwrap();
        let html = raw.find("text/html").unwrap();
        assert!(plain < html);
        assert_eq!(message.envelope().to().len(), 2);
    }

    #[test]
    fn test_debug_hides_password() {
        let settings = EmailSettings::from_config(&email_config()).unwrap();
        assert!(!format!("{settings:?}").contains("app-password"));
    }
}
