//! Contact inquiry notifications via SMTP.

use std::sync::Arc;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use utkrisht_core::models::ContactInquiry;
use utkrisht_core::Config;

const IMPLICIT_TLS_PORT: u16 = 465;

/// Sends contact-form notifications to the site owner.
/// Absent unless host, credentials and a recipient are all configured.
#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    to: String,
}

impl EmailService {
    pub fn from_config(config: &Config) -> Option<Self> {
        let smtp = config.smtp();
        if !smtp.is_configured() {
            tracing::debug!("SMTP not configured, contact notifications disabled");
            return None;
        }
        let host = smtp.host.as_deref()?;
        let user = smtp.user.clone()?;
        let password = smtp.password.clone()?;
        let to = smtp.contact_email.clone()?;
        let from = smtp.contact_from.clone().unwrap_or_else(|| user.clone());
        let credentials = Credentials::new(user, password);

        let mailer = if smtp.port == IMPLICIT_TLS_PORT {
            match AsyncSmtpTransport::<Tokio1Executor>::relay(host) {
                Ok(b) => b.port(smtp.port).credentials(credentials).build(),
                Err(err) => {
                    tracing::warn!(host = %host, error = %err, "Invalid SMTP relay");
                    return None;
                }
            }
        } else if smtp.tls {
            match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host) {
                Ok(b) => b.port(smtp.port).credentials(credentials).build(),
                Err(err) => {
                    tracing::warn!(host = %host, error = %err, "Invalid SMTP relay");
                    return None;
                }
            }
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(smtp.port)
                .credentials(credentials)
                .build()
        };

        tracing::info!(host = %host, port = smtp.port, "Email service initialized (SMTP)");
        Some(Self {
            mailer: Arc::new(mailer),
            from,
            to,
        })
    }

    pub async fn notify_inquiry(&self, inquiry: &ContactInquiry) -> Result<(), String> {
        let email = inquiry_message(&self.from, &self.to, inquiry)?;
        self.mailer.send(email).await.map_err(|e| e.to_string())?;
        tracing::info!(inquiry_id = %inquiry.id, "Contact notification sent");
        Ok(())
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

pub(crate) fn inquiry_subject(inquiry: &ContactInquiry) -> String {
    format!("New Contact Inquiry from {}", inquiry.name)
}

pub(crate) fn inquiry_body(inquiry: &ContactInquiry) -> String {
    format!(
        "New inquiry received.\n\nName: {}\nEmail: {}\nPhone: {}\nService: {}\n\nMessage:\n{}",
        inquiry.name,
        inquiry.email,
        or_dash(Some(inquiry.phone.as_str())),
        or_dash(inquiry.service.as_deref()),
        inquiry.message
    )
}

fn inquiry_message(from: &str, to: &str, inquiry: &ContactInquiry) -> Result<Message, String> {
    let from: Mailbox = from
        .parse()
        .map_err(|e| format!("Invalid CONTACT_FROM: {}", e))?;
    let to: Mailbox = to
        .parse()
        .map_err(|e| format!("Invalid CONTACT_EMAIL: {}", e))?;

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(inquiry_subject(inquiry));
    if let Ok(reply_to) = inquiry.email.parse::<Mailbox>() {
        builder = builder.reply_to(reply_to);
    }
    builder
        .header(ContentType::TEXT_PLAIN)
        .body(inquiry_body(inquiry))
        .map_err(|e| e.to_string())
}
