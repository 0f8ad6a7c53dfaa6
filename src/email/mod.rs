pub mod templates;

use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::models::Quote;

/// Tells the operator about a new quote request.
#[async_trait]
pub trait QuoteNotifier: Send + Sync {
    async fn notify_quote(&self, quote: &Quote) -> Result<(), String>;
}

pub struct SystemMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    operator: String,
}

impl SystemMailer {
    /// Port 465 uses implicit TLS, anything else STARTTLS.
    pub fn new(config: &SmtpConfig, operator: &str) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| format!("System SMTP error: {e}"))?;

        let transport = builder.port(config.port).credentials(creds).build();

        Ok(Self {
            transport,
            from: config.from.clone(),
            operator: operator.to_string(),
        })
    }

    async fn send(&self, to: &str, subject: &str, html: String, text: String) -> Result<(), String> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(to.parse().map_err(|e| format!("Invalid to address: {e}"))?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

#[async_trait]
impl QuoteNotifier for SystemMailer {
    async fn notify_quote(&self, quote: &Quote) -> Result<(), String> {
        let subject = format!(
            "New Quote Request from {} {}",
            quote.first_name, quote.last_name
        );
        tracing::info!("Notifying {} of quote {}", self.operator, quote.id);
        self.send(
            &self.operator,
            &subject,
            templates::render_quote_html(quote),
            templates::render_quote_text(quote),
        )
        .await
    }
}
