//! # Owner Notifications
//!
//! Emails the shop owner when an order is placed. Delivery goes through an
//! SMTP relay with STARTTLS via lettre; the body is an askama template.

use crate::state::SmtpConfig;
use askama::Template;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use shop_core::{BoxedNotifier, DisabledNotifier, Order, OrderNotifier, ShopError, ShopResult};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Subject line of the owner notification
pub fn order_subject(order: &Order) -> String {
    format!("New Order: {}", order.order_number)
}

/// HTML body of the owner notification
#[derive(Template)]
#[template(path = "email/new_order.html")]
struct OrderEmailHtml<'a> {
    order: &'a Order,
}

/// Render the HTML body of the owner notification
pub fn render_order_email(order: &Order) -> ShopResult<String> {
    OrderEmailHtml { order }
        .render()
        .map_err(|e| ShopError::Notification(format!("Template error: {}", e)))
}

/// Sends owner notifications through an SMTP relay
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    owner: Mailbox,
}

impl SmtpNotifier {
    /// Create a notifier for a fully configured relay
    pub fn new(config: &SmtpConfig) -> ShopResult<Self> {
        let from: Mailbox = config
            .user
            .parse()
            .map_err(|_| ShopError::Configuration(format!("Invalid SMTP_USER: {}", config.user)))?;
        let owner: Mailbox = config.owner_email.parse().map_err(|_| {
            ShopError::Configuration(format!("Invalid OWNER_EMAIL: {}", config.owner_email))
        })?;

        let credentials = Credentials::new(config.user.clone(), config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
            .map_err(|e| ShopError::Configuration(format!("Invalid SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from,
            owner,
        })
    }

    /// Pick the notifier for `config`: SMTP when the relay credentials and
    /// the owner address are all present, otherwise one that only warns.
    pub fn from_config(config: &SmtpConfig) -> ShopResult<BoxedNotifier> {
        if !config.is_configured() {
            warn!("SMTP credentials or OWNER_EMAIL not configured; order emails disabled");
            return Ok(Arc::new(DisabledNotifier));
        }
        Ok(Arc::new(Self::new(config)?))
    }

    fn build_message(&self, order: &Order) -> ShopResult<Message> {
        let html = render_order_email(order)?;

        Message::builder()
            .from(self.from.clone())
            .to(self.owner.clone())
            .subject(order_subject(order))
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| ShopError::Notification(e.to_string()))
    }
}

#[async_trait]
impl OrderNotifier for SmtpNotifier {
    #[instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn order_placed(&self, order: &Order) -> ShopResult<()> {
        let message = self.build_message(order)?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| ShopError::Notification(e.to_string()))?;

        info!("Email sent to {}", self.owner);
        Ok(())
    }
}
