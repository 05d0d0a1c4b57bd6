//! Email delivery contract.
//!
//! The transport is an external collaborator invoked with
//! (recipient, template, context). Delivery failures propagate to the
//! caller; they are never silently swallowed, and they never roll back
//! state that was already committed before the send.

use serde_json::json;
use thiserror::Error;

/// Site name used in email contexts.
pub const SITE_NAME: &str = "Agromart";

/// Email send failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("email delivery failed to {recipient}: {reason}")]
pub struct DeliveryError {
    /// Intended recipient.
    pub recipient: String,
    /// Transport-reported reason.
    pub reason: String,
}

impl DeliveryError {
    pub fn new(recipient: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            reason: reason.into(),
        }
    }
}

/// Known email templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailTemplate {
    /// Email-address verification link.
    Verification,
    /// Post-verification welcome.
    Welcome,
}

impl EmailTemplate {
    /// Template name handed to the transport.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailTemplate::Verification => "verification_email",
            EmailTemplate::Welcome => "welcome_email",
        }
    }

    /// Subject line for this template.
    pub fn subject(&self) -> String {
        match self {
            EmailTemplate::Verification => format!("Verify Your Email - {}", SITE_NAME),
            EmailTemplate::Welcome => format!("Welcome to {}!", SITE_NAME),
        }
    }
}

/// Email transport collaborator.
pub trait Mailer {
    /// Send `template` rendered with `context` to `recipient`.
    fn send(
        &self,
        recipient: &str,
        template: EmailTemplate,
        context: &serde_json::Value,
    ) -> Result<(), DeliveryError>;
}

/// Send the email-verification message with its link.
pub fn send_verification_email(
    mailer: &dyn Mailer,
    recipient: &str,
    verification_url: &str,
) -> Result<(), DeliveryError> {
    let context = json!({
        "verification_url": verification_url,
        "site_name": SITE_NAME,
    });
    mailer.send(recipient, EmailTemplate::Verification, &context)
}

/// Send the welcome message after a successful verification.
pub fn send_welcome_email(mailer: &dyn Mailer, recipient: &str) -> Result<(), DeliveryError> {
    let context = json!({
        "site_name": SITE_NAME,
    });
    mailer.send(recipient, EmailTemplate::Welcome, &context)
}
