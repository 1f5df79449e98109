//! Contact form
//!
//! Submission is simulated: a valid form produces a success notice and
//! nothing is sent anywhere.

use crate::cart::sanitize_input;
use crate::error::{ProcurementError, ProcurementResult};
use crate::notify::{NoticeLevel, Notifier};
use regex::Regex;
use tracing::info;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

pub const MISSING_FIELDS: &str = "Please fill in all required fields";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const MESSAGE_SENT: &str = "Thank you! Your message has been sent.";

/// Raw form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// A form that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    /// HTML-escaped
    pub name: String,
    pub email: String,
    /// HTML-escaped
    pub message: String,
}

impl ContactForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Check required fields and the email format
    pub fn validate(&self) -> ProcurementResult<ContactMessage> {
        let name = sanitize_input(self.name.trim());
        let email = self.email.trim().to_string();
        let message = sanitize_input(self.message.trim());

        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(ProcurementError::Validation(MISSING_FIELDS.to_string()));
        }

        if !is_valid_email(&email)? {
            return Err(ProcurementError::Validation(INVALID_EMAIL.to_string()));
        }

        Ok(ContactMessage {
            name,
            email,
            message,
        })
    }

    /// Validate and "send". Validation failures are reported through the
    /// notifier and returned.
    pub fn submit<N: Notifier + ?Sized>(&self, notifier: &N) -> ProcurementResult<ContactMessage> {
        match self.validate() {
            Ok(message) => {
                info!("Contact message from {} accepted", message.email);
                notifier.notify(NoticeLevel::Success, MESSAGE_SENT);
                Ok(message)
            }
            Err(e) => {
                notifier.notify(NoticeLevel::Error, &e.to_string());
                Err(e)
            }
        }
    }
}

/// `local@domain.tld` with no whitespace and a single `@`
pub fn is_valid_email(email: &str) -> ProcurementResult<bool> {
    let re = Regex::new(EMAIL_PATTERN)
        .map_err(|e| ProcurementError::Internal(format!("invalid email pattern: {}", e)))?;
    Ok(re.is_match(email))
}
