use std::sync::OnceLock;

use regex::Regex;

use crate::models::Subscription;
use crate::{Error, Result};

// Good enough for catching typos; real verification happens when the
// reminder email actually gets sent.
fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles"))
}

/// Caller-side validation, run before a subscription reaches the store.
///
/// The store itself never re-validates - it trusts its callers, exactly
/// like the storage engine trusts the store.
pub fn validate(sub: &Subscription) -> Result<()> {
    if sub.name.trim().is_empty() {
        return Err(Error::Validation("name must not be empty".to_string()));
    }

    if !sub.amount.is_finite() || sub.amount <= 0.0 {
        return Err(Error::Validation(format!(
            "amount must be a positive number, got {}",
            sub.amount
        )));
    }

    if sub.email_reminder {
        match &sub.reminder_email {
            Some(email) if email_regex().is_match(email) => {}
            Some(email) => {
                return Err(Error::Validation(format!(
                    "invalid reminder email: {}",
                    email
                )))
            }
            None => {
                return Err(Error::Validation(
                    "email reminders are enabled but no reminder email is set".to_string(),
                ))
            }
        }
    }

    Ok(())
}
