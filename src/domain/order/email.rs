//! Customer email value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// A syntactically valid email address.
///
/// Only shape is checked: one `@`, a non-empty local part, and a dotted
/// domain without empty labels. Deliverability is the provider's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerEmail(String);

impl CustomerEmail {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let value = raw.as_ref().trim();
        if value.is_empty() {
            return Err(ValidationError::empty_field("customerEmail"));
        }
        if value.len() > 254 || value.chars().any(char::is_whitespace) {
            return Err(invalid("not a valid email address"));
        }

        let (local, domain) = value
            .split_once('@')
            .ok_or_else(|| invalid("missing @ symbol"))?;
        if local.is_empty() || domain.contains('@') {
            return Err(invalid("not a valid email address"));
        }

        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
            return Err(invalid("domain must contain a dot"));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(reason: &str) -> ValidationError {
    ValidationError::invalid_format("customerEmail", reason)
}

impl TryFrom<String> for CustomerEmail {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CustomerEmail> for String {
    fn from(email: CustomerEmail) -> Self {
        email.0
    }
}

impl fmt::Display for CustomerEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
