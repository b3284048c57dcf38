use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::error::{AppError, Result};

/// Support codes stay redeemable for this long after issuance.
pub const SUPPORT_CODE_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Number of decimal digits in a support code.
pub const SUPPORT_CODE_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CodeStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportCode {
    pub id: String,
    pub code: String,
    pub status: CodeStatus,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub session_notes: Option<String>,
    pub created_at: i64,
    pub expires_at: i64,
}

impl SupportCode {
    /// Active and not yet expired at `now`. Expiry is never stored as a
    /// status change; it is evaluated here at read time.
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.status == CodeStatus::Active && self.expires_at > now
    }

    pub fn metadata(&self) -> CustomerMetadata {
        CustomerMetadata {
            customer_name: self.customer_name.clone(),
            customer_email: self.customer_email.clone(),
            customer_phone: self.customer_phone.clone(),
            session_notes: self.session_notes.clone(),
        }
    }
}

/// Support code row as shown on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct SupportCodeListing {
    #[serde(flatten)]
    pub code: SupportCode,
    pub is_valid: bool,
}

/// Customer identity attached to a support code and copied onto packages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerMetadata {
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub session_notes: Option<String>,
}

impl CustomerMetadata {
    pub fn named(customer_name: &str) -> Self {
        Self {
            customer_name: customer_name.to_string(),
            ..Default::default()
        }
    }
}

/// Request body for issuing a support code. Every field is optional at the
/// wire level so a missing name surfaces as a validation error, not a JSON
/// rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSupportCode {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub session_notes: Option<String>,
}

impl CreateSupportCode {
    /// Trim every field, drop blank optionals, and require a customer name.
    pub fn into_metadata(self) -> Result<CustomerMetadata> {
        let customer_name = non_blank(self.customer_name)
            .ok_or_else(|| AppError::Validation("Customer name is required".into()))?;

        Ok(CustomerMetadata {
            customer_name,
            customer_email: non_blank(self.customer_email),
            customer_phone: non_blank(self.customer_phone),
            session_notes: non_blank(self.session_notes),
        })
    }
}

impl From<CustomerMetadata> for CreateSupportCode {
    fn from(m: CustomerMetadata) -> Self {
        Self {
            customer_name: Some(m.customer_name),
            customer_email: m.customer_email,
            customer_phone: m.customer_phone,
            session_notes: m.session_notes,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
