use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Status given to inquiries submitted through the contact form.
pub const NEW_INQUIRY_STATUS: &str = "New";

/// Message left through the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ContactInquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub service: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContactInquiry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub service: Option<String>,
}

/// Contact form submission
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ContactRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 5000, message = "message is required"))]
    pub message: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl ContactRequest {
    /// Trimmed values ready for storage
    pub fn into_new_inquiry(self) -> NewContactInquiry {
        NewContactInquiry {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.map(|p| p.trim().to_string()).unwrap_or_default(),
            message: self.message.trim().to_string(),
            service: self
                .service
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateInquiryStatusRequest {
    pub id: Uuid,
    #[validate(length(min = 1, max = 50, message = "status is required"))]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_missing_fields_fail_validation() {
        let req: ContactRequest = serde_json::from_value(serde_json::json!({
            "email": "client@example.com"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("message"));
    }

    #[test]
    fn test_invalid_email_fails_validation() {
        let req = ContactRequest {
            name: "Asha".to_string(),
            email: "not-an-email".to_string(),
            phone: None,
            message: "Need a kitchen redesign".to_string(),
            service: None,
        };
        assert!(req.validate().unwrap_err().field_errors().contains_key("email"));
    }

    #[test]
    fn test_into_new_inquiry_trims_and_defaults_phone() {
        let req = ContactRequest {
            name: " Asha ".to_string(),
            email: "asha@example.com ".to_string(),
            phone: None,
            message: " Hello ".to_string(),
            service: Some("  ".to_string()),
        };
        let inquiry = req.into_new_inquiry();
        assert_eq!(inquiry.name, "Asha");
        assert_eq!(inquiry.email, "asha@example.com");
        assert_eq!(inquiry.phone, "");
        assert_eq!(inquiry.service, None);
    }
}
