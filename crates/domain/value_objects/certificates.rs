use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Joined certificate + owner profile + course row used by the public
/// verification endpoint and the PDF renderer.
#[derive(Debug, Clone)]
pub struct CertificateVerificationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub verification_code: String,
    pub score: Option<i32>,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub certificate_url: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub student_full_name: Option<String>,
    pub student_email: Option<String>,
    pub course_title: String,
}

impl CertificateVerificationRecord {
    /// Display-name fallback chain: profile name, then the email local
    /// part, then a generic placeholder.
    pub fn student_display_name(&self) -> String {
        if let Some(name) = self
            .student_full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            return name.to_string();
        }

        if let Some(email) = self.student_email.as_deref() {
            if let Some(local) = email.split('@').next().filter(|local| !local.is_empty()) {
                return local.to_string();
            }
        }

        "Certificate Holder".to_string()
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CertificateVerificationDto {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CertificateVerificationDto {
    pub fn invalid(message: &str) -> Self {
        Self {
            valid: false,
            student_name: None,
            course: None,
            score: None,
            issued_at: None,
            certificate_url: None,
            message: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CertificateDto {
    pub id: Uuid,
    pub course_id: Uuid,
    pub verification_code: String,
    pub score: Option<i32>,
    pub verified: bool,
    pub certificate_url: Option<String>,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct GeneratePdfResponse {
    pub certificate_url: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadProofRequest {
    pub course_id: Uuid,
    pub filename: String,
    /// Base64-encoded document bytes.
    pub content_base64: String,
}
