use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::certificates::{CertificateEntity, InsertCertificateEntity};
use crate::domain::value_objects::certificates::CertificateVerificationRecord;

#[mockall::automock]
#[async_trait]
pub trait CertificateRepository {
    async fn create(&self, insert_certificate_entity: InsertCertificateEntity) -> Result<Uuid>;

    /// Restricted read: only returns the row when it belongs to `user_id`.
    async fn find_owned(
        &self,
        certificate_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CertificateEntity>>;

    async fn find_for_user_and_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<CertificateEntity>>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CertificateEntity>>;

    /// Joined view (owner profile + course title) for verification and
    /// PDF rendering.
    async fn find_verification_by_code(
        &self,
        verification_code: String,
    ) -> Result<Option<CertificateVerificationRecord>>;

    /// Flips `verified` and stamps `verified_at`, but only on a row that
    /// has never been verified. Returns true when this call did the stamp.
    async fn mark_verified(&self, verification_code: String) -> Result<bool>;

    async fn set_certificate_url(&self, certificate_id: Uuid, url: String) -> Result<()>;
}
