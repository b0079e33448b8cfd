use std::sync::Arc;

use chrono::Utc;
use crates::{
    documents::certificate_pdf::{CertificateRender, render_certificate},
    domain::{
        entities::certificates::{CertificateEntity, InsertCertificateEntity},
        repositories::{certificates::CertificateRepository, storage::CertificateStorageClient},
        value_objects::certificates::{
            CertificateDto, CertificateVerificationDto, GeneratePdfResponse,
        },
    },
    infra::storages::guess_content_type,
};
use rand::Rng;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const VERIFICATION_CODE_PREFIX: &str = "SOMA-";
const VERIFICATION_CODE_LEN: usize = 10;
const VERIFICATION_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Message returned for any code that cannot be resolved, malformed or
/// unknown alike, so the public endpoint never leaks which it was.
pub const INVALID_CODE_MESSAGE: &str = "Certificate not found or invalid";

pub fn generate_verification_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..VERIFICATION_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..VERIFICATION_CODE_CHARSET.len());
            VERIFICATION_CODE_CHARSET[idx] as char
        })
        .collect();
    format!("{VERIFICATION_CODE_PREFIX}{suffix}")
}

pub fn is_wellformed_code(code: &str) -> bool {
    match code.strip_prefix(VERIFICATION_CODE_PREFIX) {
        Some(suffix) => {
            suffix.len() == VERIFICATION_CODE_LEN
                && suffix
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        }
        None => false,
    }
}

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("certificate not found")]
    NotFound,
    #[error("malformed verification code")]
    InvalidCode,
    #[error("filename must not be empty or contain path separators")]
    InvalidFilename,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CertificateError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CertificateError::NotFound | CertificateError::InvalidCode => StatusCode::NOT_FOUND,
            CertificateError::InvalidFilename => StatusCode::BAD_REQUEST,
            CertificateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CertificateError>;

pub struct CertificateUseCase<C, S>
where
    C: CertificateRepository + Send + Sync + 'static,
    S: CertificateStorageClient + Send + Sync + 'static,
{
    certificate_repository: Arc<C>,
    storage_client: Arc<S>,
}

impl<C, S> CertificateUseCase<C, S>
where
    C: CertificateRepository + Send + Sync + 'static,
    S: CertificateStorageClient + Send + Sync + 'static,
{
    pub fn new(certificate_repository: Arc<C>, storage_client: Arc<S>) -> Self {
        Self {
            certificate_repository,
            storage_client,
        }
    }

    pub async fn list_mine(&self, user_id: Uuid) -> UseCaseResult<Vec<CertificateDto>> {
        let certificates = self
            .certificate_repository
            .list_for_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "certificates: failed to list");
                CertificateError::Internal(err)
            })?;

        Ok(certificates.into_iter().map(certificate_dto).collect())
    }

    /// Renders and stores the PDF for a certificate the caller owns. A
    /// certificate owned by someone else is indistinguishable from a
    /// missing one. The storage upload and the URL update are not atomic;
    /// re-invoking generation recovers from a crash between the two.
    pub async fn generate_pdf(
        &self,
        user_id: Uuid,
        certificate_id: Uuid,
    ) -> UseCaseResult<GeneratePdfResponse> {
        let certificate = self
            .certificate_repository
            .find_owned(certificate_id, user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %certificate_id,
                    db_error = ?err,
                    "certificates: ownership check failed"
                );
                CertificateError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = CertificateError::NotFound;
                warn!(
                    %user_id,
                    %certificate_id,
                    status = err.status_code().as_u16(),
                    "certificates: pdf requested for missing or foreign certificate"
                );
                err
            })?;

        let record = self
            .certificate_repository
            .find_verification_by_code(certificate.verification_code.clone())
            .await
            .map_err(CertificateError::Internal)?
            .ok_or_else(|| {
                CertificateError::Internal(anyhow::anyhow!(
                    "certificate display row missing for code {}",
                    certificate.verification_code
                ))
            })?;

        let render = CertificateRender {
            student_name: record.student_display_name(),
            course_title: record.course_title.clone(),
            score: record.score,
            issued_on: record.issued_at.format("%B %d, %Y").to_string(),
            verification_code: record.verification_code.clone(),
        };

        let bytes = render_certificate(&render).map_err(|err| {
            error!(
                %certificate_id,
                error = ?err,
                "certificates: pdf rendering failed"
            );
            CertificateError::Internal(err)
        })?;

        let filename = format!("certificate-{}.pdf", certificate.verification_code);
        let certificate_url = self
            .storage_client
            .upload_certificate(
                user_id,
                filename,
                bytes,
                "application/pdf".to_string(),
            )
            .await
            .map_err(|err| {
                error!(
                    %certificate_id,
                    error = ?err,
                    "certificates: pdf upload failed"
                );
                CertificateError::Internal(err)
            })?;

        self.certificate_repository
            .set_certificate_url(certificate_id, certificate_url.clone())
            .await
            .map_err(|err| {
                error!(
                    %certificate_id,
                    db_error = ?err,
                    "certificates: failed to store certificate url"
                );
                CertificateError::Internal(err)
            })?;

        info!(%user_id, %certificate_id, "certificates: pdf generated and stored");

        Ok(GeneratePdfResponse { certificate_url })
    }

    /// Public verification: resolves a code to its certificate, stamping
    /// `verified`/`verified_at` on the first successful lookup only.
    /// Repeat lookups return the same payload.
    pub async fn verify(&self, code: &str) -> UseCaseResult<CertificateVerificationDto> {
        if !is_wellformed_code(code) {
            let err = CertificateError::InvalidCode;
            warn!(
                status = err.status_code().as_u16(),
                "certificates: malformed verification code"
            );
            return Err(err);
        }

        let record = self
            .certificate_repository
            .find_verification_by_code(code.to_string())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "certificates: verification lookup failed");
                CertificateError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = CertificateError::NotFound;
                info!(
                    status = err.status_code().as_u16(),
                    "certificates: unknown verification code"
                );
                err
            })?;

        let first_verification = self
            .certificate_repository
            .mark_verified(code.to_string())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "certificates: failed to stamp verification");
                CertificateError::Internal(err)
            })?;

        if first_verification {
            info!(certificate_id = %record.id, "certificates: first verification recorded");
        }

        Ok(CertificateVerificationDto {
            valid: true,
            student_name: Some(record.student_display_name()),
            course: Some(record.course_title.clone()),
            score: record.score,
            issued_at: Some(record.issued_at.format("%B %d, %Y").to_string()),
            certificate_url: record.certificate_url.clone(),
            message: None,
        })
    }

    /// Manual completion-proof upload: stores the document under the
    /// caller's prefix and records a certificate row pointing at it.
    pub async fn upload_proof(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        filename: String,
        bytes: Vec<u8>,
    ) -> UseCaseResult<CertificateDto> {
        if filename.trim().is_empty() || filename.contains('/') || filename.contains('\\') {
            let err = CertificateError::InvalidFilename;
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "certificates: rejected proof filename"
            );
            return Err(err);
        }

        let content_type = guess_content_type(&filename);
        let proof_url = self
            .storage_client
            .upload_certificate(user_id, filename, bytes, content_type)
            .await
            .map_err(|err| {
                error!(%user_id, error = ?err, "certificates: proof upload failed");
                CertificateError::Internal(err)
            })?;

        let existing = self
            .certificate_repository
            .find_for_user_and_course(user_id, course_id)
            .await
            .map_err(CertificateError::Internal)?;

        let certificate_id = match existing.as_ref() {
            Some(certificate) => certificate.id,
            None => self
                .certificate_repository
                .create(InsertCertificateEntity {
                    user_id,
                    course_id,
                    verification_code: generate_verification_code(),
                    score: None,
                    issued_at: Utc::now(),
                })
                .await
                .map_err(|err| {
                    error!(%user_id, db_error = ?err, "certificates: failed to create from proof");
                    CertificateError::Internal(err)
                })?,
        };

        self.certificate_repository
            .set_certificate_url(certificate_id, proof_url.clone())
            .await
            .map_err(CertificateError::Internal)?;

        let certificate = self
            .certificate_repository
            .find_owned(certificate_id, user_id)
            .await
            .map_err(CertificateError::Internal)?
            .ok_or_else(|| {
                CertificateError::Internal(anyhow::anyhow!("certificate row vanished after upload"))
            })?;

        info!(%user_id, %certificate_id, "certificates: proof uploaded");

        Ok(certificate_dto(certificate))
    }
}

fn certificate_dto(certificate: CertificateEntity) -> CertificateDto {
    CertificateDto {
        id: certificate.id,
        course_id: certificate.course_id,
        verification_code: certificate.verification_code,
        score: certificate.score,
        verified: certificate.verified,
        certificate_url: certificate.certificate_url,
        issued_at: certificate.issued_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crates::domain::repositories::certificates::MockCertificateRepository;
    use crates::domain::repositories::storage::MockCertificateStorageClient;
    use crates::domain::value_objects::certificates::CertificateVerificationRecord;

    fn sample_record(code: &str, verified: bool) -> CertificateVerificationRecord {
        CertificateVerificationRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            verification_code: code.to_string(),
            score: Some(87),
            verified,
            verified_at: None,
            certificate_url: Some("https://example.supabase.co/cert.pdf".to_string()),
            issued_at: Utc.with_ymd_and_hms(2026, 1, 12, 8, 0, 0).unwrap(),
            student_full_name: Some("Wanjiku Kamau".to_string()),
            student_email: Some("wanjiku@example.com".to_string()),
            course_title: "Community Health Basics".to_string(),
        }
    }

    #[test]
    fn generated_codes_are_wellformed_and_distinct() {
        let first = generate_verification_code();
        let second = generate_verification_code();

        assert!(is_wellformed_code(&first));
        assert!(is_wellformed_code(&second));
        assert_ne!(first, second);
    }

    #[test]
    fn rejects_malformed_codes() {
        for code in [
            "",
            "SOMA-",
            "SOMA-short",
            "SOMA-AB12CD34EF99",
            "soma-AB12CD34EF",
            "OTHER-B12CD34EF",
            "SOMA-ab12cd34ef",
        ] {
            assert!(!is_wellformed_code(code), "expected {code:?} to be rejected");
        }
        assert!(is_wellformed_code("SOMA-AB12CD34EF"));
    }

    #[tokio::test]
    async fn pdf_generation_for_foreign_certificate_is_not_found() {
        let mut certificate_repo = MockCertificateRepository::new();
        certificate_repo
            .expect_find_owned()
            .returning(|_, _| Ok(None));

        let mut storage = MockCertificateStorageClient::new();
        storage.expect_upload_certificate().never();

        let usecase = CertificateUseCase::new(Arc::new(certificate_repo), Arc::new(storage));
        let result = usecase.generate_pdf(Uuid::new_v4(), Uuid::new_v4()).await;

        assert!(matches!(result, Err(CertificateError::NotFound)));
    }

    #[tokio::test]
    async fn verify_unknown_code_is_not_found_without_mutation() {
        let mut certificate_repo = MockCertificateRepository::new();
        certificate_repo
            .expect_find_verification_by_code()
            .returning(|_| Ok(None));
        certificate_repo.expect_mark_verified().never();

        let storage = MockCertificateStorageClient::new();
        let usecase = CertificateUseCase::new(Arc::new(certificate_repo), Arc::new(storage));

        let result = usecase.verify("SOMA-ZZ99ZZ99ZZ").await;
        assert!(matches!(result, Err(CertificateError::NotFound)));
    }

    #[tokio::test]
    async fn verify_malformed_code_never_touches_repository() {
        let mut certificate_repo = MockCertificateRepository::new();
        certificate_repo.expect_find_verification_by_code().never();
        certificate_repo.expect_mark_verified().never();

        let storage = MockCertificateStorageClient::new();
        let usecase = CertificateUseCase::new(Arc::new(certificate_repo), Arc::new(storage));

        let result = usecase.verify("not-a-code").await;
        assert!(matches!(result, Err(CertificateError::InvalidCode)));
    }

    #[tokio::test]
    async fn repeat_verification_returns_the_same_payload() {
        let code = "SOMA-AB12CD34EF";

        let mut sequence = mockall::Sequence::new();
        let mut certificate_repo = MockCertificateRepository::new();

        let fresh = sample_record(code, false);
        certificate_repo
            .expect_find_verification_by_code()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(move |_| {
                let record = fresh.clone();
                Ok(Some(record))
            });
        certificate_repo
            .expect_mark_verified()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(true));

        let stamped = sample_record(code, true);
        certificate_repo
            .expect_find_verification_by_code()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(move |_| {
                let record = stamped.clone();
                Ok(Some(record))
            });
        // The guarded update is a no-op the second time around.
        certificate_repo
            .expect_mark_verified()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(false));

        let storage = MockCertificateStorageClient::new();
        let usecase = CertificateUseCase::new(Arc::new(certificate_repo), Arc::new(storage));

        let first = usecase.verify(code).await.unwrap();
        let second = usecase.verify(code).await.unwrap();

        assert!(first.valid);
        assert_eq!(first, second);
        assert_eq!(first.student_name.as_deref(), Some("Wanjiku Kamau"));
        assert_eq!(first.course.as_deref(), Some("Community Health Basics"));
    }

    #[tokio::test]
    async fn student_name_falls_back_to_email_local_part() {
        let code = "SOMA-AB12CD34EF";
        let mut record = sample_record(code, false);
        record.student_full_name = None;

        let mut certificate_repo = MockCertificateRepository::new();
        certificate_repo
            .expect_find_verification_by_code()
            .returning(move |_| {
                let record = record.clone();
                Ok(Some(record))
            });
        certificate_repo
            .expect_mark_verified()
            .returning(|_| Ok(true));

        let storage = MockCertificateStorageClient::new();
        let usecase = CertificateUseCase::new(Arc::new(certificate_repo), Arc::new(storage));

        let dto = usecase.verify(code).await.unwrap();
        assert_eq!(dto.student_name.as_deref(), Some("wanjiku"));
    }

    #[tokio::test]
    async fn proof_upload_rejects_path_traversal_filenames() {
        let mut certificate_repo = MockCertificateRepository::new();
        certificate_repo.expect_create().never();

        let mut storage = MockCertificateStorageClient::new();
        storage.expect_upload_certificate().never();

        let usecase = CertificateUseCase::new(Arc::new(certificate_repo), Arc::new(storage));
        let result = usecase
            .upload_proof(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "../escape.pdf".to_string(),
                vec![1, 2, 3],
            )
            .await;

        assert!(matches!(result, Err(CertificateError::InvalidFilename)));
    }
}
