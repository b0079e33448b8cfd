use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::error_response;
use crate::usecases::certificates::{
    CertificateError, CertificateUseCase, INVALID_CODE_MESSAGE,
};
use crates::{
    domain::{
        repositories::{certificates::CertificateRepository, storage::CertificateStorageClient},
        value_objects::certificates::{CertificateVerificationDto, UploadProofRequest},
    },
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::certificates::CertificatePostgres,
        },
        storages::supabase_storage::SupabaseStorageClient,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, storage_client: Arc<SupabaseStorageClient>) -> Router {
    let certificate_repository = CertificatePostgres::new(Arc::clone(&db_pool));
    let certificate_usecase =
        CertificateUseCase::new(Arc::new(certificate_repository), storage_client);

    Router::new()
        .route("/", get(list_mine))
        .route("/proof", post(upload_proof))
        .route("/:certificate_id/generate-pdf", post(generate_pdf))
        .with_state(Arc::new(certificate_usecase))
}

/// Public, unauthenticated verification surface nested at the API root.
pub fn public_routes(
    db_pool: Arc<PgPoolSquad>,
    storage_client: Arc<SupabaseStorageClient>,
) -> Router {
    let certificate_repository = CertificatePostgres::new(Arc::clone(&db_pool));
    let certificate_usecase =
        CertificateUseCase::new(Arc::new(certificate_repository), storage_client);

    Router::new()
        .route("/verify-certificate/:code", get(verify))
        .with_state(Arc::new(certificate_usecase))
}

pub async fn list_mine<C, S>(
    State(certificate_usecase): State<Arc<CertificateUseCase<C, S>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    C: CertificateRepository + Send + Sync + 'static,
    S: CertificateStorageClient + Send + Sync + 'static,
{
    match certificate_usecase.list_mine(auth.user_id).await {
        Ok(certificates) => (StatusCode::OK, Json(certificates)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn generate_pdf<C, S>(
    State(certificate_usecase): State<Arc<CertificateUseCase<C, S>>>,
    auth: AuthUser,
    Path(certificate_id): Path<Uuid>,
) -> impl IntoResponse
where
    C: CertificateRepository + Send + Sync + 'static,
    S: CertificateStorageClient + Send + Sync + 'static,
{
    match certificate_usecase
        .generate_pdf(auth.user_id, certificate_id)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn upload_proof<C, S>(
    State(certificate_usecase): State<Arc<CertificateUseCase<C, S>>>,
    auth: AuthUser,
    Json(request): Json<UploadProofRequest>,
) -> impl IntoResponse
where
    C: CertificateRepository + Send + Sync + 'static,
    S: CertificateStorageClient + Send + Sync + 'static,
{
    let bytes = match general_purpose::STANDARD.decode(&request.content_base64) {
        Ok(bytes) => bytes,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "content_base64 is not valid base64".to_string(),
            );
        }
    };

    match certificate_usecase
        .upload_proof(auth.user_id, request.course_id, request.filename, bytes)
        .await
    {
        Ok(certificate) => (StatusCode::CREATED, Json(certificate)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

/// Contract for third-party integrators: malformed and unknown codes both
/// yield a 404 with `{valid: false, message}`, never a bare server error.
pub async fn verify<C, S>(
    State(certificate_usecase): State<Arc<CertificateUseCase<C, S>>>,
    Path(code): Path<String>,
) -> impl IntoResponse
where
    C: CertificateRepository + Send + Sync + 'static,
    S: CertificateStorageClient + Send + Sync + 'static,
{
    match certificate_usecase.verify(&code).await {
        Ok(dto) => (StatusCode::OK, Json(dto)).into_response(),
        Err(CertificateError::NotFound) | Err(CertificateError::InvalidCode) => (
            StatusCode::NOT_FOUND,
            Json(CertificateVerificationDto::invalid(INVALID_CODE_MESSAGE)),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(CertificateVerificationDto::invalid(
                "Verification temporarily unavailable",
            )),
        )
            .into_response(),
    }
}
