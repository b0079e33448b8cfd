use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::error_response;
use crate::usecases::payments::{MpesaGateway, PaymentUseCase};
use crates::{
    domain::{
        repositories::payments::PaymentRepository,
        value_objects::payments::{InitiateStkPushRequest, WaitOptions},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::payments::PaymentPostgres,
    },
    payments::mpesa_client::{MpesaClient, StkCallbackEnvelope},
};

const MAX_WAIT_SECS: u64 = 60;

pub fn routes(db_pool: Arc<PgPoolSquad>, mpesa_client: Arc<MpesaClient>) -> Router {
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let payment_usecase = PaymentUseCase::new(Arc::new(payment_repository), mpesa_client);

    Router::new()
        .route("/stk-push", post(initiate_stk_push))
        .route("/callback", post(handle_callback))
        .route("/:transaction_id", get(get_status))
        .route("/:transaction_id/wait", get(wait_for_status))
        .with_state(Arc::new(payment_usecase))
}

pub async fn initiate_stk_push<P, G>(
    State(payment_usecase): State<Arc<PaymentUseCase<P, G>>>,
    auth: AuthUser,
    Json(request): Json<InitiateStkPushRequest>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
    G: MpesaGateway + Send + Sync + 'static,
{
    match payment_usecase
        .initiate_stk_push(auth.user_id, request)
        .await
    {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

/// Unauthenticated webhook target for the Daraja callback. The gateway is
/// always acknowledged with its success envelope.
pub async fn handle_callback<P, G>(
    State(payment_usecase): State<Arc<PaymentUseCase<P, G>>>,
    Json(envelope): Json<StkCallbackEnvelope>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
    G: MpesaGateway + Send + Sync + 'static,
{
    let ack = payment_usecase
        .handle_callback(envelope.body.stk_callback)
        .await;
    (StatusCode::OK, Json(ack)).into_response()
}

pub async fn get_status<P, G>(
    State(payment_usecase): State<Arc<PaymentUseCase<P, G>>>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
    G: MpesaGateway + Send + Sync + 'static,
{
    match payment_usecase.get_status(auth.user_id, transaction_id).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct WaitQuery {
    pub timeout_secs: Option<u64>,
}

pub async fn wait_for_status<P, G>(
    State(payment_usecase): State<Arc<PaymentUseCase<P, G>>>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
    Query(query): Query<WaitQuery>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
    G: MpesaGateway + Send + Sync + 'static,
{
    let mut options = WaitOptions::default();
    if let Some(timeout_secs) = query.timeout_secs {
        options.deadline = Duration::from_secs(timeout_secs.clamp(1, MAX_WAIT_SECS));
    }

    match payment_usecase
        .wait_for_status(auth.user_id, transaction_id, options)
        .await
    {
        Ok(wait) => (StatusCode::OK, Json(wait)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
