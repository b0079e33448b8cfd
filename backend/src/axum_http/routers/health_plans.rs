use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};

use crate::auth::AuthUser;
use crate::axum_http::error_responses::error_response;
use crate::usecases::{ai::LlmGateway, health_plans::HealthPlanUseCase};
use crates::{
    ai::llm_client::LlmClient,
    domain::{
        repositories::health_plans::HealthPlanRepository,
        value_objects::health_plans::GenerateHealthPlanRequest,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::health_plans::HealthPlanPostgres,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, llm_client: Arc<LlmClient>) -> Router {
    let health_plan_repository = HealthPlanPostgres::new(Arc::clone(&db_pool));
    let health_plan_usecase =
        HealthPlanUseCase::new(Arc::new(health_plan_repository), llm_client);

    Router::new()
        .route("/plans", post(generate_plan).get(list_plans))
        .with_state(Arc::new(health_plan_usecase))
}

pub async fn generate_plan<R, L>(
    State(health_plan_usecase): State<Arc<HealthPlanUseCase<R, L>>>,
    auth: AuthUser,
    Json(request): Json<GenerateHealthPlanRequest>,
) -> impl IntoResponse
where
    R: HealthPlanRepository + Send + Sync + 'static,
    L: LlmGateway + Send + Sync + 'static,
{
    match health_plan_usecase.generate_plan(auth.user_id, request).await {
        Ok(plan) => (StatusCode::CREATED, Json(plan)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn list_plans<R, L>(
    State(health_plan_usecase): State<Arc<HealthPlanUseCase<R, L>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    R: HealthPlanRepository + Send + Sync + 'static,
    L: LlmGateway + Send + Sync + 'static,
{
    match health_plan_usecase.list_plans(auth.user_id).await {
        Ok(plans) => (StatusCode::OK, Json(plans)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
