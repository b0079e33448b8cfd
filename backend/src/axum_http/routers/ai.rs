use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};

use crate::auth::AuthUser;
use crate::axum_http::error_responses::error_response;
use crate::usecases::ai::{AiUseCase, LlmGateway};
use crates::{
    ai::llm_client::LlmClient,
    domain::value_objects::ai::{ChatRequest, ChatResponse, SummarizeRequest, SummarizeResponse},
};

pub fn routes(llm_client: Arc<LlmClient>) -> Router {
    let ai_usecase = AiUseCase::new(llm_client);

    Router::new()
        .route("/chat", post(chat))
        .route("/summarize", post(summarize))
        .with_state(Arc::new(ai_usecase))
}

pub async fn chat<L>(
    State(ai_usecase): State<Arc<AiUseCase<L>>>,
    _auth: AuthUser,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse
where
    L: LlmGateway + Send + Sync + 'static,
{
    match ai_usecase.chat(request).await {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse { reply })).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn summarize<L>(
    State(ai_usecase): State<Arc<AiUseCase<L>>>,
    _auth: AuthUser,
    Json(request): Json<SummarizeRequest>,
) -> impl IntoResponse
where
    L: LlmGateway + Send + Sync + 'static,
{
    match ai_usecase.summarize(request).await {
        Ok(summary) => (StatusCode::OK, Json(SummarizeResponse { summary })).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
