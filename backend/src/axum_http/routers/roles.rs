use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::auth::AuthUser;
use crate::axum_http::error_responses::error_response;
use crate::usecases::roles::RoleUseCase;
use crates::{
    domain::{
        repositories::roles::RoleRepository,
        value_objects::roles::{CurrentRolesResponse, GrantRoleRequest, RevokeRoleRequest},
    },
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::roles::RolePostgres},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let role_repository = RolePostgres::new(Arc::clone(&db_pool));
    let role_usecase = RoleUseCase::new(Arc::new(role_repository));

    Router::new()
        .route("/me", get(current_roles))
        .route("/grant", post(grant_role))
        .route("/revoke", post(revoke_role))
        .with_state(Arc::new(role_usecase))
}

pub async fn current_roles<R>(
    State(role_usecase): State<Arc<RoleUseCase<R>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    R: RoleRepository + Send + Sync + 'static,
{
    match role_usecase.current_user_roles(auth.user_id).await {
        Ok(roles) => {
            let mut roles: Vec<_> = roles.into_iter().collect();
            roles.sort_by_key(|role| role.as_str());
            (StatusCode::OK, Json(CurrentRolesResponse { roles })).into_response()
        }
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn grant_role<R>(
    State(role_usecase): State<Arc<RoleUseCase<R>>>,
    auth: AuthUser,
    Json(request): Json<GrantRoleRequest>,
) -> impl IntoResponse
where
    R: RoleRepository + Send + Sync + 'static,
{
    match role_usecase
        .grant_role(auth.user_id, request.email, request.role, request.notes)
        .await
    {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn revoke_role<R>(
    State(role_usecase): State<Arc<RoleUseCase<R>>>,
    auth: AuthUser,
    Json(request): Json<RevokeRoleRequest>,
) -> impl IntoResponse
where
    R: RoleRepository + Send + Sync + 'static,
{
    match role_usecase
        .revoke_role(auth.user_id, request.email, request.role)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
