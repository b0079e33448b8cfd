use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use crates::{
    ai::llm_client::LlmClient,
    infra::db::postgres::postgres_connection::PgPoolSquad,
    infra::storages::supabase_storage::{SupabaseStorageClient, SupabaseStorageConfig},
    payments::mpesa_client::MpesaClient,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let mpesa_client = Arc::new(MpesaClient::new(
        config.mpesa.consumer_key.clone(),
        config.mpesa.consumer_secret.clone(),
        config.mpesa.shortcode.clone(),
        config.mpesa.passkey.clone(),
        config.mpesa.api_base.clone(),
        config.mpesa.callback_url.clone(),
    ));

    let llm_client = Arc::new(LlmClient::new(
        config.llm.api_key.clone(),
        config.llm.api_base.clone(),
        config.llm.model.clone(),
    ));

    let storage_client = Arc::new(
        SupabaseStorageClient::new(SupabaseStorageConfig {
            endpoint: config.supabase.s3_endpoint.clone(),
            region: config.supabase.s3_region.clone(),
            bucket: config.supabase.certificate_bucket.clone(),
            access_key: config.supabase.s3_access_key.clone(),
            secret_key: config.supabase.s3_secret_key.clone(),
            project_url: config.supabase.project_url.clone(),
        })
        .await?,
    );

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/payments",
            routers::payments::routes(Arc::clone(&db_pool), Arc::clone(&mpesa_client)),
        )
        .nest(
            "/api/v1/certificates",
            routers::certificates::routes(Arc::clone(&db_pool), Arc::clone(&storage_client)),
        )
        .merge(routers::certificates::public_routes(
            Arc::clone(&db_pool),
            Arc::clone(&storage_client),
        ))
        .nest("/api/v1/courses", routers::courses::routes(Arc::clone(&db_pool)))
        .nest(
            "/api/v1/health",
            routers::health_plans::routes(Arc::clone(&db_pool), Arc::clone(&llm_client)),
        )
        .nest("/api/v1/ai", routers::ai::routes(Arc::clone(&llm_client)))
        .nest("/api/v1/roles", routers::roles::routes(Arc::clone(&db_pool)))
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any), // TODO Add the domain later
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
