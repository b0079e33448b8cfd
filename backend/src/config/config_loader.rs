use anyhow::{Ok, Result};

use super::config_model::{BackendServer, Database, DotEnvyConfig, Llm, Mpesa, Supabase};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: std::env::var("SERVER_PORT_BACKEND")
            .expect("SERVER_PORT_BACKEND is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let project_url =
        std::env::var("SUPABASE_PROJECT_URL").expect("SUPABASE_PROJECT_URL is invalid");
    let supabase = Supabase {
        jwt_secret: std::env::var("SUPABASE_JWT_SECRET").expect("SUPABASE_JWT_SECRET is invalid"),
        certificate_bucket: std::env::var("SUPABASE_CERTIFICATE_BUCKET")
            .unwrap_or_else(|_| "certificates".to_string()),
        s3_endpoint: std::env::var("SUPABASE_S3_ENDPOINT").unwrap_or_else(|_| {
            format!("{}/storage/v1/s3", project_url.trim_end_matches('/'))
        }),
        s3_region: std::env::var("SUPABASE_S3_REGION")
            .unwrap_or_else(|_| "us-east-1".to_string()),
        s3_access_key: std::env::var("SUPABASE_S3_ACCESS_KEY_ID")
            .expect("SUPABASE_S3_ACCESS_KEY_ID is invalid"),
        s3_secret_key: std::env::var("SUPABASE_S3_SECRET_ACCESS_KEY")
            .expect("SUPABASE_S3_SECRET_ACCESS_KEY is invalid"),
        project_url,
    };

    let mpesa = Mpesa {
        consumer_key: std::env::var("MPESA_CONSUMER_KEY").expect("MPESA_CONSUMER_KEY is invalid"),
        consumer_secret: std::env::var("MPESA_CONSUMER_SECRET")
            .expect("MPESA_CONSUMER_SECRET is invalid"),
        shortcode: std::env::var("MPESA_SHORTCODE").expect("MPESA_SHORTCODE is invalid"),
        passkey: std::env::var("MPESA_PASSKEY").expect("MPESA_PASSKEY is invalid"),
        api_base: std::env::var("MPESA_API_BASE")
            .unwrap_or_else(|_| "https://sandbox.safaricom.co.ke".to_string()),
        callback_url: std::env::var("MPESA_CALLBACK_URL").expect("MPESA_CALLBACK_URL is invalid"),
    };

    let llm = Llm {
        api_key: std::env::var("LLM_API_KEY").expect("LLM_API_KEY is invalid"),
        api_base: std::env::var("LLM_API_BASE")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
        model: std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        supabase,
        mpesa,
        llm,
    })
}
