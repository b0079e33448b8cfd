use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    error::{ProvideErrorMetadata, SdkError},
    operation::put_object::PutObjectError,
    primitives::ByteStream,
};
use uuid::Uuid;

use crate::domain::repositories::storage::CertificateStorageClient;

use super::s3::{S3Config, build_s3_client};

#[derive(Debug, Clone)]
pub struct SupabaseStorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Base project URL used to assemble public object URLs.
    pub project_url: String,
}

pub struct SupabaseStorageClient {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl SupabaseStorageClient {
    pub async fn new(config: SupabaseStorageConfig) -> Result<Self> {
        let client = build_s3_client(&S3Config::new(
            config.endpoint,
            config.region,
            config.access_key,
            config.secret_key,
        ))
        .await
        .context("failed to build Supabase s3 client")?;

        let public_base_url = format!(
            "{}/storage/v1/object/public/{}",
            config.project_url.trim_end_matches('/'),
            config.bucket
        );

        Ok(Self {
            client,
            bucket: config.bucket,
            public_base_url,
        })
    }
}

#[async_trait]
impl CertificateStorageClient for SupabaseStorageClient {
    /// Supabase Storage S3-compatible API reference:
    /// https://supabase.com/docs/guides/storage/s3/compatibility
    async fn upload_certificate(
        &self,
        owner_id: Uuid,
        filename: String,
        bytes: Vec<u8>,
        content_type: String,
    ) -> Result<String> {
        let object_key = format!("{}/{}", owner_id, filename);
        let body = ByteStream::from(bytes);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(body)
            .content_type(&content_type)
            .send()
            .await
            .map_err(|err| map_put_object_error(err, &self.bucket, &object_key))?;

        Ok(format!("{}/{}", self.public_base_url, object_key))
    }
}

fn map_put_object_error(
    err: SdkError<PutObjectError>,
    bucket: &str,
    object_key: &str,
) -> anyhow::Error {
    if let SdkError::ServiceError(service_err) = &err {
        let raw = service_err.raw();
        let status = raw.status().as_u16();
        let code = service_err.err().code().unwrap_or("unknown");
        let message = service_err.err().message().unwrap_or_default();
        let body = raw
            .body()
            .bytes()
            .map(|b| String::from_utf8_lossy(b).trim().to_owned())
            .filter(|b| !b.is_empty())
            .unwrap_or_default();

        let mut detail = format!(
            "failed to upload certificate to Supabase Storage (status {}, code {})",
            status, code
        );

        if !message.is_empty() {
            detail.push_str(&format!(": {}", message));
        }

        detail.push_str(&format!(" [bucket={}, key={}]", bucket, object_key));

        if !body.is_empty() {
            // Keep a short preview of the response body for debugging.
            let preview = body.chars().take(512).collect::<String>();
            detail.push_str(&format!("; body={}", preview));
        }

        return anyhow::anyhow!(detail);
    }

    anyhow::Error::new(err).context("failed to upload certificate to Supabase Storage")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::storage::CertificateStorageClient;
    use anyhow::{Context, Result};
    use std::path::{Path, PathBuf};
    use tokio::fs;
    use uuid::Uuid;

    fn workspace_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .expect("workspace root should exist")
            .to_path_buf()
    }

    fn load_supabase_config_from_env() -> SupabaseStorageConfig {
        dotenvy::dotenv().ok();

        let project_url =
            std::env::var("SUPABASE_PROJECT_URL").expect("SUPABASE_PROJECT_URL is required");
        let endpoint = std::env::var("SUPABASE_S3_ENDPOINT").unwrap_or_else(|_| {
            format!("{}/storage/v1/s3", project_url.trim_end_matches('/'))
        });

        SupabaseStorageConfig {
            endpoint,
            region: std::env::var("SUPABASE_S3_REGION").expect("SUPABASE_S3_REGION is required"),
            bucket: std::env::var("SUPABASE_CERTIFICATE_BUCKET")
                .unwrap_or_else(|_| "certificates".into()),
            access_key: std::env::var("SUPABASE_S3_ACCESS_KEY_ID")
                .expect("SUPABASE_S3_ACCESS_KEY_ID is required"),
            secret_key: std::env::var("SUPABASE_S3_SECRET_ACCESS_KEY")
                .expect("SUPABASE_S3_SECRET_ACCESS_KEY is required"),
            project_url,
        }
    }

    // Manual check: place a PDF named `test-certificate.pdf` in the repo root,
    // export the Supabase S3 credentials, then run:
    // cargo test -p crates supabase_storage::tests::upload_certificate_pdf -- --ignored --nocapture
    #[tokio::test]
    #[ignore = "hits real Supabase Storage and needs local test file + credentials"]
    async fn upload_certificate_pdf() -> Result<()> {
        let pdf_path = workspace_root().join("test-certificate.pdf");
        if !pdf_path.exists() {
            anyhow::bail!("place `test-certificate.pdf` in the project root to run this test");
        }

        let bytes = fs::read(&pdf_path)
            .await
            .with_context(|| format!("failed to read {:?}", pdf_path))?;

        let client = SupabaseStorageClient::new(load_supabase_config_from_env()).await?;
        let public_url = client
            .upload_certificate(
                Uuid::new_v4(),
                "certificate-test.pdf".to_string(),
                bytes,
                "application/pdf".to_string(),
            )
            .await?;
        println!("uploaded certificate to {}", public_url);

        Ok(())
    }
}
