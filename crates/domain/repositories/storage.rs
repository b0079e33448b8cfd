use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Object storage seam for generated certificate PDFs and uploaded proof
/// documents. Keys follow the `{owner_id}/{filename}` convention; the
/// returned string is the public URL of the stored object.
#[mockall::automock]
#[async_trait]
pub trait CertificateStorageClient {
    async fn upload_certificate(
        &self,
        owner_id: Uuid,
        filename: String,
        bytes: Vec<u8>,
        content_type: String,
    ) -> Result<String>;
}
