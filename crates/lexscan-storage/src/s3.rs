use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info, warn};

use lexscan_core::document::{DocumentReference, ObjectStore};
use lexscan_core::error::{LexError, Result};

/// Timeout for a single S3 request (seconds).
const S3_TIMEOUT_SECS: u64 = 60;

pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

/// Wrap an S3 call with a timeout, converting the timeout to LexError::Service.
async fn timed<T, F: Future<Output = T>>(op: F) -> Result<T> {
    tokio::time::timeout(Duration::from_secs(S3_TIMEOUT_SECS), op)
        .await
        .map_err(|_| {
            warn!("S3 operation timed out after {}s", S3_TIMEOUT_SECS);
            LexError::Service(format!("S3 operation timed out after {}s", S3_TIMEOUT_SECS))
        })
}

fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn exists(&self, reference: &DocumentReference) -> Result<bool> {
        let result = timed(
            self.client
                .head_object()
                .bucket(&reference.container)
                .key(&reference.key)
                .send(),
        )
        .await?;

        match result {
            Ok(_) => {
                debug!(document = %reference, "Object exists");
                Ok(true)
            }
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => {
                debug!(document = %reference, "Object not found");
                Ok(false)
            }
            Err(e) => Err(LexError::Service(format!(
                "HeadObject failed for {reference}: {}",
                DisplayErrorContext(&e)
            ))),
        }
    }

    async fn put(&self, reference: &DocumentReference, bytes: Vec<u8>) -> Result<()> {
        let size = bytes.len();
        let content_type = content_type_for(&reference.key);

        timed(
            self.client
                .put_object()
                .bucket(&reference.container)
                .key(&reference.key)
                .content_type(&content_type)
                .body(ByteStream::from(bytes))
                .send(),
        )
        .await?
        .map_err(|e| {
            LexError::Service(format!(
                "PutObject failed for {reference}: {}",
                DisplayErrorContext(&e)
            ))
        })?;

        info!(document = %reference, size_bytes = size, content_type = %content_type, "Uploaded document");
        Ok(())
    }

    async fn get(&self, reference: &DocumentReference) -> Result<Vec<u8>> {
        let output = timed(
            self.client
                .get_object()
                .bucket(&reference.container)
                .key(&reference.key)
                .send(),
        )
        .await?
        .map_err(|e| {
            if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                LexError::ReferenceNotFound {
                    container: reference.container.clone(),
                    key: reference.key.clone(),
                }
            } else {
                LexError::Service(format!(
                    "GetObject failed for {reference}: {}",
                    DisplayErrorContext(&e)
                ))
            }
        })?;

        let bytes = timed(output.body.collect())
            .await?
            .map_err(|e| LexError::Service(format!("reading {reference} failed: {e}")))?
            .into_bytes()
            .to_vec();

        debug!(document = %reference, size_bytes = bytes.len(), "Downloaded document");
        Ok(bytes)
    }
}
