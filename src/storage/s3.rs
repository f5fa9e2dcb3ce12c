//! S3 storage root.
//!
//! Credentials come from the default AWS provider chain, which sees the keys
//! exported from the credentials file at startup.

use super::{join_key, Storage};
use crate::config::S3Settings;
use crate::error::{EtlError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, Error as S3Error, ObjectIdentifier};
use aws_sdk_s3::Client;
use std::fmt::{self, Debug};
use tracing::debug;

/// DeleteObjects accepts at most this many keys per request.
const DELETE_BATCH_SIZE: usize = 1000;

#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    /// Key prefix of the root inside the bucket, without surrounding slashes.
    prefix: String,
}

impl Debug for S3Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Storage")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl S3Storage {
    pub async fn connect(bucket: String, prefix: String, settings: &S3Settings) -> Result<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        if settings.force_path_style {
            builder = builder.force_path_style(true);
        }

        debug!("Connected S3 client for bucket {}", bucket);
        Ok(Self::from_client(
            Client::from_conf(builder.build()),
            bucket,
            prefix,
        ))
    }

    pub fn from_client(client: Client, bucket: String, prefix: String) -> Self {
        Self {
            client,
            bucket,
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    fn to_object_key(&self, key: &str) -> String {
        join_key(&self.prefix, key)
    }

    fn to_relative_key(&self, object_key: &str) -> String {
        if self.prefix.is_empty() {
            return object_key.to_string();
        }
        object_key
            .strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(object_key)
            .to_string()
    }
}

/// Summarizes per-key DeleteObjects failures, `None` when every key went.
fn describe_delete_errors(errors: &[S3Error]) -> Option<String> {
    let first = errors.first()?;
    Some(format!(
        "{} of the keys could not be deleted, first {}: {} ({})",
        errors.len(),
        first.key().unwrap_or("<unknown key>"),
        first.code().unwrap_or("UnknownError"),
        first.message().unwrap_or("no message"),
    ))
}

#[async_trait]
impl Storage for S3Storage {
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let full_prefix = self.to_object_key(prefix);
        let mut keys = Vec::new();
        let mut continuation_token = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&full_prefix);
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| EtlError::storage(self.uri_for(prefix), DisplayErrorContext(&e)))?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    // Zero-byte "directory" markers are not files
                    if !key.ends_with('/') {
                        keys.push(self.to_relative_key(key));
                    }
                }
            }

            match response.next_continuation_token() {
                Some(token) => continuation_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(keys)
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.to_object_key(key))
            .send()
            .await
            .map_err(|e| EtlError::storage(self.uri_for(key), DisplayErrorContext(&e)))?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| EtlError::storage(self.uri_for(key), e))?
            .into_bytes()
            .to_vec();
        Ok(bytes)
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.to_object_key(key))
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| EtlError::storage(self.uri_for(key), DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let keys = self.list_prefix(prefix).await?;

        for chunk in keys.chunks(DELETE_BATCH_SIZE) {
            let objects = chunk
                .iter()
                .map(|key| {
                    ObjectIdentifier::builder()
                        .key(self.to_object_key(key))
                        .build()
                        .map_err(|e| EtlError::storage(self.uri_for(key), e))
                })
                .collect::<Result<Vec<_>>>()?;
            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| EtlError::storage(self.uri_for(prefix), e))?;

            let response = self
                .client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| EtlError::storage(self.uri_for(prefix), DisplayErrorContext(&e)))?;

            // Quiet mode still answers 200 when single keys fail
            if let Some(reason) = describe_delete_errors(response.errors()) {
                return Err(EtlError::storage(self.uri_for(prefix), reason));
            }
        }

        Ok(keys.len())
    }

    fn uri_for(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, self.to_object_key(key))
    }
}
