use std::{fs, path::Path};

use aws_sdk_s3::{primitives::ByteStream, Client};
use aws_types::SdkConfig;

use crate::{
    aws::is_error_retryable,
    errors::{
        Error::{Other, API},
        Result,
    },
};

/// Implements the S3 operations needed to upload source bundles.
#[derive(Debug, Clone)]
pub struct Manager {
    #[allow(dead_code)]
    shared_config: SdkConfig,
    cli: Client,
}

impl Manager {
    pub fn new(shared_config: &SdkConfig) -> Self {
        let cloned = shared_config.clone();
        let cli = Client::new(shared_config);
        Self {
            shared_config: cloned,
            cli,
        }
    }

    /// Returns "true" if the object exists.
    pub async fn exists(&self, s3_bucket: &str, s3_key: &str) -> Result<bool> {
        let ret = self
            .cli
            .head_object()
            .bucket(s3_bucket)
            .key(s3_key)
            .send()
            .await;
        match ret {
            Ok(_) => Ok(true),
            Err(e) => {
                if let aws_sdk_s3::error::SdkError::ServiceError(se) = &e {
                    if se.err().is_not_found() {
                        log::info!("'s3://{}/{}' does not exist", s3_bucket, s3_key);
                        return Ok(false);
                    }
                }
                Err(API {
                    message: format!("failed head_object {:?}", e),
                    is_retryable: is_error_retryable(&e),
                })
            }
        }
    }

    /// Uploads the file as "s3://{s3_bucket}/{s3_key}".
    pub async fn put_object(&self, file_path: &str, s3_bucket: &str, s3_key: &str) -> Result<()> {
        if !Path::new(file_path).exists() {
            return Err(Other {
                message: format!("file path {} does not exist", file_path),
                is_retryable: false,
            });
        }

        let meta = fs::metadata(file_path).map_err(|e| Other {
            message: format!("failed metadata {}", e),
            is_retryable: false,
        })?;
        log::info!(
            "starting put_object '{}' (size {} bytes) to 's3://{}/{}'",
            file_path,
            meta.len(),
            s3_bucket,
            s3_key
        );

        let byte_stream = ByteStream::from_path(Path::new(file_path))
            .await
            .map_err(|e| Other {
                message: format!("failed ByteStream::from_file {}", e),
                is_retryable: false,
            })?;
        self.cli
            .put_object()
            .bucket(s3_bucket)
            .key(s3_key)
            .body(byte_stream)
            .send()
            .await
            .map_err(|e| API {
                message: format!("failed put_object {}", e),
                is_retryable: is_error_retryable(&e),
            })?;

        log::info!("uploaded '{}' to 's3://{}/{}'", file_path, s3_bucket, s3_key);
        Ok(())
    }
}
