use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{Client as S3Client, primitives::ByteStream};

use super::ObjectStore;
use crate::{Error, Res};

/// Object store backed by Amazon S3 or an S3-compatible service.
pub struct S3Store {
    client: S3Client,
}

impl S3Store {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Builds a client from the default AWS credential chain.
    ///
    /// `region` overrides the region from the environment; `endpoint`
    /// points the client at an S3-compatible service and switches to
    /// path-style addressing.
    pub async fn connect(region: Option<String>, endpoint: Option<String>) -> Self {
        let mut aws_config = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            aws_config = aws_config.region(aws_sdk_s3::config::Region::new(region));
        }
        let aws_config = aws_config.load().await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&aws_config);
        if let Some(endpoint) = endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(S3Client::from_conf(s3_config.build()))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, bucket: &str, key: &str) -> Res<Option<Vec<u8>>> {
        let response = self.client.get_object().bucket(bucket).key(key).send().await;

        let output = match response {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(Error::Storage(format!(
                    "get s3://{bucket}/{key} failed: {service_err}"
                )));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| Error::Storage(format!("read s3://{bucket}/{key} failed: {e}")))?;
        Ok(Some(body.into_bytes().to_vec()))
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Res<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| {
                Error::Storage(format!(
                    "put s3://{bucket}/{key} failed: {}",
                    e.into_service_error()
                ))
            })?;
        Ok(())
    }
}
