//! SQS-compatible client construction.

use aws_sdk_sqs::config::{Builder, Credentials, Region};
use aws_sdk_sqs::Client;

/// Connection settings for the queue service. Mirrors the S3 storage
/// provider's builder shape: region/credentials/endpoint, with an
/// endpoint override for SQS-compatible services run outside AWS
/// (ElasticMQ, LocalStack).
#[derive(Debug, Clone, Default)]
pub struct QueueClientConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint_url: Option<String>,
}

impl QueueClientConfig {
    pub fn from_env() -> Self {
        Self {
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            access_key_id: std::env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
            endpoint_url: std::env::var("SQS_ENDPOINT_URL").ok(),
        }
    }
}

/// Build a queue client from explicit settings, bypassing the ambient AWS
/// credential chain — used for SQS-compatible services and tests.
pub fn build_client(config: &QueueClientConfig) -> Client {
    let mut builder = Builder::new().region(Region::new(config.region.clone()));

    if let (Some(key), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
        let credentials = Credentials::new(key, secret, None, None, "coord-queue");
        builder = builder.credentials_provider(credentials);
    }

    if let Some(endpoint_url) = &config.endpoint_url {
        builder = builder.endpoint_url(endpoint_url);
    }

    Client::from_conf(builder.build())
}

/// Build a queue client from the ambient AWS credential chain
/// (environment, instance profile, SSO) — the normal production path.
pub async fn build_client_from_env() -> Client {
    let shared_config = aws_config::load_from_env().await;
    Client::new(&shared_config)
}
