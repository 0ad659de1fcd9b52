//! Channel publisher.

use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{config::PubSubConfig, Error};

type Result<T> = std::result::Result<T, Error>;

/// Publishes raw or JSON payloads to namespaced channels.
#[derive(Clone)]
pub struct Publisher {
    connection: ConnectionManager,
    namespace: String,
}

impl Publisher {
    /// Connect and validate. Construction is a hard failure on invalid
    /// configuration or an unreachable broker.
    #[instrument(skip(config))]
    pub async fn connect(config: PubSubConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::open(config.connection.to_url())?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self {
            connection,
            namespace: config.channel_namespace,
        })
    }

    fn full_channel(&self, channel: &str) -> String {
        format!("{}::{}", self.namespace, channel)
    }

    /// Publish a raw byte payload. Returns the number of subscribers that
    /// received it.
    pub async fn publish(&self, channel: &str, payload: &[u8]) -> Result<i64> {
        let mut conn = self.connection.clone();
        let receivers: i64 = conn.publish(self.full_channel(channel), payload).await?;
        debug!(channel = %self.full_channel(channel), receivers, "published");
        Ok(receivers)
    }

    /// Serialize `value` as JSON and publish it.
    pub async fn publish_json<T: Serialize>(&self, channel: &str, value: &T) -> Result<i64> {
        let serialized = serde_json::to_vec(value)?;
        self.publish(channel, &serialized).await
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("namespace", &self.namespace)
            .finish()
    }
}
