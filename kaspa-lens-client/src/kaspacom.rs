use crate::{ClientError, UpstreamClient};
use serde_json::Value;

// api.kaspa.com
#[derive(Debug, Clone)]
pub struct KaspaComClient {
    client: UpstreamClient,
}

impl KaspaComClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>) -> Self {
        KaspaComClient {
            client: UpstreamClient::new(http, base),
        }
    }

    pub async fn krc20_tokens(&self) -> Result<Vec<Value>, ClientError> {
        self.client
            .get_json(
                &["krc20"],
                &[
                    ("skip", "0".to_string()),
                    ("limit", "100".to_string()),
                    ("timeInterval", "1d".to_string()),
                ],
            )
            .await
    }

    pub async fn krc721_holders(&self, tick: &str) -> Result<Value, ClientError> {
        self.client.get_json(&["krc721", tick], &[]).await
    }
}
