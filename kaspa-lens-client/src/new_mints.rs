use crate::{ClientError, UpstreamClient};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

pub const RECENT_MINTS_LIMIT: usize = 1000;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MintsResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub count: u64,
}

// 新铸造监控服务
#[derive(Debug, Clone)]
pub struct NewMintsClient {
    client: UpstreamClient,
}

impl NewMintsClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>) -> Self {
        NewMintsClient {
            client: UpstreamClient::new(http, base),
        }
    }

    pub async fn collections<T: DeserializeOwned>(
        &self,
        tick: Option<&str>,
        limit: Option<usize>,
        all: Option<bool>,
    ) -> Result<MintsResponse<T>, ClientError> {
        let mut query = vec![];
        if let Some(tick) = tick {
            query.push(("tick", tick.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(all) = all {
            query.push(("all", all.to_string()));
        }

        self.client.get_json(&["api", "collections"], &query).await
    }

    pub async fn recent_mints<T: DeserializeOwned>(
        &self,
        tick: Option<&str>,
        limit: Option<usize>,
    ) -> Result<MintsResponse<T>, ClientError> {
        let mut query = vec![];
        if let Some(tick) = tick {
            query.push(("tick", tick.to_string()));
        }
        query.push(("limit", limit.unwrap_or(RECENT_MINTS_LIMIT).to_string()));

        self.client.get_json(&["api", "mints"], &query).await
    }

    pub async fn scan(&self, tick: Option<&str>) -> Result<Value, ClientError> {
        let query = tick
            .map(|t| vec![("tick", t.to_string())])
            .unwrap_or_default();

        self.client.get_json(&["api", "scan"], &query).await
    }
}
