use crate::{collect_all_pages, ClientError, UpstreamClient};
use kaspa_lens_base::Sompi;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TRANSACTIONS_PAGE_SIZE: usize = 50;
pub const TRANSACTIONS_INITIAL_BATCHES: usize = 10;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AddressBalance {
    #[serde(default)]
    pub address: Option<String>,
    pub balance: Sompi,
}

// api.kaspa.org
#[derive(Debug, Clone)]
pub struct KaspaRestClient {
    client: UpstreamClient,
}

impl KaspaRestClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>) -> Self {
        KaspaRestClient {
            client: UpstreamClient::new(http, base),
        }
    }

    pub async fn address_balance(&self, address: &str) -> Result<AddressBalance, ClientError> {
        self.client
            .get_json(&["addresses", address, "balance"], &[])
            .await
    }

    pub async fn transaction(
        &self,
        hash: &str,
        block_hash: Option<&str>,
    ) -> Result<Value, ClientError> {
        let query = block_hash
            .map(|h| vec![("blockHash", h.to_string())])
            .unwrap_or_default();

        self.client
            .get_json(&["transactions", hash], &query)
            .await
    }

    pub async fn address_transactions_page(
        &self,
        address: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Value>, ClientError> {
        let value: Value = self
            .client
            .get_json(
                &["addresses", address, "full-transactions"],
                &[
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                    ("resolve_previous_outpoints", "full".to_string()),
                ],
            )
            .await?;

        match value {
            Value::Array(transactions) => Ok(transactions),
            _ => Err(ClientError::Malformed(
                "Invalid response format from Kaspa API".to_string(),
            )),
        }
    }

    // 地址的全部交易
    pub async fn all_address_transactions(&self, address: &str) -> Result<Vec<Value>, ClientError> {
        collect_all_pages(
            TRANSACTIONS_PAGE_SIZE,
            TRANSACTIONS_INITIAL_BATCHES,
            |offset| self.address_transactions_page(address, TRANSACTIONS_PAGE_SIZE, offset),
        )
        .await
    }

    pub async fn market_data(&self) -> Result<Value, ClientError> {
        self.client.get_json(&["info", "market-data"], &[]).await
    }

    pub async fn blockdag(&self) -> Result<Value, ClientError> {
        self.client.get_json(&["info", "blockdag"], &[]).await
    }
}
