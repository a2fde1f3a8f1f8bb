use crate::{ClientError, UpstreamClient};
use kaspa_lens_base::NftMarket;
use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::collections::HashMap;

pub const COLLECTIONS_PAGE_SIZE: usize = 50;

#[derive(Deserialize, Debug, Clone)]
pub struct Krc721Response<T> {
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
    #[serde(default)]
    pub next: Option<Value>,
}

// 数值字段有时是字符串，有时是数字
#[serde_as]
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Krc721Deployment {
    pub tick: String,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub max: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub minted: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub premint: Option<u64>,
    #[serde(default)]
    pub deployer: Option<String>,
    #[serde(default)]
    pub buri: Option<String>,
    #[serde(default)]
    pub royalty_fee: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    #[serde(default)]
    pub tick: String,
    #[serde(default)]
    pub token_id: String,
}

#[derive(Debug, Clone)]
pub struct Krc721Client {
    api: UpstreamClient,
    markets: UpstreamClient,
    cache: String,
}

impl Krc721Client {
    pub fn new(
        http: reqwest::Client,
        api: impl Into<String>,
        markets: impl Into<String>,
        cache: impl Into<String>,
    ) -> Self {
        Krc721Client {
            api: UpstreamClient::new(http.clone(), api),
            markets: UpstreamClient::new(http, markets),
            cache: cache.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn collections(&self, offset: usize) -> Result<Vec<Krc721Deployment>, ClientError> {
        let query = if offset > 0 {
            vec![("offset", offset.to_string())]
        } else {
            vec![]
        };

        let response: Krc721Response<Krc721Deployment> =
            self.api.get_json(&["nfts"], &query).await?;

        Ok(response.result)
    }

    /// 各集合的地板价与成交量，按 tick 索引
    pub async fn markets(&self) -> Result<HashMap<String, NftMarket>, ClientError> {
        self.markets.get_json(&["markets"], &[]).await
    }

    pub async fn address_holdings(&self, address: &str) -> Result<Vec<Holding>, ClientError> {
        let value: Value = self.api.get_json(&["address", address], &[]).await?;
        parse_holdings(value)
    }

    pub fn thumbnail_url(&self, tick: &str, id: impl std::fmt::Display) -> String {
        format!("{}/thumbnail/{}/{}", self.cache, tick, id)
    }
}

fn parse_holdings(value: Value) -> Result<Vec<Holding>, ClientError> {
    match value.get("result") {
        Some(result @ Value::Array(_)) => Ok(serde_json::from_value(result.clone())?),
        _ => Err(ClientError::Malformed(
            "Unexpected response format from holdings API".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deployment_numbers_as_strings() -> anyhow::Result<()> {
        let response: Krc721Response<Krc721Deployment> = serde_json::from_value(json!({
            "message": "success",
            "result": [
                {"tick": "NACHO", "max": "10000", "minted": "2500", "premint": "0",
                 "deployer": "kaspa:qq", "buri": "ipfs://abc", "royaltyFee": "1000000"},
                {"tick": "KANGO", "max": 500, "minted": 12}
            ]
        }))?;

        assert_eq!(response.result.len(), 2);
        assert_eq!(response.result[0].max, Some(10_000));
        assert_eq!(response.result[0].minted, Some(2_500));
        assert_eq!(response.result[0].royalty_fee.as_deref(), Some("1000000"));
        assert_eq!(response.result[1].max, Some(500));
        assert_eq!(response.result[1].premint, None);
        Ok(())
    }

    #[test]
    fn test_parse_holdings() -> anyhow::Result<()> {
        let holdings = parse_holdings(json!({
            "result": [{"tick": "NACHO", "tokenId": "42", "owner": "kaspa:qq"}]
        }))?;
        assert_eq!(
            holdings,
            vec![Holding {
                tick: "NACHO".to_string(),
                token_id: "42".to_string()
            }]
        );

        let malformed = parse_holdings(json!({"result": {"tick": "NACHO"}}));
        assert!(matches!(malformed, Err(ClientError::Malformed(_))));
        Ok(())
    }

    #[test]
    fn test_thumbnail_url() {
        let client = Krc721Client::new(
            reqwest::Client::new(),
            "https://mainnet.krc721.stream/api/v1/krc721/mainnet",
            "https://markets.krc20.stream/krc721/mainnet",
            "https://cache.krc721.stream/krc721/mainnet/",
        );
        assert_eq!(
            client.thumbnail_url("NACHO", 1),
            "https://cache.krc721.stream/krc721/mainnet/thumbnail/NACHO/1"
        );
    }
}
