use crate::{ClientError, UpstreamClient};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

const SUCCESSFUL: &str = "successful";

#[derive(Deserialize, Debug, Clone)]
pub struct KasplexResponse<T> {
    #[serde(default)]
    pub message: String,
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct TokenBalance {
    #[serde(default)]
    pub tick: Option<String>,
    #[serde_as(as = "DisplayFromStr")]
    pub balance: Decimal,
    #[serde_as(as = "DisplayFromStr")]
    pub dec: u32,
}

impl TokenBalance {
    // 链上余额是整数，按 dec 还原小数位
    pub fn amount(&self) -> Option<Decimal> {
        let mut amount = self.balance.trunc();
        amount.set_scale(self.dec).ok()?;
        Some(amount.normalize())
    }
}

// api.kasplex.org，KRC-20 余额
#[derive(Debug, Clone)]
pub struct KasplexClient {
    client: UpstreamClient,
}

impl KasplexClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>) -> Self {
        KasplexClient {
            client: UpstreamClient::new(http, base),
        }
    }

    /// 地址持有的某个 KRC-20 数量；`None` 表示没有该代币的记录。
    pub async fn token_balance(
        &self,
        address: &str,
        tick: &str,
    ) -> Result<Option<Decimal>, ClientError> {
        let response: KasplexResponse<TokenBalance> = self
            .client
            .get_json(&["v1", "krc20", "address", address, "token", tick], &[])
            .await?;

        Ok(first_balance(response))
    }
}

fn first_balance(response: KasplexResponse<TokenBalance>) -> Option<Decimal> {
    if response.message != SUCCESSFUL {
        return None;
    }

    response.result.first().and_then(TokenBalance::amount)
}
