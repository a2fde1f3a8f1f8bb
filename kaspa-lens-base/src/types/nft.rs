use super::Ticker;
use serde::{Deserialize, Serialize};

// 市场统计，字段缺失时视为 0
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct NftMarket {
    pub floor_price: f64,
    pub total_volume: f64,
    pub volume_24h: f64,
    pub change_24h: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NftCollection {
    pub tick: Ticker,
    pub floor_price: f64,
    pub total_volume: f64,
    pub volume_24h: f64,
    pub change_24h: f64,
    pub total_supply: Option<u64>,
    pub minted_count: Option<u64>,
    pub minted_percentage: Option<f64>,
    pub thumbnail_url: String,
    pub deployer: Option<String>,
    pub buri: Option<String>,
    pub royalty_fee: Option<String>,
    pub premint: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MintedToken {
    pub id: u64,
    pub image_url: String,
    pub minted: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct NewMintsCollection {
    pub tick: Ticker,
    pub minted_count: u64,
    pub minted_ids: Vec<u64>,
    pub total_supply: u64,
    pub buri: Option<String>,
    pub state: Option<String>,
    pub deployer: Option<String>,
    pub first_seen: Option<String>,
    pub last_updated: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecentMint {
    pub tick: Ticker,
    pub id: u64,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub current_mint_position: Option<u64>,
    #[serde(default)]
    pub total_supply: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nft_market_defaults() -> anyhow::Result<()> {
        let market: NftMarket = serde_json::from_str(r#"{"floor_price": 120.5}"#)?;
        assert_eq!(market.floor_price, 120.5);
        assert_eq!(market.volume_24h, 0.0);
        Ok(())
    }

    #[test]
    fn test_new_mints_collection() -> anyhow::Result<()> {
        let doc: NewMintsCollection = serde_json::from_str(
            r#"{"_id": "x", "tick": "KASPUNKS", "minted_count": 3, "minted_ids": [1, 2, 7], "total_supply": 1000}"#,
        )?;
        assert_eq!(doc.tick, Ticker::new("KASPUNKS"));
        assert_eq!(doc.minted_ids, vec![1, 2, 7]);
        assert_eq!(doc.last_updated, None);
        Ok(())
    }
}
