use super::ExchangeName;
use bon::Builder;
use serde::{Deserialize, Serialize};

#[derive(Builder, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[builder(on(ExchangeName, into))]
pub struct MarketQuote {
    pub exchange_name: ExchangeName,
    pub price_usd: f64,
    pub volume_usd: f64,
}

impl MarketQuote {
    // 价格必须为有限正数才能参与价差计算
    pub fn has_valid_price(&self) -> bool {
        self.price_usd.is_finite() && self.price_usd > 0.0
    }

    pub fn has_valid_volume(&self) -> bool {
        self.volume_usd.is_finite() && self.volume_usd >= 0.0
    }
}
