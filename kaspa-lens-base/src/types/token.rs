use super::{MarketQuote, Ticker};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Token {
    pub ticker: Ticker,
    pub markets: Vec<MarketQuote>,
}

impl Token {
    pub fn new(ticker: impl Into<Ticker>, markets: Vec<MarketQuote>) -> Self {
        Token {
            ticker: ticker.into(),
            markets,
        }
    }
}
