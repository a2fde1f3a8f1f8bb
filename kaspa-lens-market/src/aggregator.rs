use itertools::Itertools;
use kaspa_lens_base::{ExchangeName, MarketQuote, Ticker, Token};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

pub const SELECTION_CAPACITY: usize = 2;

// 链上 KRC-20 市场，其余为中心化交易所
const KRC20_MARKETS: &[&str] = &["GuacSwap", "Kaspa Market", "KaspaCom", "Knot Meme", "KSPR Bot"];

pub fn is_krc20_market(exchange: &ExchangeName) -> bool {
    KRC20_MARKETS.contains(&exchange.as_ref())
}

/// 两个价格之间的价差百分比，以较低价为基准
pub fn spread_percent(a: f64, b: f64) -> f64 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    (high - low) / low * 100.0
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AggregatorFilter {
    pub min_volume_usd: f64,
    pub ignore_zero_volume: bool,
    pub hidden_exchanges: HashSet<ExchangeName>,
}

impl AggregatorFilter {
    fn passes_volume(&self, quote: &MarketQuote) -> bool {
        if !quote.has_valid_volume() {
            return false;
        }

        if self.ignore_zero_volume && quote.volume_usd == 0.0 {
            return false;
        }

        !(self.min_volume_usd > 0.0 && quote.volume_usd < self.min_volume_usd)
    }

    fn is_hidden(&self, quote: &MarketQuote) -> bool {
        self.hidden_exchanges.contains(&quote.exchange_name)
    }

    pub fn qualifies(&self, quote: &MarketQuote) -> bool {
        quote.has_valid_price() && self.passes_volume(quote) && !self.is_hidden(quote)
    }

    // 按首次出现顺序去重
    pub fn available_exchanges(&self, tokens: &[Token]) -> Vec<ExchangeName> {
        tokens
            .iter()
            .flat_map(|token| &token.markets)
            .filter(|quote| self.passes_volume(quote) && !self.is_hidden(quote))
            .map(|quote| quote.exchange_name.clone())
            .unique()
            .collect()
    }

    pub fn combine(&self, tokens: &[Token]) -> Vec<CombinedMarketRow> {
        let mut rows = tokens
            .iter()
            .filter_map(|token| {
                let quotes = token
                    .markets
                    .iter()
                    .filter(|quote| self.qualifies(quote))
                    .cloned()
                    .collect();

                CombinedMarketRow::from_quotes(token.ticker.clone(), quotes)
            })
            .collect::<Vec<_>>();

        // sort_by 是稳定排序
        rows.sort_by(|a, b| b.max_spread_percent.total_cmp(&a.max_spread_percent));
        rows
    }
}

pub fn filter_by_ticker(rows: Vec<CombinedMarketRow>, needle: &str) -> Vec<CombinedMarketRow> {
    rows.into_iter()
        .filter(|row| row.ticker.matches(needle))
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuoteTag {
    Buy,
    Sell,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RowQuote {
    pub exchange_name: ExchangeName,
    pub price_usd: f64,
    pub volume_usd: f64,
    pub krc20_market: bool,
    pub tag: Option<QuoteTag>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CombinedMarketRow {
    pub ticker: Ticker,
    pub markets: Vec<RowQuote>,
    pub max_price: f64,
    pub min_price: f64,
    pub max_spread_percent: f64,
}

impl CombinedMarketRow {
    // 少于两个报价无法计算价差
    fn from_quotes(ticker: Ticker, mut quotes: Vec<MarketQuote>) -> Option<Self> {
        if quotes.len() < 2 {
            return None;
        }

        quotes.sort_by(|a, b| a.price_usd.total_cmp(&b.price_usd));

        let min_price = quotes.first()?.price_usd;
        let max_price = quotes.last()?.price_usd;

        let markets = quotes
            .into_iter()
            .map(|quote| {
                let tag = if quote.price_usd == min_price {
                    Some(QuoteTag::Buy)
                } else if quote.price_usd == max_price {
                    Some(QuoteTag::Sell)
                } else {
                    None
                };

                RowQuote {
                    krc20_market: is_krc20_market(&quote.exchange_name),
                    exchange_name: quote.exchange_name,
                    price_usd: quote.price_usd,
                    volume_usd: quote.volume_usd,
                    tag,
                }
            })
            .collect();

        Some(CombinedMarketRow {
            ticker,
            markets,
            max_price,
            min_price,
            max_spread_percent: spread_percent(min_price, max_price),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectedQuote {
    pub ticker: Ticker,
    pub exchange_name: ExchangeName,
    pub price_usd: f64,
}

// 手动选择的两个报价，先进先出
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Selection {
    rows: VecDeque<SelectedQuote>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已选中则取消，否则加入并在满员时挤掉最早的一个。返回操作后是否处于选中状态。
    pub fn toggle(
        &mut self,
        ticker: impl Into<Ticker>,
        exchange_name: impl Into<ExchangeName>,
        price_usd: f64,
    ) -> bool {
        let ticker = ticker.into();
        let exchange_name = exchange_name.into();

        if let Some(pos) = self.position(&ticker, &exchange_name) {
            self.rows.remove(pos);
            return false;
        }

        if self.rows.len() >= SELECTION_CAPACITY {
            self.rows.pop_front();
        }

        self.rows.push_back(SelectedQuote {
            ticker,
            exchange_name,
            price_usd,
        });

        true
    }

    fn position(&self, ticker: &Ticker, exchange_name: &ExchangeName) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| &row.ticker == ticker && &row.exchange_name == exchange_name)
    }

    pub fn is_selected(&self, ticker: &Ticker, exchange_name: &ExchangeName) -> bool {
        self.position(ticker, exchange_name).is_some()
    }

    pub fn selected(&self) -> impl Iterator<Item = &SelectedQuote> {
        self.rows.iter()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn selected_spread(&self) -> Option<f64> {
        match (self.rows.front(), self.rows.back()) {
            (Some(a), Some(b)) if self.rows.len() == 2 && a.ticker == b.ticker => {
                Some(spread_percent(a.price_usd, b.price_usd))
            }
            _ => None,
        }
    }

    pub fn displayed_spread(&self, row: &CombinedMarketRow) -> f64 {
        match self.rows.front() {
            Some(first) if first.ticker == row.ticker => self
                .selected_spread()
                .unwrap_or(row.max_spread_percent),
            _ => row.max_spread_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(exchange: &str, price: f64, volume: f64) -> MarketQuote {
        MarketQuote::builder()
            .exchange_name(exchange)
            .price_usd(price)
            .volume_usd(volume)
            .build()
    }

    fn token(ticker: &str, quotes: Vec<MarketQuote>) -> Token {
        Token::new(ticker, quotes)
    }

    #[test]
    fn test_spread_over_qualifying_quotes() {
        let filter = AggregatorFilter {
            hidden_exchanges: HashSet::from([ExchangeName::new("XT")]),
            ..Default::default()
        };

        let tokens = vec![token(
            "NACHO",
            vec![
                quote("MEXC", 2.0, 500.0),
                quote("XT", 10.0, 500.0),
                quote("KaspaCom", 1.6, 500.0),
                quote("CoinEx", 0.0, 500.0),
                quote("LBank", f64::NAN, 500.0),
            ],
        )];

        let rows = filter.combine(&tokens);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.min_price, 1.6);
        assert_eq!(row.max_price, 2.0);
        assert!((row.max_spread_percent - 25.0).abs() < 1e-9);
        assert_eq!(row.markets.len(), 2);
    }

    #[test]
    fn test_single_quote_excluded() {
        let filter = AggregatorFilter {
            min_volume_usd: 100.0,
            ..Default::default()
        };

        let tokens = vec![
            token("KASPY", vec![quote("MEXC", 1.0, 200.0), quote("XT", 1.2, 20.0)]),
            token("NACHO", vec![quote("MEXC", 1.0, 200.0), quote("XT", 1.2, 300.0)]),
            token("BURT", vec![quote("MEXC", 1.0, 200.0)]),
        ];

        let rows = filter.combine(&tokens);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticker, Ticker::new("NACHO"));
    }

    #[test]
    fn test_filter_composition() {
        let filter = AggregatorFilter {
            min_volume_usd: 100.0,
            ignore_zero_volume: true,
            ..Default::default()
        };

        assert!(!filter.qualifies(&quote("MEXC", 5.0, 0.0)));
        assert!(!filter.qualifies(&quote("MEXC", 5.0, 50.0)));
        assert!(filter.qualifies(&quote("MEXC", 5.0, 150.0)));
    }

    #[test]
    fn test_zero_volume_kept_without_threshold() {
        let filter = AggregatorFilter::default();
        assert!(filter.qualifies(&quote("MEXC", 5.0, 0.0)));
    }

    #[test]
    fn test_sort_is_stable_for_equal_spreads() {
        let filter = AggregatorFilter::default();
        let tokens = vec![
            token("AAA", vec![quote("MEXC", 1.0, 1.0), quote("XT", 1.1, 1.0)]),
            token("BBB", vec![quote("MEXC", 1.0, 1.0), quote("XT", 3.0, 1.0)]),
            token("CCC", vec![quote("MEXC", 2.0, 1.0), quote("XT", 2.2, 1.0)]),
        ];

        let tickers = filter
            .combine(&tokens)
            .into_iter()
            .map(|row| row.ticker.to_string())
            .collect::<Vec<_>>();

        assert_eq!(tickers, vec!["BBB", "AAA", "CCC"]);
    }

    #[test]
    fn test_buy_sell_tags() {
        let filter = AggregatorFilter::default();
        let tokens = vec![token(
            "NACHO",
            vec![
                quote("MEXC", 3.0, 1.0),
                quote("XT", 1.0, 1.0),
                quote("KaspaCom", 2.0, 1.0),
                quote("CoinEx", 1.0, 1.0),
            ],
        )];

        let row = &filter.combine(&tokens)[0];
        let tags = row.markets.iter().map(|m| m.tag).collect::<Vec<_>>();
        assert_eq!(
            tags,
            vec![Some(QuoteTag::Buy), Some(QuoteTag::Buy), None, Some(QuoteTag::Sell)]
        );
        assert_eq!(row.markets[0].exchange_name, ExchangeName::new("XT"));
        assert!(row.markets[2].krc20_market);
    }

    #[test]
    fn test_available_exchanges() {
        let filter = AggregatorFilter {
            ignore_zero_volume: true,
            hidden_exchanges: HashSet::from([ExchangeName::new("LBank")]),
            ..Default::default()
        };

        let tokens = vec![
            token("A", vec![quote("MEXC", 1.0, 1.0), quote("XT", 1.0, 0.0)]),
            token("B", vec![quote("LBank", 1.0, 1.0), quote("CoinEx", 1.0, 9.0), quote("MEXC", 2.0, 1.0)]),
        ];

        assert_eq!(
            filter.available_exchanges(&tokens),
            vec![ExchangeName::new("MEXC"), ExchangeName::new("CoinEx")]
        );
    }

    #[test]
    fn test_filter_by_ticker() {
        let filter = AggregatorFilter::default();
        let tokens = vec![
            token("NACHO", vec![quote("MEXC", 1.0, 1.0), quote("XT", 1.1, 1.0)]),
            token("KASPY", vec![quote("MEXC", 1.0, 1.0), quote("XT", 1.1, 1.0)]),
        ];

        let rows = filter_by_ticker(filter.combine(&tokens), "spy");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticker, Ticker::new("KASPY"));
    }

    #[test]
    fn test_selection_fifo() {
        let mut selection = Selection::new();
        selection.toggle("NACHO", "A", 1.0);
        selection.toggle("NACHO", "B", 1.2);
        selection.toggle("NACHO", "C", 1.4);

        let selected = selection
            .selected()
            .map(|row| row.exchange_name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(selected, vec!["B", "C"]);
    }

    #[test]
    fn test_selection_toggle_off() {
        let mut selection = Selection::new();
        assert!(selection.toggle("NACHO", "A", 1.0));
        assert!(!selection.toggle("NACHO", "A", 1.0));
        assert_eq!(selection.selected().count(), 0);
    }

    #[test]
    fn test_selected_pair_override() {
        let filter = AggregatorFilter::default();
        let tokens = vec![token(
            "X",
            vec![
                quote("ExA", 1.0, 1.0),
                quote("ExB", 1.5, 1.0),
                quote("ExC", 0.5, 1.0),
                quote("ExD", 4.0, 1.0),
            ],
        )];
        let row = &filter.combine(&tokens)[0];
        assert!((row.max_spread_percent - 700.0).abs() < 1e-9);

        let mut selection = Selection::new();
        selection.toggle("X", "ExA", 1.0);
        selection.toggle("X", "ExB", 1.5);

        assert_eq!(selection.selected_spread(), Some(50.0));
        assert_eq!(selection.displayed_spread(row), 50.0);
    }

    #[test]
    fn test_selection_across_tickers_falls_back() {
        let filter = AggregatorFilter::default();
        let tokens = vec![token("X", vec![quote("ExA", 1.0, 1.0), quote("ExB", 2.0, 1.0)])];
        let row = &filter.combine(&tokens)[0];

        let mut selection = Selection::new();
        selection.toggle("X", "ExA", 1.0);
        selection.toggle("Y", "ExB", 1.5);

        assert_eq!(selection.selected_spread(), None);
        assert_eq!(selection.displayed_spread(row), row.max_spread_percent);
    }
}
