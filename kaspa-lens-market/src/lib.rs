pub mod aggregator;
pub mod airdrop;
pub mod collections;
pub mod loader;
pub mod mints;

pub use aggregator::{AggregatorFilter, CombinedMarketRow, QuoteTag, RowQuote, Selection};
pub use airdrop::{AirdropEntry, AirdropError, AirdropOutcome, AirdropPlan};
pub use collections::{CollectionTab, TokenGrid};
pub use loader::{LoadEvent, LoadReport, TokenLoader, TokenSource};
pub use mints::MintWatcher;
