mod exchange_name;
mod market_quote;
mod network;
mod nft;
mod sompi;
mod ticker;
mod token;

pub use exchange_name::ExchangeName;
pub use market_quote::MarketQuote;
pub use network::Network;
pub use nft::{MintedToken, NewMintsCollection, NftCollection, NftMarket, RecentMint};
pub use sompi::{Sompi, SOMPI_PER_KAS};
pub use ticker::Ticker;
pub use token::Token;
