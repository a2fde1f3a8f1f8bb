mod wallet_error;
pub mod provider;
pub mod refresher;
pub mod session;

pub use provider::{
    MockWalletProvider, RestWatchProvider, WalletEvent, WalletProvider, WalletProviderKind,
};
pub use refresher::{RefreshPolicy, RefreshRequest, RefreshResponse};
pub use session::{WalletHandle, WalletSnapshot};
pub use wallet_error::{WalletError, WalletErrorKind};
