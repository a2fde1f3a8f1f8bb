mod mock_provider;
mod rest_watch_provider;

pub use mock_provider::MockWalletProvider;
pub use rest_watch_provider::RestWatchProvider;

use crate::WalletError;
use enum_dispatch::enum_dispatch;
use kaspa_lens_base::{Network, Sompi};
use strum_macros::EnumString;

#[derive(Debug, Clone, PartialEq)]
pub enum WalletEvent {
    AccountsChanged(Vec<String>),
    NetworkChanged(Network),
}

#[derive(EnumString, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderType {
    Watch,
    Mock,
}

/// 钱包提供方边界，错误只通过 [`WalletError`] 的类型区分
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    // 请求授权并返回账户
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;

    // 已授权账户，不弹出提示
    async fn get_accounts(&self) -> Result<Vec<String>, WalletError>;

    async fn get_network(&self) -> Result<Network, WalletError>;

    async fn get_balance(&self) -> Result<Sompi, WalletError>;

    async fn switch_network(&self, network: Network) -> Result<Network, WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;

    fn subscribe(&self) -> flume::Receiver<WalletEvent>;
}

#[derive(Debug, Clone)]
#[enum_dispatch(WalletProvider)]
pub enum WalletProviderKind {
    MockWalletProvider(MockWalletProvider),
    RestWatchProvider(RestWatchProvider),
}
