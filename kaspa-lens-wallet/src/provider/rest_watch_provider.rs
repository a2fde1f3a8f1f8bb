use super::{WalletEvent, WalletProvider};
use crate::{WalletError, WalletErrorKind};
use kaspa_lens_base::{Network, Sompi};
use kaspa_lens_client::KaspaRestClient;

/// 只读钱包：按配置的地址从 REST 索引器读取余额，无法签名或切换网络
#[derive(Debug, Clone)]
pub struct RestWatchProvider {
    client: KaspaRestClient,
    address: Option<String>,
    network: Network,
    _events_tx: flume::Sender<WalletEvent>, // 保持通道打开，只读钱包不产生事件
    events_rx: flume::Receiver<WalletEvent>,
}

impl RestWatchProvider {
    pub fn new(client: KaspaRestClient, address: Option<String>, network: Network) -> Self {
        let (events_tx, events_rx) = flume::unbounded();

        RestWatchProvider {
            client,
            address,
            network,
            _events_tx: events_tx,
            events_rx,
        }
    }

    fn address(&self) -> Result<&str, WalletError> {
        self.address
            .as_deref()
            .ok_or_else(|| WalletError::new(WalletErrorKind::NoAccounts, "no watch address configured"))
    }
}

impl WalletProvider for RestWatchProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        self.get_accounts().await
    }

    async fn get_accounts(&self) -> Result<Vec<String>, WalletError> {
        Ok(self.address.iter().cloned().collect())
    }

    async fn get_network(&self) -> Result<Network, WalletError> {
        Ok(self.network)
    }

    async fn get_balance(&self) -> Result<Sompi, WalletError> {
        let address = self.address()?;
        let balance = self.client.address_balance(address).await?;
        Ok(balance.balance)
    }

    async fn switch_network(&self, network: Network) -> Result<Network, WalletError> {
        if network == self.network {
            return Ok(network);
        }

        Err(WalletError::new(
            WalletErrorKind::Rejected,
            format!("watch-only wallet is pinned to {}", self.network),
        ))
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        Ok(())
    }

    fn subscribe(&self) -> flume::Receiver<WalletEvent> {
        self.events_rx.clone()
    }
}
