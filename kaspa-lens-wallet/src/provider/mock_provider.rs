use super::{WalletEvent, WalletProvider};
use crate::{WalletError, WalletErrorKind};
use bon::bon;
use kaspa_lens_base::{Network, Sompi};
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::Mutex;

#[derive(Debug)]
struct MockState {
    accounts: Vec<String>,
    network: Network,
    balance: Sompi,
    balance_failures: VecDeque<WalletErrorKind>,
    reject_switch: bool,
    balance_calls: usize,
}

// 可编排的钱包，用于演示和测试
#[derive(Debug, Clone)]
pub struct MockWalletProvider {
    state: Arc<Mutex<MockState>>, // 克隆后共享状态
    events_tx: flume::Sender<WalletEvent>,
    events_rx: flume::Receiver<WalletEvent>,
}

#[bon]
impl MockWalletProvider {
    #[builder]
    pub fn new(
        accounts: Vec<String>,
        #[builder(default)] network: Network,
        #[builder(default)] balance: Sompi,
        #[builder(default)] reject_switch: bool,
    ) -> Self {
        let (events_tx, events_rx) = flume::unbounded();

        let state = MockState {
            accounts,
            network,
            balance,
            balance_failures: VecDeque::new(),
            reject_switch,
            balance_calls: 0,
        };

        MockWalletProvider {
            state: Arc::new(Mutex::new(state)),
            events_tx,
            events_rx,
        }
    }
}

impl MockWalletProvider {
    // 之后的 n 次余额查询依次失败
    pub async fn fail_balance(&self, kind: WalletErrorKind, times: usize) {
        let mut state = self.state.lock().await;
        state.balance_failures.extend(std::iter::repeat(kind).take(times));
    }

    pub async fn set_balance(&self, balance: Sompi) {
        self.state.lock().await.balance = balance;
    }

    pub async fn set_accounts(&self, accounts: Vec<String>) {
        self.state.lock().await.accounts = accounts.clone();
        self.emit(WalletEvent::AccountsChanged(accounts));
    }

    pub async fn set_network(&self, network: Network) {
        self.state.lock().await.network = network;
        self.emit(WalletEvent::NetworkChanged(network));
    }

    pub fn emit(&self, event: WalletEvent) {
        if let Err(e) = self.events_tx.send(event) {
            tracing::warn!("mock wallet event dropped: {}", e);
        }
    }

    pub async fn balance_calls(&self) -> usize {
        self.state.lock().await.balance_calls
    }
}

impl WalletProvider for MockWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        self.get_accounts().await
    }

    async fn get_accounts(&self) -> Result<Vec<String>, WalletError> {
        Ok(self.state.lock().await.accounts.clone())
    }

    async fn get_network(&self) -> Result<Network, WalletError> {
        Ok(self.state.lock().await.network)
    }

    async fn get_balance(&self) -> Result<Sompi, WalletError> {
        let mut state = self.state.lock().await;
        state.balance_calls += 1;

        match state.balance_failures.pop_front() {
            Some(kind) => Err(WalletError::new(kind, "scripted balance failure")),
            None => Ok(state.balance),
        }
    }

    async fn switch_network(&self, network: Network) -> Result<Network, WalletError> {
        let mut state = self.state.lock().await;

        if state.reject_switch {
            return Err(WalletError::new(WalletErrorKind::Rejected, "switch rejected"));
        }

        state.network = network;
        Ok(network)
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        Ok(())
    }

    fn subscribe(&self) -> flume::Receiver<WalletEvent> {
        self.events_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_failures() -> anyhow::Result<()> {
        let provider = MockWalletProvider::builder()
            .accounts(vec!["kaspa:qq".to_string()])
            .balance(Sompi::new(42))
            .build();

        provider.fail_balance(WalletErrorKind::Transport, 2).await;

        assert!(provider.get_balance().await.is_err());
        assert!(provider.get_balance().await.is_err());
        assert_eq!(provider.get_balance().await?, Sompi::new(42));
        assert_eq!(provider.balance_calls().await, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_events_reach_subscriber() -> anyhow::Result<()> {
        let provider = MockWalletProvider::builder().accounts(vec![]).build();
        let events = provider.subscribe();

        provider.set_network(Network::Testnet10).await;
        assert_eq!(events.recv_async().await?, WalletEvent::NetworkChanged(Network::Testnet10));
        Ok(())
    }
}
