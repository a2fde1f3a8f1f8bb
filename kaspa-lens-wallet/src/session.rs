use crate::{
    refresher::{self, RefreshPolicy, RefreshRequest, RefreshResponse, RefreshService},
    WalletError, WalletErrorKind, WalletEvent, WalletProvider, WalletProviderKind,
};
use kaspa_lens_base::{Network, RequestSequencer, RequestToken, Sompi};
use kaspa_lens_config::{PrefsStore, WalletSetting};
use rust_decimal::Decimal;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

const BALANCE_TARGET: &str = "balance";

type Reply<T> = flume::Sender<Result<T, WalletError>>;

#[derive(Debug, Clone, Default)]
struct WalletSession {
    address: Option<String>,
    balance: Sompi,
    network: Option<Network>,
    connected: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletSnapshot {
    pub address: Option<String>,
    pub balance_sompi: Sompi,
    pub balance_kas: Decimal, // 保留一位小数
    pub network: Option<Network>,
    pub connected: bool,
}

impl From<&WalletSession> for WalletSnapshot {
    fn from(session: &WalletSession) -> Self {
        WalletSnapshot {
            address: session.address.clone(),
            balance_sompi: session.balance,
            balance_kas: session.balance.display_kas(),
            network: session.network,
            connected: session.connected,
        }
    }
}

enum Command {
    Connect(Reply<WalletSnapshot>),
    Restore(Reply<Option<WalletSnapshot>>),
    Disconnect(Reply<()>),
    SwitchNetwork(Network, Reply<WalletSnapshot>),
    Refresh,
    Snapshot(flume::Sender<WalletSnapshot>),
}

struct RefreshOutcome {
    token: RequestToken<&'static str>,
    result: Result<RefreshResponse, WalletError>,
}

#[derive(Debug, Clone)]
struct Timing {
    refresh_interval: Duration,
    balance_delay: Duration,
    network_settle: Duration,
    switch_settle: Duration,
}

impl Timing {
    fn from_setting(setting: &WalletSetting) -> Self {
        Timing {
            refresh_interval: Duration::from_millis(setting.refresh_interval_ms.max(1)),
            balance_delay: Duration::from_millis(setting.balance_delay_ms),
            network_settle: Duration::from_millis(setting.network_settle_ms),
            switch_settle: Duration::from_millis(setting.switch_settle_ms),
        }
    }
}

/// 钱包会话的唯一入口。会话状态只由后台任务修改，其他地方通过命令通道访问。
#[derive(Debug, Clone)]
pub struct WalletHandle {
    commands: flume::Sender<Command>,
    cancel_token: CancellationToken,
}

impl WalletHandle {
    pub fn spawn(
        provider: WalletProviderKind,
        setting: &WalletSetting,
        prefs: Arc<PrefsStore>,
    ) -> Self {
        let (commands_tx, commands_rx) = flume::unbounded();
        let (results_tx, results_rx) = flume::unbounded();
        let (delayed_tx, delayed_rx) = flume::unbounded();
        let cancel_token = CancellationToken::new();
        let call_timeout = Duration::from_secs(setting.call_timeout_secs.max(1));

        let actor = SessionActor {
            refresh_svc: refresher::refresh_service(
                &provider,
                RefreshPolicy::from_setting(setting),
                call_timeout,
            ),
            connect_svc: refresher::oneshot_service(&provider, call_timeout),
            events: provider.subscribe(),
            provider,
            session: WalletSession::default(),
            sequencer: RequestSequencer::new(),
            in_flight: None,
            prefs,
            timing: Timing::from_setting(setting),
            allowed_testnet: setting.allowed_testnet_addresses.clone(),
            results_tx,
            delayed_tx,
        };

        let token = cancel_token.clone();
        tokio::spawn(async move {
            actor.run(commands_rx, results_rx, delayed_rx, token).await;
        });

        WalletHandle {
            commands: commands_tx,
            cancel_token,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T, WalletError> {
        let (tx, rx) = flume::bounded(1);

        self.commands
            .send_async(command(tx))
            .await
            .map_err(|_| session_stopped())?;

        rx.recv_async().await.map_err(|_| session_stopped())?
    }

    pub async fn connect(&self) -> Result<WalletSnapshot, WalletError> {
        self.request(Command::Connect).await
    }

    // 启动时静默恢复上次的连接
    pub async fn restore(&self) -> Result<Option<WalletSnapshot>, WalletError> {
        self.request(Command::Restore).await
    }

    pub async fn disconnect(&self) -> Result<(), WalletError> {
        self.request(Command::Disconnect).await
    }

    pub async fn switch_network(&self, network: Network) -> Result<WalletSnapshot, WalletError> {
        self.request(|reply| Command::SwitchNetwork(network, reply)).await
    }

    // 已有刷新在进行时会被合并
    pub fn refresh(&self) -> Result<(), WalletError> {
        self.commands
            .send(Command::Refresh)
            .map_err(|_| session_stopped())
    }

    pub async fn snapshot(&self) -> Result<WalletSnapshot, WalletError> {
        let (tx, rx) = flume::bounded(1);

        self.commands
            .send_async(Command::Snapshot(tx))
            .await
            .map_err(|_| session_stopped())?;

        rx.recv_async().await.map_err(|_| session_stopped())
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

fn session_stopped() -> WalletError {
    WalletError::new(WalletErrorKind::Provider, "wallet session stopped")
}

async fn remember(prefs: &PrefsStore, connected: bool) {
    if let Err(e) = prefs.set_wallet_connected(connected).await {
        tracing::warn!("failed to persist wallet flag: {}", e);
    }
}

struct SessionActor {
    provider: WalletProviderKind,
    refresh_svc: RefreshService,
    connect_svc: RefreshService,
    events: flume::Receiver<WalletEvent>,
    session: WalletSession,
    sequencer: RequestSequencer<&'static str>,
    in_flight: Option<RequestToken<&'static str>>,
    prefs: Arc<PrefsStore>,
    timing: Timing,
    allowed_testnet: Vec<String>,
    results_tx: flume::Sender<RefreshOutcome>,
    delayed_tx: flume::Sender<()>,
}

impl SessionActor {
    async fn run(
        mut self,
        commands: flume::Receiver<Command>,
        results: flume::Receiver<RefreshOutcome>,
        delayed: flume::Receiver<()>,
        cancel_token: CancellationToken,
    ) {
        let period = self.timing.refresh_interval;
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let events = self.events.clone();

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::info!("wallet session cancelled");
                    break;
                }
                command = commands.recv_async() => match command {
                    Ok(command) => self.handle_command(command).await,
                    Err(_) => break,
                },
                Ok(event) = events.recv_async() => self.handle_event(event).await,
                Ok(outcome) = results.recv_async() => self.apply_refresh(outcome),
                Ok(()) = delayed.recv_async() => self.start_refresh().await,
                _ = interval.tick() => self.start_refresh().await,
            }
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect(reply) => {
                let _ = reply.send(self.connect().await);
            }
            Command::Restore(reply) => {
                let _ = reply.send(Ok(self.restore().await));
            }
            Command::Disconnect(reply) => {
                self.disconnect().await;
                let _ = reply.send(Ok(()));
            }
            Command::SwitchNetwork(network, reply) => {
                let _ = reply.send(self.switch_network(network).await);
            }
            Command::Refresh => self.start_refresh().await,
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn snapshot(&self) -> WalletSnapshot {
        WalletSnapshot::from(&self.session)
    }

    async fn connect(&mut self) -> Result<WalletSnapshot, WalletError> {
        let accounts = self.provider.request_accounts().await?;

        let address = accounts
            .into_iter()
            .next()
            .ok_or_else(|| WalletError::new(WalletErrorKind::NoAccounts, "wallet returned no accounts"))?;

        self.open_session(address).await;
        remember(&self.prefs, true).await;

        tracing::info!(address = ?self.session.address, "wallet connected");
        Ok(self.snapshot())
    }

    async fn restore(&mut self) -> Option<WalletSnapshot> {
        if !self.prefs.get().await.wallet_connected {
            return None;
        }

        match self.provider.get_accounts().await {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(address) => {
                    self.open_session(address).await;
                    tracing::info!(address = ?self.session.address, "wallet restored");
                    Some(self.snapshot())
                }
                None => {
                    remember(&self.prefs, false).await;
                    None
                }
            },
            Err(e) => {
                tracing::warn!("wallet restore failed: {}", e);
                remember(&self.prefs, false).await;
                None
            }
        }
    }

    async fn disconnect(&mut self) {
        if let Err(e) = self.provider.disconnect().await {
            tracing::warn!("wallet disconnect failed: {}", e);
        }

        self.close_session().await;
        tracing::info!("wallet disconnected");
    }

    async fn switch_network(&mut self, target: Network) -> Result<WalletSnapshot, WalletError> {
        if !self.session.connected {
            return Err(WalletError::not_connected());
        }

        let switched = self.provider.switch_network(target).await?;
        tracing::debug!(%switched, "network switch requested");

        // 等待钱包完成切换后再确认
        time::sleep(self.timing.switch_settle).await;

        let current = self.provider.get_network().await?;
        if current != target {
            return Err(WalletError::new(
                WalletErrorKind::NetworkMismatch,
                format!("expected {target}, wallet reports {current}"),
            ));
        }

        self.session.network = Some(current);
        self.start_refresh().await;

        Ok(self.snapshot())
    }

    async fn open_session(&mut self, address: String) {
        self.sequencer.invalidate(&BALANCE_TARGET);
        self.in_flight = None;
        self.session = WalletSession {
            address: Some(address),
            connected: true,
            ..Default::default()
        };

        // 首次读取不重试，失败时余额保持为 0
        let req = RefreshRequest {
            balance_delay: self.timing.balance_delay,
        };
        match refresher::call_refresh(&mut self.connect_svc, req).await {
            Ok(response) => {
                self.session.network = Some(response.network);
                self.session.balance = response.balance;
            }
            Err(e) => tracing::warn!("initial wallet read failed: {}", e),
        }

        self.auto_switch().await;
    }

    // 非主网地址且不在测试网白名单中时切回主网
    async fn auto_switch(&mut self) {
        let Some(address) = self.session.address.as_deref() else {
            return;
        };

        if Network::from_address(address) == Some(Network::Mainnet)
            || self.allowed_testnet.iter().any(|a| a == address)
        {
            return;
        }

        tracing::info!(address, "address not allowed on testnet, switching to mainnet");

        if let Err(e) = self.switch_network(Network::Mainnet).await {
            tracing::warn!("auto switch to mainnet failed: {}", e);
        }
    }

    async fn close_session(&mut self) {
        self.sequencer.invalidate(&BALANCE_TARGET);
        self.in_flight = None;
        self.session = WalletSession::default();
        remember(&self.prefs, false).await;
    }

    async fn handle_event(&mut self, event: WalletEvent) {
        if !self.session.connected {
            return;
        }

        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                None => {
                    tracing::info!("wallet reported no accounts, disconnecting");
                    self.close_session().await;
                }
                Some(address) => {
                    if self.session.address.as_deref() != Some(address.as_str()) {
                        self.sequencer.invalidate(&BALANCE_TARGET);
                        self.in_flight = None;
                        self.session.address = Some(address);
                        self.session.balance = Sompi::ZERO;
                        self.auto_switch().await;
                    }
                    self.schedule_refresh(Duration::ZERO);
                }
            },
            WalletEvent::NetworkChanged(network) => {
                tracing::info!(%network, "wallet network changed");
                self.session.network = Some(network);
                self.schedule_refresh(self.timing.network_settle);
            }
        }
    }

    fn schedule_refresh(&self, delay: Duration) {
        let delayed_tx = self.delayed_tx.clone();

        tokio::spawn(async move {
            if !delay.is_zero() {
                time::sleep(delay).await;
            }
            let _ = delayed_tx.send_async(()).await;
        });
    }

    async fn start_refresh(&mut self) {
        if !self.session.connected {
            return;
        }

        if self.in_flight.is_some() {
            tracing::debug!("balance refresh already in flight");
            return;
        }

        let token = self.sequencer.issue(BALANCE_TARGET);
        self.in_flight = Some(token.clone());

        let svc = match self.refresh_svc.ready().await {
            Ok(svc) => svc,
            Err(e) => {
                tracing::warn!("refresh service unavailable: {}", e);
                self.in_flight = None;
                return;
            }
        };

        let fut = tower::Service::call(
            svc,
            RefreshRequest {
                balance_delay: self.timing.balance_delay,
            },
        );
        let results_tx = self.results_tx.clone();

        tokio::spawn(async move {
            let result = fut.await.map_err(WalletError::from_boxed);
            let _ = results_tx.send_async(RefreshOutcome { token, result }).await;
        });
    }

    fn apply_refresh(&mut self, outcome: RefreshOutcome) {
        let RefreshOutcome { token, result } = outcome;

        if self.in_flight.as_ref() == Some(&token) {
            self.in_flight = None;
        }

        let session = &mut self.session;
        let applied = self.sequencer.apply_if_current(&token, result, |result| match result {
            Ok(response) => {
                session.network = Some(response.network);
                session.balance = response.balance;
                tracing::debug!(balance = %response.balance, "wallet balance refreshed");
            }
            Err(e) => {
                tracing::debug!(kind = %e.kind(), "balance left stale until next tick");
            }
        });

        if !applied {
            tracing::debug!(seq = token.seq(), "stale balance refresh dropped");
        }
    }
}
