use async_lock::{Mutex, RwLock};
use chrono::{DateTime, Utc};
use kaspa_lens_base::{RequestSequencer, Token};
use kaspa_lens_client::{
    KasFyiClient, KaspaComClient, KaspaRestClient, KasplexClient, Krc721Client, NewMintsClient,
};
use kaspa_lens_config::{AppContext, PrefsStore, Setting};
use kaspa_lens_market::{LoadReport, MintWatcher, Selection};
use kaspa_lens_wallet::WalletHandle;
use serde::Serialize;
use std::sync::Arc;

pub(crate) const ARBITRAGE_TARGET: &str = "arbitrage";

#[derive(Debug, Clone)]
pub struct Upstreams {
    pub kaspa: KaspaRestClient,
    pub kasfyi: Arc<KasFyiClient>,
    pub kaspacom: KaspaComClient,
    pub kasplex: KasplexClient,
    pub krc721: Krc721Client,
    pub new_mints: NewMintsClient,
}

impl Upstreams {
    pub fn from_context(context: &AppContext) -> Self {
        let http = &context.http;
        let upstream = &context.setting.upstream;

        Upstreams {
            kaspa: KaspaRestClient::new(http.clone(), &upstream.kaspa_api),
            kasfyi: Arc::new(KasFyiClient::new(http.clone(), &upstream.kasfyi_api)),
            kaspacom: KaspaComClient::new(http.clone(), &upstream.kaspacom_api),
            kasplex: KasplexClient::new(http.clone(), &upstream.kasplex_api),
            krc721: Krc721Client::new(
                http.clone(),
                &upstream.krc721_api,
                &upstream.krc721_markets,
                &upstream.krc721_cache,
            ),
            new_mints: NewMintsClient::new(http.clone(), &upstream.new_mints_api),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub current: usize,
    pub total: usize,
}

// 套利视图使用的代币集合，加载过程中逐批追加
#[derive(Debug, Default)]
pub struct MarketState {
    pub tokens: Vec<Token>,
    pub progress: Option<LoadProgress>,
    pub report: Option<LoadReport>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub selection: Selection,
}

#[derive(Clone)]
pub struct AppState {
    pub setting: Arc<Setting>,
    pub upstreams: Upstreams,
    pub market: Arc<RwLock<MarketState>>,
    pub sequencer: Arc<RequestSequencer<&'static str>>,
    pub mints: Arc<Mutex<MintWatcher>>,
    pub wallet: WalletHandle,
    pub prefs: Arc<PrefsStore>,
}

impl AppState {
    pub async fn new(context: &AppContext, wallet: WalletHandle) -> Self {
        let watched = context.prefs.get().await.watched_collections;

        AppState {
            setting: Arc::clone(&context.setting),
            upstreams: Upstreams::from_context(context),
            market: Arc::new(RwLock::new(MarketState::default())),
            sequencer: Arc::new(RequestSequencer::new()),
            mints: Arc::new(Mutex::new(MintWatcher::new(watched))),
            wallet,
            prefs: Arc::clone(&context.prefs),
        }
    }
}
