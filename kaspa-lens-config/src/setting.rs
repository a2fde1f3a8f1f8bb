use config::{Config, ConfigError, Environment, File};
use kaspa_lens_base::Network;
use serde::Deserialize;
use std::{env, path::Path};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Setting {
    pub server: ServerSetting,
    pub upstream: UpstreamSetting,
    pub wallet: WalletSetting,
    pub market: MarketSetting,
    pub telemetry: TelemetrySetting,
    pub prefs_path: Option<String>,
}

impl Setting {
    pub fn try_new() -> Result<Self, ConfigError> {
        // .env 文件可选
        let _ = dotenvy::dotenv();
        let run_mode = env::var("RUN_MODE").unwrap_or("dev".to_string());

        Self::load("config", &run_mode)
    }

    pub fn load(dir: impl AsRef<Path>, run_mode: &str) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();

        let config = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::from(dir.join("default.toml")).required(false))
            // Add in the current environment file
            // Note that this file is _optional_
            .add_source(File::from(dir.join(format!("{}.toml", run_mode))).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(File::from(dir.join("local.toml")).required(false))
            // Add in settings from the environment (with a prefix of APP)
            // Eg.. `APP_SERVER__PORT=8080 ./target/app` would set the `server.port` key
            .add_source(
                Environment::with_prefix("app")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSetting {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSetting {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerSetting {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UpstreamSetting {
    pub kaspa_api: String,
    pub kasfyi_api: String,
    pub kaspacom_api: String,
    pub kasplex_api: String,
    pub krc721_api: String,
    pub krc721_markets: String,
    pub krc721_cache: String,
    pub new_mints_api: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamSetting {
    fn default() -> Self {
        Self {
            kaspa_api: "https://api.kaspa.org".to_string(),
            kasfyi_api: "https://api-v2-do.kas.fyi".to_string(),
            kaspacom_api: "https://api.kaspa.com".to_string(),
            kasplex_api: "https://api.kasplex.org".to_string(),
            krc721_api: "https://mainnet.krc721.stream/api/v1/krc721/mainnet".to_string(),
            krc721_markets: "https://markets.krc20.stream/krc721/mainnet".to_string(),
            krc721_cache: "https://cache.krc721.stream/krc721/mainnet".to_string(),
            new_mints_api: "https://new-mints-server.vercel.app".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WalletSetting {
    pub provider: String,
    pub address: Option<String>,
    pub network: Network,
    pub refresh_interval_ms: u64,
    pub retry_base_ms: u64,
    pub retry_max_ms: u64,
    pub retry_lead_ms: u64,
    pub max_retries: usize,
    pub balance_delay_ms: u64,
    pub network_settle_ms: u64,
    pub switch_settle_ms: u64,
    pub call_timeout_secs: u64,
    pub allowed_testnet_addresses: Vec<String>,
}

impl Default for WalletSetting {
    fn default() -> Self {
        Self {
            provider: "watch".to_string(),
            address: None,
            network: Network::Mainnet,
            refresh_interval_ms: 5000,
            retry_base_ms: 5000,
            retry_max_ms: 10000,
            retry_lead_ms: 1000,
            max_retries: 3,
            balance_delay_ms: 500,
            network_settle_ms: 2000,
            switch_settle_ms: 1000,
            call_timeout_secs: 10,
            allowed_testnet_addresses: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarketSetting {
    pub tickers: Vec<String>,
    pub batch_size: usize,
    pub mint_poll_secs: u64,
}

impl Default for MarketSetting {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            batch_size: 100,
            mint_poll_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelemetrySetting {
    pub log_dir: String,
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySetting {
    fn default() -> Self {
        Self {
            log_dir: "/tmp/logs".to_string(),
            otlp_endpoint: None,
        }
    }
}
