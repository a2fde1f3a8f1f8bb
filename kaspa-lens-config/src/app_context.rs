use crate::{setting::Setting, PrefsStore};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};

const DEFAULT_PREFS_PATH: &str = "data/prefs.json";

#[derive(Debug, Clone)]
pub struct AppContext {
    pub setting: Arc<Setting>,
    pub http: reqwest::Client,
    pub prefs: Arc<PrefsStore>,
}

impl AppContext {
    pub async fn try_new() -> Result<Self> {
        let setting = Setting::try_new()?;
        Self::from_setting(setting).await
    }

    pub async fn from_setting(setting: Setting) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("kaspa-lens/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(setting.upstream.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let prefs_path = setting
            .prefs_path
            .clone()
            .unwrap_or_else(|| DEFAULT_PREFS_PATH.to_string());
        let prefs = PrefsStore::open(&prefs_path).await?;

        tracing::debug!(prefs_path, "app context ready");

        Ok(Self {
            setting: Arc::new(setting),
            http,
            prefs: Arc::new(prefs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_app_context() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let setting = Setting {
            prefs_path: Some(dir.path().join("prefs.json").display().to_string()),
            ..Default::default()
        };

        let app_context = AppContext::from_setting(setting).await?;
        assert_eq!(app_context.setting.upstream.timeout_secs, 15);
        assert!(!app_context.prefs.get().await.wallet_connected);

        Ok(())
    }
}
