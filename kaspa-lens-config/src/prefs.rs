use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};
use tokio::sync::Mutex;

// 本地持久化的少量偏好标记
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Prefs {
    pub favorite_tickers: BTreeSet<String>,
    pub watched_collections: BTreeSet<String>,
    pub last_view: Option<String>,
    pub wallet_connected: bool,
}

#[derive(Debug)]
pub struct PrefsStore {
    path: Option<PathBuf>,
    prefs: Mutex<Prefs>,
}

impl PrefsStore {
    // 文件不存在时使用默认值
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let prefs = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Prefs::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(PrefsStore {
            path: Some(path),
            prefs: Mutex::new(prefs),
        })
    }

    pub fn in_memory() -> Self {
        PrefsStore {
            path: None,
            prefs: Mutex::new(Prefs::default()),
        }
    }

    pub async fn get(&self) -> Prefs {
        self.prefs.lock().await.clone()
    }

    pub async fn update(&self, f: impl FnOnce(&mut Prefs)) -> Result<()> {
        let mut prefs = self.prefs.lock().await;
        f(&mut prefs);

        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            // 先写临时文件再改名
            let tmp = path.with_extension("json.tmp");
            tokio::fs::write(&tmp, serde_json::to_vec_pretty(&*prefs)?).await?;
            tokio::fs::rename(&tmp, path).await?;
        }

        Ok(())
    }

    pub async fn set_wallet_connected(&self, connected: bool) -> Result<()> {
        self.update(|prefs| prefs.wallet_connected = connected).await
    }

    // 切换收藏，返回切换后是否为收藏状态
    pub async fn toggle_favorite(&self, ticker: &str) -> Result<bool> {
        let mut favorite = false;
        self.update(|prefs| {
            if !prefs.favorite_tickers.remove(ticker) {
                prefs.favorite_tickers.insert(ticker.to_string());
                favorite = true;
            }
        })
        .await?;

        Ok(favorite)
    }

    pub async fn toggle_watched(&self, tick: &str) -> Result<bool> {
        let mut watched = false;
        self.update(|prefs| {
            if !prefs.watched_collections.remove(tick) {
                prefs.watched_collections.insert(tick.to_string());
                watched = true;
            }
        })
        .await?;

        Ok(watched)
    }
}
