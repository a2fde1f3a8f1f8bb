use kaspa_lens_client::ClientError;
use serde::Serialize;
use strum_macros::Display;
use thiserror::Error;
use tower::BoxError;

#[derive(Serialize, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WalletErrorKind {
    Transport,       // 连接层错误，可退避重试
    Rejected,        // 用户或钱包拒绝
    NotConnected,    // 没有已连接的会话
    NoAccounts,      // 钱包未返回账户
    NetworkMismatch, // 切换后网络与目标不一致
    Provider,        // 其他钱包错误
}

impl WalletErrorKind {
    pub fn is_transient(&self) -> bool {
        matches!(self, WalletErrorKind::Transport)
    }
}

#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct WalletError {
    kind: WalletErrorKind,
    message: String,
}

impl WalletError {
    pub fn new(kind: WalletErrorKind, message: impl Into<String>) -> Self {
        WalletError {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(WalletErrorKind::Transport, message)
    }

    pub fn not_connected() -> Self {
        Self::new(WalletErrorKind::NotConnected, "wallet not connected")
    }

    pub fn kind(&self) -> WalletErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    // 经过 tower 中间件后错误被装箱，超时视为连接错误
    pub fn classify(err: &BoxError) -> WalletErrorKind {
        if let Some(e) = err.downcast_ref::<WalletError>() {
            e.kind()
        } else if err.is::<tower::timeout::error::Elapsed>() {
            WalletErrorKind::Transport
        } else {
            WalletErrorKind::Provider
        }
    }

    pub fn from_boxed(err: BoxError) -> Self {
        match err.downcast::<WalletError>() {
            Ok(e) => *e,
            Err(err) => {
                let kind = Self::classify(&err);
                Self::new(kind, err.to_string())
            }
        }
    }
}

impl From<ClientError> for WalletError {
    fn from(err: ClientError) -> Self {
        let kind = match &err {
            ClientError::Transport(_) => WalletErrorKind::Transport,
            ClientError::Status { status, .. } if *status >= 500 || *status == 429 => {
                WalletErrorKind::Transport
            }
            _ => WalletErrorKind::Provider,
        };

        WalletError::new(kind, err.to_string())
    }
}
