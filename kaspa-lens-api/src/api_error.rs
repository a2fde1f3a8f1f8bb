use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use kaspa_lens_client::ClientError;
use kaspa_lens_market::AirdropError;
use kaspa_lens_wallet::{WalletError, WalletErrorKind};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{} parameter is required", capitalize(.0))]
    MissingParam(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Upstream(#[from] ClientError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParam(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // 上游状态码原样返回
            ApiError::Upstream(e) => e
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Wallet(e) => match e.kind() {
                WalletErrorKind::NotConnected | WalletErrorKind::NoAccounts => StatusCode::CONFLICT,
                WalletErrorKind::NetworkMismatch => StatusCode::CONFLICT,
                WalletErrorKind::Rejected => StatusCode::FORBIDDEN,
                WalletErrorKind::Transport => StatusCode::BAD_GATEWAY,
                WalletErrorKind::Provider => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AirdropError> for ApiError {
    fn from(err: AirdropError) -> Self {
        match err {
            AirdropError::Client(e) => ApiError::Upstream(e),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::Upstream(e) => {
                tracing::error!("upstream error: {}", e);
                json!({
                    "success": false,
                    "error": "Failed to fetch data from upstream",
                    "details": e.to_string(),
                })
            }
            ApiError::Internal(e) => {
                tracing::error!("internal error: {:?}", e);
                json!({
                    "success": false,
                    "error": e.to_string(),
                    "details": format!("{:#}", e),
                })
            }
            other => json!({ "success": false, "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
