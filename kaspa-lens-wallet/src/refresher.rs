use crate::{WalletError, WalletProvider, WalletProviderKind};
use bon::bon;
use futures::future::BoxFuture;
use kaspa_lens_base::{Network, Sompi};
use kaspa_lens_config::WalletSetting;
use std::{
    task::{Context, Poll},
    time::Duration,
};
use tower::{retry::Policy, util::BoxService, BoxError, Service, ServiceBuilder, ServiceExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRequest {
    pub balance_delay: Duration, // 读网络和读余额之间的等待
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshResponse {
    pub network: Network,
    pub balance: Sompi,
}

impl Service<RefreshRequest> for WalletProviderKind {
    type Response = RefreshResponse;
    type Error = WalletError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RefreshRequest) -> Self::Future {
        let provider = self.clone();

        let fut = async move {
            let network = provider.get_network().await?;

            if !req.balance_delay.is_zero() {
                tokio::time::sleep(req.balance_delay).await;
            }

            let balance = provider.get_balance().await?;

            Ok(RefreshResponse { network, balance })
        };

        Box::pin(fut)
    }
}

/// 余额刷新的重试策略。
///
/// 连接类错误按 `min(base * 2^attempt, max)` 退避，其他错误固定等待 `base`；
/// 每次重试前另加 `lead`。最多重试 `max_retries` 次，之后放弃，等下一次定时刷新。
/// tower 为每个请求克隆一份策略，所以计数只在单次刷新内有效。
#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    attempt: usize,
    max_retries: usize,
    base: Duration,
    max: Duration,
    lead: Duration,
}

#[bon]
impl RefreshPolicy {
    #[builder]
    pub fn new(max_retries: usize, base: Duration, max: Duration, lead: Duration) -> Self {
        RefreshPolicy {
            attempt: 0,
            max_retries,
            base,
            max,
            lead,
        }
    }
}

impl RefreshPolicy {
    pub fn from_setting(setting: &WalletSetting) -> Self {
        RefreshPolicy::builder()
            .max_retries(setting.max_retries)
            .base(Duration::from_millis(setting.retry_base_ms))
            .max(Duration::from_millis(setting.retry_max_ms))
            .lead(Duration::from_millis(setting.retry_lead_ms))
            .build()
    }

    // 不含 lead
    pub fn backoff(&self, transient: bool) -> Duration {
        if !transient {
            return self.base;
        }

        let factor = 1u32.checked_shl(self.attempt as u32).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }
}

impl<Req, Res> Policy<Req, Res, BoxError> for RefreshPolicy
where
    Req: Clone,
{
    type Future = tokio::time::Sleep;

    fn retry(&mut self, _req: &mut Req, result: &mut Result<Res, BoxError>) -> Option<Self::Future> {
        let err = result.as_ref().err()?;

        if self.attempt >= self.max_retries {
            tracing::error!(
                attempts = self.attempt + 1,
                "balance refresh gave up until next tick: {}",
                err
            );
            return None;
        }

        let kind = WalletError::classify(err);
        let delay = self.backoff(kind.is_transient()) + self.lead;

        self.attempt += 1;
        tracing::warn!(
            attempt = self.attempt,
            %kind,
            delay_ms = delay.as_millis() as u64,
            "balance refresh failed, retrying: {}",
            err
        );

        Some(tokio::time::sleep(delay))
    }

    fn clone_request(&mut self, req: &Req) -> Option<Req> {
        Some(req.clone())
    }
}

pub type RefreshService = BoxService<RefreshRequest, RefreshResponse, BoxError>;

// 重试包在超时外层，每次调用单独计时
pub fn refresh_service(
    provider: &WalletProviderKind,
    policy: RefreshPolicy,
    call_timeout: Duration,
) -> RefreshService {
    ServiceBuilder::new()
        .retry(policy)
        .timeout(call_timeout)
        .service(provider.clone())
        .boxed()
}

// 不重试，用于连接时的首次读取
pub fn oneshot_service(provider: &WalletProviderKind, call_timeout: Duration) -> RefreshService {
    ServiceBuilder::new()
        .timeout(call_timeout)
        .service(provider.clone())
        .boxed()
}

pub async fn call_refresh(svc: &mut RefreshService, req: RefreshRequest) -> Result<RefreshResponse, WalletError> {
    svc.ready()
        .await
        .map_err(WalletError::from_boxed)?
        .call(req)
        .await
        .map_err(WalletError::from_boxed)
}
