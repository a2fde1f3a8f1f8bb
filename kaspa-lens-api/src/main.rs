use anyhow::Context;
use kaspa_lens_api::{
    helper::init_tracing_subscriber,
    market::{poll_mints, reload_tokens},
    routes, AppState,
};
use kaspa_lens_client::KaspaRestClient;
use kaspa_lens_config::AppContext;
use kaspa_lens_wallet::{
    provider::ProviderType, MockWalletProvider, RestWatchProvider, WalletHandle,
    WalletProviderKind,
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

const SERVER_NAME: &str = "kaspa-lens-api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let context = AppContext::try_new().await?;
    let _guard = init_tracing_subscriber(SERVER_NAME, &context.setting.telemetry)?;

    let wallet = WalletHandle::spawn(
        build_provider(&context)?,
        &context.setting.wallet,
        Arc::clone(&context.prefs),
    );

    if let Some(snapshot) = wallet.restore().await? {
        tracing::info!(address = ?snapshot.address, "previous wallet session restored");
    }

    let state = AppState::new(&context, wallet.clone()).await;
    let cancel_token = CancellationToken::new();

    tokio::spawn({
        let state = state.clone();
        async move {
            if let Err(e) = reload_tokens(state).await {
                tracing::error!("initial token load failed: {:#}", e);
            }
        }
    });

    tokio::spawn(poll_mints(
        state.clone(),
        Duration::from_secs(context.setting.market.mint_poll_secs.max(1)),
        cancel_token.clone(),
    ));

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = context.setting.server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("{} listening on {}", SERVER_NAME, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await
        .context("Server error")?;

    wallet.shutdown();

    Ok(())
}

fn build_provider(context: &AppContext) -> anyhow::Result<WalletProviderKind> {
    let setting = &context.setting.wallet;
    let provider_type = setting
        .provider
        .parse::<ProviderType>()
        .with_context(|| format!("unknown wallet provider {:?}", setting.provider))?;

    let provider = match provider_type {
        ProviderType::Watch => RestWatchProvider::new(
            KaspaRestClient::new(context.http.clone(), &context.setting.upstream.kaspa_api),
            setting.address.clone(),
            setting.network,
        )
        .into(),
        ProviderType::Mock => MockWalletProvider::builder()
            .accounts(setting.address.clone().into_iter().collect())
            .network(setting.network)
            .build()
            .into(),
    };

    tracing::info!(?provider_type, "wallet provider ready");
    Ok(provider)
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }

    tracing::info!("shutting down");
    cancel_token.cancel();
}
