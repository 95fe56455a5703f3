use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ai_client::GeminiClient;
use ghostroute_common::Config;
use ghostroute_server::{build_router, AppState};
use ghostroute_store::{seed_if_empty, EventStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("ghostroute=info".parse()?),
        )
        .init();

    let config = Config::from_env();

    // The pool is lazy so a database that is down at boot degrades
    // per-request instead of preventing startup.
    let store = match &config.database_url {
        Some(url) => Some(EventStore::connect_lazy(url)?),
        None => {
            warn!("DATABASE_URL not set, running without a store");
            None
        }
    };

    if let Some(store) = &store {
        match prepare_store(store).await {
            Ok(seeded) if seeded > 0 => info!(seeded, "seeded empty events table"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "store preparation failed, serving degraded"),
        }
    }

    let (generator, synthesizer) = if config.ai_enabled() {
        let client = Arc::new(GeminiClient::new(&config.gemini_api_key, &config.gemini_model));
        (
            Some(client.clone() as Arc<dyn ai_client::TextGenerator>),
            Some(client as Arc<dyn ai_client::SpeechSynthesizer>),
        )
    } else {
        warn!("GEMINI_API_KEY not set, AI endpoints will return stubs");
        (None, None)
    };

    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState { store: store.clone(), generator, synthesizer, config });
    let app = build_router(state);

    info!("Ghost Route server starting on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(store) = &store {
        store.close().await;
    }
    Ok(())
}

async fn prepare_store(store: &EventStore) -> Result<usize> {
    store.ensure_schema().await?;
    let seeded = seed_if_empty(store).await?;
    Ok(seeded)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install ctrl-c handler");
    }
    info!("shutdown signal received");
}
