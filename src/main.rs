//! Wiring & DI. Entry point: bootstrap adapters, inject into use cases, serve the webhook.
//! No business logic here.

use dotenv::dotenv;
use health_companion::adapters::ai::{MockAiAdapter, OpenAiAdapter};
use health_companion::adapters::line::{build_router, LineReplyAdapter};
use health_companion::adapters::persistence::{
    FsTemplateStore, JsonlActivityStore, SampleActivityStore,
};
use health_companion::ports::{
    ActivityLogPort, ActivityStorePort, GenerationPort, InboundPort, ReplyPort, TemplatePort,
};
use health_companion::shared::config::{ActivityStoreKind, AppConfig};
use health_companion::usecases::{
    DegradationPolicy, EventRouter, Generators, IntentClassifier, DEFAULT_HISTORY_LIMIT,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    // --- Generation service ---
    let ai: Arc<dyn GenerationPort> = if cfg.is_ai_configured() {
        info!(
            model = %cfg.ai_model_or_default(),
            url = %cfg.ai_api_url_or_default(),
            "generation enabled with OpenAI adapter"
        );
        Arc::new(OpenAiAdapter::new(
            cfg.ai_api_url_or_default(),
            cfg.ai_api_key().unwrap_or_default(),
            cfg.ai_model_or_default(),
        ))
    } else {
        warn!("OPENAI_API_KEY not set, using mock AI adapter");
        Arc::new(MockAiAdapter::new())
    };

    // --- Templates and activity history ---
    let prompts_dir = cfg.prompts_dir_or_default();
    info!(path = %prompts_dir.display(), "prompt templates directory");
    let templates: Arc<dyn TemplatePort> = Arc::new(FsTemplateStore::new(&prompts_dir));

    let activity_dir = cfg.data_dir_or_default().join("activity");
    let jsonl_store = Arc::new(JsonlActivityStore::new(&activity_dir));
    let activity_log: Arc<dyn ActivityLogPort> =
        Arc::clone(&jsonl_store) as Arc<dyn ActivityLogPort>;
    let store: Arc<dyn ActivityStorePort> = match cfg.activity_store_or_default() {
        ActivityStoreKind::Jsonl => {
            info!(path = %activity_dir.display(), "activity history: JSONL store");
            jsonl_store as Arc<dyn ActivityStorePort>
        }
        ActivityStoreKind::Sample => {
            info!("activity history: built-in sample records");
            Arc::new(SampleActivityStore)
        }
    };

    // --- Reply delivery ---
    let line_token = cfg.line_channel_access_token();
    if line_token.is_none() {
        warn!("LINE_CHANNEL_ACCESS_TOKEN not set, replies will not be delivered");
    }
    let replies: Arc<dyn ReplyPort> = Arc::new(LineReplyAdapter::new(
        cfg.line_reply_url_or_default(),
        line_token,
    ));

    // --- Pipeline ---
    let policy = DegradationPolicy::new(
        cfg.quota_locale_or_default(),
        cfg.fallback_locale_or_default(),
    );
    let history_limit = cfg.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let router = EventRouter::new(
        IntentClassifier::new(Arc::clone(&ai), Arc::clone(&templates)),
        Generators::new(ai, templates, store, history_limit),
        policy,
        replies,
        activity_log,
    );
    let queue_size = cfg.event_queue_size_or_default();
    info!(queue_size, "event router started");
    let inbound: Arc<dyn InboundPort> = Arc::new(router.spawn(queue_size));

    // --- HTTP ---
    let bind_addr = cfg.bind_addr_or_default();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("bind {}: {}", bind_addr, e))?;
    info!(addr = %bind_addr, "webhook listening on /webhook");
    axum::serve(listener, build_router(inbound))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("ctrl-c received, shutting down");
}
