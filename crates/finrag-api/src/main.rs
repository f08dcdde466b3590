use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use finrag_core::config::Credentials;
use finrag_retrieval::build_pipeline;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finrag_api::{create_router, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finrag_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (api_config, config, pipeline) = match ApiConfig::from_env().and_then(|api_config| {
        let config = api_config.layered()?;
        let credentials = Credentials::from_env()?;
        let pipeline = build_pipeline(&config, &credentials)?;
        Ok((api_config, config, pipeline))
    }) {
        Ok(built) => built,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            tracing::error!(
                "Remediation:\n\
                1. Set OPENAI_API_KEY and PINECONE_API_KEY (a .env file is read if present)\n\
                2. Check FINRAG_* overrides (including FINRAG_PORT) for malformed values\n\
                3. Verify FINRAG_CONFIG points at a readable TOML file"
            );
            std::process::exit(1);
        }
    };

    tracing::info!(
        port = api_config.port,
        index = %config.index_name.value,
        chat_model = %config.chat_model.value,
        session_idle_secs = api_config.session_idle_timeout.as_secs(),
        "Starting finrag API server"
    );

    let state = Arc::new(AppState::new(
        Arc::new(pipeline),
        config.display_settings(),
        api_config.session_idle_timeout,
    ));

    spawn_session_sweeper(state.clone());

    let origin = api_config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid FINRAG_CORS_ORIGIN: {}", api_config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let app = create_router(state).layer(cors).layer(TraceLayer::new_for_http());

    let addr = api_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", api_config.cors_origin);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Periodically discard sessions whose browser tab went away without ending them
fn spawn_session_sweeper(state: Arc<AppState>) {
    let period = (state.sessions.idle_timeout() / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            state.sessions.evict_idle();
        }
    });
}
