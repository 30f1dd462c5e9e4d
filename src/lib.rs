pub mod api;
pub mod config;
pub mod core_state;
pub mod pipeline;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::api::{start_api_server, ServerError};
use crate::config::{AppConfig, ConfigError};
use crate::core_state::CoreState;
use crate::pipeline::extraction::DocumentExtractor;
use crate::pipeline::tutor::{GeminiClient, LlmError, TutorPipeline};

/// Anything that stops the process from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Model client setup failed: {0}")]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("Async runtime error: {0}")]
    Runtime(std::io::Error),
}

/// Load configuration, build the pipeline and serve the API until Ctrl-C.
///
/// Returns before binding anything when the API key is missing.
pub fn run() -> Result<(), StartupError> {
    // A missing .env file is fine; variables may come from the shell
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    let config = AppConfig::from_env().inspect_err(|e| tracing::error!(error = %e, "Configuration error"))?;

    // Blocking HTTP client: build it outside the async runtime
    let llm = GeminiClient::from_config(&config)?;
    let pipeline = TutorPipeline::new(
        Box::new(DocumentExtractor::with_defaults()),
        Box::new(llm),
        &config.model,
    );
    let core = Arc::new(CoreState::new(pipeline).with_idle_timeout(config.session_idle_timeout));
    tracing::info!(model = %config.model, timeout_secs = config.request_timeout.as_secs(), "Tutor pipeline ready");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(StartupError::Runtime)?;

    let result = runtime.block_on(serve_until_ctrl_c(Arc::clone(&core), config.bind_addr));
    drop(runtime);

    tracing::info!("{} stopped", config::APP_NAME);
    result
}

async fn serve_until_ctrl_c(
    core: Arc<CoreState>,
    addr: std::net::SocketAddr,
) -> Result<(), StartupError> {
    let sweeper = tokio::spawn(sweep_idle_sessions(Arc::clone(&core)));
    let server = start_api_server(core, addr).await?;
    tracing::info!(addr = %server.local_addr(), "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for Ctrl-C, shutting down");
    }

    server.shutdown().await;
    sweeper.abort();
    Ok(())
}

/// Periodically drop sessions whose browser went away without ending them.
async fn sweep_idle_sessions(core: Arc<CoreState>) {
    let period = (core.idle_timeout() / 4).max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match core.evict_idle_sessions() {
            Ok(0) => {}
            Ok(evicted) => tracing::info!(evicted, "Idle sessions dropped"),
            Err(e) => tracing::warn!(error = %e, "Idle session sweep failed"),
        }
    }
}
