//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::judge::LATENCY_WARN_THRESHOLD;
use crate::config::JudgeAppConfig;
use crate::logging::init_tracing;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<JudgeAppConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        JudgeAppConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        JudgeAppConfig::default()
    };

    config = config.with_env_overrides();

    // CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

/// Log the effective judge settings and warn when the worst case gets long.
///
/// The worst case assumes every attempt hits its timeout and every backoff
/// is slept in full.
pub fn log_judge_settings(config: &JudgeAppConfig) {
    let judge = &config.judge;
    let worst_case = judge.worst_case_latency();

    tracing::info!(
        model = %judge.model,
        threshold = judge.pass_threshold(),
        timeout_ms = judge.timeout().as_millis() as u64,
        max_attempts = judge.max_attempts(),
        worst_case_ms = worst_case.as_millis() as u64,
        proxy = judge.proxy_url.is_some(),
        "Judge configured"
    );

    if worst_case > LATENCY_WARN_THRESHOLD {
        tracing::warn!(
            worst_case_ms = worst_case.as_millis() as u64,
            "Worst-case judge latency exceeds {}s; players may give up before a verdict",
            LATENCY_WARN_THRESHOLD.as_secs()
        );
    }

    if judge.resolve_api_key().is_none() {
        tracing::warn!(
            api_key_env = %judge.api_key_env,
            "API key not set; /judge will answer with errors until it is"
        );
    }
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {}
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load, merge and validate configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;

    tracing::info!("Starting emoji-judge server");
    tracing::debug!(?config, "Loaded configuration");
    log_judge_settings(&config);

    // 3. Build state and router
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(Arc::new(config)));
    let app = create_router(state);

    // 4. Bind and serve
    let cancel_token = CancellationToken::new();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "emoji-judge listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    tracing::info!("emoji-judge stopped");
    Ok(())
}
