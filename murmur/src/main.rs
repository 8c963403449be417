#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use args::Args;
use clap::Parser;
use murmur_server::Server;
use tokio_util::sync::CancellationToken;
use tts::{JobRequest, JobStatus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = args.config()?;

    // Initialize telemetry
    let _telemetry_guard = murmur_telemetry::init(config.telemetry.as_ref(), &args.log_filter)?;

    tracing::info!(
        config_path = ?args.config,
        init = ?config.model.init,
        voice = %config.voice.reference_path.display(),
        "starting murmur"
    );

    if let Some(raw) = &args.test_input {
        return run_once(&config, raw).await;
    }

    // Build server
    let server = Box::pin(Server::new(&config)).await?;

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    // Run server
    server.serve(shutdown).await?;

    tracing::info!("murmur stopped");
    Ok(())
}

/// Run a single job without a server and print its envelope to stdout
async fn run_once(config: &murmur_config::Config, raw: &str) -> anyhow::Result<()> {
    let request = parse_job(raw)?;

    let worker = tts::build_worker(config)?;
    worker
        .prepare()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare worker: {e}"))?;

    let result = worker.run(request).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.status == JobStatus::Failed {
        anyhow::bail!("job {} failed", result.id);
    }

    Ok(())
}

/// Accept either a full `{"input": ...}` envelope or a bare input object
fn parse_job(raw: &str) -> anyhow::Result<JobRequest> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("invalid --test-input JSON: {e}"))?;

    if value.get("input").is_some() {
        return Ok(serde_json::from_value(value)?);
    }

    Ok(JobRequest { id: None, input: value })
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
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
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
