use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use agent_hub::agent::{CapabilitySet, Coordinator};
use agent_hub::api;
use agent_hub::config::HubConfig;
use agent_hub::console;
use agent_hub::error::ConfigError;
use tokio::task::JoinError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = HubConfig::from_env().context("Failed to load configuration")?;

    // Initialize tracing (stderr, plus a daily rolling file when configured)
    let _log_guard = init_tracing(&config)?;

    let addr = config.socket_addr();
    eprintln!("🤖 Agent Hub v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Agents API: http://{}/api/agents", addr);
    eprintln!("   Events WS:  ws://{}/ws/agents", addr);

    // ── Coordinator ─────────────────────────────────────────────────────
    let capabilities = CapabilitySet::placeholders(config.simulated_latency);
    let coordinator = Coordinator::new(capabilities, config.event_capacity);

    // ── Transport ───────────────────────────────────────────────────────
    let listener = api::bind(addr).await?;
    let mut server = tokio::spawn(api::serve(listener, Arc::clone(&coordinator)));

    // ── Console / shutdown ──────────────────────────────────────────────
    let outcome = if config.console {
        eprintln!("   Type 'help' for commands, 'quit' to exit.\n");
        tokio::select! {
            result = console::run_stdio(Arc::clone(&coordinator)) => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Console failed");
                }
                Ok(())
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received");
                Ok(())
            }
            result = &mut server => server_exit(result),
        }
    } else {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => signal
                .context("Failed to listen for shutdown signal")
                .map(|()| tracing::info!("Interrupt received")),
            result = &mut server => server_exit(result),
        }
    };

    coordinator.stop_all().await;
    server.abort();
    tracing::info!("Agent Hub shut down");
    outcome
}

/// Turn an early transport exit into the process error.
fn server_exit(result: Result<agent_hub::error::Result<()>, JoinError>) -> anyhow::Result<()> {
    let err = match result {
        Ok(Ok(())) => anyhow::anyhow!("Agent transport stopped unexpectedly"),
        Ok(Err(e)) => anyhow::Error::new(e),
        Err(e) => anyhow::Error::new(e).context("Agent transport task failed"),
    };
    tracing::error!(error = %err, "Agent transport exited");
    Err(err)
}

fn init_tracing(
    config: &HubConfig,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(ConfigError::Io)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "agent-hub.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            Ok(None)
        }
    }
}
