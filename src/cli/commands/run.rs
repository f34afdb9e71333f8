//! Headless match command
//!
//! Loads the configuration, wires the console host to a match engine, and
//! feeds stdin commands to it until EOF, `quit`, or a shutdown signal.

use std::path::Path;
use std::sync::Arc;

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

use crate::cli::args::RunArgs;
use crate::config::{ConfigLoader, MatchConfig};
use crate::console::{Console, ConsoleCommand, ConsoleHost};
use crate::error::ManhuntError;
use crate::host::{MatchHost, PlayerId};
use crate::observability::EventEmitter;
use crate::phase::MatchEngine;

/// Run a match driven by console commands.
///
/// # Errors
///
/// Returns a configuration error if the config cannot be loaded, an I/O
/// error if the events file or stdin fails, or a match error if the
/// engine stops unexpectedly.
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<(), ManhuntError> {
    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => MatchConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.engine.seed = Some(seed);
    }

    let emitter = if args.no_events {
        EventEmitter::noop()
    } else if let Some(path) = &args.events_file {
        EventEmitter::from_file(path)?
    } else {
        EventEmitter::stderr()
    };

    let host = Arc::new(ConsoleHost::stdout());
    for name in &args.players {
        host.connect(&PlayerId::new(name.as_str()));
    }

    let (handle, engine) = MatchEngine::spawn(
        Arc::new(config),
        Arc::clone(&host) as Arc<dyn MatchHost>,
        Arc::new(emitter),
    );
    let console = Console::new(handle.clone(), host);

    if args.auto_start {
        console.execute(ConsoleCommand::Start).await?;
    }

    let result = console
        .run(BufReader::new(tokio::io::stdin()), cancel)
        .await;

    handle.shutdown();
    engine.await.map_err(std::io::Error::other)?;
    tracing::info!("match engine stopped");
    result
}

fn load_config(path: &Path) -> Result<MatchConfig, ManhuntError> {
    tracing::info!(config = %path.display(), "loading configuration");
    let load_result = ConfigLoader::default().load(path)?;
    for warning in &load_result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    Ok(Arc::unwrap_or_clone(load_result.config))
}
