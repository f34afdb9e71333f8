//! Prometheus metrics for the match engine.
//!
//! All labels are drawn from closed sets (phase names, winners, stop
//! causes), so cardinality is bounded by construction.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::ManhuntError;
use crate::phase::MatchPhase;
use crate::victory::Winner;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// # Errors
///
/// Returns `ManhuntError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), ManhuntError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| ManhuntError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "manhunt_phase_transitions_total",
        "Total number of phase transitions"
    );
    describe_gauge!(
        "manhunt_current_phase",
        "Currently active phase (1 = active)"
    );
    describe_counter!("manhunt_victories_total", "Decided matches by winner");
    describe_counter!(
        "manhunt_forced_stops_total",
        "Matches forced back to idle, by cause"
    );
    describe_counter!(
        "manhunt_hunter_eliminations_total",
        "Hunters permanently eliminated"
    );
    describe_gauge!(
        "manhunt_border_progress",
        "Border shrink progress in [0, 1]"
    );
}

/// Records a phase transition.
pub fn record_phase_transition(from: MatchPhase, to: MatchPhase) {
    counter!(
        "manhunt_phase_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
}

/// Sets the current phase gauge, zeroing the previous phase label.
pub fn set_current_phase(phase: MatchPhase, previous: Option<MatchPhase>) {
    if let Some(prev) = previous {
        gauge!("manhunt_current_phase", "phase" => prev.as_str()).set(0.0);
    }
    gauge!("manhunt_current_phase", "phase" => phase.as_str()).set(1.0);
}

/// Records a decided match.
pub fn record_victory(winner: Winner) {
    let label = match winner {
        Winner::Runner => "runner",
        Winner::Hunters => "hunters",
    };
    counter!("manhunt_victories_total", "winner" => label).increment(1);
}

/// Records a forced stop.
pub fn record_forced_stop(cause: &'static str) {
    counter!("manhunt_forced_stops_total", "cause" => cause).increment(1);
}

/// Records a permanent Hunter elimination.
pub fn record_hunter_elimination() {
    counter!("manhunt_hunter_eliminations_total").increment(1);
}

/// Sets the border progress gauge.
pub fn set_border_progress(progress: f64) {
    gauge!("manhunt_border_progress").set(progress);
}
