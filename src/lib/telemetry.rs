//! Telemetry initialization and child-process span helpers.

use std::time::Instant;

use anyhow::Result;
use tracing::{info, info_span, Span};
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset; the launcher stays quiet unless asked.
const DEFAULT_FILTER: &str = "warn";

/// Initialize `tracing` and format developer logs on stderr.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span helper recording the lifetime of a spawned child process.
pub struct ChildSpan {
    span: Span,
    started_at: Instant,
}

impl ChildSpan {
    /// Start a span for `program` launched under `profile`.
    pub fn start(program: &str, profile: &str) -> Self {
        let span = info_span!(target: "ccode::launch", "child", program, profile);
        Self {
            span,
            started_at: Instant::now(),
        }
    }

    /// Close the span while recording how the child finished.
    pub fn finish(self, exit_code: Option<i32>, signal: Option<i32>) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        info!(
            target: "ccode::launch",
            exit_code = exit_code,
            signal = signal,
            elapsed_ms = elapsed_ms,
            "Child process finished"
        );
    }
}

/// Payload describing a launch, logged before the child is spawned.
#[derive(Debug)]
pub struct LaunchTelemetry<'a> {
    pub profile: &'a str,
    pub program: &'a str,
    pub config_path: &'a str,
    pub passthrough_args: usize,
    pub env_keys: &'a [&'a str],
}

/// Emit the launch description to `tracing`. Values are never logged, only key names.
pub fn emit_launch(telemetry: &LaunchTelemetry<'_>) {
    info!(
        target: "ccode::launch",
        profile = telemetry.profile,
        program = telemetry.program,
        config_path = telemetry.config_path,
        passthrough_args = telemetry.passthrough_args,
        env_keys = ?telemetry.env_keys,
        "Launching child process"
    );
}
