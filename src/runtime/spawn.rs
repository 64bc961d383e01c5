use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

use crate::{
    environment::EffectiveEnvironment,
    lib::{errors::SpawnError, telemetry::ChildSpan},
};

/// Exit status reported when the target executable cannot be started.
pub const SPAWN_FAILURE_EXIT_CODE: u8 = 127;

/// Variables set on the child command only. The launcher's own environment is
/// never modified, and variables absent from the overlay are inherited as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
    vars: Vec<(String, String)>,
}

impl EnvOverlay {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Turn an effective environment into the overlay for the child.
pub fn apply(environment: &EffectiveEnvironment) -> EnvOverlay {
    EnvOverlay {
        vars: environment
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    }
}

/// Executable plus the arguments forwarded to it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub program: String,
    pub args: Vec<String>,
}

/// How the child finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    Code(i32),
    Signal(i32),
}

impl ChildExit {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ChildExit::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ChildExit::Signal(signal);
            }
        }
        ChildExit::Code(1)
    }

    /// Status for the launcher itself: the child's code, or 128 + signal.
    pub fn exit_code(self) -> u8 {
        match self {
            ChildExit::Code(code) => u8::try_from(code).unwrap_or(1),
            ChildExit::Signal(signal) => u8::try_from(128 + signal).unwrap_or(u8::MAX),
        }
    }
}

/// Build the child command with inherited stdio and the overlay applied.
pub fn build_command(target: &LaunchTarget, overlay: &EnvOverlay) -> Command {
    let mut command = Command::new(&target.program);
    command.args(&target.args);
    command.envs(overlay.iter());
    command.stdin(Stdio::inherit());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());
    command
}

/// Start the target and wait for it to finish.
pub async fn spawn(
    target: &LaunchTarget,
    overlay: &EnvOverlay,
    profile: &str,
) -> Result<ChildExit, SpawnError> {
    let failure = |source| SpawnError::SpawnFailure {
        program: target.program.clone(),
        source,
    };

    let _interrupts = InterruptGuard::install();
    let span = ChildSpan::start(&target.program, profile);
    let mut child = build_command(target, overlay).spawn().map_err(failure)?;
    let status = child.wait().await.map_err(failure)?;

    let exit = ChildExit::from_status(status);
    match exit {
        ChildExit::Code(code) => span.finish(Some(code), None),
        ChildExit::Signal(signal) => span.finish(None, Some(signal)),
    }
    Ok(exit)
}

/// Keeps terminal interrupts from killing the launcher while a child runs.
///
/// The terminal delivers SIGINT and SIGQUIT to the whole foreground process
/// group, so the child still receives them and decides how to react; the
/// launcher only waits for its status. Exec'd children get the default
/// dispositions back.
struct InterruptGuard {
    #[cfg(unix)]
    _listeners: Vec<tokio::signal::unix::Signal>,
}

impl InterruptGuard {
    #[cfg(unix)]
    fn install() -> Self {
        use tokio::signal::unix::{signal, SignalKind};
        use tracing::warn;

        let listeners = [SignalKind::interrupt(), SignalKind::quit()]
            .into_iter()
            .filter_map(|kind| match signal(kind) {
                Ok(listener) => Some(listener),
                Err(err) => {
                    warn!(
                        target: "ccode::launch",
                        reason = %err,
                        "Failed to install interrupt listener"
                    );
                    None
                }
            })
            .collect();
        Self {
            _listeners: listeners,
        }
    }

    #[cfg(not(unix))]
    fn install() -> Self {
        Self {}
    }
}
