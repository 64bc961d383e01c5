//! Launch pipeline and child process execution.
mod spawn;
mod startup;

pub use spawn::{apply, build_command, spawn, ChildExit, EnvOverlay, LaunchTarget, SPAWN_FAILURE_EXIT_CODE};
pub use startup::{prepare_profile, render_summary, run_launch, PreparedProfile, RuntimeExit};
