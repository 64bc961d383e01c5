use std::{path::Path, process::ExitCode};

use anyhow::{Error, Result};
use tracing::warn;

use crate::{
    cli::LaunchPlan,
    config::{ConfigDocument, ConfigStore},
    environment::{render, resolve, EffectiveEnvironment, SensitiveKeySet, AUTH_TOKEN_KEY},
    lib::telemetry::{emit_launch, LaunchTelemetry},
    models::{catalog::BASE_URL_KEY, SelectionStore},
};

use super::spawn::{apply, spawn, SPAWN_FAILURE_EXIT_CODE};

/// Bundles a one-line error message with the exit code to report it under.
#[derive(Debug)]
pub struct RuntimeExit {
    message: String,
    exit_code: ExitCode,
}

impl RuntimeExit {
    pub fn from_error(err: impl Into<Error>) -> Self {
        Self::with_code(err, ExitCode::FAILURE)
    }

    pub fn with_code(err: impl Into<Error>, exit_code: ExitCode) -> Self {
        let err = err.into();
        Self {
            message: format!("{err:#}"),
            exit_code,
        }
    }

    pub fn report(self) -> ExitCode {
        eprintln!("ccode: {}", self.message);
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }
}

/// A loaded document with one profile resolved and stored selections applied.
#[derive(Debug)]
pub struct PreparedProfile {
    pub document: ConfigDocument,
    pub name: String,
    pub environment: EffectiveEnvironment,
    pub selections: Option<SelectionStore>,
}

/// Load the configuration, resolve `requested`, and layer stored model
/// selections over the result.
pub fn prepare_profile(
    store: &ConfigStore,
    requested: Option<&str>,
    selections_path: Option<&Path>,
) -> Result<PreparedProfile> {
    let document = store.load()?;
    let resolved = resolve(&document, requested)?;
    let selections = selections_path.map(SelectionStore::load);
    let environment = match &selections {
        Some(selections) => resolved
            .environment
            .with_overrides(selections.overrides(&resolved.name)),
        None => resolved.environment,
    };

    Ok(PreparedProfile {
        document,
        name: resolved.name,
        environment,
        selections,
    })
}

/// Profile header followed by one `KEY=value` line per variable, secrets masked.
pub fn render_summary(profile: &str, environment: &EffectiveEnvironment) -> String {
    let mut summary = format!("Profile: {profile}\n");
    for (key, value) in render(environment, &SensitiveKeySet::default()) {
        summary.push_str(&format!("  {key}={value}\n"));
    }
    summary
}

/// Load → resolve → display → apply → spawn, returning the child's status.
pub async fn run_launch(plan: LaunchPlan) -> Result<ExitCode, RuntimeExit> {
    let prepared = prepare_profile(
        &plan.config_store,
        plan.profile.as_deref(),
        plan.selections_path.as_deref(),
    )
    .map_err(RuntimeExit::from_error)?;

    warn_missing_credentials(&prepared.name, &prepared.environment);
    if !plan.quiet {
        eprint!("{}", render_summary(&prepared.name, &prepared.environment));
    }
    if plan.dry_run {
        return Ok(ExitCode::SUCCESS);
    }

    let overlay = apply(&prepared.environment);
    let env_keys: Vec<&str> = overlay.keys().collect();
    emit_launch(&LaunchTelemetry {
        profile: &prepared.name,
        program: &plan.target.program,
        config_path: prepared.document.source_path().to_string_lossy().as_ref(),
        passthrough_args: plan.target.args.len(),
        env_keys: &env_keys,
    });

    let exit = spawn(&plan.target, &overlay, &prepared.name)
        .await
        .map_err(|err| RuntimeExit::with_code(err, ExitCode::from(SPAWN_FAILURE_EXIT_CODE)))?;
    Ok(ExitCode::from(exit.exit_code()))
}

fn warn_missing_credentials(profile: &str, environment: &EffectiveEnvironment) {
    for key in [BASE_URL_KEY, AUTH_TOKEN_KEY] {
        if !environment.has_value(key) {
            warn!(
                target: "ccode::launch",
                profile,
                key,
                "Profile does not set a value for this variable"
            );
        }
    }
}
