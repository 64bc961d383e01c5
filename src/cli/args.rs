//! CLI argument definitions and `LaunchPlan` construction.
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};

use crate::{models::ModelSlot, runtime::LaunchTarget};

use super::{
    resolve_config_store, resolve_selections_path, CliContext, LaunchPlan, COMMAND_ENV,
    CONFIG_ENV, DEFAULT_PROGRAM,
};

/// Parsed command intent from CLI.
#[derive(Debug, Clone)]
pub enum ParsedCommand {
    Launch(LaunchPlan),
    Cli {
        command: CliCommand,
        context: CliContext,
    },
}

/// Optional inspection and model-management commands.
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// List configured profiles in declared order.
    Profiles(ProfilesArgs),
    /// Print a profile's effective environment with secrets masked.
    Show(ShowArgs),
    /// Fetch the models offered by a profile's endpoint.
    Models(ModelsArgs),
    /// Persist (or clear) the model used for a slot of a profile.
    Select(SelectArgs),
}

/// Arguments for `profiles`.
#[derive(Debug, Clone, Args)]
pub struct ProfilesArgs {
    /// Emit JSON instead of text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Arguments for `show`.
#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    /// Profile to show (defaults to the first profile).
    pub profile: Option<String>,
    /// Emit JSON instead of text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Arguments for `models`.
#[derive(Debug, Clone, Args)]
pub struct ModelsArgs {
    /// Profile whose endpoint is queried (defaults to the first profile).
    pub profile: Option<String>,
}

/// Arguments for `select`.
#[derive(Debug, Clone, Args)]
#[command(
    after_help = "Hint: omit MODEL_ID to clear the slot, e.g. `ccode select work opus`."
)]
pub struct SelectArgs {
    /// Profile the choice applies to.
    pub profile: String,
    /// Model slot to set.
    #[arg(value_enum)]
    pub slot: ModelSlot,
    /// Model id as listed by `ccode models`; omit to clear the slot.
    pub model_id: Option<String>,
    /// Owner of the model when several owners offer the same id.
    #[arg(long)]
    pub owner: Option<String>,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ccode",
    author,
    version,
    about = "Launch a command with the environment of a named profile",
    long_about = None,
    after_help = "Launcher options go before PROFILE; everything after PROFILE is passed to the command unchanged.\nUse `ccode -- PROFILE` when a profile shares its name with a subcommand."
)]
pub struct LaunchArgs {
    /// Profile configuration file (skips the default search).
    #[arg(long = "config", env = CONFIG_ENV)]
    pub config_override: Option<PathBuf>,
    /// Executable to launch.
    #[arg(long = "command", env = COMMAND_ENV, default_value = DEFAULT_PROGRAM)]
    pub program: String,
    /// Print the environment but do not launch.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
    /// Do not print the environment before launching.
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
    /// Profile to launch (defaults to the first profile in the file), then
    /// the arguments passed verbatim to the launched command.
    #[arg(
        value_name = "PROFILE [ARGS]",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub rest: Vec<String>,
    /// Optional CLI command mode.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl LaunchArgs {
    /// Requested profile: the first positional argument.
    pub fn profile(&self) -> Option<&str> {
        self.rest.first().map(String::as_str)
    }

    /// Arguments after the profile, forwarded unchanged.
    pub fn passthrough(&self) -> &[String] {
        self.rest.get(1..).unwrap_or_default()
    }

    /// Build a `LaunchPlan` from CLI args and environment variables.
    pub fn build(self) -> Result<LaunchPlan> {
        let program = self.program.trim();
        if program.is_empty() {
            return Err(anyhow!("--command must name an executable"));
        }

        let program = program.to_string();
        let mut rest = self.rest.into_iter();
        let profile = rest.next();

        Ok(LaunchPlan {
            config_store: resolve_config_store(self.config_override)?,
            profile,
            target: LaunchTarget {
                program,
                args: rest.collect(),
            },
            selections_path: resolve_selections_path(),
            dry_run: self.dry_run,
            quiet: self.quiet,
        })
    }

    /// Parse CLI args into either launch mode or utility command mode.
    pub fn into_command(self) -> Result<ParsedCommand> {
        match self.command {
            Some(command) => Ok(ParsedCommand::Cli {
                command,
                context: CliContext {
                    config_store: resolve_config_store(self.config_override)?,
                    selections_path: resolve_selections_path(),
                },
            }),
            None => Ok(ParsedCommand::Launch(self.build()?)),
        }
    }
}
