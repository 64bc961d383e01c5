//! CLI entrypoint module structure.
use anyhow::{anyhow, Context, Result};
use serde_json::{json, Map, Value};

use crate::{
    environment::{render, SensitiveKeySet},
    models::{choose_model, CatalogEndpoint, ModelCatalog, ModelSlot, SelectionStore},
    runtime::{prepare_profile, render_summary, PreparedProfile},
};

pub mod args;
pub mod launch;

pub use args::{
    CliCommand, LaunchArgs, ModelsArgs, ParsedCommand, ProfilesArgs, SelectArgs, ShowArgs,
};
pub use launch::{
    resolve_config_store, resolve_selections_path, CliContext, LaunchPlan, COMMAND_ENV,
    CONFIG_ENV, DEFAULT_PROGRAM,
};

/// Execute CLI command mode and return the text to print on stdout.
pub async fn execute_cli_command(command: CliCommand, context: CliContext) -> Result<String> {
    match command {
        CliCommand::Profiles(args) => list_profiles(&context, args.json),
        CliCommand::Show(args) => show_profile(&context, args.profile.as_deref(), args.json),
        CliCommand::Models(args) => list_models(&context, args.profile.as_deref()).await,
        CliCommand::Select(args) => select_model(&context, args).await,
    }
}

fn list_profiles(context: &CliContext, as_json: bool) -> Result<String> {
    let document = context.config_store.load()?;
    let default = document.default_profile().name.as_str();

    if as_json {
        let payload = json!({
            "config_path": document.source_path().to_string_lossy(),
            "default": default,
            "profiles": document.profile_names().collect::<Vec<_>>(),
        });
        return Ok(serde_json::to_string_pretty(&payload)?);
    }

    let lines: Vec<String> = document
        .profile_names()
        .map(|name| {
            if name == default {
                format!("{name} (default)")
            } else {
                name.to_string()
            }
        })
        .collect();
    Ok(lines.join("\n"))
}

fn show_profile(context: &CliContext, profile: Option<&str>, as_json: bool) -> Result<String> {
    let prepared = prepare(context, profile)?;

    if as_json {
        let environment: Map<String, Value> =
            render(&prepared.environment, &SensitiveKeySet::default())
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
        let payload = json!({
            "profile": prepared.name,
            "config_path": prepared.document.source_path().to_string_lossy(),
            "environment": environment,
        });
        return Ok(serde_json::to_string_pretty(&payload)?);
    }

    Ok(render_summary(&prepared.name, &prepared.environment)
        .trim_end()
        .to_string())
}

async fn list_models(context: &CliContext, profile: Option<&str>) -> Result<String> {
    let prepared = prepare(context, profile)?;
    let catalog = fetch_catalog(&prepared).await?;

    let mut selections = open_selections(prepared.selections)?;
    if selections.prune(&prepared.name, &catalog) {
        selections
            .save()
            .context("failed to drop selections the endpoint no longer offers")?;
    }

    Ok(format_catalog(&prepared.name, &catalog, &selections))
}

async fn select_model(context: &CliContext, args: SelectArgs) -> Result<String> {
    let prepared = prepare(context, Some(args.profile.as_str()))?;
    let slot = args.slot;

    let Some(model_id) = args.model_id else {
        let mut selections = open_selections(prepared.selections)?;
        if !selections.clear(&prepared.name, slot) {
            return Ok(format!(
                "No {} model was selected for `{}`",
                slot.as_str(),
                prepared.name
            ));
        }
        selections.save()?;
        return Ok(format!(
            "Cleared {} model for `{}`",
            slot.as_str(),
            prepared.name
        ));
    };

    let catalog = fetch_catalog(&prepared).await?;
    let choice = choose_model(&catalog, &model_id, args.owner.as_deref())?;
    let mut selections = open_selections(prepared.selections)?;
    selections.set(&prepared.name, slot, choice.clone());
    selections.save()?;

    Ok(format!(
        "Selected {} = {} ({}) for `{}`",
        slot.as_str(),
        choice.id,
        choice.owned_by,
        prepared.name
    ))
}

fn prepare(context: &CliContext, profile: Option<&str>) -> Result<PreparedProfile> {
    prepare_profile(
        &context.config_store,
        profile,
        context.selections_path.as_deref(),
    )
}

async fn fetch_catalog(prepared: &PreparedProfile) -> Result<ModelCatalog> {
    let endpoint = CatalogEndpoint::from_environment(&prepared.name, &prepared.environment)?;
    let catalog = endpoint
        .fetch()
        .await
        .with_context(|| format!("failed to list models from {}", endpoint.models_url()))?;
    Ok(catalog)
}

fn open_selections(loaded: Option<SelectionStore>) -> Result<SelectionStore> {
    loaded.ok_or_else(|| anyhow!("cannot locate the selection file: set HOME or CCODE_HOME"))
}

/// Models grouped by owner, with the profile's current choices marked.
fn format_catalog(profile: &str, catalog: &ModelCatalog, selections: &SelectionStore) -> String {
    if catalog.is_empty() {
        return format!("The endpoint for `{profile}` offers no models");
    }

    let mut lines = vec![format!(
        "Models for `{profile}` ({} total):",
        catalog.entries().len()
    )];
    for (owner, ids) in catalog.by_owner() {
        lines.push(format!("  {owner}"));
        for id in ids {
            let chosen: Vec<&str> = ModelSlot::ALL
                .iter()
                .filter(|slot| {
                    selections
                        .get(profile, **slot)
                        .is_some_and(|choice| choice.owned_by == owner && choice.id == id)
                })
                .map(|slot| slot.as_str())
                .collect();
            if chosen.is_empty() {
                lines.push(format!("    {id}"));
            } else {
                lines.push(format!("    {id} [{}]", chosen.join(", ")));
            }
        }
    }
    lines.join("\n")
}
