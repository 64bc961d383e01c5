use tracing::debug;

use crate::{
    config::{ConfigDocument, VarMap},
    lib::errors::ResolveError,
};

use super::EffectiveEnvironment;

/// The profile chosen for this invocation and its merged variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub name: String,
    pub environment: EffectiveEnvironment,
}

/// Select a profile and merge it over the shared defaults.
///
/// With no request the first declared profile is used. A requested name must
/// match exactly; otherwise the error lists every valid name, sorted.
pub fn resolve(
    document: &ConfigDocument,
    requested: Option<&str>,
) -> Result<ResolvedProfile, ResolveError> {
    let profile = match requested {
        None => document.default_profile(),
        Some(name) => document.profile(name).ok_or_else(|| {
            let mut available: Vec<String> =
                document.profile_names().map(str::to_string).collect();
            available.sort();
            ResolveError::UnknownProfile {
                requested: name.to_string(),
                available,
            }
        })?,
    };

    let environment = merge(document.common(), &profile.vars);
    debug!(
        target: "ccode::resolve",
        profile = %profile.name,
        explicit = requested.is_some(),
        vars = environment.len(),
        "Resolved profile"
    );

    Ok(ResolvedProfile {
        name: profile.name.clone(),
        environment,
    })
}

/// Two-level override: every `common` entry, then every profile entry on top.
pub fn merge(common: &VarMap, overrides: &VarMap) -> EffectiveEnvironment {
    let mut vars = VarMap::new();
    vars.extend(common.iter().map(|(k, v)| (k.clone(), v.clone())));
    vars.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    EffectiveEnvironment::new(vars)
}
