pub mod check;
pub mod resolve;
pub mod run;

use actionplan_core::{ActionRegistry, Plan, ResolverOptions, Settings};
use anyhow::Context;
use std::path::Path;

/// Load a plan file and register its actions.
pub fn load(path: &Path) -> anyhow::Result<(ResolverOptions, ActionRegistry<Settings>)> {
    let plan = Plan::load(path).with_context(|| format!("failed to load plan {}", path.display()))?;
    let loaded = plan
        .into_registry()
        .with_context(|| format!("invalid plan {}", path.display()))?;
    Ok(loaded)
}
