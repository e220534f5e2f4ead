use crate::output::print_json;
use actionplan_core::options::OptionWarning;
use actionplan_core::resolve;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct CheckOutput {
    actions: usize,
    phases: usize,
    warnings: Vec<OptionWarning>,
}

pub fn run(plan: &Path, json: bool) -> anyhow::Result<()> {
    let (options, registry) = super::load(plan)?;
    let warnings = options.validate();
    let resolved = resolve(registry, &options)?;

    let output = CheckOutput {
        actions: resolved.len(),
        phases: resolved.phase_count(),
        warnings,
    };

    if json {
        print_json(&output)?;
        return Ok(());
    }

    for w in &output.warnings {
        println!("warning: {}", w.message);
    }
    println!(
        "ok: {} action(s) in {} phase(s)",
        output.actions, output.phases
    );
    Ok(())
}
