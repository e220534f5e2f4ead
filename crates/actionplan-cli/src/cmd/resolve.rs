use crate::output::{one_line, print_json, print_table};
use actionplan_core::resolve;
use std::path::Path;

pub fn run(plan: &Path, json: bool) -> anyhow::Result<()> {
    let (options, registry) = super::load(plan)?;
    let resolved = resolve(registry, &options)?;
    let steps = resolved.steps();

    if json {
        print_json(&steps)?;
        return Ok(());
    }

    if steps.is_empty() {
        println!("No actions.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = steps
        .iter()
        .map(|s| {
            vec![
                (s.position + 1).to_string(),
                s.phase.to_string(),
                s.discriminator.to_string(),
                one_line(&s.info.to_string()),
            ]
        })
        .collect();
    print_table(&["#", "PHASE", "DISCRIMINATOR", "INFO"], rows);
    Ok(())
}
