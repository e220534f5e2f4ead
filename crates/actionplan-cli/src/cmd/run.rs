use crate::output::{print_json, print_table};
use actionplan_core::{resolve, ExecutionReport, Executor, Settings};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct RunOutput<'a> {
    executed: usize,
    settings: &'a Settings,
}

pub fn run(plan: &Path, json: bool) -> anyhow::Result<()> {
    let (options, registry) = super::load(plan)?;
    let resolved = resolve(registry, &options)?;

    let mut settings = Settings::new();
    let ExecutionReport { executed } = Executor::execute(resolved, &mut settings)?;

    if json {
        print_json(&RunOutput {
            executed,
            settings: &settings,
        })?;
        return Ok(());
    }

    println!("Executed {executed} action(s).");
    if !settings.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = settings
            .iter()
            .map(|(k, v)| vec![k.to_string(), v.to_string()])
            .collect();
        print_table(&["KEY", "VALUE"], rows);
    }
    Ok(())
}
