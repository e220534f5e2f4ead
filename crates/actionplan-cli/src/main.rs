mod cmd;
mod output;

use actionplan_core::ExecutionError;
use clap::{Parser, Subcommand};
use std::error::Error as StdError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "actionplan",
    about = "Resolve configuration actions into one conflict-free, cycle-free order and run them",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved execution order of a plan
    Resolve {
        /// Plan file (YAML, or JSON with a .json extension)
        plan: PathBuf,
    },

    /// Resolve a plan and execute its actions against empty settings
    Run {
        /// Plan file (YAML, or JSON with a .json extension)
        plan: PathBuf,
    },

    /// Validate a plan without executing anything
    Check {
        /// Plan file (YAML, or JSON with a .json extension)
        plan: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Resolve { plan } => cmd::resolve::run(&plan, cli.json),
        Commands::Run { plan } => cmd::run::run(&plan, cli.json),
        Commands::Check { plan } => cmd::check::run(&plan, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {}", render_error(&e));
        std::process::exit(1);
    }
}

/// The error chain joined like anyhow's alternate Display, except that it
/// stops after an execution error: its message already names the failing
/// callback's kind and value.
fn render_error(e: &anyhow::Error) -> String {
    let mut out = String::new();
    for (i, cause) in e.chain().enumerate() {
        if i > 0 {
            out.push_str(": ");
        }
        out.push_str(&cause.to_string());
        if is_execution_error(cause) {
            break;
        }
    }
    out
}

fn is_execution_error(cause: &(dyn StdError + 'static)) -> bool {
    cause.is::<ExecutionError>()
        || matches!(
            cause.downcast_ref::<actionplan_core::Error>(),
            Some(actionplan_core::Error::Execution(_))
        )
}
