//! Sequential, fail-fast execution of a resolved plan.

use crate::error::ExecutionError;
use crate::resolve::ResolvedPlan;
use serde::Serialize;

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub executed: usize,
}

pub struct Executor;

impl Executor {
    /// Run every callback in resolved order against `target`.
    ///
    /// Stops at the first failure. Callbacks that already ran are not undone.
    pub fn execute<C>(
        plan: ResolvedPlan<C>,
        target: &mut C,
    ) -> Result<ExecutionReport, ExecutionError> {
        let total = plan.len();
        let mut executed = 0;

        for action in plan.into_actions() {
            let discriminator = action.discriminator.clone();
            let order = action.order();
            match action.invoke(target) {
                Ok(_) => {
                    executed += 1;
                    tracing::debug!(%discriminator, order, "action executed");
                }
                Err((info, err)) => {
                    let kind = err.kind().to_string();
                    let source = err.into_inner();
                    let value = source.to_string();
                    tracing::error!(
                        %discriminator,
                        order,
                        executed,
                        skipped = total - executed - 1,
                        "action failed: {kind}: {value}"
                    );
                    return Err(ExecutionError {
                        kind,
                        value,
                        info,
                        discriminator,
                        source,
                    });
                }
            }
        }

        tracing::info!(executed, "configuration executed");
        Ok(ExecutionReport { executed })
    }
}
