//! Resolution pipeline: conflicts, then phases, then a stable topological
//! sort inside each phase.
//!
//! Every call to [`resolve`] owns its registry and builds fresh graph state,
//! so independent passes never share anything.

pub mod conflict;
pub mod phase;
pub mod topo;

pub use conflict::{resolve_conflicts, Resolution};
pub use topo::{Graph, NodeSpec, SortOutcome};

use crate::action::{Action, ActionInfo, Discriminator};
use crate::error::{CyclicDependencyError, Error, Result};
use crate::options::{HintPolicy, ResolverOptions};
use crate::registry::ActionRegistry;
use serde::Serialize;

// ---------------------------------------------------------------------------
// ResolvedPlan
// ---------------------------------------------------------------------------

/// Fully ordered, executable actions: ascending phases, each topologically
/// sorted.
pub struct ResolvedPlan<C> {
    phases: Vec<(i32, Vec<Action<C>>)>,
}

/// Serializable view of one resolved step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedStep {
    pub position: usize,
    pub phase: i32,
    pub order: usize,
    pub discriminator: Discriminator,
    pub info: ActionInfo,
}

impl<C> ResolvedPlan<C> {
    pub fn len(&self) -> usize {
        self.phases.iter().map(|(_, a)| a.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action<C>> {
        self.phases.iter().flat_map(|(_, a)| a.iter())
    }

    pub fn steps(&self) -> Vec<PlannedStep> {
        self.actions()
            .enumerate()
            .map(|(position, a)| PlannedStep {
                position,
                phase: a.phase,
                order: a.order(),
                discriminator: a.discriminator.clone(),
                info: a.info.clone(),
            })
            .collect()
    }

    pub(crate) fn into_actions(self) -> impl Iterator<Item = Action<C>> {
        self.phases.into_iter().flat_map(|(_, a)| a)
    }
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

/// Consume the registry and compute the execution order. No callback runs.
pub fn resolve<C>(
    registry: ActionRegistry<C>,
    options: &ResolverOptions,
) -> Result<ResolvedPlan<C>> {
    let submitted = registry.len();
    let deduped = resolve_conflicts(registry.into_actions())?;
    tracing::debug!(submitted, kept = deduped.len(), "conflicts resolved");

    let mut phases = Vec::new();
    for (phase, bucket) in phase::group_by_phase(deduped) {
        let sorted = sort_bucket(phase, bucket, options.hint_policy)?;
        tracing::debug!(phase, actions = sorted.len(), "phase sorted");
        phases.push((phase, sorted));
    }

    let plan = ResolvedPlan { phases };
    tracing::info!(
        actions = plan.len(),
        phases = plan.phase_count(),
        "configuration resolved"
    );
    Ok(plan)
}

fn sort_bucket<C>(
    phase: i32,
    bucket: Vec<Action<C>>,
    policy: HintPolicy,
) -> Result<Vec<Action<C>>> {
    let specs: Vec<NodeSpec<'_>> = bucket
        .iter()
        .map(|a| NodeSpec {
            order: a.order(),
            key: a.discriminator.as_key(),
            before: &a.before,
            after: &a.after,
        })
        .collect();
    let graph = Graph::build(&specs);

    for hint in graph.dangling() {
        let action = &bucket[hint.from];
        match policy {
            HintPolicy::Ignore => {}
            HintPolicy::Warn => tracing::warn!(
                phase,
                dependent = %action.discriminator,
                target = %hint.target,
                "ordering hint names no action in this phase"
            ),
            HintPolicy::Deny => {
                return Err(Error::DanglingHint {
                    dependent: action.discriminator.clone(),
                    target: hint.target.clone(),
                    phase,
                    info: action.info.clone(),
                })
            }
        }
    }

    let order = match topo::sort(&graph) {
        SortOutcome::Sorted(order) => order,
        SortOutcome::Cycle(residual) => {
            let label = |i: usize| node_label(&bucket[i]);
            let cycles = residual
                .into_iter()
                .map(|(i, succs)| (label(i), succs.into_iter().map(label).collect()))
                .collect();
            return Err(CyclicDependencyError { phase, cycles }.into());
        }
    };

    let mut slots: Vec<Option<Action<C>>> = bucket.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

fn node_label<C>(action: &Action<C>) -> String {
    match &action.discriminator {
        Discriminator::Key(k) => k.clone(),
        Discriminator::Unique => format!("<unique #{}>", action.order()),
    }
}
