pub mod action;
pub mod error;
pub mod execute;
pub mod options;
pub mod plan;
pub mod registry;
pub mod resolve;

pub use action::{
    Action, ActionInfo, CallbackError, Discriminator, DEFAULT_PHASE, PHASE0_CONFIG, PHASE1_CONFIG,
    PHASE2_CONFIG, PHASE3_CONFIG,
};
pub use error::{ConflictError, CyclicDependencyError, Error, ExecutionError, Result};
pub use execute::{ExecutionReport, Executor};
pub use options::{HintPolicy, ResolverOptions};
pub use plan::{Plan, Settings};
pub use registry::ActionRegistry;
pub use resolve::{resolve, ResolvedPlan};
