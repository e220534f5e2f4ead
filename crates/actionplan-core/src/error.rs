use crate::action::{ActionInfo, Discriminator};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ConflictError
// ---------------------------------------------------------------------------

/// One discriminator claimed by several non-overriding actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub discriminator: Discriminator,
    pub infos: Vec<ActionInfo>,
}

/// Raised during resolution when non-overriding actions share a discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ConflictError {
    pub conflicts: Vec<Conflict>,
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Conflicting configuration actions")?;
        for conflict in &self.conflicts {
            write!(f, "\n  For: {}", conflict.discriminator)?;
            for info in &conflict.infos {
                for line in info.to_string().trim_end().split('\n') {
                    write!(f, "\n    {line}")?;
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CyclicDependencyError
// ---------------------------------------------------------------------------

/// Raised when the before/after hints of one phase admit no linear order.
///
/// `cycles` maps each node left unresolved when the sort stalled to the
/// nodes it is still required to precede, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct CyclicDependencyError {
    pub phase: i32,
    pub cycles: Vec<(String, Vec<String>)>,
}

impl fmt::Display for CyclicDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<String> = self
            .cycles
            .iter()
            .map(|(dependent, dependees)| {
                let quoted: Vec<String> = dependees.iter().map(|d| quote(d)).collect();
                format!("{} sorts before [{}]", quote(dependent), quoted.join(", "))
            })
            .collect();
        write!(f, "Implicit ordering cycle:{}", clauses.join("; "))
    }
}

/// Quote a key the way a repr of a string would: single quotes unless the
/// key holds a `'` and no `"`.
fn quote(s: &str) -> String {
    let delim = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

// ---------------------------------------------------------------------------
// ExecutionError
// ---------------------------------------------------------------------------

/// A callback failed during execution. Actions before it already ran;
/// actions after it never will.
#[derive(Debug, Error)]
#[error("{kind}: {value}\n  in:\n  {info}")]
pub struct ExecutionError {
    pub kind: String,
    pub value: String,
    pub info: ActionInfo,
    pub discriminator: Discriminator,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Cycle(#[from] CyclicDependencyError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(
        "action '{dependent}' names unknown discriminator '{target}' in phase {phase}\n  in:\n  {info}"
    )]
    DanglingHint {
        dependent: Discriminator,
        target: String,
        phase: i32,
        info: ActionInfo,
    },

    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
