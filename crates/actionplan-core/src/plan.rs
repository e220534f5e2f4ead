//! Declarative plan files.
//!
//! A plan file lists actions as data: discriminator, phase, ordering hints,
//! override flag and one settings operation. Loading a plan produces an
//! `ActionRegistry<Settings>` that resolves and executes like any other.

use crate::action::{named_phase, Action, ActionInfo, CallbackError, Discriminator, DEFAULT_PHASE};
use crate::error::{Error, Result};
use crate::options::ResolverOptions;
use crate::registry::ActionRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Configuration target for plan-file actions: an ordered key/value map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, String>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Append to a comma-separated list value.
    pub fn append(&mut self, key: &str, value: &str) {
        match self.0.get_mut(key) {
            Some(existing) if !existing.is_empty() => {
                existing.push(',');
                existing.push_str(value);
            }
            _ => {
                self.0.insert(key.to_string(), value.to_string());
            }
        }
    }

    pub fn unset(&mut self, key: &str) {
        self.0.remove(key);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// The side effect a plan-file action performs on `Settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    Set { key: String, value: String },
    Append { key: String, value: String },
    Unset { key: String },
    Require { key: String },
    Fail { message: String },
}

impl Operation {
    pub fn apply(&self, settings: &mut Settings) -> std::result::Result<(), CallbackError> {
        match self {
            Operation::Set { key, value } => settings.set(key.as_str(), value.as_str()),
            Operation::Append { key, value } => settings.append(key, value),
            Operation::Unset { key } => settings.unset(key),
            Operation::Require { key } => {
                if settings.get(key).is_none() {
                    return Err(CallbackError::msg(
                        "MissingSetting",
                        format!("required setting '{key}' is not set"),
                    ));
                }
            }
            Operation::Fail { message } => {
                return Err(CallbackError::msg("PlanFailure", message));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PhaseSpec
// ---------------------------------------------------------------------------

/// A phase given as a number or as one of `phase0` .. `phase3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhaseSpec {
    Number(i32),
    Named(String),
}

impl PhaseSpec {
    pub fn value(&self) -> Result<i32> {
        match self {
            PhaseSpec::Number(n) => Ok(*n),
            PhaseSpec::Named(name) => named_phase(name)
                .ok_or_else(|| Error::InvalidPlan(format!("unknown phase '{name}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanAction {
    /// Omitted means the action is always unique.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<PhaseSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,
    #[serde(default, rename = "override")]
    pub override_previous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    pub op: Operation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub options: ResolverOptions,
    #[serde(default)]
    pub actions: Vec<PlanAction>,
    /// File the plan was read from; used to label action provenance.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Plan {
    /// Read a plan file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut plan = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&data)?
        } else {
            Self::from_yaml(&data)?
        };
        plan.source = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), actions = plan.actions.len(), "plan loaded");
        Ok(plan)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Turn every plan entry into a registered action, in file order.
    pub fn into_registry(self) -> Result<(ResolverOptions, ActionRegistry<Settings>)> {
        let label = self
            .source
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<plan>".to_string());

        let mut registry = ActionRegistry::new();
        for (idx, entry) in self.actions.into_iter().enumerate() {
            let discriminator = match entry.discriminator {
                Some(key) if key.trim().is_empty() => {
                    return Err(Error::InvalidPlan(format!(
                        "action #{} has an empty discriminator",
                        idx + 1
                    )));
                }
                Some(key) => Discriminator::Key(key),
                None => Discriminator::Unique,
            };
            let phase = match &entry.phase {
                Some(spec) => spec.value()?,
                None => DEFAULT_PHASE,
            };
            let info = match entry.info {
                Some(text) => ActionInfo::text(format!("{label}: action #{}\n{text}", idx + 1)),
                None => ActionInfo::text(format!("{label}: action #{}", idx + 1)),
            };
            let op = entry.op;
            let mut action = Action::new(discriminator, move |settings: &mut Settings| {
                op.apply(settings)
            })
            .phase(phase)
            .overriding(entry.override_previous)
            .info(info);
            action.before.extend(entry.before);
            action.after.extend(entry.after);
            registry.add(action);
        }
        Ok((self.options, registry))
    }
}
