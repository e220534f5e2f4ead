use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// OptionWarning
// ---------------------------------------------------------------------------

/// A setting that is valid but likely to hide configuration mistakes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionWarning {
    pub message: String,
}

// ---------------------------------------------------------------------------
// HintPolicy
// ---------------------------------------------------------------------------

/// What to do with a before/after hint naming a key that has no surviving
/// action in the same phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintPolicy {
    Ignore,
    #[default]
    Warn,
    Deny,
}

impl HintPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            HintPolicy::Ignore => "ignore",
            HintPolicy::Warn => "warn",
            HintPolicy::Deny => "deny",
        }
    }
}

impl fmt::Display for HintPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ResolverOptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolverOptions {
    #[serde(default)]
    pub hint_policy: HintPolicy,
}

impl ResolverOptions {
    pub fn with_hint_policy(mut self, policy: HintPolicy) -> Self {
        self.hint_policy = policy;
        self
    }

    pub fn validate(&self) -> Vec<OptionWarning> {
        let mut warnings = Vec::new();
        if self.hint_policy == HintPolicy::Ignore {
            warnings.push(OptionWarning {
                message: "hint_policy 'ignore' hides misspelled before/after discriminators"
                    .to_string(),
            });
        }
        warnings
    }
}
