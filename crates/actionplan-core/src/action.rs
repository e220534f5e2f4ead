//! Action data model.
//!
//! An `Action` is a deferred unit of configuration work: an identity key
//! (the discriminator), ordering metadata, and a callback that mutates the
//! configuration target `C` when the resolved plan is executed.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::panic::Location;

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Lower phase numbers execute earlier. The default phase is 0.
pub const PHASE0_CONFIG: i32 = -30;
pub const PHASE1_CONFIG: i32 = -20;
pub const PHASE2_CONFIG: i32 = -10;
pub const PHASE3_CONFIG: i32 = 0;

pub const DEFAULT_PHASE: i32 = PHASE3_CONFIG;

/// Map a named phase (`phase0` .. `phase3`) to its number.
pub fn named_phase(name: &str) -> Option<i32> {
    match name {
        "phase0" => Some(PHASE0_CONFIG),
        "phase1" => Some(PHASE1_CONFIG),
        "phase2" => Some(PHASE2_CONFIG),
        "phase3" => Some(PHASE3_CONFIG),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Discriminator
// ---------------------------------------------------------------------------

/// Identity key used for conflict and override detection.
///
/// `Unique` actions are never deduplicated and cannot be named by
/// before/after hints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Discriminator {
    Key(String),
    Unique,
}

impl Discriminator {
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(k) => Some(k),
            Self::Unique => None,
        }
    }

    pub fn is_unique(&self) -> bool {
        matches!(self, Self::Unique)
    }
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Unique => f.write_str("<unique>"),
        }
    }
}

impl From<&str> for Discriminator {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for Discriminator {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

// ---------------------------------------------------------------------------
// ActionInfo
// ---------------------------------------------------------------------------

/// Where an action was registered. Only used to render error reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionInfo {
    /// A source location, optionally with the registering source text.
    Location {
        file: String,
        line: u32,
        column: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    /// Free-form provenance text, rendered verbatim.
    Text { text: String },
}

impl ActionInfo {
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(loc: &Location<'_>) -> Self {
        Self::Location {
            file: loc.file().to_string(),
            line: loc.line(),
            column: loc.column(),
            source: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Attach source text to a location. Text infos are returned unchanged.
    pub fn with_source(self, text: impl Into<String>) -> Self {
        match self {
            Self::Location {
                file, line, column, ..
            } => Self::Location {
                file,
                line,
                column,
                source: Some(text.into()),
            },
            other => other,
        }
    }
}

impl fmt::Display for ActionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location {
                file,
                line,
                column,
                source,
            } => {
                write!(f, "File \"{file}\", line {line}, column {column}")?;
                if let Some(src) = source {
                    for l in src.trim_end().lines() {
                        write!(f, "\n  {l}")?;
                    }
                }
                Ok(())
            }
            Self::Text { text } => f.write_str(text),
        }
    }
}

// ---------------------------------------------------------------------------
// CallbackError
// ---------------------------------------------------------------------------

/// Failure returned by an action callback.
///
/// Any `std::error::Error` converts with `?`; its type name becomes the
/// `kind` reported by `ExecutionError`. Deliberately not an `Error` itself
/// so the blanket `From` stays coherent.
pub struct CallbackError {
    kind: Cow<'static, str>,
    inner: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl CallbackError {
    pub fn msg(kind: impl Into<Cow<'static, str>>, message: impl fmt::Display) -> Self {
        Self {
            kind: kind.into(),
            inner: Box::new(Message(message.to_string())),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self.inner
    }
}

impl<E> From<E> for CallbackError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self {
            kind: Cow::Borrowed(short_type_name(std::any::type_name::<E>())),
            inner: Box::new(err),
        }
    }
}

impl fmt::Debug for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackError")
            .field("kind", &self.kind)
            .field("inner", &self.inner)
            .finish()
    }
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.inner)
    }
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Message {}

/// `std::io::error::Error` -> `Error`, `core::num::error::ParseIntError` -> `ParseIntError`.
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

pub type Callback<C> = Box<dyn FnOnce(&mut C) -> Result<(), CallbackError>>;

/// A deferred configuration step over target `C`.
pub struct Action<C> {
    pub discriminator: Discriminator,
    pub phase: i32,
    pub before: BTreeSet<String>,
    pub after: BTreeSet<String>,
    pub override_previous: bool,
    pub info: ActionInfo,
    order: usize,
    callback: Callback<C>,
}

impl<C> Action<C> {
    /// New action in the default phase, with the caller's location as info.
    #[track_caller]
    pub fn new<F>(discriminator: impl Into<Discriminator>, callback: F) -> Self
    where
        F: FnOnce(&mut C) -> Result<(), CallbackError> + 'static,
    {
        Self {
            discriminator: discriminator.into(),
            phase: DEFAULT_PHASE,
            before: BTreeSet::new(),
            after: BTreeSet::new(),
            override_previous: false,
            info: ActionInfo::caller(),
            order: 0,
            callback: Box::new(callback),
        }
    }

    /// New action with the `Unique` sentinel discriminator.
    #[track_caller]
    pub fn unique<F>(callback: F) -> Self
    where
        F: FnOnce(&mut C) -> Result<(), CallbackError> + 'static,
    {
        Self::new(Discriminator::Unique, callback)
    }

    pub fn phase(mut self, phase: i32) -> Self {
        self.phase = phase;
        self
    }

    pub fn before(mut self, key: impl Into<String>) -> Self {
        self.before.insert(key.into());
        self
    }

    pub fn after(mut self, key: impl Into<String>) -> Self {
        self.after.insert(key.into());
        self
    }

    pub fn overriding(mut self, override_previous: bool) -> Self {
        self.override_previous = override_previous;
        self
    }

    pub fn info(mut self, info: ActionInfo) -> Self {
        self.info = info;
        self
    }

    /// Registration sequence number, assigned by `ActionRegistry::add`.
    pub fn order(&self) -> usize {
        self.order
    }

    pub(crate) fn set_order(&mut self, order: usize) {
        self.order = order;
    }

    /// Consume the action and run its callback.
    pub(crate) fn invoke(self, target: &mut C) -> Result<ActionInfo, (ActionInfo, CallbackError)> {
        let Self { info, callback, .. } = self;
        match callback(target) {
            Ok(()) => Ok(info),
            Err(e) => Err((info, e)),
        }
    }
}

impl<C> fmt::Debug for Action<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("discriminator", &self.discriminator)
            .field("phase", &self.phase)
            .field("order", &self.order)
            .field("before", &self.before)
            .field("after", &self.after)
            .field("override_previous", &self.override_previous)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}
