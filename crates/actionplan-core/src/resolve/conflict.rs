//! Discriminator conflict resolution.
//!
//! Actions sharing a key discriminator are folded in registration order. Each
//! action gets one of three outcomes; a group left with more than one
//! survivor is a conflict.

use crate::action::{Action, Discriminator};
use crate::error::{Conflict, ConflictError};
use std::collections::HashMap;

/// How an action relates to earlier actions with the same discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// First of its discriminator (or a `Unique` action).
    Unique,
    /// Replaces every earlier member of its group.
    OverridesPrevious,
    /// Joins the surviving set alongside earlier members.
    ConflictsWithPrevious,
}

impl Resolution {
    pub fn classify(has_previous: bool, override_previous: bool) -> Self {
        match (has_previous, override_previous) {
            (false, _) => Resolution::Unique,
            (true, true) => Resolution::OverridesPrevious,
            (true, false) => Resolution::ConflictsWithPrevious,
        }
    }
}

/// Collapse duplicate discriminators. Input must be in registration order;
/// output keeps that order with dropped actions removed.
pub fn resolve_conflicts<C>(actions: Vec<Action<C>>) -> Result<Vec<Action<C>>, ConflictError> {
    // key -> indices of the current survivors, plus first-seen order of keys
    let mut survivors: HashMap<String, Vec<usize>> = HashMap::new();
    let mut key_order: Vec<String> = Vec::new();
    let mut dropped = vec![false; actions.len()];

    for (idx, action) in actions.iter().enumerate() {
        let Discriminator::Key(key) = &action.discriminator else {
            continue;
        };
        let group = survivors.entry(key.clone()).or_insert_with(|| {
            key_order.push(key.clone());
            Vec::new()
        });
        match Resolution::classify(!group.is_empty(), action.override_previous) {
            Resolution::Unique | Resolution::ConflictsWithPrevious => group.push(idx),
            Resolution::OverridesPrevious => {
                for prev in group.drain(..) {
                    tracing::debug!(
                        discriminator = %key,
                        dropped = %actions[prev].info,
                        "action overridden"
                    );
                    dropped[prev] = true;
                }
                group.push(idx);
            }
        }
    }

    let conflicts: Vec<Conflict> = key_order
        .iter()
        .filter_map(|key| {
            let group = &survivors[key];
            (group.len() > 1).then(|| Conflict {
                discriminator: Discriminator::Key(key.clone()),
                infos: group.iter().map(|&i| actions[i].info.clone()).collect(),
            })
        })
        .collect();

    if !conflicts.is_empty() {
        return Err(ConflictError { conflicts });
    }

    Ok(actions
        .into_iter()
        .zip(dropped)
        .filter_map(|(action, gone)| (!gone).then_some(action))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionInfo;
    use crate::registry::ActionRegistry;

    fn act(key: &str, info: &str, over: bool) -> Action<()> {
        Action::new(key, |_| Ok(()))
            .info(ActionInfo::text(info))
            .overriding(over)
    }

    fn infos(actions: &[Action<()>]) -> Vec<String> {
        actions.iter().map(|a| a.info.to_string()).collect()
    }

    fn resolve(actions: Vec<Action<()>>) -> Result<Vec<Action<()>>, ConflictError> {
        let mut reg = ActionRegistry::new();
        reg.extend(actions);
        resolve_conflicts(reg.into_actions())
    }

    #[test]
    fn classify_is_three_way() {
        assert_eq!(Resolution::classify(false, false), Resolution::Unique);
        assert_eq!(Resolution::classify(false, true), Resolution::Unique);
        assert_eq!(Resolution::classify(true, true), Resolution::OverridesPrevious);
        assert_eq!(
            Resolution::classify(true, false),
            Resolution::ConflictsWithPrevious
        );
    }

    #[test]
    fn distinct_keys_pass_through() {
        let out = resolve(vec![act("a", "1", false), act("b", "2", false)]).unwrap();
        assert_eq!(infos(&out), vec!["1", "2"]);
    }

    #[test]
    fn later_override_replaces_earlier() {
        let out = resolve(vec![
            act("d1", "x", false),
            act("other", "o", false),
            act("d1", "y", true),
        ])
        .unwrap();
        assert_eq!(infos(&out), vec!["o", "y"]);
    }

    #[test]
    fn override_clears_earlier_conflicts() {
        let out = resolve(vec![
            act("d", "1", false),
            act("d", "2", false),
            act("d", "3", true),
        ])
        .unwrap();
        assert_eq!(infos(&out), vec!["3"]);
    }

    #[test]
    fn non_overriding_after_override_conflicts() {
        let err = resolve(vec![
            act("d", "1", false),
            act("d", "2", true),
            act("d", "3", false),
        ])
        .unwrap_err();
        assert_eq!(err.conflicts.len(), 1);
        let got: Vec<String> = err.conflicts[0].infos.iter().map(|i| i.to_string()).collect();
        assert_eq!(got, vec!["2", "3"]);
    }

    #[test]
    fn duplicate_without_override_conflicts() {
        let err = resolve(vec![
            act("route:home", "views:10", false),
            act("route:home", "views:20", false),
        ])
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("For: route:home"));
        assert!(msg.contains("views:10"));
        assert!(msg.contains("views:20"));
    }

    #[test]
    fn all_conflicts_reported_in_first_seen_order() {
        let err = resolve(vec![
            act("b", "b1", false),
            act("a", "a1", false),
            act("a", "a2", false),
            act("b", "b2", false),
        ])
        .unwrap_err();
        let keys: Vec<String> = err
            .conflicts
            .iter()
            .map(|c| c.discriminator.to_string())
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn unique_actions_never_conflict() {
        let out = resolve(vec![
            Action::unique(|_| Ok(())).info(ActionInfo::text("u1")),
            Action::unique(|_| Ok(())).info(ActionInfo::text("u2")),
        ])
        .unwrap();
        assert_eq!(infos(&out), vec!["u1", "u2"]);
    }
}
