use crate::action::Action;
use std::collections::BTreeMap;

/// Partition actions into phase buckets, ascending by phase number.
/// Registration order is kept inside each bucket.
pub fn group_by_phase<C>(actions: Vec<Action<C>>) -> BTreeMap<i32, Vec<Action<C>>> {
    let mut buckets: BTreeMap<i32, Vec<Action<C>>> = BTreeMap::new();
    for action in actions {
        buckets.entry(action.phase).or_default().push(action);
    }
    buckets
}
