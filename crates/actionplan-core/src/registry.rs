use crate::action::Action;

/// Append-only store of submitted actions, in registration order.
///
/// Registration must finish before the registry is handed to
/// [`crate::resolve::resolve`]; the registry is consumed there.
pub struct ActionRegistry<C> {
    actions: Vec<Action<C>>,
}

impl<C> ActionRegistry<C> {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Assign the next sequence number and append. Returns that number.
    pub fn add(&mut self, mut action: Action<C>) -> usize {
        let order = self.actions.len();
        action.set_order(order);
        self.actions.push(action);
        order
    }

    pub fn all(&self) -> &[Action<C>] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub(crate) fn into_actions(self) -> Vec<Action<C>> {
        self.actions
    }
}

impl<C> Default for ActionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Extend<Action<C>> for ActionRegistry<C> {
    fn extend<I: IntoIterator<Item = Action<C>>>(&mut self, iter: I) {
        for action in iter {
            self.add(action);
        }
    }
}
