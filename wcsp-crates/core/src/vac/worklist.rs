use std::collections::VecDeque;

use crate::containers::KeyedVec;
use crate::engine::variables::VariableId;

/// A first-in first-out queue of variables which holds every variable at most once.
#[derive(Debug, Clone, Default)]
pub(crate) struct VariableQueue {
    queue: VecDeque<VariableId>,
    is_enqueued: KeyedVec<VariableId, bool>,
}

impl VariableQueue {
    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn contains(&self, variable: VariableId) -> bool {
        self.is_enqueued.get(variable).copied().unwrap_or(false)
    }

    pub(crate) fn push(&mut self, variable: VariableId) {
        if self.contains(variable) {
            return;
        }
        self.is_enqueued.accomodate(variable, false);
        self.is_enqueued[variable] = true;
        self.queue.push_back(variable);
    }

    pub(crate) fn pop(&mut self) -> Option<VariableId> {
        let variable = self.queue.pop_front()?;
        self.is_enqueued[variable] = false;
        Some(variable)
    }

    pub(crate) fn clear(&mut self) {
        while self.pop().is_some() {}
    }
}
