use super::TrailedChange;
use super::TrailedInteger;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;

/// The store of every backtrackable integer: domains, unary costs, cost function deltas and the
/// lower bound all live here, so a single [`TrailedValues::synchronise`] restores all of them.
#[derive(Default, Debug, Clone)]
pub(crate) struct TrailedValues {
    trail: Trail<TrailedChange>,
    values: KeyedVec<TrailedInteger, i64>,
}

impl TrailedValues {
    pub(crate) fn grow(&mut self, initial_value: i64) -> TrailedInteger {
        self.values.push(initial_value)
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.trail.new_checkpoint()
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.trail.get_checkpoint()
    }

    /// Keeps the changes of the current checkpoint, which are from now on undone together with
    /// the previous one.
    pub(crate) fn commit_checkpoint(&mut self) {
        self.trail.commit()
    }

    pub(crate) fn read(&self, trailed_integer: TrailedInteger) -> i64 {
        self.values[trailed_integer]
    }

    pub(crate) fn synchronise(&mut self, checkpoint: usize) {
        self.trail
            .synchronise(checkpoint)
            .for_each(|change| self.values[change.reference] = change.old_value)
    }

    fn write(&mut self, trailed_integer: TrailedInteger, value: i64) {
        let old_value = self.values[trailed_integer];
        if old_value == value {
            return;
        }
        // At the root nothing can be undone, so there is no need to remember the old value.
        if self.trail.get_checkpoint() > 0 {
            self.trail.push(TrailedChange {
                old_value,
                reference: trailed_integer,
            });
        }
        self.values[trailed_integer] = value;
    }

    pub(crate) fn assign(&mut self, trailed_integer: TrailedInteger, value: i64) {
        self.write(trailed_integer, value);
    }

    pub(crate) fn add_assign(&mut self, trailed_integer: TrailedInteger, addition: i64) {
        self.write(trailed_integer, self.values[trailed_integer] + addition);
    }
}
