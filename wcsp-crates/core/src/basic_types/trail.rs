use std::iter::Rev;
use std::vec::Drain;

use crate::wcsp_assert_simple;

/// A stack of undo entries partitioned into checkpoints.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    /// At index i is the length of the trail when checkpoint i + 1 was created.
    checkpoint_starts: Vec<usize>,
    entries: Vec<T>,
}

// Implemented by hand so that `T` does not need to be `Default`.
impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            checkpoint_starts: Vec::default(),
            entries: Vec::default(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn new_checkpoint(&mut self) {
        self.checkpoint_starts.push(self.entries.len());
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.checkpoint_starts.len()
    }

    /// Removes the entries made after `checkpoint` was current, most recent first.
    pub(crate) fn synchronise(&mut self, checkpoint: usize) -> Rev<Drain<'_, T>> {
        wcsp_assert_simple!(checkpoint < self.get_checkpoint());

        let new_len = self.checkpoint_starts[checkpoint];
        self.checkpoint_starts.truncate(checkpoint);
        self.entries.drain(new_len..).rev()
    }

    /// Merges the current checkpoint into the previous one, keeping its entries.
    pub(crate) fn commit(&mut self) {
        wcsp_assert_simple!(self.get_checkpoint() > 0);

        let _ = self.checkpoint_starts.pop();
        if self.checkpoint_starts.is_empty() {
            self.entries.clear();
        }
    }

    pub(crate) fn push(&mut self, entry: T) {
        self.entries.push(entry)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synchronising_drops_entries_of_later_checkpoints() {
        let mut trail = Trail::default();
        trail.push('a');
        trail.new_checkpoint();
        trail.push('b');
        trail.new_checkpoint();
        trail.push('c');
        trail.push('d');

        let undone = trail.synchronise(1).collect::<String>();

        assert_eq!("dc", undone);
        assert_eq!(1, trail.get_checkpoint());
        assert_eq!(2, trail.len());
    }

    #[test]
    fn synchronising_to_root_skips_several_checkpoints() {
        let mut trail = Trail::default();
        trail.push(10);
        for value in 0..3 {
            trail.new_checkpoint();
            trail.push(value);
        }

        let undone = trail.synchronise(0).collect::<Vec<_>>();

        assert_eq!(vec![2, 1, 0], undone);
        assert_eq!(0, trail.get_checkpoint());
        assert_eq!(1, trail.len());
    }

    #[test]
    fn committed_entries_are_undone_with_the_parent_checkpoint() {
        let mut trail = Trail::default();
        trail.new_checkpoint();
        trail.push('a');
        trail.new_checkpoint();
        trail.push('b');
        trail.commit();

        assert_eq!(1, trail.get_checkpoint());
        assert_eq!("ba", trail.synchronise(0).collect::<String>());
    }

    #[test]
    fn committing_to_the_root_forgets_the_entries() {
        let mut trail = Trail::default();
        trail.new_checkpoint();
        trail.push(1);
        trail.commit();

        assert_eq!(0, trail.get_checkpoint());
        assert_eq!(0, trail.len());
    }

    #[test]
    fn empty_checkpoints_are_allowed() {
        let mut trail: Trail<u8> = Trail::default();
        trail.new_checkpoint();
        trail.new_checkpoint();

        assert_eq!(0, trail.synchronise(0).count());
    }
}
