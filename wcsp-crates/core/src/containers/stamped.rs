/// A counter which reads as zero unless it was written during the current iteration.
///
/// Starting a new iteration is the only reset these counters need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Stamped {
    value: u64,
    stamp: u64,
}

impl Stamped {
    pub(crate) fn get(&self, iteration: u64) -> u64 {
        if self.stamp == iteration {
            self.value
        } else {
            0
        }
    }

    pub(crate) fn set(&mut self, iteration: u64, value: u64) {
        self.stamp = iteration;
        self.value = value;
    }

    pub(crate) fn add(&mut self, iteration: u64, amount: u64) {
        let value = self.get(iteration) + amount;
        self.set(iteration, value);
    }
}

/// A flag which is only raised for the iteration in which it was set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Stamp(u64);

impl Stamp {
    pub(crate) fn is_set(&self, iteration: u64) -> bool {
        self.0 == iteration
    }

    pub(crate) fn set(&mut self, iteration: u64) {
        self.0 = iteration;
    }
}
