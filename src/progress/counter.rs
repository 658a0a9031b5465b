// src/progress/counter.rs

/// Result of [`ProgressCounter::decrement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// Work remains in flight.
    Remaining(usize),
    /// The last in-flight unit finished.
    Idle,
    /// Nothing was in flight; the count stayed at zero.
    Unmatched,
}

/// Number of work units currently in flight. Never negative.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounter {
    count: usize,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Add one unit and return the new count.
    pub fn increment(&mut self) -> usize {
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// Remove one unit, clamping at zero.
    pub fn decrement(&mut self) -> Decrement {
        match self.count {
            0 => Decrement::Unmatched,
            1 => {
                self.count = 0;
                Decrement::Idle
            }
            n => {
                self.count = n - 1;
                Decrement::Remaining(self.count)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_decrement_clamps_to_zero() {
        let mut counter = ProgressCounter::new();
        assert_eq!(counter.decrement(), Decrement::Unmatched);
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn counts_down_to_idle() {
        let mut counter = ProgressCounter::new();
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.decrement(), Decrement::Remaining(1));
        assert_eq!(counter.decrement(), Decrement::Idle);
        assert_eq!(counter.decrement(), Decrement::Unmatched);
        assert_eq!(counter.count(), 0);
    }
}
