//! Recursion state for self-referential factories.
//!
//! A [`Pipeline`] holds one depth counter per field position. Counters are
//! created lazily with the limit configured on the recursive field and count
//! down each time that field expands. Forking is a cheap structural copy:
//! the fork and its origin never observe each other's writes afterwards.

/// State of a single field position inside a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackState {
    Uninitialized,
    /// Remaining permitted expansions.
    Active(u64),
    Exhausted,
}

/// Per-lineage depth counters, keyed by field position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    stacks: im::OrdMap<usize, i64>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, index: usize) -> bool {
        self.stacks.contains_key(&index)
    }

    /// Current counter value, negative once exhausted.
    pub fn size(&self, index: usize) -> Option<i64> {
        self.stacks.get(&index).copied()
    }

    pub fn state(&self, index: usize) -> StackState {
        match self.size(index) {
            None => StackState::Uninitialized,
            Some(n) if n >= 0 => StackState::Active(n as u64),
            Some(_) => StackState::Exhausted,
        }
    }

    /// Initialize the counter at `index`, overwriting any previous value.
    pub fn set(&mut self, index: usize, limit: usize) {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.stacks.insert(index, limit);
    }

    /// Consume one expansion at `index`; returns whether it was permitted.
    ///
    /// An uninitialized position behaves like a limit of zero.
    pub fn next(&mut self, index: usize) -> bool {
        let counter = self.size(index).unwrap_or(0).saturating_sub(1);
        self.stacks.insert(index, counter);
        counter >= 0
    }

    /// Copy handed to a nested build.
    pub fn fork(&self) -> Pipeline {
        self.clone()
    }

    /// Number of initialized positions.
    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}
