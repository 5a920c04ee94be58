use std::sync::atomic::{AtomicI64, Ordering};

/// Process-wide counter behind a `seq_*` registration.
///
/// Never reset; every call to [`Sequence::next`] observes a distinct value,
/// starting at 1, across all threads sharing the sequence.
#[derive(Debug, Default)]
pub struct Sequence {
    counter: AtomicI64,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last value handed out, 0 if none.
    pub fn current(&self) -> i64 {
        self.counter.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_starts_at_one_and_increments() {
        let seq = Sequence::new();
        assert_eq!(seq.current(), 0);
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.next(), 2);
        assert_eq!(seq.current(), 2);
    }
}
