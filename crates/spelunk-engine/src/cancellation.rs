use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Cooperative cancellation flag for long evaluations.
///
/// Clones share the flag, so one end can hand a copy to an
/// [`Evaluator`](crate::Evaluator) and trip it from another thread. The
/// evaluator checks it between steps and returns the partial frontier in
/// [`EvalError::Cancelled`](crate::EvalError).
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::Cancellation;

    #[test]
    fn clones_share_the_flag() {
        let token = Cancellation::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
