use std::fmt;

/// A fatal evaluation failure.
///
/// Per-node predicate failures are never fatal: a comparison that cannot be
/// computed is simply false. Only external cancellation and host failures
/// abort an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError<N: fmt::Debug> {
    /// The caller's [`Cancellation`](crate::Cancellation) token tripped
    /// between steps; the frontier reached so far is preserved.
    #[error("evaluation cancelled")]
    Cancelled { partial: Vec<N> },
    /// The [`SyntaxHost`](crate::SyntaxHost) failed while the evaluator was
    /// applying the given step (zero-based).
    #[error("syntax host failed at step {step}: {message}")]
    Host { step: usize, message: String },
}

/// A non-fatal diagnostic accumulated during an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalWarning {
    /// `@matches` received a pattern the regex engine rejected; the
    /// predicate evaluated to false wherever it applied.
    #[error("invalid regex `{pattern}` in step {step}: {message}")]
    BadRegex {
        /// Zero-based index of the step whose predicate carried the
        /// pattern.
        step: usize,
        pattern: String,
        message: String,
    },
}
