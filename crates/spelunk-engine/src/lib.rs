#![doc = include_str!("../README.md")]

mod cancellation;
pub mod diagnostic;
mod error;
mod eval;
mod host;
mod stable_path;

pub use crate::cancellation::Cancellation;
pub use crate::error::EvalError;
pub use crate::error::EvalWarning;
pub use crate::eval::evaluate;
pub use crate::eval::Evaluation;
pub use crate::eval::Evaluator;
pub use crate::host::AttrValue;
pub use crate::host::DocumentOrder;
pub use crate::host::SyntaxHost;
pub use crate::stable_path::stable_path;
