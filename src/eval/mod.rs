//! Expression Evaluator (spec §4.2): reduces constant expressions over
//! literals, parameters, and enumerator references to concrete values.

pub mod evaluator;
pub mod literal;

pub use evaluator::{EvalResult, Evaluator};
pub use literal::parse_int_literal;
