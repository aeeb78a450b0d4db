//! Expression interpreter for the in-memory engine.
//!
//! Parses the condition and update expressions the store client compiles back
//! into predicates and assignments:
//!
//! 1. **Lexing**: tokenize the expression string.
//! 2. **Parsing**: build predicates or assignments, resolving bind variables
//!    and rejecting reserved attribute names.
//! 3. **Evaluation**: test predicates against the stored row, then apply
//!    assignments.

pub mod parser;
pub mod predicate;

pub use parser::{ExpressionError, parse_condition, parse_update};
pub use predicate::{Assignment, Predicate, accepts_all, apply_assignments};
