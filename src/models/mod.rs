//! Caller-facing descriptions: predicate trees, columns and sort orders
//!
//! These are plain values. The dialect compilers in
//! [`crate::query_builder`] turn them into SQL text.

pub mod column;
pub mod expression;
pub mod order;

pub use column::{Column, ColumnBuilder};
pub use expression::{Expression, Operand, Operator, Term};
pub use order::{OrderDirection, ResultOrder};
