//! Unified type system for SQL rendering
//!
//! Literal values (`SqlValue`) and the portable column type map shared by
//! every dialect.

pub mod registry;
pub mod value;

pub use registry::{DataType, TypeMap, TypeSyntax};
pub use value::SqlValue;
