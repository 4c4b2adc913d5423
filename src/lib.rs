//! rustf-sql - dialect-aware SQL rendering
//!
//! Describe filters, columns and sort orders once and render them for
//! SQL Server, MySQL, PostgreSQL or SQLite:
//! - Predicate trees compiled to parenthesized, escaped or parameterized SQL
//! - CREATE/DROP TABLE from portable column descriptors
//! - SELECT, INSERT, UPDATE, DELETE, EXISTS, COUNT, SUM and TRUNCATE builders
//!
//! ```
//! use rustf_sql::prelude::*;
//!
//! let dialect = SqlDialect::new(DatabaseBackend::MySQL);
//! let statement = QueryBuilder::new(&dialect)
//!     .from("users")
//!     .filter(Expression::contains("name", "ann"))
//!     .build_count("total")
//!     .unwrap();
//!
//! assert_eq!(statement.params.len(), 3);
//! ```

// Error handling lints
#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

pub mod adapter;
pub mod config;
pub mod error;
pub mod models;
pub mod query_builder;
pub mod types;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::adapter::{ResultSet, StatementExecutor};
    pub use crate::config::{CompilerConfig, DialectOverrides};
    pub use crate::error::{Error, ErrorContext, Result};
    pub use crate::models::{
        Column, Expression, Operand, Operator, OrderDirection, ResultOrder, Term,
    };
    pub use crate::query_builder::{
        compile_where, DatabaseBackend, Parameter, PredicateCompiler, QueryBuilder, RenderMode,
        Row, SchemaBuilder, SqlDialect, Statement,
    };
    pub use crate::types::{DataType, SqlValue, TypeMap};
}
