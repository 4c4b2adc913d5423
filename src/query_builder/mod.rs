//! Multi-database SQL rendering
//!
//! This module renders predicate trees, column definitions and complete
//! statements for SQL Server, MySQL, PostgreSQL and SQLite, handling
//! quoting, escaping, placeholders and pagination per dialect.

pub mod core;
pub mod dialects;
pub mod predicate;
pub mod schema;

pub use self::core::{QueryBuilder, Row};
pub use dialects::{DatabaseBackend, DialectProfile, SqlDialect};
pub use predicate::{compile_where, Parameter, PredicateCompiler, RenderMode, Statement};
pub use schema::SchemaBuilder;
