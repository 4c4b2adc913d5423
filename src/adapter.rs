//! Execution collaborator contract
//!
//! This crate renders statements; it never opens connections. A driver
//! layer implements [`StatementExecutor`] to run a [`Statement`] and hand
//! back a [`ResultSet`]. Failures should be reported through
//! [`Statement::execution_error`] so the rendered SQL travels with them.

use crate::error::Result;
use crate::query_builder::{DatabaseBackend, QueryBuilder, SqlDialect, Statement};
use crate::types::SqlValue;
use serde::{Deserialize, Serialize};

/// Rows returned by an executor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
    /// Number of rows affected by INSERT, UPDATE or DELETE
    #[serde(default)]
    pub rows_affected: u64,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        ResultSet {
            columns,
            rows,
            rows_affected: 0,
        }
    }

    /// Result of a data-modifying statement
    pub fn affected(rows_affected: u64) -> Self {
        ResultSet {
            rows_affected,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, compared case-insensitively
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    /// First-row value of the aliased column, as produced by COUNT, SUM and EXISTS
    pub fn scalar(&self, alias: &str) -> Option<&SqlValue> {
        let index = self.column_index(alias)?;
        self.rows.first()?.get(index)
    }

    /// Iterate one column across every row
    pub fn column_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a SqlValue> + 'a {
        let index = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |row| index.and_then(|i| row.get(i)))
    }
}

/// Something that can run rendered statements
///
/// Implementations own connections and transactions; this crate only
/// supplies the SQL text and bound values.
pub trait StatementExecutor: Send + Sync {
    /// Dialect the executor's statements must be rendered for
    fn dialect(&self) -> &SqlDialect;

    /// Run a statement
    fn execute(&self, statement: &Statement) -> Result<ResultSet>;

    fn backend(&self) -> DatabaseBackend {
        self.dialect().backend()
    }

    /// Create a new query builder for this executor's dialect
    fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self.dialect())
    }

    /// Run a statement and read the aliased scalar from its first row
    fn fetch_scalar(&self, statement: &Statement, alias: &str) -> Result<Option<SqlValue>> {
        let result = self.execute(statement)?;
        Ok(result.scalar(alias).cloned())
    }
}
