//! Statement assembly
//!
//! [`QueryBuilder`] collects a table, projection, filter, ordering and
//! paging, then renders one of the terminal statements (SELECT, INSERT,
//! UPDATE, DELETE, EXISTS, COUNT, SUM, TRUNCATE) for its dialect. All
//! literals flow through one [`PredicateCompiler`], so placeholders are
//! numbered in the order they appear in the final SQL text.

use super::dialects::{ExistsStyle, MultiInsert, SqlDialect};
use super::predicate::{PredicateCompiler, RenderMode, Statement};
use crate::error::{Error, Result};
use crate::models::{Expression, ResultOrder};
use crate::types::SqlValue;
use indexmap::IndexMap;

/// Column name to value, in insertion order
pub type Row = IndexMap<String, SqlValue>;

/// Fluent statement builder bound to one dialect
///
/// # Example
/// ```
/// use rustf_sql::prelude::*;
///
/// let dialect = SqlDialect::new(DatabaseBackend::Postgres);
/// let statement = QueryBuilder::new(&dialect)
///     .from("users")
///     .select(["id", "email"])
///     .filter(Expression::eq("status", "active"))
///     .order_by(ResultOrder::desc("created_at"))
///     .limit(10)
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     statement.sql,
///     "SELECT \"id\", \"email\" FROM \"users\" WHERE (\"status\" = $1) ORDER BY \"created_at\" DESC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    dialect: &'a SqlDialect,
    mode: RenderMode,
    table: Option<String>,
    select_columns: Vec<String>,
    filter: Option<Expression>,
    order_by: Vec<ResultOrder>,
    offset: Option<u64>,
    limit: Option<u64>,
}

impl<'a> QueryBuilder<'a> {
    /// Create a builder using the dialect's configured render mode
    pub fn new(dialect: &'a SqlDialect) -> Self {
        QueryBuilder {
            dialect,
            mode: RenderMode::for_dialect(dialect),
            table: None,
            select_columns: Vec::new(),
            filter: None,
            order_by: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    /// Set the table to operate on
    pub fn from<S: Into<String>>(mut self, table: S) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the columns to select; an empty list selects `*`
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a filter; repeated calls are AND-ed together
    pub fn filter(mut self, expression: Expression) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.prepend_and(expression),
            None => expression,
        });
        self
    }

    pub fn order_by(mut self, order: ResultOrder) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn order_by_all<I>(mut self, orders: I) -> Self
    where
        I: IntoIterator<Item = ResultOrder>,
    {
        self.order_by.extend(orders);
        self
    }

    /// Skip the first `index_start` rows
    pub fn offset(mut self, index_start: u64) -> Self {
        self.offset = Some(index_start);
        self
    }

    /// Return at most `max_results` rows
    pub fn limit(mut self, max_results: u64) -> Self {
        self.limit = Some(max_results);
        self
    }

    /// Override the render mode for this statement
    pub fn mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build a SELECT statement
    pub fn build(&self) -> Result<Statement> {
        let table = self.quoted_table()?;
        let mut compiler = self.compiler();

        let where_clause = self.where_clause(&mut compiler)?;
        let pagination =
            self.dialect
                .pagination(self.offset, self.limit, !self.order_by.is_empty())?;

        let mut sql = String::from("SELECT ");
        if let Some(top) = &pagination.top {
            sql.push_str(top);
            sql.push(' ');
        }
        sql.push_str(&self.projection());
        sql.push_str(" FROM ");
        sql.push_str(&table);
        sql.push_str(&where_clause);

        if !self.order_by.is_empty() {
            let order_clauses: Vec<String> = self
                .order_by
                .iter()
                .map(|order| {
                    format!(
                        "{} {}",
                        self.dialect.quote_identifier(&order.column),
                        order.direction.keyword()
                    )
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_clauses.join(", "));
        }

        sql.push_str(&pagination.suffix);

        self.finish("SELECT", sql, compiler)
    }

    /// Build a single-row INSERT statement
    pub fn build_insert(&self, row: &Row) -> Result<Statement> {
        let table = self.quoted_table()?;
        if row.is_empty() {
            return Err(Error::validation("No data provided for INSERT"));
        }

        let mut compiler = self.compiler();
        let values = self.values_tuple(&mut compiler, row)?;
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            table,
            self.column_list(row),
            values
        );

        self.finish("INSERT", sql, compiler)
    }

    /// Build an INSERT for many rows sharing one column set
    ///
    /// Every row must carry the first row's columns in the same order.
    /// Parameterized inserts larger than the engine's bind limit fail; use
    /// [`QueryBuilder::build_insert_batches`] to split them into requests.
    pub fn build_insert_multiple(&self, rows: &[Row]) -> Result<Statement> {
        let table = self.quoted_table()?;
        let reference = check_rows(rows)?;

        let columns = self.column_list(reference);
        let mut compiler = self.compiler();
        let profile = self.dialect.profile();

        let sql = match profile.multi_insert {
            MultiInsert::ValuesList { max_rows } => {
                let chunk_size = self.param_chunk_size(max_rows.unwrap_or(rows.len()), reference.len());
                let mut inserts = Vec::new();
                for chunk in rows.chunks(chunk_size) {
                    let tuples = chunk
                        .iter()
                        .map(|row| self.values_tuple(&mut compiler, row))
                        .collect::<Result<Vec<_>>>()?;
                    inserts.push(format!(
                        "INSERT INTO {} ({}) VALUES {}",
                        table,
                        columns,
                        tuples.join(", ")
                    ));
                }

                if inserts.len() == 1 {
                    inserts.remove(0)
                } else {
                    wrap_transaction(
                        profile.begin_transaction,
                        &inserts,
                        profile.commit_transaction,
                    )
                }
            }
            MultiInsert::Transaction => {
                let inserts = rows
                    .iter()
                    .map(|row| -> Result<String> {
                        Ok(format!(
                            "INSERT INTO {} ({}) VALUES {}",
                            table,
                            columns,
                            self.values_tuple(&mut compiler, row)?
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?;
                wrap_transaction(
                    profile.begin_transaction,
                    &inserts,
                    profile.commit_transaction,
                )
            }
        };

        self.check_param_count(&compiler)?;
        self.finish("INSERT", sql, compiler)
    }

    /// Split a multi-row insert into statements that each fit the engine's bind limit
    ///
    /// Each statement numbers its placeholders from the start and is meant to
    /// be sent as its own request.
    pub fn build_insert_batches(&self, rows: &[Row]) -> Result<Vec<Statement>> {
        let reference = check_rows(rows)?;
        let chunk_size = match self.dialect.profile().multi_insert {
            MultiInsert::ValuesList { max_rows } => max_rows.unwrap_or(rows.len()),
            MultiInsert::Transaction => rows.len(),
        };
        let chunk_size = self.param_chunk_size(chunk_size, reference.len());

        rows.chunks(chunk_size)
            .map(|chunk| self.build_insert_multiple(chunk))
            .collect()
    }

    /// Build an UPDATE statement; the builder's filter becomes the WHERE clause
    pub fn build_update(&self, row: &Row) -> Result<Statement> {
        let table = self.quoted_table()?;
        if row.is_empty() {
            return Err(Error::validation("No data provided for UPDATE"));
        }

        let mut compiler = self.compiler();
        let mut assignments = Vec::with_capacity(row.len());
        for (column, value) in row {
            assignments.push(format!(
                "{} = {}",
                self.dialect.quote_identifier(column),
                compiler.value(value)?
            ));
        }

        let where_clause = self.where_clause(&mut compiler)?;
        let sql = format!(
            "UPDATE {} SET {}{}",
            table,
            assignments.join(", "),
            where_clause
        );

        self.finish("UPDATE", sql, compiler)
    }

    pub fn build_delete(&self) -> Result<Statement> {
        let table = self.quoted_table()?;
        let mut compiler = self.compiler();
        let where_clause = self.where_clause(&mut compiler)?;
        let sql = format!("DELETE FROM {}{}", table, where_clause);

        self.finish("DELETE", sql, compiler)
    }

    /// Build a query returning 1/0 (or true/false) under `alias`
    pub fn build_exists(&self, alias: &str) -> Result<Statement> {
        let table = self.quoted_table()?;
        let mut compiler = self.compiler();
        let where_clause = self.where_clause(&mut compiler)?;
        let inner = format!("SELECT 1 FROM {}{}", table, where_clause);
        let alias = self.dialect.quote_identifier(alias);

        let sql = match self.dialect.profile().exists {
            ExistsStyle::CaseWhen => format!(
                "SELECT CASE WHEN EXISTS ({}) THEN 1 ELSE 0 END AS {}",
                inner, alias
            ),
            ExistsStyle::Bare => format!("SELECT EXISTS ({}) AS {}", inner, alias),
        };

        self.finish("EXISTS", sql, compiler)
    }

    pub fn build_count(&self, alias: &str) -> Result<Statement> {
        let table = self.quoted_table()?;
        let mut compiler = self.compiler();
        let where_clause = self.where_clause(&mut compiler)?;
        let sql = format!(
            "SELECT COUNT(*) AS {} FROM {}{}",
            self.dialect.quote_identifier(alias),
            table,
            where_clause
        );

        self.finish("COUNT", sql, compiler)
    }

    pub fn build_sum(&self, field: &str, alias: &str) -> Result<Statement> {
        let table = self.quoted_table()?;
        let mut compiler = self.compiler();
        let where_clause = self.where_clause(&mut compiler)?;
        let sql = format!(
            "SELECT SUM({}) AS {} FROM {}{}",
            self.dialect.quote_identifier(field),
            self.dialect.quote_identifier(alias),
            table,
            where_clause
        );

        self.finish("SUM", sql, compiler)
    }

    /// Remove every row; SQLite has no TRUNCATE and gets a bare DELETE
    pub fn build_truncate(&self) -> Result<Statement> {
        let table = self.quoted_table()?;
        let sql = format!("{} {}", self.dialect.profile().truncate, table);
        self.finish("TRUNCATE", sql, self.compiler())
    }

    fn compiler(&self) -> PredicateCompiler<'a> {
        PredicateCompiler::new(self.dialect, self.mode)
    }

    fn quoted_table(&self) -> Result<String> {
        self.table
            .as_deref()
            .map(|table| self.dialect.quote_identifier(table))
            .ok_or_else(|| Error::missing_clause("from"))
    }

    fn projection(&self) -> String {
        if self.select_columns.is_empty() {
            return "*".to_string();
        }
        self.select_columns
            .iter()
            .map(|column| self.dialect.quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn where_clause(&self, compiler: &mut PredicateCompiler<'_>) -> Result<String> {
        let Some(filter) = &self.filter else {
            return Ok(String::new());
        };
        Ok(match compiler.compile(filter)? {
            Some(predicate) => format!(" WHERE {}", predicate),
            None => String::new(),
        })
    }

    fn column_list(&self, row: &Row) -> String {
        row.keys()
            .map(|column| self.dialect.quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn values_tuple(&self, compiler: &mut PredicateCompiler<'_>, row: &Row) -> Result<String> {
        let values = row
            .values()
            .map(|value| compiler.value(value))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("({})", values.join(", ")))
    }

    /// Rows per chunk, capped so one chunk never binds more than the engine accepts
    fn param_chunk_size(&self, max_rows: usize, columns: usize) -> usize {
        let max_rows = max_rows.max(1);
        match (self.mode, self.dialect.max_params()) {
            (RenderMode::Parameterized, Some(max_params)) => {
                max_rows.min(max_params / columns.max(1)).max(1)
            }
            _ => max_rows,
        }
    }

    fn check_param_count(&self, compiler: &PredicateCompiler<'_>) -> Result<()> {
        if let Some(max_params) = self.dialect.max_params() {
            let bound = compiler.params().len();
            if bound > max_params {
                return Err(Error::unsupported_feature(
                    self.dialect.backend(),
                    format!(
                        "{} bound parameters in one request (limit {}); use build_insert_batches or inline mode",
                        bound, max_params
                    ),
                ));
            }
        }
        Ok(())
    }

    fn finish(&self, kind: &str, sql: String, compiler: PredicateCompiler<'_>) -> Result<Statement> {
        self.dialect.check_length(&sql)?;
        let params = compiler.into_params();

        log::debug!("QueryBuilder {} SQL: {}", kind, sql);
        log::debug!("  Parameters to bind: {:?}", params);

        Ok(Statement::new(sql, params))
    }
}

/// Require at least one non-empty row and the first row's key order in every row
fn check_rows(rows: &[Row]) -> Result<&Row> {
    let reference = rows
        .first()
        .ok_or_else(|| Error::validation("No rows provided for INSERT"))?;
    if reference.is_empty() {
        return Err(Error::validation("No data provided for INSERT"));
    }

    for (index, row) in rows.iter().enumerate().skip(1) {
        if !row.keys().eq(reference.keys()) {
            return Err(Error::SchemaMismatch {
                row: index,
                expected: join_keys(reference),
                found: join_keys(row),
            });
        }
    }

    Ok(reference)
}

fn join_keys(row: &Row) -> String {
    row.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn wrap_transaction(begin: &str, statements: &[String], commit: &str) -> String {
    format!("{} {}; {}", begin, statements.join("; "), commit)
}
