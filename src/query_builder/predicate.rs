//! Predicate compilation
//!
//! Walks an [`Expression`] tree and renders it as a fully parenthesized SQL
//! predicate for one dialect. Literals are either bound as placeholders or
//! escaped inline depending on the [`RenderMode`].
//!
//! Hand-assembled trees may contain nodes that cannot be rendered. Some are
//! hard errors; others (a comparison with nothing to compare against, a
//! pattern over a non-string) are dropped with a warning, and their parent
//! combinator collapses to the surviving side.

use super::dialects::SqlDialect;
use crate::error::{Error, Result};
use crate::models::{Expression, Operand, Operator, Term};
use crate::types::SqlValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How literals reach the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// Placeholders in the SQL text, values returned alongside
    Parameterized,
    /// Escaped literals embedded in the SQL text
    Inline,
}

impl RenderMode {
    /// The mode a dialect is configured to use by default
    pub fn for_dialect(dialect: &SqlDialect) -> Self {
        if dialect.parameterized() {
            RenderMode::Parameterized
        } else {
            RenderMode::Inline
        }
    }
}

/// A bound value and the placeholder it answers to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub placeholder: String,
    pub value: SqlValue,
}

/// Rendered SQL plus its bound parameters, in placeholder order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Parameter>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Parameter>) -> Self {
        Statement {
            sql: sql.into(),
            params,
        }
    }

    /// Bound values in placeholder order
    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.params.iter().map(|p| &p.value)
    }

    pub fn is_parameterized(&self) -> bool {
        !self.params.is_empty()
    }

    /// Wrap a downstream failure so it carries this statement's SQL
    pub fn execution_error(&self, message: impl Into<String>) -> Error {
        Error::execution(self.sql.clone(), message)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Recursive predicate renderer
///
/// Placeholder numbering runs across every call on the same compiler, so a
/// statement builder can render SET values and then a WHERE clause through
/// one instance and get a single consistent parameter list.
pub struct PredicateCompiler<'a> {
    dialect: &'a SqlDialect,
    mode: RenderMode,
    params: Vec<Parameter>,
}

impl<'a> PredicateCompiler<'a> {
    pub fn new(dialect: &'a SqlDialect, mode: RenderMode) -> Self {
        PredicateCompiler {
            dialect,
            mode,
            params: Vec::new(),
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn into_params(self) -> Vec<Parameter> {
        self.params
    }

    /// Render a value as a placeholder or inline literal
    ///
    /// `Null` is always written as `NULL` and never bound.
    pub fn value(&mut self, value: &SqlValue) -> Result<String> {
        if value.is_null() {
            return Ok("NULL".to_string());
        }

        match self.mode {
            RenderMode::Inline => self.dialect.literal(value),
            RenderMode::Parameterized => {
                let placeholder = self.dialect.placeholder(self.params.len() + 1);
                self.params.push(Parameter {
                    placeholder: placeholder.clone(),
                    value: value.clone(),
                });
                Ok(placeholder)
            }
        }
    }

    /// Render a predicate; `None` means the whole tree was dropped
    pub fn compile(&mut self, expression: &Expression) -> Result<Option<String>> {
        if expression.operator.is_combinator() {
            return self.compile_combinator(expression);
        }

        let field = match &expression.left {
            Term::Field(field) => field,
            Term::Nested(_) => {
                return Err(Error::invalid_expression(format!(
                    "{} requires a field on the left, found a nested expression",
                    expression.operator
                )))
            }
        };

        let op = expression.operator;
        if op.is_nullity() {
            return Ok(Some(format!(
                "({} {})",
                self.dialect.quote_identifier(field),
                op.symbol()
            )));
        }
        if op.is_membership() {
            return self.compile_membership(field, op, &expression.right).map(Some);
        }
        if op.is_pattern() {
            return self.compile_pattern(field, op, &expression.right);
        }
        self.compile_comparison(field, op, &expression.right)
    }

    fn compile_combinator(&mut self, expression: &Expression) -> Result<Option<String>> {
        let op = expression.operator;
        let left = match &expression.left {
            Term::Nested(left) => left,
            Term::Field(field) => {
                return Err(Error::invalid_expression(format!(
                    "{} requires a nested expression on the left, found field '{}'",
                    op, field
                )))
            }
        };

        let left = self.compile(left)?;
        let right = match &expression.right {
            Operand::Nested(right) => self.compile(right)?,
            Operand::Absent => None,
            other => {
                return Err(Error::invalid_expression(format!(
                    "{} requires a nested expression on the right, found {:?}",
                    op, other
                )))
            }
        };

        Ok(match (left, right) {
            (Some(left), Some(right)) => Some(format!("({} {} {})", left, op.symbol(), right)),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        })
    }

    fn compile_comparison(
        &mut self,
        field: &str,
        op: Operator,
        right: &Operand,
    ) -> Result<Option<String>> {
        match right {
            // `= NULL` is never true; callers wanting nullity use IS NULL
            Operand::Value(SqlValue::Null) => {
                self.drop_predicate(field, op, "comparison against NULL matches no rows")
            }
            Operand::Value(value) => Ok(Some(format!(
                "({} {} {})",
                self.dialect.quote_identifier(field),
                op.symbol(),
                self.value(value)?
            ))),
            Operand::Absent => self.drop_predicate(field, op, "no value to compare against"),
            other => Err(Error::invalid_expression(format!(
                "{} on '{}' requires a single value, found {:?}",
                op, field, other
            ))),
        }
    }

    fn compile_membership(&mut self, field: &str, op: Operator, right: &Operand) -> Result<String> {
        let values = match right {
            Operand::List(values) => values,
            other => {
                return Err(Error::invalid_expression(format!(
                    "{} on '{}' requires a list, found {:?}",
                    op, field, other
                )))
            }
        };

        let mut rendered = Vec::with_capacity(values.len());
        for value in values.iter().filter(|v| !v.is_null()) {
            rendered.push(self.value(value)?);
        }

        if rendered.is_empty() {
            // Nothing is IN an empty set, everything is NOT IN it
            return Ok(match op {
                Operator::NotIn => "(1 = 1)".to_string(),
                _ => "(1 = 0)".to_string(),
            });
        }

        Ok(format!(
            "({} {} ({}))",
            self.dialect.quote_identifier(field),
            op.symbol(),
            rendered.join(", ")
        ))
    }

    fn compile_pattern(
        &mut self,
        field: &str,
        op: Operator,
        right: &Operand,
    ) -> Result<Option<String>> {
        let raw = match right {
            Operand::Value(SqlValue::String(raw)) => raw,
            Operand::Value(value) => {
                let reason = format!("pattern value is {}, not a string", value.kind());
                return self.drop_predicate(field, op, &reason);
            }
            _ => return self.drop_predicate(field, op, "pattern value is not a string"),
        };

        let escaped = self.dialect.escape_like(raw);
        let patterns = match op {
            Operator::Contains | Operator::ContainsNot => vec![
                format!("%{}", escaped),
                format!("%{}%", escaped),
                format!("{}%", escaped),
            ],
            Operator::StartsWith | Operator::StartsWithNot => vec![format!("{}%", escaped)],
            _ => vec![format!("%{}", escaped)],
        };

        let column = self.dialect.quote_identifier(field);
        let joiner = if op.is_negated() { " AND " } else { " OR " };
        let escape_clause = self.dialect.like_escape_clause();

        let mut terms = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let value = self.value(&SqlValue::String(pattern))?;
            terms.push(format!(
                "{} {} {}{}",
                column,
                op.symbol(),
                value,
                escape_clause
            ));
        }

        Ok(Some(format!("({})", terms.join(joiner))))
    }

    fn drop_predicate(&self, field: &str, op: Operator, reason: &str) -> Result<Option<String>> {
        if self.dialect.strict_predicates() {
            return Err(Error::invalid_expression(format!(
                "{} on '{}': {}",
                op, field, reason
            )));
        }

        log::warn!("Dropping predicate {} on '{}': {}", op, field, reason);
        Ok(None)
    }
}

/// Compile a filter into a standalone `WHERE ...` fragment
///
/// Uses the dialect's configured render mode. Returns `None` when every
/// predicate in the tree was dropped.
pub fn compile_where(dialect: &SqlDialect, expression: &Expression) -> Result<Option<Statement>> {
    let mut compiler = PredicateCompiler::new(dialect, RenderMode::for_dialect(dialect));
    let predicate = compiler.compile(expression)?;
    Ok(predicate.map(|predicate| {
        Statement::new(format!("WHERE {}", predicate), compiler.into_params())
    }))
}
