//! Predicate trees
//!
//! An [`Expression`] is a term/operator/operand triple. Leaves compare a
//! field against a literal; combinators (`And`/`Or`) join two nested
//! expressions, so trees nest to any depth. Trees own their children
//! outright; combining two expressions always moves them into a new node.
//!
//! # Example
//! ```
//! use rustf_sql::models::Expression;
//!
//! let adults = Expression::between("age", [18, 65]).unwrap();
//! let filter = Expression::list_to_nested_and(vec![
//!     adults,
//!     Expression::eq("status", "active"),
//!     Expression::is_not_null("verified_at"),
//! ])
//! .unwrap();
//!
//! assert_eq!(filter.fields(), vec!["age", "age", "status", "verified_at"]);
//! ```

use crate::error::{Error, Result};
use crate::types::SqlValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Portable operator set. Variant names are the stable serialized names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    And,
    Or,
    Equals,
    NotEquals,
    In,
    NotIn,
    Contains,
    ContainsNot,
    StartsWith,
    StartsWithNot,
    EndsWith,
    EndsWithNot,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn is_combinator(&self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Equals
                | Operator::NotEquals
                | Operator::GreaterThan
                | Operator::GreaterThanOrEqualTo
                | Operator::LessThan
                | Operator::LessThanOrEqualTo
        )
    }

    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            Operator::Contains
                | Operator::ContainsNot
                | Operator::StartsWith
                | Operator::StartsWithNot
                | Operator::EndsWith
                | Operator::EndsWithNot
        )
    }

    pub fn is_nullity(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// Negated pattern and membership operators
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            Operator::NotIn
                | Operator::ContainsNot
                | Operator::StartsWithNot
                | Operator::EndsWithNot
                | Operator::IsNotNull
        )
    }

    /// SQL keyword or symbol emitted between the two sides
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Equals => "=",
            Operator::NotEquals => "<>",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqualTo => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqualTo => "<=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Contains | Operator::StartsWith | Operator::EndsWith => "LIKE",
            Operator::ContainsNot | Operator::StartsWithNot | Operator::EndsWithNot => "NOT LIKE",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Left side of a predicate node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Term {
    Field(String),
    Nested(Box<Expression>),
}

/// Right side of a predicate node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Value(SqlValue),
    Nested(Box<Expression>),
    List(Vec<SqlValue>),
    Absent,
}

impl Operand {
    fn describe(&self) -> &'static str {
        match self {
            Operand::Value(v) => v.kind(),
            Operand::Nested(_) => "expression",
            Operand::List(_) => "list",
            Operand::Absent => "nothing",
        }
    }
}

/// A node in a predicate tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub left: Term,
    pub operator: Operator,
    pub right: Operand,
}

impl Expression {
    /// Build a node, checking that the operands fit the operator
    pub fn new(left: Term, operator: Operator, right: Operand) -> Result<Self> {
        let expression = Expression {
            left,
            operator,
            right,
        };
        expression.validate_node()?;
        Ok(expression)
    }

    fn leaf(field: impl Into<String>, operator: Operator, right: Operand) -> Self {
        Expression {
            left: Term::Field(field.into()),
            operator,
            right,
        }
    }

    fn combine(left: Expression, operator: Operator, right: Expression) -> Self {
        Expression {
            left: Term::Nested(Box::new(left)),
            operator,
            right: Operand::Nested(Box::new(right)),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::leaf(field, Operator::Equals, Operand::Value(value.into()))
    }

    pub fn not_eq(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::leaf(field, Operator::NotEquals, Operand::Value(value.into()))
    }

    pub fn gt(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::leaf(field, Operator::GreaterThan, Operand::Value(value.into()))
    }

    pub fn gte(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::leaf(
            field,
            Operator::GreaterThanOrEqualTo,
            Operand::Value(value.into()),
        )
    }

    pub fn lt(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::leaf(field, Operator::LessThan, Operand::Value(value.into()))
    }

    pub fn lte(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::leaf(
            field,
            Operator::LessThanOrEqualTo,
            Operand::Value(value.into()),
        )
    }

    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        Self::leaf(field, Operator::In, Operand::List(values))
    }

    pub fn not_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        Self::leaf(field, Operator::NotIn, Operand::List(values))
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::pattern(field, Operator::Contains, value)
    }

    pub fn contains_not(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::pattern(field, Operator::ContainsNot, value)
    }

    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::pattern(field, Operator::StartsWith, value)
    }

    pub fn starts_with_not(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::pattern(field, Operator::StartsWithNot, value)
    }

    pub fn ends_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::pattern(field, Operator::EndsWith, value)
    }

    pub fn ends_with_not(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::pattern(field, Operator::EndsWithNot, value)
    }

    fn pattern(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self::leaf(
            field,
            operator,
            Operand::Value(SqlValue::String(value.into())),
        )
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::leaf(field, Operator::IsNull, Operand::Absent)
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::leaf(field, Operator::IsNotNull, Operand::Absent)
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::combine(left, Operator::And, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::combine(left, Operator::Or, right)
    }

    /// `(field >= lo) AND (field <= hi)`; `bounds` must hold exactly two values
    pub fn between<I, V>(field: impl Into<String>, bounds: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        let field = field.into();
        let mut bounds: Vec<SqlValue> = bounds.into_iter().map(Into::into).collect();
        if bounds.len() != 2 {
            return Err(Error::validation(format!(
                "between on '{}' needs exactly two bounds, got {}",
                field,
                bounds.len()
            )));
        }
        if bounds.iter().any(SqlValue::is_null) {
            return Err(Error::validation(format!(
                "between on '{}' cannot use a NULL bound",
                field
            )));
        }

        let hi = bounds.pop().unwrap_or(SqlValue::Null);
        let lo = bounds.pop().unwrap_or(SqlValue::Null);
        Ok(Self::and(Self::gte(field.clone(), lo), Self::lte(field, hi)))
    }

    /// Right-fold into `a AND (b AND (c ...))`
    pub fn list_to_nested_and(list: Vec<Expression>) -> Option<Self> {
        Self::fold_nested(list, Operator::And)
    }

    /// Right-fold into `a OR (b OR (c ...))`
    pub fn list_to_nested_or(list: Vec<Expression>) -> Option<Self> {
        Self::fold_nested(list, Operator::Or)
    }

    fn fold_nested(list: Vec<Expression>, operator: Operator) -> Option<Self> {
        let mut reversed = list.into_iter().rev();
        let last = reversed.next()?;
        Some(reversed.fold(last, |acc, expression| {
            Self::combine(expression, operator, acc)
        }))
    }

    /// `prepended AND (self)`
    pub fn prepend_and(self, prepended: Expression) -> Self {
        Self::combine(prepended, Operator::And, self)
    }

    /// `prepended OR (self)`
    pub fn prepend_or(self, prepended: Expression) -> Self {
        Self::combine(prepended, Operator::Or, self)
    }

    /// Check this node and every nested node
    pub fn validate(&self) -> Result<()> {
        self.validate_node()?;
        if let Term::Nested(left) = &self.left {
            left.validate()?;
        }
        if let Operand::Nested(right) = &self.right {
            right.validate()?;
        }
        Ok(())
    }

    fn validate_node(&self) -> Result<()> {
        let op = self.operator;

        if op.is_combinator() {
            return match (&self.left, &self.right) {
                (Term::Nested(_), Operand::Nested(_)) => Ok(()),
                _ => Err(Error::validation(format!(
                    "{} requires nested expressions on both sides",
                    op
                ))),
            };
        }

        let field = match &self.left {
            Term::Field(field) => field,
            Term::Nested(_) => {
                return Err(Error::validation(format!(
                    "{} requires a field name on the left",
                    op
                )))
            }
        };

        let fits = match (&self.right, op) {
            (Operand::Absent, o) => o.is_nullity(),
            (_, o) if o.is_nullity() => false,
            (Operand::List(_), o) => o.is_membership(),
            (Operand::Value(SqlValue::String(_)), o) if o.is_pattern() => true,
            (Operand::Value(SqlValue::Null), o) if o.is_comparison() => false,
            (Operand::Value(_), o) => o.is_comparison(),
            (Operand::Nested(_), _) => false,
        };

        if fits {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "{} on '{}' cannot take {} on the right",
                op,
                field,
                self.right.describe()
            )))
        }
    }

    /// Field names referenced by this tree, depth first
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, fields: &mut Vec<&'a str>) {
        match &self.left {
            Term::Field(field) => fields.push(field),
            Term::Nested(nested) => nested.collect_fields(fields),
        }
        if let Operand::Nested(nested) = &self.right {
            nested.collect_fields(fields);
        }
    }

    /// Number of node levels; a single leaf has depth 1
    pub fn depth(&self) -> usize {
        let left = match &self.left {
            Term::Nested(nested) => nested.depth(),
            Term::Field(_) => 0,
        };
        let right = match &self.right {
            Operand::Nested(nested) => nested.depth(),
            _ => 0,
        };
        1 + left.max(right)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        match &self.left {
            Term::Field(field) => write!(f, "{}", field)?,
            Term::Nested(nested) => write!(f, "{}", nested)?,
        }
        write!(f, " {}", self.operator)?;
        match &self.right {
            Operand::Value(value) => write!(f, " {}", value)?,
            Operand::Nested(nested) => write!(f, " {}", nested)?,
            Operand::List(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, " [{}]", items.join(", "))?
            }
            Operand::Absent => {}
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_shape_matches_manual_tree() {
        let between = Expression::between("age", [18, 65]).unwrap();
        let manual = Expression::and(Expression::gte("age", 18), Expression::lte("age", 65));
        assert_eq!(between, manual);
    }

    #[test]
    fn test_between_requires_two_bounds() {
        assert!(Expression::between("age", [18]).is_err());
        assert!(Expression::between("age", [1, 2, 3]).is_err());
        assert!(Expression::between("age", Vec::<i32>::new()).is_err());
    }

    #[test]
    fn test_between_rejects_null_bound() {
        let err = Expression::between("age", [Some(18), None]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_nested_fold_identities() {
        let e = Expression::eq("a", 1);
        assert_eq!(Expression::list_to_nested_and(vec![e.clone()]), Some(e.clone()));
        assert_eq!(Expression::list_to_nested_or(vec![e.clone()]), Some(e));
        assert_eq!(Expression::list_to_nested_and(Vec::new()), None);
        assert_eq!(Expression::list_to_nested_or(Vec::new()), None);
    }

    #[test]
    fn test_nested_fold_is_right_associative() {
        let a = Expression::eq("a", 1);
        let b = Expression::eq("b", 2);
        let c = Expression::eq("c", 3);

        let folded =
            Expression::list_to_nested_or(vec![a.clone(), b.clone(), c.clone()]).unwrap();
        assert_eq!(folded, Expression::or(a, Expression::or(b, c)));
        assert_eq!(folded.fields(), vec!["a", "b", "c"]);
        assert_eq!(folded.depth(), 3);
    }

    #[test]
    fn test_prepend_wraps_original_once() {
        let original = Expression::eq("status", "open");
        let prepended = Expression::eq("tenant_id", 7);

        let result = original.clone().prepend_and(prepended.clone());
        assert_eq!(result.operator, Operator::And);
        assert_eq!(result.left, Term::Nested(Box::new(prepended)));
        assert_eq!(result.right, Operand::Nested(Box::new(original)));
        assert_eq!(result.depth(), 2);

        let twice = result.prepend_or(Expression::is_null("deleted_at"));
        assert_eq!(twice.operator, Operator::Or);
        assert_eq!(twice.depth(), 3);
    }

    #[test]
    fn test_new_rejects_mismatched_operands() {
        let combinator_with_field = Expression::new(
            Term::Field("a".into()),
            Operator::And,
            Operand::Nested(Box::new(Expression::eq("b", 1))),
        );
        assert!(matches!(combinator_with_field, Err(Error::Validation(_))));

        let null_check_with_value = Expression::new(
            Term::Field("a".into()),
            Operator::IsNull,
            Operand::Value(SqlValue::Int(1)),
        );
        assert!(null_check_with_value.is_err());

        let comparison_without_value =
            Expression::new(Term::Field("a".into()), Operator::Equals, Operand::Absent);
        assert!(comparison_without_value.is_err());

        let in_with_scalar = Expression::new(
            Term::Field("a".into()),
            Operator::In,
            Operand::Value(SqlValue::Int(1)),
        );
        assert!(in_with_scalar.is_err());

        let pattern_with_number = Expression::new(
            Term::Field("a".into()),
            Operator::Contains,
            Operand::Value(SqlValue::Int(1)),
        );
        assert!(pattern_with_number.is_err());
    }

    #[test]
    fn test_typed_constructors_validate() {
        let tree = Expression::list_to_nested_and(vec![
            Expression::contains("name", "bob"),
            Expression::is_in("role", ["admin", "owner"]),
            Expression::is_null("deleted_at"),
            Expression::between("age", [18, 65]).unwrap(),
        ])
        .unwrap();
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_operator_serializes_with_stable_names() {
        let json = serde_json::to_string(&Operator::GreaterThanOrEqualTo).unwrap();
        assert_eq!(json, "\"GreaterThanOrEqualTo\"");

        let expression = Expression::starts_with("name", "al");
        let round: Expression =
            serde_json::from_str(&serde_json::to_string(&expression).unwrap()).unwrap();
        assert_eq!(round, expression);
    }

    #[test]
    fn test_display() {
        let expression = Expression::and(Expression::eq("a", 1), Expression::is_null("b"));
        assert_eq!(expression.to_string(), "((a Equals 1) And (b IsNull))");
    }
}
