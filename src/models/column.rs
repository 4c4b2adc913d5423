//! Portable column descriptors
//!
//! A [`Column`] names a field, its portable [`DataType`] and the length,
//! precision and key flags that DDL rendering needs.

use crate::error::{Error, Result};
use crate::types::DataType;
use serde::{Deserialize, Serialize};

/// Column descriptor consumed by the DDL compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// Create a validated column
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        primary_key: bool,
        max_length: Option<u32>,
        precision: Option<u32>,
        nullable: bool,
    ) -> Result<Self> {
        let column = Column {
            name: name.into(),
            primary_key,
            data_type,
            max_length,
            precision,
            nullable,
        };
        column.validate()?;
        Ok(column)
    }

    /// Start a fluent definition; columns are nullable until told otherwise
    pub fn builder(name: impl Into<String>, data_type: DataType) -> ColumnBuilder {
        ColumnBuilder {
            column: Column {
                name: name.into(),
                primary_key: false,
                data_type,
                max_length: None,
                precision: None,
                nullable: true,
            },
        }
    }

    /// Re-check construction invariants, e.g. after direct field assignment
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Column name cannot be empty"));
        }

        if self.primary_key && self.nullable {
            return Err(Error::validation(format!(
                "Primary key column '{}' cannot be nullable",
                self.name
            )));
        }

        if self.max_length == Some(0) {
            return Err(Error::validation(format!(
                "Column '{}' max length must be at least 1",
                self.name
            )));
        }

        if self.precision == Some(0) {
            return Err(Error::validation(format!(
                "Column '{}' precision must be at least 1",
                self.name
            )));
        }

        if self.data_type.requires_length() && self.max_length.is_none() {
            return Err(Error::validation(format!(
                "Column '{}' of type {:?} requires a max length",
                self.name, self.data_type
            )));
        }

        if self.data_type.requires_precision() && self.precision.is_none() {
            return Err(Error::validation(format!(
                "Column '{}' of type {:?} requires a precision",
                self.name, self.data_type
            )));
        }

        Ok(())
    }
}

/// Fluent builder for [`Column`]
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    column: Column,
}

impl ColumnBuilder {
    /// Mark as primary key; this also makes the column NOT NULL
    pub fn primary_key(mut self) -> Self {
        self.column.primary_key = true;
        self.column.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.column.nullable = false;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.column.nullable = nullable;
        self
    }

    pub fn max_length(mut self, max_length: u32) -> Self {
        self.column.max_length = Some(max_length);
        self
    }

    pub fn precision(mut self, precision: u32) -> Self {
        self.column.precision = Some(precision);
        self
    }

    pub fn build(self) -> Result<Column> {
        self.column.validate()?;
        Ok(self.column)
    }
}
