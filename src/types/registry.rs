//! Portable column types and their per-dialect native spellings
//!
//! Each dialect profile carries a table from [`DataType`] to a
//! [`TypeSyntax`]. [`TypeMap`] renders column types through that table and
//! maps catalog type names back to portable types for schema introspection.

use crate::error::{Error, Result};
use crate::models::Column;
use crate::query_builder::dialects::DatabaseBackend;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Portable, dialect-agnostic column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Int,
    Long,
    Decimal,
    Double,
    DateTime,
    DateTimeOffset,
    Varchar,
    Nvarchar,
    Blob,
    #[serde(alias = "TinyInt")]
    Boolean,
    Guid,
}

impl DataType {
    pub const ALL: [DataType; 11] = [
        DataType::Int,
        DataType::Long,
        DataType::Decimal,
        DataType::Double,
        DataType::DateTime,
        DataType::DateTimeOffset,
        DataType::Varchar,
        DataType::Nvarchar,
        DataType::Blob,
        DataType::Boolean,
        DataType::Guid,
    ];

    /// Types that cannot be declared without a maximum length
    pub fn requires_length(&self) -> bool {
        matches!(
            self,
            DataType::Decimal | DataType::Double | DataType::Varchar | DataType::Nvarchar
        )
    }

    /// Types that cannot be declared without a precision
    pub fn requires_precision(&self) -> bool {
        matches!(self, DataType::Decimal | DataType::Double)
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, DataType::Int | DataType::Long)
    }
}

/// How a native type name takes its length and precision arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSyntax {
    /// `NAME`
    Plain(&'static str),
    /// `NAME(length)`
    Length(&'static str),
    /// `NAME(length,precision)`
    LengthPrecision(&'static str),
    /// `NAME(length)`, or `NAME(MAX)` once length exceeds the limit
    LengthOrMax(&'static str, u32),
}

impl TypeSyntax {
    pub fn name(&self) -> &'static str {
        match self {
            TypeSyntax::Plain(name)
            | TypeSyntax::Length(name)
            | TypeSyntax::LengthPrecision(name)
            | TypeSyntax::LengthOrMax(name, _) => name,
        }
    }
}

/// Lookup and rendering over the dialect type tables
pub struct TypeMap;

impl TypeMap {
    /// Native syntax for a portable type, if the dialect can represent it
    pub fn native(backend: DatabaseBackend, data_type: DataType) -> Option<TypeSyntax> {
        backend
            .profile()
            .type_map
            .iter()
            .find(|(dt, _)| *dt == data_type)
            .map(|(_, syntax)| *syntax)
    }

    /// Render the column's type, applying length/precision only where the syntax takes them
    pub fn render(backend: DatabaseBackend, column: &Column) -> Result<String> {
        let syntax = Self::native(backend, column.data_type).ok_or(Error::UnsupportedType {
            backend,
            data_type: column.data_type,
        })?;

        let length = || {
            column.max_length.ok_or_else(|| {
                Error::validation(format!(
                    "Column '{}' of type {:?} requires a max length",
                    column.name, column.data_type
                ))
            })
        };

        let rendered = match syntax {
            TypeSyntax::Plain(name) => name.to_string(),
            TypeSyntax::Length(name) => format!("{}({})", name, length()?),
            TypeSyntax::LengthOrMax(name, limit) => match column.max_length {
                Some(n) if n <= limit => format!("{}({})", name, n),
                _ => format!("{}(MAX)", name),
            },
            TypeSyntax::LengthPrecision(name) => {
                let precision = column.precision.ok_or_else(|| {
                    Error::validation(format!(
                        "Column '{}' of type {:?} requires a precision",
                        column.name, column.data_type
                    ))
                })?;
                format!("{}({},{})", name, length()?, precision)
            }
        };

        Ok(rendered)
    }

    /// Map a catalog type name (e.g. `varchar(255)`, `TIMESTAMP WITH TIME ZONE`) back to a portable type
    pub fn parse_native(backend: DatabaseBackend, native: &str) -> Option<DataType> {
        let full = normalize(native);
        if let Some(dt) = NATIVE_INDEX.get(&(backend, full)) {
            return Some(*dt);
        }

        let bare = normalize(native.split('(').next().unwrap_or_default());
        NATIVE_INDEX.get(&(backend, bare)).copied()
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

/// Inverse of every dialect's type table, keyed by normalized native name
///
/// Full spellings such as `TINYINT(1)` win, then aliases, then the bare
/// name of a parameterized spelling. Earlier table entries win over later ones.
static NATIVE_INDEX: Lazy<HashMap<(DatabaseBackend, String), DataType>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for backend in DatabaseBackend::ALL {
        let profile = backend.profile();
        for (dt, syntax) in profile.type_map {
            index
                .entry((backend, normalize(syntax.name())))
                .or_insert(*dt);
        }
        for (alias, dt) in profile.type_aliases {
            index.entry((backend, normalize(alias))).or_insert(*dt);
        }
        for (dt, syntax) in profile.type_map {
            let bare = syntax.name().split('(').next().unwrap_or_default();
            index.entry((backend, normalize(bare))).or_insert(*dt);
        }
    }
    index
});

#[cfg(test)]
mod tests {
    use super::*;

    fn column(data_type: DataType, max_length: Option<u32>, precision: Option<u32>) -> Column {
        Column {
            name: "c".to_string(),
            primary_key: false,
            data_type,
            max_length,
            precision,
            nullable: true,
        }
    }

    #[test]
    fn test_every_dialect_maps_core_types() {
        for backend in DatabaseBackend::ALL {
            for dt in [DataType::Int, DataType::Long, DataType::Varchar, DataType::Blob] {
                assert!(
                    TypeMap::native(backend, dt).is_some(),
                    "{:?} should map {:?}",
                    backend,
                    dt
                );
            }
        }
    }

    #[test]
    fn test_render_length_and_precision() {
        let decimal = column(DataType::Decimal, Some(18), Some(4));
        assert_eq!(
            TypeMap::render(DatabaseBackend::Postgres, &decimal).unwrap(),
            "DECIMAL(18,4)"
        );
        assert_eq!(
            TypeMap::render(DatabaseBackend::SQLite, &decimal).unwrap(),
            "NUMERIC"
        );

        let varchar = column(DataType::Varchar, Some(120), None);
        assert_eq!(
            TypeMap::render(DatabaseBackend::MySQL, &varchar).unwrap(),
            "VARCHAR(120)"
        );
    }

    #[test]
    fn test_sqlserver_switches_to_max() {
        let long_text = column(DataType::Nvarchar, Some(5000), None);
        assert_eq!(
            TypeMap::render(DatabaseBackend::SqlServer, &long_text).unwrap(),
            "NVARCHAR(MAX)"
        );

        let short_text = column(DataType::Nvarchar, Some(200), None);
        assert_eq!(
            TypeMap::render(DatabaseBackend::SqlServer, &short_text).unwrap(),
            "NVARCHAR(200)"
        );
    }

    #[test]
    fn test_unsupported_type() {
        let offset = column(DataType::DateTimeOffset, None, None);
        let err = TypeMap::render(DatabaseBackend::MySQL, &offset).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedType {
                backend: DatabaseBackend::MySQL,
                data_type: DataType::DateTimeOffset
            }
        ));
    }

    #[test]
    fn test_parse_native_inverts_the_table() {
        assert_eq!(
            TypeMap::parse_native(DatabaseBackend::MySQL, "varchar(255)"),
            Some(DataType::Varchar)
        );
        assert_eq!(
            TypeMap::parse_native(DatabaseBackend::Postgres, "timestamp with time zone"),
            Some(DataType::DateTimeOffset)
        );
        assert_eq!(
            TypeMap::parse_native(DatabaseBackend::SqlServer, "uniqueidentifier"),
            Some(DataType::Guid)
        );
        assert_eq!(
            TypeMap::parse_native(DatabaseBackend::SQLite, "geometry"),
            None
        );
        assert_eq!(
            TypeMap::parse_native(DatabaseBackend::MySQL, "tinyint(1)"),
            Some(DataType::Boolean)
        );
        assert_eq!(
            TypeMap::parse_native(DatabaseBackend::MySQL, "char(36)"),
            Some(DataType::Guid)
        );
        assert_eq!(
            TypeMap::parse_native(DatabaseBackend::MySQL, "char(2)"),
            Some(DataType::Varchar)
        );
    }

    #[test]
    fn test_parse_native_round_trips_for_every_mapped_type() {
        for backend in DatabaseBackend::ALL {
            for dt in DataType::ALL {
                if let Some(syntax) = TypeMap::native(backend, dt) {
                    let parsed = TypeMap::parse_native(backend, syntax.name())
                        .expect("mapped name should parse");
                    // Several portable types share one native name (e.g. SQLite TEXT)
                    let reparsed = TypeMap::native(backend, parsed).map(|s| s.name());
                    assert_eq!(reparsed, Some(syntax.name()));
                }
            }
        }
    }
}
