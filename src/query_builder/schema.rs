//! DDL generation
//!
//! Renders CREATE TABLE and DROP TABLE statements from portable [`Column`]
//! descriptors, resolving types and identity syntax through the dialect.

use super::dialects::{IdentitySyntax, SqlDialect};
use crate::error::{Error, Result};
use crate::models::Column;
use crate::types::{DataType, TypeMap, TypeSyntax};

/// Schema builder that generates dialect-specific DDL
pub struct SchemaBuilder<'a> {
    dialect: &'a SqlDialect,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(dialect: &'a SqlDialect) -> Self {
        SchemaBuilder { dialect }
    }

    /// Build a CREATE TABLE statement
    ///
    /// An integer primary key becomes the dialect's auto-increment column;
    /// any other primary key is declared `NOT NULL PRIMARY KEY`.
    pub fn create_table(&self, table: &str, columns: &[Column]) -> Result<String> {
        if columns.is_empty() {
            return Err(Error::validation(format!(
                "Table '{}' needs at least one column",
                table
            )));
        }

        for column in columns {
            column.validate()?;
        }

        let primary_keys: Vec<&Column> = columns.iter().filter(|c| c.primary_key).collect();
        if primary_keys.len() > 1 {
            let names: Vec<&str> = primary_keys.iter().map(|c| c.name.as_str()).collect();
            return Err(Error::validation(format!(
                "Table '{}' declares more than one primary key: {}",
                table,
                names.join(", ")
            )));
        }

        let backend = self.dialect.backend();
        if let Some(pk) = primary_keys.first() {
            if !self.dialect.profile().primary_key_types.contains(&pk.data_type) {
                return Err(Error::unsupported_feature(
                    backend,
                    format!("{:?} primary key on column '{}'", pk.data_type, pk.name),
                ));
            }
            self.check_key_size(pk)?;
        }

        let definitions = columns
            .iter()
            .map(|column| self.column_definition(column))
            .collect::<Result<Vec<_>>>()?;

        let sql = format!(
            "CREATE TABLE {} (\n  {}\n)",
            self.dialect.quote_identifier(table),
            definitions.join(",\n  ")
        );

        #[cfg(debug_assertions)]
        {
            log::debug!("SchemaBuilder CREATE TABLE SQL: {}", sql);
        }

        self.dialect.check_length(&sql)?;
        Ok(sql)
    }

    /// DROP TABLE IF EXISTS, safe to repeat
    pub fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.dialect.quote_identifier(table))
    }

    /// Reject key columns the engine cannot index: `(MAX)` types and keys over its byte limit
    fn check_key_size(&self, pk: &Column) -> Result<()> {
        let backend = self.dialect.backend();

        if let Some(TypeSyntax::LengthOrMax(name, limit)) = TypeMap::native(backend, pk.data_type) {
            if pk.max_length.map_or(true, |length| length > limit) {
                return Err(Error::unsupported_feature(
                    backend,
                    format!("{}(MAX) primary key on column '{}'", name, pk.name),
                ));
            }
        }

        let key_limit = match self.dialect.profile().key_limit {
            Some(key_limit) => key_limit,
            None => return Ok(()),
        };
        let bytes_per_char = match pk.data_type {
            DataType::Varchar => key_limit.varchar_bytes,
            DataType::Nvarchar => key_limit.nvarchar_bytes,
            _ => return Ok(()),
        };

        if let Some(length) = pk.max_length {
            let bytes = u64::from(length) * u64::from(bytes_per_char);
            if bytes > u64::from(key_limit.max_bytes) {
                return Err(Error::unsupported_feature(
                    backend,
                    format!(
                        "primary key '{}' needs {} bytes, over the {}-byte key limit",
                        pk.name, bytes, key_limit.max_bytes
                    ),
                ));
            }
        }
        Ok(())
    }

    fn column_definition(&self, column: &Column) -> Result<String> {
        let name = self.dialect.quote_identifier(&column.name);

        if column.primary_key {
            if column.data_type.is_integral() {
                let identity = match self.dialect.profile().identity {
                    IdentitySyntax::Suffix(suffix) => {
                        format!("{} {}", TypeMap::render(self.dialect.backend(), column)?, suffix)
                    }
                    IdentitySyntax::ReplaceType { int, long, suffix } => {
                        let native = if column.data_type == DataType::Long {
                            long
                        } else {
                            int
                        };
                        format!("{} {}", native, suffix)
                    }
                };
                return Ok(format!("{} {}", name, identity));
            }

            return Ok(format!(
                "{} {} NOT NULL PRIMARY KEY",
                name,
                TypeMap::render(self.dialect.backend(), column)?
            ));
        }

        let mut definition = format!(
            "{} {}",
            name,
            TypeMap::render(self.dialect.backend(), column)?
        );
        if !column.nullable {
            definition.push_str(" NOT NULL");
        }
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::DatabaseBackend;

    fn columns() -> Vec<Column> {
        vec![
            Column::builder("id", DataType::Int).primary_key().build().unwrap(),
            Column::builder("email", DataType::Varchar)
                .max_length(255)
                .not_null()
                .build()
                .unwrap(),
            Column::builder("balance", DataType::Decimal)
                .max_length(12)
                .precision(2)
                .build()
                .unwrap(),
        ]
    }

    #[test]
    fn test_create_table_per_dialect() {
        let sqlserver = SqlDialect::new(DatabaseBackend::SqlServer);
        assert_eq!(
            SchemaBuilder::new(&sqlserver)
                .create_table("accounts", &columns())
                .unwrap(),
            "CREATE TABLE [accounts] (\n  [id] INT IDENTITY(1,1) PRIMARY KEY,\n  [email] VARCHAR(255) NOT NULL,\n  [balance] DECIMAL(12,2)\n)"
        );

        let postgres = SqlDialect::new(DatabaseBackend::Postgres);
        let sql = SchemaBuilder::new(&postgres)
            .create_table("accounts", &columns())
            .unwrap();
        assert!(sql.contains("\"id\" SERIAL PRIMARY KEY"));

        let sqlite = SqlDialect::new(DatabaseBackend::SQLite);
        let sql = SchemaBuilder::new(&sqlite)
            .create_table("accounts", &columns())
            .unwrap();
        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("\"balance\" NUMERIC"));

        let mysql = SqlDialect::new(DatabaseBackend::MySQL);
        let sql = SchemaBuilder::new(&mysql)
            .create_table("accounts", &columns())
            .unwrap();
        assert!(sql.contains("`id` INT AUTO_INCREMENT PRIMARY KEY"));
    }

    #[test]
    fn test_bigserial_for_long_keys() {
        let postgres = SqlDialect::new(DatabaseBackend::Postgres);
        let columns = vec![Column::builder("id", DataType::Long)
            .primary_key()
            .build()
            .unwrap()];
        let sql = SchemaBuilder::new(&postgres)
            .create_table("events", &columns)
            .unwrap();
        assert!(sql.contains("\"id\" BIGSERIAL PRIMARY KEY"));
    }

    #[test]
    fn test_non_integer_primary_key() {
        let sqlserver = SqlDialect::new(DatabaseBackend::SqlServer);
        let columns = vec![Column::builder("id", DataType::Guid)
            .primary_key()
            .build()
            .unwrap()];
        let sql = SchemaBuilder::new(&sqlserver)
            .create_table("sessions", &columns)
            .unwrap();
        assert!(sql.contains("[id] UNIQUEIDENTIFIER NOT NULL PRIMARY KEY"));
    }

    #[test]
    fn test_primary_key_type_restrictions() {
        let sqlite = SqlDialect::new(DatabaseBackend::SQLite);
        let columns = vec![Column::builder("at", DataType::DateTime)
            .primary_key()
            .build()
            .unwrap()];
        let err = SchemaBuilder::new(&sqlite)
            .create_table("ticks", &columns)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFeature { .. }));

        let mysql = SqlDialect::new(DatabaseBackend::MySQL);
        let columns = vec![Column::builder("raw", DataType::Blob)
            .primary_key()
            .build()
            .unwrap()];
        assert!(SchemaBuilder::new(&mysql)
            .create_table("blobs", &columns)
            .is_err());
    }

    #[test]
    fn test_string_keys_must_fit_the_key_limit() {
        let sqlserver = SqlDialect::new(DatabaseBackend::SqlServer);
        let builder = SchemaBuilder::new(&sqlserver);
        let key = |data_type, length| {
            vec![Column::builder("k", data_type)
                .max_length(length)
                .primary_key()
                .build()
                .unwrap()]
        };

        // NVARCHAR(MAX) cannot be indexed
        let err = builder
            .create_table("t", &key(DataType::Nvarchar, 5000))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFeature { .. }));

        assert!(builder.create_table("t", &key(DataType::Nvarchar, 451)).is_err());
        assert!(builder.create_table("t", &key(DataType::Varchar, 901)).is_err());
        assert_eq!(
            builder
                .create_table("t", &key(DataType::Nvarchar, 450))
                .unwrap(),
            "CREATE TABLE [t] (\n  [k] NVARCHAR(450) NOT NULL PRIMARY KEY\n)"
        );

        let mysql = SqlDialect::new(DatabaseBackend::MySQL);
        let builder = SchemaBuilder::new(&mysql);
        assert!(builder.create_table("t", &key(DataType::Varchar, 768)).is_ok());
        assert!(builder.create_table("t", &key(DataType::Varchar, 769)).is_err());

        let postgres = SqlDialect::new(DatabaseBackend::Postgres);
        assert!(SchemaBuilder::new(&postgres)
            .create_table("t", &key(DataType::Varchar, 5000))
            .is_ok());
    }

    #[test]
    fn test_rejects_two_primary_keys_and_empty_tables() {
        let dialect = SqlDialect::new(DatabaseBackend::Postgres);
        let builder = SchemaBuilder::new(&dialect);

        let columns = vec![
            Column::builder("a", DataType::Int).primary_key().build().unwrap(),
            Column::builder("b", DataType::Int).primary_key().build().unwrap(),
        ];
        assert!(matches!(
            builder.create_table("t", &columns),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            builder.create_table("t", &[]),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_column_rejected_before_rendering() {
        let dialect = SqlDialect::new(DatabaseBackend::MySQL);
        let mut column = Column::builder("name", DataType::Varchar)
            .max_length(10)
            .build()
            .unwrap();
        column.max_length = None;

        assert!(SchemaBuilder::new(&dialect)
            .create_table("t", &[column])
            .is_err());
    }

    #[test]
    fn test_drop_table_is_idempotent_form() {
        for backend in DatabaseBackend::ALL {
            let dialect = SqlDialect::new(backend);
            assert!(SchemaBuilder::new(&dialect)
                .drop_table("users")
                .starts_with("DROP TABLE IF EXISTS "));
        }
    }
}
