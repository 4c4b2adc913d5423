//! Database dialect descriptions
//!
//! Every engine difference lives here as data: quoting, escaping,
//! placeholders, pagination, type names, identity syntax and limits. Each
//! engine's [`DialectProfile`] is a static table in its own module; the
//! compilers in the parent module share one algorithm and consult the
//! profile wherever engines disagree.

use crate::config::CompilerConfig;
use crate::error::{Error, Result};
use crate::types::{DataType, SqlValue, TypeSyntax};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

pub mod escape;
pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;

/// Database engines supported by the compilers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseBackend {
    SqlServer,
    MySQL,
    Postgres,
    SQLite,
}

impl DatabaseBackend {
    pub const ALL: [DatabaseBackend; 4] = [
        DatabaseBackend::SqlServer,
        DatabaseBackend::MySQL,
        DatabaseBackend::Postgres,
        DatabaseBackend::SQLite,
    ];

    /// Static syntax table for this engine
    pub fn profile(&self) -> &'static DialectProfile {
        match self {
            DatabaseBackend::SqlServer => &sqlserver::PROFILE,
            DatabaseBackend::MySQL => &mysql::PROFILE,
            DatabaseBackend::Postgres => &postgres::PROFILE,
            DatabaseBackend::SQLite => &sqlite::PROFILE,
        }
    }

    /// Lowercase name used for configuration sections
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseBackend::SqlServer => "sqlserver",
            DatabaseBackend::MySQL => "mysql",
            DatabaseBackend::Postgres => "postgres",
            DatabaseBackend::SQLite => "sqlite",
        }
    }
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlserver" | "mssql" | "tsql" => Ok(DatabaseBackend::SqlServer),
            "mysql" | "mariadb" => Ok(DatabaseBackend::MySQL),
            "postgres" | "postgresql" | "pg" => Ok(DatabaseBackend::Postgres),
            "sqlite" | "sqlite3" => Ok(DatabaseBackend::SQLite),
            other => Err(Error::config(format!("Unknown database backend '{}'", other))),
        }
    }
}

/// Identifier wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// `[name]`, `]` doubled
    Brackets,
    /// `` `name` ``, backtick doubled
    Backticks,
    /// `"name"`, `"` doubled
    DoubleQuotes,
}

/// String literal escaping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeStyle {
    /// Strip control characters and comment sequences, double `'`
    Standard,
    /// As `Standard`, and double backslashes
    Backslash,
    /// `$tag$...$tag$` with a random tag absent from the value
    DollarQuoted,
}

/// Escaping of LIKE wildcards inside a pattern value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeEscape {
    /// `[%]`, `[_]`, `[[]`
    Brackets,
    /// `\%`, `\_`, `\\`; backslash is the engine's default escape
    Backslash,
    /// `\%` plus an explicit `ESCAPE '\'` clause
    BackslashClause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `@p1`, `@p2`, ...
    AtNumbered,
    /// `?`
    Question,
    /// `$1`, `$2`, ...
    Dollar,
    /// `?1`, `?2`, ...
    QuestionNumbered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStyle {
    /// `OFFSET n ROWS FETCH NEXT m ROWS ONLY`; needs ORDER BY, falls back to `TOP (m)`
    OffsetFetch,
    /// `LIMIT n,m`
    LimitComma,
    /// `OFFSET n LIMIT m`
    OffsetLimit,
    /// `LIMIT m OFFSET n`
    LimitOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiInsert {
    /// One `INSERT ... VALUES (...), (...)`, chunked at `max_rows`
    ValuesList { max_rows: Option<usize> },
    /// Repeated single-row inserts inside a transaction
    Transaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BytesLiteral {
    /// `0xDEAD`
    ZeroX,
    /// `X'DEAD'`
    XQuoted,
    /// `decode('DEAD', 'hex')`
    HexDecode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySyntax {
    /// `<type> <suffix>`
    Suffix(&'static str),
    /// Replace the type entirely: `<int|long> <suffix>`
    ReplaceType {
        int: &'static str,
        long: &'static str,
        suffix: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistsStyle {
    /// `SELECT CASE WHEN EXISTS (...) THEN 1 ELSE 0 END AS alias`
    CaseWhen,
    /// `SELECT EXISTS (...) AS alias`
    Bare,
}

/// Size limit on an indexed key column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLimit {
    pub max_bytes: u32,
    /// Storage bytes per character of a `Varchar` column
    pub varchar_bytes: u32,
    /// Storage bytes per character of an `Nvarchar` column
    pub nvarchar_bytes: u32,
}

/// Static per-engine syntax table
#[derive(Debug)]
pub struct DialectProfile {
    pub backend: DatabaseBackend,
    pub quote: QuoteStyle,
    pub escape: EscapeStyle,
    /// Prefix for string literals, e.g. `N` for Unicode literals
    pub string_prefix: &'static str,
    pub like_escape: LikeEscape,
    pub placeholder: PlaceholderStyle,
    pub pagination: PaginationStyle,
    pub multi_insert: MultiInsert,
    pub begin_transaction: &'static str,
    pub commit_transaction: &'static str,
    pub bool_literals: (&'static str, &'static str),
    pub bytes_literal: BytesLiteral,
    pub type_map: &'static [(DataType, TypeSyntax)],
    /// Catalog spellings that map back to a portable type
    pub type_aliases: &'static [(&'static str, DataType)],
    pub primary_key_types: &'static [DataType],
    pub key_limit: Option<KeyLimit>,
    pub identity: IdentitySyntax,
    pub exists: ExistsStyle,
    pub truncate: &'static str,
    pub max_statement_length: usize,
    /// Bound parameters accepted in one request
    pub max_params: Option<usize>,
    pub timestamp_format: &'static str,
    pub timestamp_offset_format: &'static str,
}

/// Rendered pagination pieces: an optional `TOP` after SELECT and a suffix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub top: Option<String>,
    pub suffix: String,
}

/// An engine's profile bound to resolved configuration
///
/// Built once and shared by reference; it holds no mutable state.
#[derive(Debug, Clone)]
pub struct SqlDialect {
    profile: &'static DialectProfile,
    timestamp_format: String,
    timestamp_offset_format: String,
    max_statement_length: usize,
    parameterized: bool,
    strict_predicates: bool,
}

impl SqlDialect {
    /// Dialect with the engine's default formats and limits
    pub fn new(backend: DatabaseBackend) -> Self {
        let profile = backend.profile();
        SqlDialect {
            profile,
            timestamp_format: profile.timestamp_format.to_string(),
            timestamp_offset_format: profile.timestamp_offset_format.to_string(),
            max_statement_length: profile.max_statement_length,
            parameterized: true,
            strict_predicates: false,
        }
    }

    /// Dialect with overrides from configuration applied
    pub fn with_config(backend: DatabaseBackend, config: &CompilerConfig) -> Result<Self> {
        config.validate()?;

        let mut dialect = Self::new(backend);
        dialect.parameterized = config.parameterized;
        dialect.strict_predicates = config.strict_predicates;

        if let Some(overrides) = config.dialect(backend) {
            if let Some(format) = &overrides.timestamp_format {
                dialect.timestamp_format = format.clone();
            }
            if let Some(format) = &overrides.timestamp_offset_format {
                dialect.timestamp_offset_format = format.clone();
            }
            if let Some(max) = overrides.max_statement_length {
                dialect.max_statement_length = max;
            }
        }

        log::debug!(
            "Configured {} dialect (parameterized: {}, strict: {}, max length: {})",
            backend,
            dialect.parameterized,
            dialect.strict_predicates,
            dialect.max_statement_length
        );

        Ok(dialect)
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.profile.backend
    }

    pub fn profile(&self) -> &'static DialectProfile {
        self.profile
    }

    /// Whether statements bind values through placeholders by default
    pub fn parameterized(&self) -> bool {
        self.parameterized
    }

    /// Whether malformed predicates fail instead of being dropped
    pub fn strict_predicates(&self) -> bool {
        self.strict_predicates
    }

    pub fn max_statement_length(&self) -> usize {
        self.max_statement_length
    }

    pub fn max_params(&self) -> Option<usize> {
        self.profile.max_params
    }

    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    pub fn timestamp_offset_format(&self) -> &str {
        &self.timestamp_offset_format
    }

    /// Quote a table or column name; dotted names are quoted per part
    pub fn quote_identifier(&self, identifier: &str) -> String {
        escape::quote_identifier(self.backend(), identifier)
    }

    /// Escape and quote a string literal
    pub fn quote_string(&self, value: &str) -> String {
        escape::escape_string(self.backend(), value)
    }

    /// Parameter placeholder for the given 1-based position
    pub fn placeholder(&self, position: usize) -> String {
        match self.profile.placeholder {
            PlaceholderStyle::AtNumbered => format!("@p{}", position),
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Dollar => format!("${}", position),
            PlaceholderStyle::QuestionNumbered => format!("?{}", position),
        }
    }

    /// Render a value inline as dialect-correct SQL text
    pub fn literal(&self, value: &SqlValue) -> Result<String> {
        let rendered = match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => {
                let (t, f) = self.profile.bool_literals;
                if *b { t } else { f }.to_string()
            }
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Decimal(d) => d.to_string(),
            SqlValue::Double(d) if d.is_finite() => d.to_string(),
            SqlValue::Double(d) => {
                return Err(Error::invalid_expression(format!(
                    "Non-finite double {} cannot be rendered inline",
                    d
                )))
            }
            SqlValue::String(s) => self.quote_string(s),
            SqlValue::Uuid(u) => self.quote_string(&u.to_string()),
            SqlValue::Bytes(bytes) => {
                let hex = escape::hex_encode(bytes);
                match self.profile.bytes_literal {
                    BytesLiteral::ZeroX => format!("0x{}", hex),
                    BytesLiteral::XQuoted => format!("X'{}'", hex),
                    BytesLiteral::HexDecode => format!("decode('{}', 'hex')", hex),
                }
            }
            SqlValue::DateTime(dt) => self.quote_string(&render_timestamp(
                dt.format(&self.timestamp_format),
                &self.timestamp_format,
            )?),
            SqlValue::DateTimeOffset(dt) => self.quote_string(&render_timestamp(
                dt.format(&self.timestamp_offset_format),
                &self.timestamp_offset_format,
            )?),
        };
        Ok(rendered)
    }

    /// Escape LIKE wildcards so a user value only matches itself
    pub fn escape_like(&self, value: &str) -> String {
        escape::escape_like(self.backend(), value)
    }

    /// Trailing clause required after a LIKE pattern, if any
    pub fn like_escape_clause(&self) -> &'static str {
        match self.profile.like_escape {
            LikeEscape::BackslashClause => " ESCAPE '\\'",
            LikeEscape::Brackets | LikeEscape::Backslash => "",
        }
    }

    /// Render pagination for this engine
    ///
    /// `ordered` reports whether the statement carries an ORDER BY.
    pub fn pagination(
        &self,
        offset: Option<u64>,
        limit: Option<u64>,
        ordered: bool,
    ) -> Result<Pagination> {
        let mut pagination = Pagination::default();

        match self.profile.pagination {
            PaginationStyle::OffsetFetch => match (offset, limit, ordered) {
                (None, None, _) => {}
                (_, _, true) => {
                    pagination.suffix = format!(" OFFSET {} ROWS", offset.unwrap_or(0));
                    if let Some(limit) = limit {
                        pagination
                            .suffix
                            .push_str(&format!(" FETCH NEXT {} ROWS ONLY", limit));
                    }
                }
                (None, Some(limit), false) => {
                    pagination.top = Some(format!("TOP ({})", limit));
                }
                (Some(_), _, false) => {
                    return Err(Error::unsupported_feature(
                        self.backend(),
                        "OFFSET pagination requires an ORDER BY clause",
                    ));
                }
            },
            PaginationStyle::LimitComma => {
                pagination.suffix = match (offset, limit) {
                    (Some(offset), Some(limit)) => format!(" LIMIT {},{}", offset, limit),
                    (None, Some(limit)) => format!(" LIMIT {}", limit),
                    (Some(offset), None) => format!(" LIMIT {},{}", offset, u64::MAX),
                    (None, None) => String::new(),
                }
            }
            PaginationStyle::OffsetLimit => {
                if let Some(offset) = offset {
                    pagination.suffix.push_str(&format!(" OFFSET {}", offset));
                }
                if let Some(limit) = limit {
                    pagination.suffix.push_str(&format!(" LIMIT {}", limit));
                }
            }
            PaginationStyle::LimitOffset => {
                pagination.suffix = match (offset, limit) {
                    (Some(offset), Some(limit)) => format!(" LIMIT {} OFFSET {}", limit, offset),
                    (None, Some(limit)) => format!(" LIMIT {}", limit),
                    (Some(offset), None) => format!(" LIMIT -1 OFFSET {}", offset),
                    (None, None) => String::new(),
                }
            }
        }

        Ok(pagination)
    }

    /// Reject statements longer than the engine accepts
    pub fn check_length(&self, sql: &str) -> Result<()> {
        if sql.len() > self.max_statement_length {
            return Err(Error::MaxLengthExceeded {
                backend: self.backend(),
                length: sql.len(),
                max: self.max_statement_length,
            });
        }
        Ok(())
    }
}

/// A format asking for data the value lacks, such as `%z` on a naive timestamp, is an error
fn render_timestamp(formatted: impl fmt::Display, format: &str) -> Result<String> {
    let mut rendered = String::new();
    write!(rendered, "{}", formatted).map_err(|_| {
        Error::invalid_expression(format!(
            "Timestamp format '{}' cannot render this value",
            format
        ))
    })?;
    Ok(rendered)
}
