//! SQLite dialect profile
//!
//! SQLite stores most portable types under a handful of storage classes,
//! has no TRUNCATE, needs an explicit LIKE escape character, and only
//! allows AUTOINCREMENT on an `INTEGER PRIMARY KEY`.

use super::{
    BytesLiteral, DatabaseBackend, DialectProfile, EscapeStyle, ExistsStyle, IdentitySyntax,
    LikeEscape, MultiInsert, PaginationStyle, PlaceholderStyle, QuoteStyle,
};
use crate::types::{DataType, TypeSyntax};

pub static PROFILE: DialectProfile = DialectProfile {
    backend: DatabaseBackend::SQLite,
    quote: QuoteStyle::DoubleQuotes,
    escape: EscapeStyle::Standard,
    string_prefix: "",
    like_escape: LikeEscape::BackslashClause,
    placeholder: PlaceholderStyle::QuestionNumbered,
    pagination: PaginationStyle::LimitOffset,
    multi_insert: MultiInsert::Transaction,
    begin_transaction: "BEGIN TRANSACTION;",
    commit_transaction: "COMMIT;",
    bool_literals: ("1", "0"),
    bytes_literal: BytesLiteral::XQuoted,
    type_map: &[
        (DataType::Int, TypeSyntax::Plain("INTEGER")),
        (DataType::Long, TypeSyntax::Plain("INTEGER")),
        (DataType::Decimal, TypeSyntax::Plain("NUMERIC")),
        (DataType::Double, TypeSyntax::Plain("REAL")),
        (DataType::DateTime, TypeSyntax::Plain("TEXT")),
        (DataType::DateTimeOffset, TypeSyntax::Plain("TEXT")),
        (DataType::Varchar, TypeSyntax::Plain("TEXT")),
        (DataType::Nvarchar, TypeSyntax::Plain("TEXT")),
        (DataType::Blob, TypeSyntax::Plain("BLOB")),
        (DataType::Boolean, TypeSyntax::Plain("INTEGER")),
        (DataType::Guid, TypeSyntax::Plain("TEXT")),
    ],
    type_aliases: &[
        ("INT", DataType::Int),
        ("BIGINT", DataType::Long),
        ("DECIMAL", DataType::Decimal),
        ("DOUBLE", DataType::Double),
        ("FLOAT", DataType::Double),
        ("DATETIME", DataType::DateTime),
        ("VARCHAR", DataType::Varchar),
        ("NVARCHAR", DataType::Nvarchar),
        ("BOOLEAN", DataType::Boolean),
    ],
    primary_key_types: &[
        DataType::Int,
        DataType::Long,
        DataType::Varchar,
        DataType::Nvarchar,
        DataType::Guid,
    ],
    key_limit: None,
    identity: IdentitySyntax::ReplaceType {
        int: "INTEGER",
        long: "INTEGER",
        suffix: "PRIMARY KEY AUTOINCREMENT",
    },
    exists: ExistsStyle::Bare,
    truncate: "DELETE FROM",
    // SQLITE_MAX_SQL_LENGTH
    max_statement_length: 1_000_000_000,
    max_params: Some(32_766),
    timestamp_format: "%Y-%m-%d %H:%M:%S%.3f",
    timestamp_offset_format: "%Y-%m-%d %H:%M:%S%.3f%:z",
};
