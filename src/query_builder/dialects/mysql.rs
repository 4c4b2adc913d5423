//! MySQL/MariaDB dialect profile
//!
//! Backtick identifiers, backslash-aware string escaping and the
//! `LIMIT offset,count` paging form. MySQL has no column type that keeps a
//! UTC offset, so `DateTimeOffset` columns are rejected.

use super::{
    BytesLiteral, DatabaseBackend, DialectProfile, EscapeStyle, ExistsStyle, IdentitySyntax,
    KeyLimit, LikeEscape, MultiInsert, PaginationStyle, PlaceholderStyle, QuoteStyle,
};
use crate::types::{DataType, TypeSyntax};

pub static PROFILE: DialectProfile = DialectProfile {
    backend: DatabaseBackend::MySQL,
    quote: QuoteStyle::Backticks,
    escape: EscapeStyle::Backslash,
    string_prefix: "",
    like_escape: LikeEscape::Backslash,
    placeholder: PlaceholderStyle::Question,
    pagination: PaginationStyle::LimitComma,
    multi_insert: MultiInsert::ValuesList { max_rows: None },
    begin_transaction: "START TRANSACTION;",
    commit_transaction: "COMMIT;",
    bool_literals: ("TRUE", "FALSE"),
    bytes_literal: BytesLiteral::XQuoted,
    type_map: &[
        (DataType::Int, TypeSyntax::Plain("INT")),
        (DataType::Long, TypeSyntax::Plain("BIGINT")),
        (DataType::Decimal, TypeSyntax::LengthPrecision("DECIMAL")),
        (DataType::Double, TypeSyntax::LengthPrecision("DOUBLE")),
        (DataType::DateTime, TypeSyntax::Plain("DATETIME")),
        (DataType::Varchar, TypeSyntax::Length("VARCHAR")),
        (DataType::Nvarchar, TypeSyntax::Length("NVARCHAR")),
        (DataType::Blob, TypeSyntax::Plain("LONGBLOB")),
        (DataType::Boolean, TypeSyntax::Plain("TINYINT(1)")),
        (DataType::Guid, TypeSyntax::Plain("CHAR(36)")),
    ],
    type_aliases: &[
        ("INTEGER", DataType::Int),
        ("MEDIUMINT", DataType::Int),
        ("SMALLINT", DataType::Int),
        ("TINYINT", DataType::Boolean),
        ("BOOL", DataType::Boolean),
        ("BOOLEAN", DataType::Boolean),
        ("NUMERIC", DataType::Decimal),
        ("FLOAT", DataType::Double),
        ("REAL", DataType::Double),
        ("TIMESTAMP", DataType::DateTime),
        ("DATE", DataType::DateTime),
        ("CHAR", DataType::Varchar),
        ("TEXT", DataType::Varchar),
        ("MEDIUMTEXT", DataType::Varchar),
        ("LONGTEXT", DataType::Varchar),
        ("BLOB", DataType::Blob),
        ("MEDIUMBLOB", DataType::Blob),
        ("VARBINARY", DataType::Blob),
    ],
    primary_key_types: &[
        DataType::Int,
        DataType::Long,
        DataType::Decimal,
        DataType::DateTime,
        DataType::Varchar,
        DataType::Nvarchar,
        DataType::Guid,
    ],
    key_limit: Some(KeyLimit {
        // InnoDB DYNAMIC rows with utf8mb4
        max_bytes: 3072,
        varchar_bytes: 4,
        nvarchar_bytes: 4,
    }),
    identity: IdentitySyntax::Suffix("AUTO_INCREMENT PRIMARY KEY"),
    exists: ExistsStyle::Bare,
    truncate: "TRUNCATE TABLE",
    // Default max_allowed_packet
    max_statement_length: 67_108_864,
    max_params: Some(65_535),
    timestamp_format: "%Y-%m-%d %H:%M:%S%.6f",
    timestamp_offset_format: "%Y-%m-%d %H:%M:%S%.6f%:z",
};
