//! SQL Server (T-SQL) dialect profile
//!
//! Bracket-quoted identifiers, `N'...'` Unicode literals, `@pN`
//! parameters and `OFFSET ... FETCH` paging, which T-SQL only accepts
//! after an ORDER BY.

use super::{
    BytesLiteral, DatabaseBackend, DialectProfile, EscapeStyle, ExistsStyle, IdentitySyntax,
    KeyLimit, LikeEscape, MultiInsert, PaginationStyle, PlaceholderStyle, QuoteStyle,
};
use crate::types::{DataType, TypeSyntax};

pub static PROFILE: DialectProfile = DialectProfile {
    backend: DatabaseBackend::SqlServer,
    quote: QuoteStyle::Brackets,
    escape: EscapeStyle::Standard,
    string_prefix: "N",
    like_escape: LikeEscape::Brackets,
    placeholder: PlaceholderStyle::AtNumbered,
    pagination: PaginationStyle::OffsetFetch,
    // A single VALUES list is capped at 1000 row constructors
    multi_insert: MultiInsert::ValuesList {
        max_rows: Some(1000),
    },
    begin_transaction: "BEGIN TRANSACTION;",
    commit_transaction: "COMMIT TRANSACTION;",
    bool_literals: ("1", "0"),
    bytes_literal: BytesLiteral::ZeroX,
    type_map: &[
        (DataType::Int, TypeSyntax::Plain("INT")),
        (DataType::Long, TypeSyntax::Plain("BIGINT")),
        (DataType::Decimal, TypeSyntax::LengthPrecision("DECIMAL")),
        (DataType::Double, TypeSyntax::Plain("FLOAT")),
        (DataType::DateTime, TypeSyntax::Plain("DATETIME2")),
        (DataType::DateTimeOffset, TypeSyntax::Plain("DATETIMEOFFSET")),
        (DataType::Varchar, TypeSyntax::LengthOrMax("VARCHAR", 8000)),
        (DataType::Nvarchar, TypeSyntax::LengthOrMax("NVARCHAR", 4000)),
        (DataType::Blob, TypeSyntax::LengthOrMax("VARBINARY", 8000)),
        (DataType::Boolean, TypeSyntax::Plain("BIT")),
        (DataType::Guid, TypeSyntax::Plain("UNIQUEIDENTIFIER")),
    ],
    type_aliases: &[
        ("TINYINT", DataType::Boolean),
        ("SMALLINT", DataType::Int),
        ("NUMERIC", DataType::Decimal),
        ("MONEY", DataType::Decimal),
        ("REAL", DataType::Double),
        ("DATETIME", DataType::DateTime),
        ("SMALLDATETIME", DataType::DateTime),
        ("DATE", DataType::DateTime),
        ("CHAR", DataType::Varchar),
        ("TEXT", DataType::Varchar),
        ("NCHAR", DataType::Nvarchar),
        ("NTEXT", DataType::Nvarchar),
        ("BINARY", DataType::Blob),
        ("IMAGE", DataType::Blob),
    ],
    primary_key_types: &[
        DataType::Int,
        DataType::Long,
        DataType::Decimal,
        DataType::DateTime,
        DataType::DateTimeOffset,
        DataType::Varchar,
        DataType::Nvarchar,
        DataType::Guid,
    ],
    key_limit: Some(KeyLimit {
        max_bytes: 900,
        varchar_bytes: 1,
        nvarchar_bytes: 2,
    }),
    identity: IdentitySyntax::Suffix("IDENTITY(1,1) PRIMARY KEY"),
    exists: ExistsStyle::CaseWhen,
    truncate: "TRUNCATE TABLE",
    // 65,536 * network packet size of 4 KB
    max_statement_length: 268_435_456,
    max_params: Some(2100),
    timestamp_format: "%Y-%m-%dT%H:%M:%S%.3f",
    timestamp_offset_format: "%Y-%m-%dT%H:%M:%S%.3f%:z",
};
