//! PostgreSQL dialect profile
//!
//! Double-quoted identifiers, dollar-quoted string literals, `$N`
//! parameters and `SERIAL`/`BIGSERIAL` identity columns.

use super::{
    BytesLiteral, DatabaseBackend, DialectProfile, EscapeStyle, ExistsStyle, IdentitySyntax,
    LikeEscape, MultiInsert, PaginationStyle, PlaceholderStyle, QuoteStyle,
};
use crate::types::{DataType, TypeSyntax};

pub static PROFILE: DialectProfile = DialectProfile {
    backend: DatabaseBackend::Postgres,
    quote: QuoteStyle::DoubleQuotes,
    escape: EscapeStyle::DollarQuoted,
    string_prefix: "",
    like_escape: LikeEscape::Backslash,
    placeholder: PlaceholderStyle::Dollar,
    pagination: PaginationStyle::OffsetLimit,
    multi_insert: MultiInsert::ValuesList { max_rows: None },
    begin_transaction: "BEGIN;",
    commit_transaction: "COMMIT;",
    bool_literals: ("TRUE", "FALSE"),
    bytes_literal: BytesLiteral::HexDecode,
    type_map: &[
        (DataType::Int, TypeSyntax::Plain("INTEGER")),
        (DataType::Long, TypeSyntax::Plain("BIGINT")),
        (DataType::Decimal, TypeSyntax::LengthPrecision("DECIMAL")),
        (DataType::Double, TypeSyntax::Plain("DOUBLE PRECISION")),
        (DataType::DateTime, TypeSyntax::Plain("TIMESTAMP")),
        (DataType::DateTimeOffset, TypeSyntax::Plain("TIMESTAMPTZ")),
        (DataType::Varchar, TypeSyntax::Length("VARCHAR")),
        (DataType::Nvarchar, TypeSyntax::Length("VARCHAR")),
        (DataType::Blob, TypeSyntax::Plain("BYTEA")),
        (DataType::Boolean, TypeSyntax::Plain("BOOLEAN")),
        (DataType::Guid, TypeSyntax::Plain("UUID")),
    ],
    type_aliases: &[
        ("INT", DataType::Int),
        ("INT4", DataType::Int),
        ("SMALLINT", DataType::Int),
        ("SERIAL", DataType::Int),
        ("INT8", DataType::Long),
        ("BIGSERIAL", DataType::Long),
        ("NUMERIC", DataType::Decimal),
        ("FLOAT8", DataType::Double),
        ("REAL", DataType::Double),
        ("TIMESTAMP WITHOUT TIME ZONE", DataType::DateTime),
        ("DATE", DataType::DateTime),
        ("TIMESTAMP WITH TIME ZONE", DataType::DateTimeOffset),
        ("CHARACTER VARYING", DataType::Varchar),
        ("TEXT", DataType::Varchar),
        ("BOOL", DataType::Boolean),
    ],
    primary_key_types: &[
        DataType::Int,
        DataType::Long,
        DataType::Decimal,
        DataType::DateTime,
        DataType::DateTimeOffset,
        DataType::Varchar,
        DataType::Nvarchar,
        DataType::Blob,
        DataType::Guid,
    ],
    key_limit: None,
    identity: IdentitySyntax::ReplaceType {
        int: "SERIAL",
        long: "BIGSERIAL",
        suffix: "PRIMARY KEY",
    },
    exists: ExistsStyle::Bare,
    truncate: "TRUNCATE TABLE",
    max_statement_length: 1_073_741_823,
    max_params: Some(65_535),
    timestamp_format: "%Y-%m-%d %H:%M:%S%.6f",
    timestamp_offset_format: "%Y-%m-%d %H:%M:%S%.6f%:z",
};
