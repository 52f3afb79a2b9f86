use super::Dialect;
use crate::error::OrmError;

/// Dialect-neutral column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Bool,
    Char,
    String,
    TinyText,
    Text,
    MediumText,
    LongText,
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,
    Json,
    Jsonb,
    Date,
    Time,
    DateTime,
    Timestamp,
    TimestampTz,
    Decimal,
    Enum,
    Binary,
    VarBinary,
}

impl ColumnType {
    pub const ALL: [ColumnType; 32] = [
        ColumnType::Int8,
        ColumnType::Int16,
        ColumnType::Int32,
        ColumnType::Int64,
        ColumnType::UInt8,
        ColumnType::UInt16,
        ColumnType::UInt32,
        ColumnType::UInt64,
        ColumnType::Float32,
        ColumnType::Float64,
        ColumnType::Bool,
        ColumnType::Char,
        ColumnType::String,
        ColumnType::TinyText,
        ColumnType::Text,
        ColumnType::MediumText,
        ColumnType::LongText,
        ColumnType::TinyBlob,
        ColumnType::Blob,
        ColumnType::MediumBlob,
        ColumnType::LongBlob,
        ColumnType::Json,
        ColumnType::Jsonb,
        ColumnType::Date,
        ColumnType::Time,
        ColumnType::DateTime,
        ColumnType::Timestamp,
        ColumnType::TimestampTz,
        ColumnType::Decimal,
        ColumnType::Enum,
        ColumnType::Binary,
        ColumnType::VarBinary,
    ];

    /// Abstract key of this type
    pub fn key(&self) -> &'static str {
        match self {
            ColumnType::Int8 => "int8",
            ColumnType::Int16 => "int16",
            ColumnType::Int32 => "int32",
            ColumnType::Int64 => "int64",
            ColumnType::UInt8 => "uint8",
            ColumnType::UInt16 => "uint16",
            ColumnType::UInt32 => "uint32",
            ColumnType::UInt64 => "uint64",
            ColumnType::Float32 => "float32",
            ColumnType::Float64 => "float64",
            ColumnType::Bool => "bool",
            ColumnType::Char => "char",
            ColumnType::String => "string",
            ColumnType::TinyText => "tinytext",
            ColumnType::Text => "text",
            ColumnType::MediumText => "mediumtext",
            ColumnType::LongText => "longtext",
            ColumnType::TinyBlob => "tinyblob",
            ColumnType::Blob => "blob",
            ColumnType::MediumBlob => "mediumblob",
            ColumnType::LongBlob => "longblob",
            ColumnType::Json => "json",
            ColumnType::Jsonb => "jsonb",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::DateTime => "datetime",
            ColumnType::Timestamp => "timestamp",
            ColumnType::TimestampTz => "timestamptz",
            ColumnType::Decimal => "decimal",
            ColumnType::Enum => "enum",
            ColumnType::Binary => "binary",
            ColumnType::VarBinary => "varbinary",
        }
    }

    /// Native type keyword for `dialect`
    ///
    /// The match is exhaustive, so every type has a translation for every
    /// dialect.
    pub fn native_name(&self, dialect: Dialect) -> &'static str {
        match dialect {
            Dialect::MySql => self.mysql_name(),
            Dialect::PostgreSql => self.postgres_name(),
            Dialect::MongoDb => self.mongodb_name(),
        }
    }

    fn mysql_name(&self) -> &'static str {
        match self {
            ColumnType::Binary => "BINARY",
            ColumnType::VarBinary => "VARBINARY",
            ColumnType::TinyBlob => "TINYBLOB",
            ColumnType::Blob => "BLOB",
            ColumnType::MediumBlob => "MEDIUMBLOB",
            ColumnType::LongBlob => "LONGBLOB",
            ColumnType::Char => "CHAR",
            ColumnType::String => "VARCHAR",
            ColumnType::Enum => "ENUM",
            ColumnType::TinyText => "TINYTEXT",
            ColumnType::Text => "TEXT",
            ColumnType::MediumText => "MEDIUMTEXT",
            ColumnType::LongText => "LONGTEXT",
            ColumnType::Json | ColumnType::Jsonb => "JSON",
            ColumnType::Int8 => "TINYINT",
            ColumnType::Int16 => "SMALLINT",
            ColumnType::Int32 => "MEDIUMINT",
            ColumnType::Int64 => "BIGINT",
            ColumnType::UInt8 => "TINYINT UNSIGNED",
            ColumnType::UInt16 => "SMALLINT UNSIGNED",
            ColumnType::UInt32 => "MEDIUMINT UNSIGNED",
            ColumnType::UInt64 => "BIGINT UNSIGNED",
            ColumnType::Float32 => "FLOAT",
            ColumnType::Float64 => "DOUBLE",
            ColumnType::Bool => "BOOLEAN",
            ColumnType::Time => "TIME",
            ColumnType::Date => "DATE",
            ColumnType::DateTime => "DATETIME",
            ColumnType::Timestamp | ColumnType::TimestampTz => "TIMESTAMP",
            ColumnType::Decimal => "DECIMAL",
        }
    }

    fn postgres_name(&self) -> &'static str {
        match self {
            ColumnType::Binary
            | ColumnType::VarBinary
            | ColumnType::TinyBlob
            | ColumnType::Blob
            | ColumnType::MediumBlob
            | ColumnType::LongBlob => "BYTEA",
            ColumnType::Char => "CHAR",
            ColumnType::String | ColumnType::Enum => "VARCHAR",
            ColumnType::TinyText | ColumnType::Text | ColumnType::MediumText | ColumnType::LongText => {
                "TEXT"
            }
            ColumnType::Json => "JSON",
            ColumnType::Jsonb => "JSONB",
            ColumnType::Int8 | ColumnType::Int16 | ColumnType::UInt8 | ColumnType::UInt16 => "SMALLINT",
            ColumnType::Int32 | ColumnType::UInt32 => "INTEGER",
            ColumnType::Int64 | ColumnType::UInt64 => "BIGINT",
            ColumnType::Float32 => "REAL",
            ColumnType::Float64 => "DOUBLE PRECISION",
            ColumnType::Bool => "BOOLEAN",
            ColumnType::Time => "TIME",
            ColumnType::Date => "DATE",
            ColumnType::DateTime | ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::TimestampTz => "TIMESTAMPTZ",
            ColumnType::Decimal => "NUMERIC",
        }
    }

    fn mongodb_name(&self) -> &'static str {
        match self {
            ColumnType::Binary
            | ColumnType::VarBinary
            | ColumnType::TinyBlob
            | ColumnType::Blob
            | ColumnType::MediumBlob
            | ColumnType::LongBlob => "binData",
            ColumnType::Char
            | ColumnType::String
            | ColumnType::Enum
            | ColumnType::TinyText
            | ColumnType::Text
            | ColumnType::MediumText
            | ColumnType::LongText => "string",
            ColumnType::Json | ColumnType::Jsonb => "object",
            ColumnType::Int8
            | ColumnType::Int16
            | ColumnType::Int32
            | ColumnType::UInt8
            | ColumnType::UInt16 => "int32",
            ColumnType::Int64 | ColumnType::UInt32 | ColumnType::UInt64 => "int64",
            ColumnType::Float32 | ColumnType::Float64 => "double",
            ColumnType::Bool => "bool",
            ColumnType::Time
            | ColumnType::Date
            | ColumnType::DateTime
            | ColumnType::Timestamp
            | ColumnType::TimestampTz => "date",
            ColumnType::Decimal => "decimal128",
        }
    }

    /// Types that carry a length or precision
    pub fn is_sized(&self) -> bool {
        matches!(
            self,
            ColumnType::Char
                | ColumnType::String
                | ColumnType::Decimal
                | ColumnType::Binary
                | ColumnType::VarBinary
        )
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnType::Int8
                | ColumnType::Int16
                | ColumnType::Int32
                | ColumnType::Int64
                | ColumnType::UInt8
                | ColumnType::UInt16
                | ColumnType::UInt32
                | ColumnType::UInt64
        )
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            ColumnType::UInt8 | ColumnType::UInt16 | ColumnType::UInt32 | ColumnType::UInt64
        )
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for ColumnType {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "varchar" {
            return Ok(ColumnType::String);
        }
        ColumnType::ALL
            .iter()
            .copied()
            .find(|ty| ty.key() == s)
            .ok_or_else(|| OrmError::invalid_argument(format!("unknown column type '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_a_keyword_per_dialect() {
        for ty in ColumnType::ALL {
            for dialect in Dialect::ALL {
                assert!(!ty.native_name(dialect).is_empty(), "{ty} has no {dialect} name");
            }
        }
    }

    #[test]
    fn test_keys_round_trip_through_from_str() {
        for ty in ColumnType::ALL {
            assert_eq!(ty.key().parse::<ColumnType>().unwrap(), ty);
        }
        assert_eq!("varchar".parse::<ColumnType>().unwrap(), ColumnType::String);
    }

    #[test]
    fn test_mysql_names() {
        assert_eq!(ColumnType::String.native_name(Dialect::MySql), "VARCHAR");
        assert_eq!(ColumnType::UInt64.native_name(Dialect::MySql), "BIGINT UNSIGNED");
        assert_eq!(ColumnType::Jsonb.native_name(Dialect::MySql), "JSON");
        assert_eq!(ColumnType::TimestampTz.native_name(Dialect::MySql), "TIMESTAMP");
    }

    #[test]
    fn test_postgres_names() {
        assert_eq!(ColumnType::LongBlob.native_name(Dialect::PostgreSql), "BYTEA");
        assert_eq!(ColumnType::Int8.native_name(Dialect::PostgreSql), "SMALLINT");
        assert_eq!(ColumnType::UInt32.native_name(Dialect::PostgreSql), "INTEGER");
        assert_eq!(ColumnType::Decimal.native_name(Dialect::PostgreSql), "NUMERIC");
        assert_eq!(ColumnType::Enum.native_name(Dialect::PostgreSql), "VARCHAR");
    }

    #[test]
    fn test_mongodb_names() {
        assert_eq!(ColumnType::UInt32.native_name(Dialect::MongoDb), "int64");
        assert_eq!(ColumnType::Jsonb.native_name(Dialect::MongoDb), "object");
        assert_eq!(ColumnType::TimestampTz.native_name(Dialect::MongoDb), "date");
    }

    #[test]
    fn test_sized_types() {
        assert!(ColumnType::String.is_sized());
        assert!(ColumnType::Decimal.is_sized());
        assert!(!ColumnType::Text.is_sized());
        assert!(ColumnType::UInt16.is_integer() && ColumnType::UInt16.is_unsigned());
    }
}
