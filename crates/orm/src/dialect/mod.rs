//! Database dialects and their type and constraint vocabularies
//!
//! Column definitions use a dialect-neutral [`ColumnType`] and
//! [`ConstraintKind`]; the tables in this module translate them into the
//! keywords of each supported target.

pub mod constraints;
pub mod types;

pub use constraints::ConstraintKind;
pub use types::ColumnType;

use crate::error::{OrmError, OrmResult};

/// Supported database targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    MySql,
    PostgreSql,
    MongoDb,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::MySql, Dialect::PostgreSql, Dialect::MongoDb];

    /// Positional parameter placeholder (1-based)
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::PostgreSql => format!("${}", index),
            Dialect::MySql | Dialect::MongoDb => "?".to_string(),
        }
    }

    /// Whether the target accepts SQL statements
    pub fn is_sql(&self) -> bool {
        !matches!(self, Dialect::MongoDb)
    }

    /// Canonical lowercase key, as accepted by `DB_DRIVER`
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::PostgreSql => "postgresql",
            Dialect::MongoDb => "mongodb",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Dialect {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            "postgresql" | "postgres" => Ok(Dialect::PostgreSql),
            "mongodb" | "mongo" => Ok(Dialect::MongoDb),
            _ => Err(OrmError::configuration(format!(
                "unsupported database driver '{}', expected mysql, postgresql or mongodb",
                s
            ))),
        }
    }
}

/// Look up the native type name for an abstract type key
///
/// Keys are matched exactly; an unknown key is an `InvalidArgument` error.
pub fn type_name(dialect: Dialect, key: &str) -> OrmResult<&'static str> {
    let column_type: ColumnType = key.parse()?;
    Ok(column_type.native_name(dialect))
}

/// Look up the keyword for an abstract constraint key
pub fn constraint_keyword(dialect: Dialect, key: &str) -> OrmResult<&'static str> {
    let kind: ConstraintKind = key.parse()?;
    Ok(kind.keyword(dialect))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_parsing() {
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("mongodb".parse::<Dialect>().unwrap(), Dialect::MongoDb);
        assert!(matches!("sqlite".parse::<Dialect>(), Err(OrmError::Configuration(_))));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::MySql.placeholder(1), "?");
        assert_eq!(Dialect::PostgreSql.placeholder(1), "$1");
        assert_eq!(Dialect::PostgreSql.placeholder(3), "$3");
    }

    #[test]
    fn test_string_keyed_lookups() {
        assert_eq!(type_name(Dialect::MySql, "int32").unwrap(), "MEDIUMINT");
        assert_eq!(type_name(Dialect::PostgreSql, "float64").unwrap(), "DOUBLE PRECISION");
        assert_eq!(type_name(Dialect::MongoDb, "decimal").unwrap(), "decimal128");
        assert_eq!(constraint_keyword(Dialect::MongoDb, "auto_increment").unwrap(), "objectId");
        assert_eq!(constraint_keyword(Dialect::PostgreSql, "auto_increment").unwrap(), "SERIAL");
    }

    #[test]
    fn test_lookups_are_case_sensitive() {
        assert!(matches!(type_name(Dialect::MySql, "Int32"), Err(OrmError::InvalidArgument(_))));
        assert!(matches!(
            constraint_keyword(Dialect::MySql, "PRIMARY_KEY"),
            Err(OrmError::InvalidArgument(_))
        ));
        assert!(type_name(Dialect::MySql, "uuid").is_err());
    }
}
