use super::Dialect;
use crate::error::OrmError;

/// Dialect-neutral constraint names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    NotNull,
    AutoIncrement,
    Check,
    Default,
    Index,
    ForeignKey,
    OnDelete,
    OnUpdate,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 10] = [
        ConstraintKind::PrimaryKey,
        ConstraintKind::Unique,
        ConstraintKind::NotNull,
        ConstraintKind::AutoIncrement,
        ConstraintKind::Check,
        ConstraintKind::Default,
        ConstraintKind::Index,
        ConstraintKind::ForeignKey,
        ConstraintKind::OnDelete,
        ConstraintKind::OnUpdate,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "primary_key",
            ConstraintKind::Unique => "unique",
            ConstraintKind::NotNull => "not_null",
            ConstraintKind::AutoIncrement => "auto_increment",
            ConstraintKind::Check => "check",
            ConstraintKind::Default => "default",
            ConstraintKind::Index => "index",
            ConstraintKind::ForeignKey => "foreign_key",
            ConstraintKind::OnDelete => "on_delete",
            ConstraintKind::OnUpdate => "on_update",
        }
    }

    /// Keyword used by `dialect`
    ///
    /// MongoDB entries name the document-store mechanism that plays the same
    /// role (`auto_increment` is ObjectId generation, `foreign_key` is a
    /// `$lookup`), not a literal clause.
    pub fn keyword(&self, dialect: Dialect) -> &'static str {
        match (dialect, self) {
            (Dialect::MongoDb, ConstraintKind::PrimaryKey) => "_id",
            (Dialect::MongoDb, ConstraintKind::Unique) => "unique",
            (Dialect::MongoDb, ConstraintKind::NotNull) => "required",
            (Dialect::MongoDb, ConstraintKind::AutoIncrement) => "objectId",
            (Dialect::MongoDb, ConstraintKind::Check) => "expr",
            (Dialect::MongoDb, ConstraintKind::Default) => "default",
            (Dialect::MongoDb, ConstraintKind::Index) => "index",
            (Dialect::MongoDb, ConstraintKind::ForeignKey) => "lookup",
            (Dialect::MongoDb, ConstraintKind::OnDelete) => "cascade",
            (Dialect::MongoDb, ConstraintKind::OnUpdate) => "manual",

            (Dialect::PostgreSql, ConstraintKind::AutoIncrement) => "SERIAL",
            (Dialect::MySql, ConstraintKind::AutoIncrement) => "AUTO_INCREMENT",

            (_, ConstraintKind::PrimaryKey) => "PRIMARY KEY",
            (_, ConstraintKind::Unique) => "UNIQUE",
            (_, ConstraintKind::NotNull) => "NOT NULL",
            (_, ConstraintKind::Check) => "CHECK",
            (_, ConstraintKind::Default) => "DEFAULT",
            (_, ConstraintKind::Index) => "INDEX",
            (_, ConstraintKind::ForeignKey) => "FOREIGN KEY",
            (_, ConstraintKind::OnDelete) => "ON DELETE",
            (_, ConstraintKind::OnUpdate) => "ON UPDATE",
        }
    }
}

impl std::str::FromStr for ConstraintKind {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConstraintKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| OrmError::invalid_argument(format!("unknown constraint '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_keywords_match_between_dialects() {
        for kind in ConstraintKind::ALL {
            if kind == ConstraintKind::AutoIncrement {
                continue;
            }
            assert_eq!(kind.keyword(Dialect::MySql), kind.keyword(Dialect::PostgreSql));
        }
        assert_eq!(ConstraintKind::AutoIncrement.keyword(Dialect::MySql), "AUTO_INCREMENT");
    }

    #[test]
    fn test_mongodb_keywords() {
        assert_eq!(ConstraintKind::PrimaryKey.keyword(Dialect::MongoDb), "_id");
        assert_eq!(ConstraintKind::NotNull.keyword(Dialect::MongoDb), "required");
        assert_eq!(ConstraintKind::ForeignKey.keyword(Dialect::MongoDb), "lookup");
    }
}
