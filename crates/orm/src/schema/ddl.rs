//! CREATE statements for SQL dialects
//!
//! Rendering is for inspection and bootstrapping fresh databases; nothing
//! here tracks which statements were already applied.

use crate::dialect::{ColumnType, ConstraintKind, Dialect};
use crate::error::{OrmError, OrmResult};
use crate::schema::column::Column;
use crate::schema::foreign_key::ForeignKey;
use crate::schema::table::Table;

impl Table {
    /// `CREATE TABLE` followed by index and comment statements
    pub fn to_create_sql(&self, dialect: Dialect) -> OrmResult<Vec<String>> {
        if !dialect.is_sql() {
            return Err(OrmError::invalid_argument(format!(
                "{} has no DDL; table '{}' cannot be rendered",
                dialect, self.name
            )));
        }

        let mut definitions: Vec<String> = self
            .columns
            .iter()
            .map(|column| column_definition(column, dialect))
            .collect();

        if !self.primary_keys.is_empty() {
            definitions.push(format!(
                "{} ({})",
                ConstraintKind::PrimaryKey.keyword(dialect),
                self.primary_keys.join(", ")
            ));
        }

        for foreign_key in self.all_foreign_keys() {
            definitions.push(foreign_key_definition(&self.name, foreign_key, dialect));
        }

        for (name, body) in &self.constraints {
            definitions.push(format!("CONSTRAINT {} {}", name, body));
        }

        let mut create = format!(
            "CREATE {}TABLE {} (\n    {}\n)",
            if self.temporary { "TEMPORARY " } else { "" },
            self.name,
            definitions.join(",\n    ")
        );
        if dialect == Dialect::MySql {
            create.push_str(&mysql_table_options(self));
        }
        create.push(';');

        let mut statements = vec![create];
        statements.extend(self.index_statements());
        if dialect == Dialect::PostgreSql {
            statements.extend(self.postgres_trailing_statements());
        }

        tracing::debug!(table = %self.name, %dialect, count = statements.len(), "rendered table DDL");
        Ok(statements)
    }

    fn index_statements(&self) -> Vec<String> {
        let column_indexes = self
            .columns
            .iter()
            .filter(|column| column.index && !column.primary_key && !column.unique)
            .map(|column| {
                format!(
                    "CREATE INDEX idx_{}_{} ON {} ({});",
                    self.name, column.name, self.name, column.name
                )
            });

        let declared = self.indexes.iter().map(|index| {
            format!(
                "CREATE {}INDEX {} ON {} ({});",
                if index.unique { "UNIQUE " } else { "" },
                index.name,
                self.name,
                index.columns.join(", ")
            )
        });

        column_indexes.chain(declared).collect()
    }

    fn postgres_trailing_statements(&self) -> Vec<String> {
        let mut statements = Vec::new();

        if let Some(comment) = &self.comment {
            statements.push(format!("COMMENT ON TABLE {} IS {};", self.name, quote(comment)));
        }
        for column in &self.columns {
            if let Some(comment) = &column.comment {
                statements.push(format!(
                    "COMMENT ON COLUMN {}.{} IS {};",
                    self.name,
                    column.name,
                    quote(comment)
                ));
            }
        }

        if let Some(start) = self.auto_increment_start {
            if let Some(serial) = self.columns.iter().find(|column| column.auto_increment) {
                statements.push(format!(
                    "ALTER SEQUENCE {}_{}_seq RESTART WITH {};",
                    self.name, serial.name, start
                ));
            }
        }

        statements
    }
}

fn column_definition(column: &Column, dialect: Dialect) -> String {
    let mut parts = vec![column.name.clone(), column_type_sql(column, dialect)];

    if let Some(expression) = &column.generated {
        parts.push(format!("GENERATED ALWAYS AS ({}) STORED", expression));
    }

    if !column.nullable {
        parts.push(ConstraintKind::NotNull.keyword(dialect).to_string());
    }

    if let Some(default) = &column.default {
        parts.push(format!(
            "{} {}",
            ConstraintKind::Default.keyword(dialect),
            render_default(default)
        ));
    }

    if dialect == Dialect::MySql {
        if let Some(on_update) = &column.on_update {
            parts.push(format!("{} {}", ConstraintKind::OnUpdate.keyword(dialect), on_update));
        }
        if column.auto_increment {
            parts.push(ConstraintKind::AutoIncrement.keyword(dialect).to_string());
        }
    }

    if column.unique && !column.primary_key {
        parts.push(ConstraintKind::Unique.keyword(dialect).to_string());
    }

    if let Some(check) = &column.check {
        parts.push(format!("{} ({})", ConstraintKind::Check.keyword(dialect), check));
    }

    if dialect == Dialect::PostgreSql && column.column_type == ColumnType::Enum {
        if let Some(values) = column.constraints.get("enum") {
            parts.push(format!(
                "{} ({} IN ({}))",
                ConstraintKind::Check.keyword(dialect),
                column.name,
                values
            ));
        }
    }

    if dialect == Dialect::MySql {
        if let Some(comment) = &column.comment {
            parts.push(format!("COMMENT {}", quote(comment)));
        }
    }

    parts.join(" ")
}

fn column_type_sql(column: &Column, dialect: Dialect) -> String {
    let ty = column.column_type;

    if dialect == Dialect::PostgreSql && column.auto_increment && ty.is_integer() {
        return match ty {
            ColumnType::Int8 | ColumnType::Int16 | ColumnType::UInt8 | ColumnType::UInt16 => {
                "SMALLSERIAL".to_string()
            }
            ColumnType::Int64 | ColumnType::UInt64 => "BIGSERIAL".to_string(),
            _ => ConstraintKind::AutoIncrement.keyword(dialect).to_string(),
        };
    }

    let native = ty.native_name(dialect);
    match ty {
        ColumnType::Enum if dialect == Dialect::MySql => match column.constraints.get("enum") {
            Some(values) => format!("{}({})", native, values),
            None => native.to_string(),
        },
        ColumnType::Enum => format!("{}({})", native, super::column::DEFAULT_LENGTH),
        ColumnType::Decimal => match (column.precision, column.scale) {
            (Some(precision), Some(scale)) => format!("{}({}, {})", native, precision, scale),
            (Some(precision), None) => format!("{}({})", native, precision),
            _ => native.to_string(),
        },
        ColumnType::Binary | ColumnType::VarBinary if dialect == Dialect::PostgreSql => {
            native.to_string()
        }
        _ if ty.is_sized() => match column.precision {
            Some(length) => format!("{}({})", native, length),
            None => native.to_string(),
        },
        _ => native.to_string(),
    }
}

fn foreign_key_definition(table: &str, foreign_key: &ForeignKey, dialect: Dialect) -> String {
    let mut definition = format!(
        "CONSTRAINT {} {} ({}) REFERENCES {} ({})",
        foreign_key.constraint_name(table),
        ConstraintKind::ForeignKey.keyword(dialect),
        foreign_key.column,
        foreign_key.table,
        foreign_key.references
    );
    if let Some(action) = foreign_key.on_delete {
        definition.push_str(&format!(" {} {}", ConstraintKind::OnDelete.keyword(dialect), action));
    }
    if let Some(action) = foreign_key.on_update {
        definition.push_str(&format!(" {} {}", ConstraintKind::OnUpdate.keyword(dialect), action));
    }
    definition
}

fn mysql_table_options(table: &Table) -> String {
    let mut options = String::new();
    if let Some(engine) = &table.engine {
        options.push_str(&format!(" ENGINE={}", engine));
    }
    if let Some(charset) = &table.charset {
        options.push_str(&format!(" DEFAULT CHARSET={}", charset));
    }
    if let Some(collation) = &table.collation {
        options.push_str(&format!(" COLLATE={}", collation));
    }
    if let Some(start) = table.auto_increment_start {
        options.push_str(&format!(" AUTO_INCREMENT={}", start));
    }
    if let Some(comment) = &table.comment {
        options.push_str(&format!(" COMMENT={}", quote(comment)));
    }
    options
}

/// Keywords, finite numbers and function calls stay bare, anything else is quoted
fn render_default(value: &str) -> String {
    let upper = value.to_ascii_uppercase();
    let is_keyword = matches!(
        upper.as_str(),
        "NULL" | "TRUE" | "FALSE" | "CURRENT_TIMESTAMP" | "CURRENT_DATE" | "CURRENT_TIME"
    );
    if is_keyword {
        upper
    } else if value.parse::<f64>().map_or(false, f64::is_finite) || value.ends_with(')') {
        value.to_string()
    } else {
        quote(value)
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::column::{
        big_increments, big_int, boolean, created_at, decimal, enumeration, string, uint32, updated_at,
    };

    fn posts() -> Table {
        let mut table = Table::new(
            "post",
            [
                big_increments(()),
                string("title", ["120", "not_null", "comment:Shown in lists"]),
                big_int("user_id", ["not_null"]),
                enumeration("status", &["draft", "published"], ["default:draft"]),
                boolean("pinned", ()),
                decimal("price", 8, 2, ()),
                string("slug", ["index"]),
                created_at(()),
                updated_at(()),
            ],
        );
        table
            .foreign("user_id", ["ondelete:cascade"])
            .engine("InnoDB")
            .charset("utf8mb4")
            .index(&["user_id", "status"], false, None);
        table
    }

    #[test]
    fn test_mysql_create_table() {
        let statements = posts().to_create_sql(Dialect::MySql).unwrap();
        let sql = &statements[0];

        assert!(sql.starts_with("CREATE TABLE posts ("));
        assert!(sql.contains("id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT"));
        assert!(sql.contains("title VARCHAR(120) NOT NULL COMMENT 'Shown in lists'"));
        assert!(sql.contains("status ENUM('draft', 'published') DEFAULT 'draft'"));
        assert!(sql.contains(
            "pinned BOOLEAN NOT NULL DEFAULT FALSE CHECK (pinned IN (TRUE, FALSE) AND pinned IS NOT NULL)"
        ));
        assert!(sql.contains("price DECIMAL(8, 2)"));
        assert!(sql.contains("created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP"));
        assert!(sql.contains("updated_at TIMESTAMP ON UPDATE CURRENT_TIMESTAMP"));
        assert!(sql.contains("PRIMARY KEY (id)"));
        assert!(sql.contains(
            "CONSTRAINT fk_posts_user_id FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE"
        ));
        assert!(sql.ends_with(") ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;"));

        assert!(statements.contains(&"CREATE INDEX idx_posts_slug ON posts (slug);".to_string()));
        assert!(statements.contains(&"CREATE INDEX idx_posts_user_id_status ON posts (user_id, status);".to_string()));
    }

    #[test]
    fn test_postgres_create_table() {
        let statements = posts().to_create_sql(Dialect::PostgreSql).unwrap();
        let sql = &statements[0];

        assert!(sql.contains("id BIGSERIAL NOT NULL"));
        assert!(!sql.contains("AUTO_INCREMENT"));
        assert!(sql.contains("status VARCHAR(255) DEFAULT 'draft' CHECK (status IN ('draft', 'published'))"));
        assert!(sql.contains("price NUMERIC(8, 2)"));
        assert!(sql.contains("updated_at TIMESTAMP,") || sql.contains("updated_at TIMESTAMP\n"));
        assert!(!sql.contains("ENGINE"));
        assert!(statements
            .contains(&"COMMENT ON COLUMN posts.title IS 'Shown in lists';".to_string()));
    }

    #[test]
    fn test_postgres_serial_widths() {
        let mut table = Table::new("counter", [uint32("id", ["auto_increment", "primary_key"])]);
        table.auto_increment_start(100);
        let statements = table.to_create_sql(Dialect::PostgreSql).unwrap();
        assert!(statements[0].contains("id SERIAL"));
        assert!(statements.contains(&"ALTER SEQUENCE counters_id_seq RESTART WITH 100;".to_string()));
    }

    #[test]
    fn test_mongodb_has_no_ddl() {
        let err = posts().to_create_sql(Dialect::MongoDb).unwrap_err();
        assert!(matches!(err, OrmError::InvalidArgument(_)));
    }

    #[test]
    fn test_render_default() {
        assert_eq!(render_default("false"), "FALSE");
        assert_eq!(render_default("42"), "42");
        assert_eq!(render_default("now()"), "now()");
        assert_eq!(render_default("it's"), "'it''s'");
    }

    #[test]
    fn test_non_finite_defaults_are_quoted() {
        assert_eq!(render_default("-2.5"), "-2.5");
        for value in ["NaN", "inf", "-infinity"] {
            assert_eq!(render_default(value), format!("'{}'", value));
        }
    }
}
