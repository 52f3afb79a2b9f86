//! Column descriptors and their constructors
//!
//! Each constructor applies the defaults of its type and then the supplied
//! options, in order:
//!
//! ```
//! use tessera_orm::schema::column::string;
//!
//! let name = string("name", ["40", "not_null", "default:N/A"]);
//! assert_eq!(name.precision, Some(40));
//! assert!(!name.nullable);
//! assert_eq!(name.default.as_deref(), Some("N/A"));
//! ```

use std::collections::BTreeMap;

use crate::dialect::ColumnType;
use crate::naming::to_snake_case;
use crate::schema::foreign_key::ForeignKey;
use crate::schema::options::{ColumnOption, ColumnOptions};

/// Length used by sized string and binary columns when none is given
pub const DEFAULT_LENGTH: u32 = 255;

/// Column descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    /// Length for char/varchar/binary, precision for decimal
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub nullable: bool,
    pub auto_increment: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub index: bool,
    pub default: Option<String>,
    pub check: Option<String>,
    pub comment: Option<String>,
    /// Expression of a generated column
    pub generated: Option<String>,
    pub on_update: Option<String>,
    pub foreign_key: Option<ForeignKey>,
    /// Free-form constraints keyed by name
    pub constraints: BTreeMap<String, String>,
}

impl Column {
    /// Nullable column of `column_type` with no other flags set
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: to_snake_case(name),
            column_type,
            precision: None,
            scale: None,
            nullable: true,
            auto_increment: false,
            primary_key: false,
            unique: false,
            index: false,
            default: None,
            check: None,
            comment: None,
            generated: None,
            on_update: None,
            foreign_key: None,
            constraints: BTreeMap::new(),
        }
    }

    /// Apply further options on top of the current state
    pub fn options(mut self, options: impl Into<ColumnOptions>) -> Self {
        for option in options.into() {
            self.apply(option);
        }
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn index(mut self) -> Self {
        self.index = true;
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Mark as generated from `expression`
    pub fn generated(mut self, expression: impl Into<String>) -> Self {
        self.generated = Some(expression.into());
        self
    }

    pub fn references(mut self, table: &str, column: &str) -> Self {
        self.foreign_key = Some(ForeignKey::to(&self.name, table, column));
        self
    }

    pub fn constraint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.constraints.insert(key.into(), value.into());
        self
    }

    /// Length of a sized column
    pub fn length(&self) -> Option<u32> {
        self.precision
    }

    fn apply(&mut self, option: ColumnOption) {
        match option {
            ColumnOption::Length(length) => {
                if self.column_type.is_sized() {
                    self.precision = Some(length);
                } else {
                    tracing::warn!(
                        column = %self.name,
                        column_type = %self.column_type,
                        length,
                        "length ignored for unsized column type"
                    );
                }
            }
            ColumnOption::NotNull => self.nullable = false,
            ColumnOption::Nullable => self.nullable = true,
            ColumnOption::AutoIncrement => self.auto_increment = true,
            ColumnOption::PrimaryKey => self.primary_key = true,
            ColumnOption::Unique => self.unique = true,
            ColumnOption::Index => self.index = true,
            ColumnOption::Default(value) => self.default = Some(value),
            ColumnOption::Comment(value) => self.comment = Some(value),
            ColumnOption::Check(value) => self.check = Some(value),
            ColumnOption::OnUpdate(value) => self.on_update = Some(value),
            ColumnOption::References { table, column } => {
                self.foreign_key = Some(ForeignKey::to(&self.name, &table, &column));
            }
            ColumnOption::Custom { key, value } => {
                self.constraints.insert(key, value);
            }
        }
    }
}

fn build(name: &str, column_type: ColumnType, options: impl Into<ColumnOptions>) -> Column {
    Column::new(name, column_type).options(options)
}

fn sized(name: &str, column_type: ColumnType, options: impl Into<ColumnOptions>) -> Column {
    let mut column = Column::new(name, column_type);
    column.precision = Some(DEFAULT_LENGTH);
    column.options(options)
}

fn increments_column(column_type: ColumnType) -> Column {
    let mut column = Column::new("id", column_type);
    column.nullable = false;
    column.auto_increment = true;
    column.primary_key = true;
    column
}

macro_rules! typed_columns {
    ($($(#[$doc:meta])* $fn_name:ident => $ty:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $fn_name(name: &str, options: impl Into<ColumnOptions>) -> Column {
                build(name, ColumnType::$ty, options)
            }
        )*
    };
}

typed_columns! {
    int8 => Int8;
    int16 => Int16;
    int32 => Int32;
    int64 => Int64;
    uint8 => UInt8;
    uint16 => UInt16;
    uint32 => UInt32;
    uint64 => UInt64;
    float32 => Float32;
    float64 => Float64;
    time => Time;
    date => Date;
    date_time => DateTime;
    timestamp => Timestamp;
    timestamp_tz => TimestampTz;
    tiny_text => TinyText;
    text => Text;
    medium_text => MediumText;
    long_text => LongText;
    tiny_blob => TinyBlob;
    blob => Blob;
    medium_blob => MediumBlob;
    long_blob => LongBlob;
    /// Alias of [`long_blob`]
    bytea => LongBlob;
    json => Json;
    jsonb => Jsonb;
}

/// Alias of [`int8`]
pub fn tiny_int(name: &str, options: impl Into<ColumnOptions>) -> Column {
    int8(name, options)
}

/// Alias of [`int16`]
pub fn small_int(name: &str, options: impl Into<ColumnOptions>) -> Column {
    int16(name, options)
}

/// Alias of [`int32`]
pub fn integer(name: &str, options: impl Into<ColumnOptions>) -> Column {
    int32(name, options)
}

/// Alias of [`int64`]
pub fn big_int(name: &str, options: impl Into<ColumnOptions>) -> Column {
    int64(name, options)
}

pub fn unsigned_tiny_int(name: &str, options: impl Into<ColumnOptions>) -> Column {
    uint8(name, options)
}

pub fn unsigned_small_int(name: &str, options: impl Into<ColumnOptions>) -> Column {
    uint16(name, options)
}

pub fn unsigned_integer(name: &str, options: impl Into<ColumnOptions>) -> Column {
    uint32(name, options)
}

pub fn unsigned_big_int(name: &str, options: impl Into<ColumnOptions>) -> Column {
    uint64(name, options)
}

/// `VARCHAR`, 255 characters unless the first option is a length
pub fn string(name: &str, options: impl Into<ColumnOptions>) -> Column {
    sized(name, ColumnType::String, options)
}

pub fn char(name: &str, options: impl Into<ColumnOptions>) -> Column {
    sized(name, ColumnType::Char, options)
}

pub fn binary(name: &str, options: impl Into<ColumnOptions>) -> Column {
    sized(name, ColumnType::Binary, options)
}

pub fn var_binary(name: &str, options: impl Into<ColumnOptions>) -> Column {
    sized(name, ColumnType::VarBinary, options)
}

pub fn decimal(name: &str, precision: u32, scale: u32, options: impl Into<ColumnOptions>) -> Column {
    let mut column = Column::new(name, ColumnType::Decimal);
    column.precision = Some(precision);
    column.scale = Some(scale);
    column.options(options)
}

/// Not-null boolean defaulting to `false`
///
/// A `CHECK (<name> IN (TRUE, FALSE))` is synthesized and tightened with
/// `AND <name> IS NOT NULL` while the column stays not-nullable. A check
/// passed in the options is kept as given.
pub fn boolean(name: &str, options: impl Into<ColumnOptions>) -> Column {
    let mut column = Column::new(name, ColumnType::Bool);
    column.nullable = false;
    column.default = Some("false".to_string());
    let synthesized = format!("{} IN (TRUE, FALSE)", column.name);
    column.check = Some(synthesized.clone());

    let mut column = column.options(options);
    if !column.nullable && column.check.as_deref() == Some(synthesized.as_str()) {
        column.check = Some(format!("{} AND {} IS NOT NULL", synthesized, column.name));
    }
    column
}

/// Enumerated string column
///
/// The quoted value list is stored under the `enum` custom constraint, e.g.
/// `'draft', 'published'`.
pub fn enumeration(name: &str, values: &[&str], options: impl Into<ColumnOptions>) -> Column {
    let quoted = values
        .iter()
        .map(|value| format!("'{}'", value.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ");
    Column::new(name, ColumnType::Enum)
        .constraint("enum", quoted)
        .options(options)
}

/// `created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP`
pub fn created_at(options: impl Into<ColumnOptions>) -> Column {
    let mut column = Column::new("created_at", ColumnType::Timestamp);
    column.nullable = false;
    column.default = Some("CURRENT_TIMESTAMP".to_string());
    column.options(options)
}

/// Nullable `updated_at`, refreshed on every update
pub fn updated_at(options: impl Into<ColumnOptions>) -> Column {
    let mut column = Column::new("updated_at", ColumnType::Timestamp);
    column.on_update = Some("CURRENT_TIMESTAMP".to_string());
    column.options(options)
}

/// Nullable, indexed soft-delete marker
pub fn deleted_at(options: impl Into<ColumnOptions>) -> Column {
    Column::new("deleted_at", ColumnType::Timestamp)
        .index()
        .options(options)
}

/// Unsigned 8-bit auto-increment primary key named `id`
pub fn tiny_increments(options: impl Into<ColumnOptions>) -> Column {
    increments_column(ColumnType::UInt8).options(options)
}

/// Unsigned 16-bit auto-increment primary key named `id`
pub fn small_increments(options: impl Into<ColumnOptions>) -> Column {
    increments_column(ColumnType::UInt16).options(options)
}

/// Unsigned 32-bit auto-increment primary key named `id`
pub fn increments(options: impl Into<ColumnOptions>) -> Column {
    increments_column(ColumnType::UInt32).options(options)
}

/// Unsigned 64-bit auto-increment primary key named `id`
pub fn big_increments(options: impl Into<ColumnOptions>) -> Column {
    increments_column(ColumnType::UInt64).options(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_with_length_and_options() {
        let column = string("name", ["40", "not_null", "default:N/A"]);
        assert_eq!(column.column_type, ColumnType::String);
        assert_eq!(column.length(), Some(40));
        assert!(!column.nullable);
        assert_eq!(column.default.as_deref(), Some("N/A"));
    }

    #[test]
    fn test_sized_defaults_to_255() {
        assert_eq!(string("email", ()).length(), Some(DEFAULT_LENGTH));
        assert_eq!(char("code", ["unique"]).length(), Some(DEFAULT_LENGTH));
        assert_eq!(var_binary("digest", ["64"]).length(), Some(64));
    }

    #[test]
    fn test_length_ignored_for_unsized_types() {
        let column = int32("age", ["10", "not_null"]);
        assert_eq!(column.precision, None);
        assert!(!column.nullable);
    }

    #[test]
    fn test_names_are_snake_cased() {
        assert_eq!(string("GameNickname", ()).name, "game_nickname");
    }

    #[test]
    fn test_defaults_to_nullable() {
        let column = text("bio", ());
        assert!(column.nullable);
        assert!(!column.primary_key);
        assert!(column.constraints.is_empty());
    }

    #[test]
    fn test_increments_family() {
        let id = big_increments(());
        assert_eq!(id.name, "id");
        assert_eq!(id.column_type, ColumnType::UInt64);
        assert!(id.auto_increment && id.primary_key && !id.nullable);
        assert_eq!(increments(()).column_type, ColumnType::UInt32);
        assert_eq!(small_increments(()).column_type, ColumnType::UInt16);
        assert_eq!(tiny_increments(()).column_type, ColumnType::UInt8);
    }

    #[test]
    fn test_boolean_check() {
        let active = boolean("active", ());
        assert!(!active.nullable);
        assert_eq!(active.default.as_deref(), Some("false"));
        assert_eq!(
            active.check.as_deref(),
            Some("active IN (TRUE, FALSE) AND active IS NOT NULL")
        );

        let flag = boolean("flag", ["nullable"]);
        assert_eq!(flag.check.as_deref(), Some("flag IN (TRUE, FALSE)"));

        let custom = boolean("flag", ["check:flag = TRUE"]);
        assert_eq!(custom.check.as_deref(), Some("flag = TRUE"));
    }

    #[test]
    fn test_enumeration_stores_quoted_values() {
        let status = enumeration("status", &["draft", "it's live"], ["default:draft"]);
        assert_eq!(status.column_type, ColumnType::Enum);
        assert_eq!(status.constraints["enum"], "'draft', 'it''s live'");
        assert_eq!(status.default.as_deref(), Some("draft"));
    }

    #[test]
    fn test_decimal_precision_and_scale() {
        let price = decimal("price", 10, 2, ["not_null"]);
        assert_eq!(price.precision, Some(10));
        assert_eq!(price.scale, Some(2));
        assert!(!price.nullable);
    }

    #[test]
    fn test_timestamps() {
        let created = created_at(());
        assert!(!created.nullable);
        assert_eq!(created.default.as_deref(), Some("CURRENT_TIMESTAMP"));

        let updated = updated_at(());
        assert!(updated.nullable);
        assert_eq!(updated.on_update.as_deref(), Some("CURRENT_TIMESTAMP"));

        let deleted = deleted_at(());
        assert!(deleted.nullable && deleted.index);
    }

    #[test]
    fn test_fixed_name_constructors_take_options() {
        let created = created_at(["comment:row creation", "default:2000-01-01 00:00:00"]);
        assert_eq!(created.comment.as_deref(), Some("row creation"));
        assert_eq!(created.default.as_deref(), Some("2000-01-01 00:00:00"));
        assert!(!created.nullable);

        let updated = updated_at(["not_null"]);
        assert!(!updated.nullable);
        assert_eq!(updated.on_update.as_deref(), Some("CURRENT_TIMESTAMP"));

        assert!(!deleted_at(["not_null"]).nullable);

        let id = increments(ColumnOptions::new().comment("surrogate key"));
        assert_eq!(id.comment.as_deref(), Some("surrogate key"));
        assert!(id.primary_key && id.auto_increment);
    }

    #[test]
    fn test_fk_and_custom_options() {
        let column = big_int("department_id", ["fk:departments(id)", "charset:ascii"]);
        let fk = column.foreign_key.expect("column-level foreign key");
        assert_eq!(fk.table, "departments");
        assert_eq!(fk.references, "id");
        assert_eq!(fk.column, "department_id");
        assert_eq!(column.constraints.get("charset").map(String::as_str), Some("ascii"));
    }

    #[test]
    fn test_bytea_is_long_blob() {
        assert_eq!(bytea("payload", ()).column_type, ColumnType::LongBlob);
    }
}
