//! Typed hydration
//!
//! A struct opts in by implementing [`Hydrate`], which returns an explicit
//! [`FieldMap`] binding column names to typed setters. Values that fail to
//! convert leave the field untouched and are reported as warnings.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::backends::DatabaseValue;
use crate::error::ConversionWarning;
use crate::model::record::Record;

/// Conversion from a scanned value into a Rust type
pub trait FromDatabaseValue: Sized {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String>;
}

fn mismatch<T>(expected: &str, value: &DatabaseValue) -> Result<T, String> {
    Err(format!("expected {}, found {}", expected, value.kind()))
}

macro_rules! integer_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromDatabaseValue for $ty {
                fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
                    let wide: i64 = match value {
                        DatabaseValue::Int32(i) => *i as i64,
                        DatabaseValue::Int64(i) => *i,
                        other => return mismatch("integer", other),
                    };
                    <$ty>::try_from(wide).map_err(|_| {
                        format!("{} is out of range for {}", wide, stringify!($ty))
                    })
                }
            }
        )*
    };
}

integer_conversions!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromDatabaseValue for f64 {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Float32(f) => Ok(*f as f64),
            DatabaseValue::Float64(f) => Ok(*f),
            DatabaseValue::Int32(i) => Ok(*i as f64),
            DatabaseValue::Int64(i) => Ok(*i as f64),
            // NUMERIC and DECIMAL columns arrive as text
            DatabaseValue::String(s) => s
                .parse()
                .map_err(|_| format!("'{}' is not a number", s)),
            other => mismatch("float", other),
        }
    }
}

impl FromDatabaseValue for f32 {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Float32(f) => Ok(*f),
            other => f64::from_database_value(other).map(|f| f as f32),
        }
    }
}

impl FromDatabaseValue for bool {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Bool(b) => Ok(*b),
            DatabaseValue::Int32(0) | DatabaseValue::Int64(0) => Ok(false),
            DatabaseValue::Int32(1) | DatabaseValue::Int64(1) => Ok(true),
            other => mismatch("bool", other),
        }
    }
}

impl FromDatabaseValue for String {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::String(s) => Ok(s.clone()),
            DatabaseValue::Uuid(u) => Ok(u.to_string()),
            other => mismatch("string", other),
        }
    }
}

impl FromDatabaseValue for Vec<u8> {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Bytes(b) => Ok(b.clone()),
            DatabaseValue::String(s) => Ok(s.clone().into_bytes()),
            other => mismatch("bytes", other),
        }
    }
}

impl FromDatabaseValue for Uuid {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Uuid(u) => Ok(*u),
            DatabaseValue::String(s) => Uuid::parse_str(s).map_err(|e| e.to_string()),
            DatabaseValue::Bytes(b) => Uuid::from_slice(b).map_err(|e| e.to_string()),
            other => mismatch("uuid", other),
        }
    }
}

impl FromDatabaseValue for DateTime<Utc> {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::DateTime(dt) => Ok(*dt),
            DatabaseValue::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| e.to_string()),
            other => mismatch("datetime", other),
        }
    }
}

impl FromDatabaseValue for NaiveDateTime {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        DateTime::<Utc>::from_database_value(value).map(|dt| dt.naive_utc())
    }
}

impl FromDatabaseValue for NaiveDate {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Date(d) => Ok(*d),
            DatabaseValue::DateTime(dt) => Ok(dt.date_naive()),
            other => mismatch("date", other),
        }
    }
}

impl FromDatabaseValue for NaiveTime {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Time(t) => Ok(*t),
            other => mismatch("time", other),
        }
    }
}

impl FromDatabaseValue for JsonValue {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        Ok(value.to_json())
    }
}

impl FromDatabaseValue for DatabaseValue {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl<T: FromDatabaseValue> FromDatabaseValue for Option<T> {
    fn from_database_value(value: &DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Null => Ok(None),
            other => T::from_database_value(other).map(Some),
        }
    }
}

type Setter<T> = Box<dyn Fn(&mut T, &DatabaseValue) -> Result<(), String> + Send + Sync>;

struct Binding<T> {
    column: String,
    apply: Setter<T>,
}

/// Explicit column to field bindings for `T`
pub struct FieldMap<T> {
    bindings: Vec<Binding<T>>,
}

impl<T> Default for FieldMap<T> {
    fn default() -> Self {
        Self { bindings: Vec::new() }
    }
}

impl<T> fmt::Debug for FieldMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMap").field("columns", &self.columns()).finish()
    }
}

impl<T> FieldMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `column` to a setter taking the converted value
    ///
    /// Binding the same column twice replaces the earlier setter.
    pub fn field<V, F>(mut self, column: &str, setter: F) -> Self
    where
        V: FromDatabaseValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.bindings.retain(|binding| binding.column != column);
        self.bindings.push(Binding {
            column: column.to_string(),
            apply: Box::new(move |target, value| {
                let converted = V::from_database_value(value)?;
                setter(target, converted);
                Ok(())
            }),
        });
        self
    }

    /// Bound column names in binding order
    pub fn columns(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.column.as_str()).collect()
    }

    pub fn is_bound(&self, column: &str) -> bool {
        self.bindings.iter().any(|b| b.column == column)
    }

    /// Apply every bound column present in `record` to `target`
    ///
    /// Unbound columns are skipped. A failed conversion leaves the field as
    /// it was and yields a warning; it never aborts the remaining columns.
    pub fn apply(&self, target: &mut T, record: &Record) -> Vec<ConversionWarning> {
        let mut warnings = Vec::new();

        for binding in &self.bindings {
            let Some(value) = record.get(&binding.column) else {
                continue;
            };
            if let Err(message) = (binding.apply)(target, value) {
                tracing::warn!(column = %binding.column, %message, "value left at default during hydration");
                warnings.push(ConversionWarning {
                    column: binding.column.clone(),
                    message,
                });
            }
        }

        warnings
    }
}

/// Structs that can be filled from a fetched row
pub trait Hydrate: Default + Send + 'static {
    fn field_map() -> FieldMap<Self>;
}

/// A hydrated struct plus the conversions that fell back to defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Hydrated<T> {
    pub model: T,
    pub warnings: Vec<ConversionWarning>,
}

impl<T> Hydrated<T> {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_inner(self) -> T {
        self.model
    }
}
