//! Schema definition
//!
//! Columns are built with the constructors in [`column`], grouped into
//! [`Table`]s, collected in a [`Schema`] and finally published through a
//! [`SchemaRegistry`].

pub mod column;
pub mod ddl;
pub mod definition;
pub mod foreign_key;
pub mod options;
pub mod registry;
pub mod table;

pub use column::Column;
pub use definition::Schema;
pub use foreign_key::{foreign, ForeignKey, ReferentialAction};
pub use options::{ColumnOption, ColumnOptions};
pub use registry::{SchemaRegistry, TableBuilder};
pub use table::{Index, Table};
