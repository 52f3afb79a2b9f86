//! Foreign keys and naming-convention inference

use std::fmt;
use std::str::FromStr;

use crate::error::OrmError;
use crate::naming::{to_snake_case, to_table_name};
use crate::schema::options::strip_prefix_ignore_case;

/// Action taken on dependent rows when the referenced row changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
    NoAction,
}

impl ReferentialAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for ReferentialAction {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', " ").replace('-', " ");
        match normalized.as_str() {
            "cascade" => Ok(ReferentialAction::Cascade),
            "set null" => Ok(ReferentialAction::SetNull),
            "set default" => Ok(ReferentialAction::SetDefault),
            "restrict" => Ok(ReferentialAction::Restrict),
            "no action" => Ok(ReferentialAction::NoAction),
            _ => Err(OrmError::invalid_argument(format!(
                "unknown referential action '{}'",
                s
            ))),
        }
    }
}

/// A reference from `column` to `table.references`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Owning column
    pub column: String,
    /// Referenced column
    pub references: String,
    /// Referenced table
    pub table: String,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

impl ForeignKey {
    /// Foreign key whose target is inferred from the column name
    pub fn new(column: &str) -> Self {
        foreign(column, Vec::<&str>::new())
    }

    /// Explicit target; `table` is normalized with [`to_table_name`]
    pub fn to(column: &str, table: &str, references: &str) -> Self {
        Self {
            column: to_snake_case(column),
            references: to_snake_case(references),
            table: to_table_name(table),
            on_delete: None,
            on_update: None,
        }
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Constraint name used in DDL
    pub fn constraint_name(&self, owning_table: &str) -> String {
        format!("fk_{}_{}", owning_table, self.column)
    }
}

/// Build a foreign key for `column`
///
/// Exactly four options are read positionally as reference column,
/// referenced table, on-delete and on-update (empty strings leave a slot
/// unset). Otherwise each option is matched against the `references:`,
/// `on:`, `ondelete:` and `onupdate:` prefixes. An explicit table goes through
/// [`to_table_name`], so `user` and `users` both target `users`. Whatever is
/// still missing is inferred from the column name: `department_id` references
/// `id` on `departments`, and a column without an underscore references `id`
/// on its pluralized name.
pub fn foreign<I, S>(column: &str, options: I) -> ForeignKey
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let column = to_snake_case(column);
    let options: Vec<S> = options.into_iter().collect();

    let mut references = None;
    let mut table = None;
    let mut on_delete = None;
    let mut on_update = None;

    if options.len() == 4 {
        let slot = |i: usize| Some(options[i].as_ref().trim()).filter(|v| !v.is_empty());
        references = slot(0).map(to_snake_case);
        table = slot(1).map(to_table_name);
        on_delete = slot(2).and_then(parse_action);
        on_update = slot(3).and_then(parse_action);
    } else {
        for option in &options {
            let option = option.as_ref().trim();
            if let Some(value) = strip_prefix_ignore_case(option, "references:") {
                references = Some(to_snake_case(value));
            } else if let Some(value) = strip_prefix_ignore_case(option, "on:") {
                table = Some(to_table_name(value));
            } else if let Some(value) = strip_prefix_ignore_case(option, "ondelete:") {
                on_delete = parse_action(value).or(on_delete);
            } else if let Some(value) = strip_prefix_ignore_case(option, "onupdate:") {
                on_update = parse_action(value).or(on_update);
            } else {
                tracing::warn!(column = %column, option = %option, "unrecognized foreign key option");
            }
        }
    }

    if table.is_none() || references.is_none() {
        let (inferred_table, inferred_reference) = infer_target(&column);
        table.get_or_insert(inferred_table);
        references.get_or_insert(inferred_reference);
    }

    ForeignKey {
        column,
        references: references.unwrap_or_default(),
        table: table.unwrap_or_default(),
        on_delete,
        on_update,
    }
}

/// `(table, column)` referenced by an owning column, by convention
pub fn infer_target(column: &str) -> (String, String) {
    let trimmed = column.trim_matches('_');
    match trimmed.rsplit_once('_') {
        Some((prefix, suffix)) => (to_table_name(prefix), suffix.to_string()),
        None => (to_table_name(trimmed), "id".to_string()),
    }
}

fn parse_action(value: &str) -> Option<ReferentialAction> {
    match value.parse() {
        Ok(action) => Some(action),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring referential action");
            None
        }
    }
}
