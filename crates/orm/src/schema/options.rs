//! Column options
//!
//! Options can be built with the typed [`ColumnOptions`] builder or parsed
//! from the flat token list used by table definitions:
//!
//! | token | effect |
//! |---|---|
//! | `not_null`, `nullable` | nullability |
//! | `auto_increment`, `serial` | auto-increment |
//! | `primary_key`, `unique`, `index` | key flags |
//! | `default:<v>`, `comment:<v>`, `check:<expr>`, `onupdate:<expr>` | optional fields |
//! | `fk:<table>(<column>)` | column-level foreign key |
//! | `<key>:<value>` | custom constraint |
//! | leading positive integer | length of sized types |
//!
//! Bare tokens are compared after snake_case normalization, prefixes
//! case-insensitively. Anything else is reported with `tracing::warn!` and
//! kept in [`ColumnOptions::unrecognized`].

use crate::naming::to_snake_case;

/// A single typed column option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOption {
    Length(u32),
    NotNull,
    Nullable,
    AutoIncrement,
    PrimaryKey,
    Unique,
    Index,
    Default(String),
    Comment(String),
    Check(String),
    OnUpdate(String),
    References { table: String, column: String },
    Custom { key: String, value: String },
}

/// Ordered set of options applied to a column after its type defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOptions {
    options: Vec<ColumnOption>,
    unrecognized: Vec<String>,
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the token DSL
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Self::new();

        for (position, token) in tokens.into_iter().enumerate() {
            let token = token.as_ref().trim();

            if position == 0 {
                if let Some(length) = parse_length(token) {
                    parsed.options.push(ColumnOption::Length(length));
                    continue;
                }
            }

            match parse_token(token) {
                Some(option) => parsed.options.push(option),
                None => {
                    tracing::warn!(token = %token, "unrecognized column option");
                    parsed.unrecognized.push(token.to_string());
                }
            }
        }

        parsed
    }

    pub fn push(&mut self, option: ColumnOption) {
        self.options.push(option);
    }

    pub fn with(mut self, option: ColumnOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn length(self, length: u32) -> Self {
        self.with(ColumnOption::Length(length))
    }

    pub fn not_null(self) -> Self {
        self.with(ColumnOption::NotNull)
    }

    pub fn nullable(self) -> Self {
        self.with(ColumnOption::Nullable)
    }

    pub fn auto_increment(self) -> Self {
        self.with(ColumnOption::AutoIncrement)
    }

    pub fn primary_key(self) -> Self {
        self.with(ColumnOption::PrimaryKey)
    }

    pub fn unique(self) -> Self {
        self.with(ColumnOption::Unique)
    }

    pub fn index(self) -> Self {
        self.with(ColumnOption::Index)
    }

    pub fn default_value(self, value: impl Into<String>) -> Self {
        self.with(ColumnOption::Default(value.into()))
    }

    pub fn comment(self, comment: impl Into<String>) -> Self {
        self.with(ColumnOption::Comment(comment.into()))
    }

    pub fn check(self, expression: impl Into<String>) -> Self {
        self.with(ColumnOption::Check(expression.into()))
    }

    pub fn on_update(self, expression: impl Into<String>) -> Self {
        self.with(ColumnOption::OnUpdate(expression.into()))
    }

    pub fn references(self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.with(ColumnOption::References {
            table: table.into(),
            column: column.into(),
        })
    }

    pub fn custom(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(ColumnOption::Custom {
            key: key.into(),
            value: value.into(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnOption> {
        self.options.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Tokens that matched no pattern
    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }
}

impl IntoIterator for ColumnOptions {
    type Item = ColumnOption;
    type IntoIter = std::vec::IntoIter<ColumnOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.into_iter()
    }
}

impl From<()> for ColumnOptions {
    fn from(_: ()) -> Self {
        Self::new()
    }
}

impl From<ColumnOption> for ColumnOptions {
    fn from(option: ColumnOption) -> Self {
        Self::new().with(option)
    }
}

impl From<Vec<ColumnOption>> for ColumnOptions {
    fn from(options: Vec<ColumnOption>) -> Self {
        Self {
            options,
            unrecognized: Vec::new(),
        }
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for ColumnOptions {
    fn from(tokens: [&'a str; N]) -> Self {
        Self::from_tokens(tokens)
    }
}

impl<'a> From<&[&'a str]> for ColumnOptions {
    fn from(tokens: &[&'a str]) -> Self {
        Self::from_tokens(tokens)
    }
}

impl<'a> From<Vec<&'a str>> for ColumnOptions {
    fn from(tokens: Vec<&'a str>) -> Self {
        Self::from_tokens(tokens)
    }
}

impl From<Vec<String>> for ColumnOptions {
    fn from(tokens: Vec<String>) -> Self {
        Self::from_tokens(tokens)
    }
}

fn parse_length(token: &str) -> Option<u32> {
    token.parse::<u32>().ok().filter(|length| *length > 0)
}

fn parse_token(token: &str) -> Option<ColumnOption> {
    match to_snake_case(token).as_str() {
        "not_null" => return Some(ColumnOption::NotNull),
        "nullable" => return Some(ColumnOption::Nullable),
        "auto_increment" | "serial" => return Some(ColumnOption::AutoIncrement),
        "primary_key" => return Some(ColumnOption::PrimaryKey),
        "unique" => return Some(ColumnOption::Unique),
        "index" => return Some(ColumnOption::Index),
        _ => {}
    }

    if let Some(value) = strip_prefix_ignore_case(token, "default:") {
        return Some(ColumnOption::Default(value.to_string()));
    }
    if let Some(value) = strip_prefix_ignore_case(token, "comment:") {
        return Some(ColumnOption::Comment(value.to_string()));
    }
    if let Some(value) = strip_prefix_ignore_case(token, "check:") {
        return Some(ColumnOption::Check(value.to_string()));
    }
    if let Some(value) = strip_prefix_ignore_case(token, "onupdate:") {
        return Some(ColumnOption::OnUpdate(value.to_string()));
    }
    if let Some(value) = strip_prefix_ignore_case(token, "fk:") {
        return parse_reference(value);
    }

    let (key, value) = token.split_once(':')?;
    if key.is_empty() {
        return None;
    }
    Some(ColumnOption::Custom {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// `table(column)`
fn parse_reference(value: &str) -> Option<ColumnOption> {
    let (table, rest) = value.split_once('(')?;
    let column = rest.strip_suffix(')')?;
    if table.trim().is_empty() || column.trim().is_empty() {
        return None;
    }
    Some(ColumnOption::References {
        table: table.trim().to_string(),
        column: column.trim().to_string(),
    })
}

/// Strip `prefix` regardless of case; an empty remainder does not match
pub(crate) fn strip_prefix_ignore_case<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    if token.len() <= prefix.len() || !token.is_char_boundary(prefix.len()) {
        return None;
    }
    let (head, tail) = token.split_at(prefix.len());
    head.eq_ignore_ascii_case(prefix).then_some(tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &[&str]) -> Vec<ColumnOption> {
        ColumnOptions::from(tokens).into_iter().collect()
    }

    #[test]
    fn test_bare_tokens() {
        assert_eq!(
            parse(&["not_null", "Unique", "PrimaryKey", "serial", "INDEX", "nullable"]),
            vec![
                ColumnOption::NotNull,
                ColumnOption::Unique,
                ColumnOption::PrimaryKey,
                ColumnOption::AutoIncrement,
                ColumnOption::Index,
                ColumnOption::Nullable,
            ]
        );
    }

    #[test]
    fn test_prefixed_tokens() {
        assert_eq!(
            parse(&["default:N/A", "COMMENT:shown name", "check:age > 0", "OnUpdate:CURRENT_TIMESTAMP"]),
            vec![
                ColumnOption::Default("N/A".to_string()),
                ColumnOption::Comment("shown name".to_string()),
                ColumnOption::Check("age > 0".to_string()),
                ColumnOption::OnUpdate("CURRENT_TIMESTAMP".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_value_keeps_colons() {
        assert_eq!(
            parse(&["default:12:00:00"]),
            vec![ColumnOption::Default("12:00:00".to_string())]
        );
    }

    #[test]
    fn test_foreign_reference_token() {
        assert_eq!(
            parse(&["fk:departments(id)"]),
            vec![ColumnOption::References {
                table: "departments".to_string(),
                column: "id".to_string(),
            }]
        );

        let options = ColumnOptions::from(["fk:departments", "fk:(id)"]);
        assert!(options.is_empty());
        assert_eq!(options.unrecognized(), ["fk:departments", "fk:(id)"]);
    }

    #[test]
    fn test_custom_and_unrecognized_tokens() {
        let options = ColumnOptions::from(["charset:utf8mb4", "whatever", "default:"]);
        let parsed: Vec<_> = options.iter().cloned().collect();
        assert_eq!(
            parsed,
            vec![
                ColumnOption::Custom {
                    key: "charset".to_string(),
                    value: "utf8mb4".to_string(),
                },
                ColumnOption::Custom {
                    key: "default".to_string(),
                    value: String::new(),
                },
            ]
        );
        assert_eq!(options.unrecognized(), ["whatever"]);
    }

    #[test]
    fn test_leading_length() {
        assert_eq!(parse(&["40", "unique"]), vec![ColumnOption::Length(40), ColumnOption::Unique]);
        // only the first token may be a length
        assert!(ColumnOptions::from(["unique", "40"]).unrecognized().contains(&"40".to_string()));
        // zero is not a length
        assert!(ColumnOptions::from(["0"]).unrecognized().contains(&"0".to_string()));
    }

    #[test]
    fn test_typed_builder_matches_tokens() {
        let typed = ColumnOptions::new().length(40).not_null().default_value("N/A");
        let tokens = ColumnOptions::from(["40", "not_null", "default:N/A"]);
        assert_eq!(typed, tokens);
    }
}
