//! Naming conventions
//!
//! Pure string transforms used to derive table names, convention-based
//! foreign-key targets and field names.

use once_cell::sync::Lazy;
use regex::Regex;

static REPEATED_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").expect("static regex"));

/// Words with a plural that no suffix rule produces, or that do not change.
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("mouse", "mice"),
    ("man", "men"),
    ("woman", "women"),
    ("ox", "oxen"),
    ("cactus", "cacti"),
    ("focus", "foci"),
    ("analysis", "analyses"),
    ("thesis", "theses"),
    ("crisis", "crises"),
    ("diagnosis", "diagnoses"),
    ("appendix", "appendices"),
    ("vertex", "vertices"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("axis", "axes"),
    ("basis", "bases"),
    ("fungus", "fungi"),
    ("radius", "radii"),
    ("alumnus", "alumni"),
    ("curriculum", "curricula"),
    ("datum", "data"),
    ("medium", "media"),
    ("forum", "fora"),
    ("bacterium", "bacteria"),
    ("syllabus", "syllabi"),
    ("criterion", "criteria"),
    ("aquarium", "aquaria"),
    ("stadium", "stadia"),
    ("stimulus", "stimuli"),
    ("die", "dice"),
    ("formula", "formulae"),
    ("genus", "genera"),
    ("bison", "bison"),
    ("deer", "deer"),
    ("sheep", "sheep"),
    ("salmon", "salmon"),
    ("aircraft", "aircraft"),
    ("series", "series"),
    ("species", "species"),
    ("fish", "fish"),
    ("trousers", "trousers"),
    ("scissors", "scissors"),
    ("clothes", "clothes"),
    ("news", "news"),
];

/// Convert an identifier to snake_case
///
/// An underscore is inserted before an ASCII uppercase letter when the
/// previous or the next character is ASCII lowercase, whitespace becomes an
/// underscore, runs of underscores collapse and the result is lowercased.
///
/// ```
/// use tessera_orm::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("GameNickname"), "game_nickname");
/// assert_eq!(to_snake_case("HTTPServer"), "http_server");
/// assert_eq!(to_snake_case("Game Nickname"), "game_nickname");
/// ```
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_whitespace() {
            out.push('_');
            continue;
        }

        if c.is_ascii_uppercase() && i > 0 {
            let prev_lower = chars[i - 1].is_ascii_lowercase();
            let next_lower = chars.get(i + 1).map_or(false, |n| n.is_ascii_lowercase());
            if prev_lower || next_lower {
                out.push('_');
            }
        }

        out.push(c);
    }

    let lowered = out.to_lowercase();
    REPEATED_UNDERSCORES.replace_all(&lowered, "_").into_owned()
}

/// Pluralize an English word
///
/// The irregular table is consulted first, against the last underscore
/// segment so that compounds like `sales_person` become `sales_people`.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let (prefix, last) = match word.rfind('_') {
        Some(pos) => word.split_at(pos + 1),
        None => ("", word),
    };

    if let Some((_, plural)) = IRREGULAR_PLURALS
        .iter()
        .find(|(singular, _)| singular.eq_ignore_ascii_case(last))
    {
        return format!("{}{}", prefix, plural);
    }

    format!("{}{}", prefix, apply_suffix_rules(last))
}

fn apply_suffix_rules(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        let after_vowel = stem
            .chars()
            .last()
            .map_or(false, |c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'));
        return if after_vowel || stem.is_empty() {
            format!("{}s", word)
        } else {
            format!("{}ies", stem)
        };
    }

    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{}es", word);
    }

    if let Some(stem) = word.strip_suffix('f') {
        return format!("{}ves", stem);
    }

    if let Some(stem) = word.strip_suffix("fe") {
        return format!("{}ves", stem);
    }

    format!("{}s", word)
}

/// Whether the last underscore segment of `word` already reads as a plural
///
/// Irregular plurals count, as does a trailing `s` that is not part of an
/// `ss`, `us` or `is` ending (`users`, `categories`, but not `bus`).
pub fn is_plural(word: &str) -> bool {
    let last = word.rsplit('_').next().unwrap_or(word);
    if IRREGULAR_PLURALS
        .iter()
        .any(|(_, plural)| plural.eq_ignore_ascii_case(last))
    {
        return true;
    }
    if IRREGULAR_PLURALS
        .iter()
        .any(|(singular, _)| singular.eq_ignore_ascii_case(last))
    {
        return false;
    }

    let lower = last.to_ascii_lowercase();
    lower.len() > 1
        && lower.ends_with('s')
        && !(lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is"))
}

/// Derive a table name from a model or table identifier
///
/// Names that are already plural are only snake_cased, so the result is
/// stable when fed back in.
///
/// ```
/// use tessera_orm::naming::to_table_name;
///
/// assert_eq!(to_table_name("UserProfile"), "user_profiles");
/// assert_eq!(to_table_name("user_profiles"), "user_profiles");
/// ```
pub fn to_table_name(name: &str) -> String {
    let snake = to_snake_case(name);
    if is_plural(&snake) {
        snake
    } else {
        pluralize(&snake)
    }
}
