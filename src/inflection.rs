//! Shared string inflection utilities.
//!
//! Provides pluralization, singularization and identifier casing for alias
//! generation and logical field names. Uses the `inflector` crate with
//! additional handling for common irregular plurals that appear in database
//! schemas.

use inflector::Inflector;

/// Known irregular plurals that inflector doesn't handle well for database contexts.
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("half", "halves"),
    ("potato", "potatoes"),
    ("hero", "heroes"),
    ("analysis", "analyses"),
    ("basis", "bases"),
    ("crisis", "crises"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
];

/// Suffixes marking a column as holding a key, longest first.
static ID_SUFFIXES: &[&str] = &["_ids", "_id", "Ids", "IDs", "Id", "ID"];

/// Pluralize a word, handling irregulars first then falling back to inflector.
///
/// # Examples
/// ```ignore
/// assert_eq!(pluralize("customer"), "customers");
/// assert_eq!(pluralize("person"), "people");
/// ```
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();

    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *singular || lower == *plural {
            return plural.to_string();
        }
    }

    word.to_plural()
}

/// Singularize a word, handling irregulars first then falling back to inflector.
///
/// # Examples
/// ```ignore
/// assert_eq!(singularize("persons"), "person");
/// assert_eq!(singularize("people"), "person");
/// ```
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();

    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *plural || lower == *singular {
            return singular.to_string();
        }
    }

    word.to_singular()
}

/// Plural form of an entity name, whatever number the name is in.
pub fn plural_of(name: &str) -> String {
    pluralize(&singularize(name))
}

/// camelCase form of an identifier.
pub fn camelize(identifier: &str) -> String {
    identifier.to_camel_case()
}

/// Strip a trailing key marker (`_id`, `Id`, `_ids`, ...) from an identifier.
///
/// Returns `None` if the identifier carries no such suffix or nothing is left
/// once it is removed.
pub fn strip_id_suffix(identifier: &str) -> Option<&str> {
    ID_SUFFIXES.iter().find_map(|suffix| {
        identifier
            .strip_suffix(suffix)
            .map(|base| base.trim_end_matches('_'))
            .filter(|base| !base.is_empty())
    })
}

/// Join two identifier parts using the entity's naming convention.
///
/// `("author", "films", true)` gives `author_films`; with `underscored`
/// false it gives `authorFilms`.
pub fn join_identifier(prefix: &str, rest: &str, underscored: bool) -> String {
    if underscored {
        format!("{}_{}", prefix.to_snake_case(), rest.to_snake_case())
    } else {
        format!("{}_{}", prefix, rest).to_camel_case()
    }
}
