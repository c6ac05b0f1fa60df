//! Naming conventions of a table.
//!
//! Decides whether a table follows the underscored convention, derives
//! logical field names, and recognizes the timestamp and `id` columns the
//! entity options are built from.

use crate::inflection::camelize;

/// Column names treated as timestamps, in both conventions.
const CREATED_COLUMNS: &[&str] = &["created_at", "createdAt"];
const UPDATED_COLUMNS: &[&str] = &["updated_at", "updatedAt"];
const DELETED_COLUMNS: &[&str] = &["deleted_at", "deletedAt"];

/// Naming style of a single identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingStyle {
    /// snake_case (e.g., author_id), including single lower-case words
    SnakeCase,
    /// camelCase (e.g., authorId)
    CamelCase,
    /// PascalCase (e.g., AuthorId)
    PascalCase,
    /// Anything else, including names with expression artifacts
    Mixed,
}

impl NamingStyle {
    /// Classify a single identifier.
    pub fn classify(name: &str) -> Self {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return Self::Mixed;
        };

        if name
            .chars()
            .all(|c| c.is_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Self::SnakeCase;
        }

        // Underscores and punctuation only appear in snake_case names
        if !name.chars().all(char::is_alphanumeric) {
            return Self::Mixed;
        }

        let internal_uppercase = chars.filter(|c| c.is_uppercase()).count();
        if first.is_uppercase() && internal_uppercase > 0 {
            Self::PascalCase
        } else if first.is_lowercase() && internal_uppercase > 0 {
            Self::CamelCase
        } else {
            Self::Mixed
        }
    }
}

/// Whether a table follows the underscored convention.
///
/// True iff every column is snake_case and at least one contains an
/// underscore. An empty table is not underscored; a table whose only
/// column is `id` is, for lack of evidence against it.
pub fn is_underscored<'a, I>(columns: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = false;
    let mut has_underscore = false;
    let mut only_id = true;

    for column in columns {
        seen = true;
        if column != "id" {
            only_id = false;
        }
        if NamingStyle::classify(column) != NamingStyle::SnakeCase {
            return false;
        }
        if column.contains('_') {
            has_underscore = true;
        }
    }

    seen && (has_underscore || only_id)
}

/// Logical field name for a column.
pub fn logical_name(column: &str, underscored: bool) -> String {
    if underscored {
        camelize(column)
    } else {
        column.to_string()
    }
}

/// Whether the column is the bare `id` identifier.
pub fn is_id_column(column: &str) -> bool {
    column.eq_ignore_ascii_case("id")
}

pub fn is_timestamp_column(column: &str) -> bool {
    CREATED_COLUMNS.contains(&column)
        || UPDATED_COLUMNS.contains(&column)
        || DELETED_COLUMNS.contains(&column)
}

/// Whether the columns carry both created and updated timestamps.
pub fn has_timestamps<'a, I>(columns: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let (mut created, mut updated) = (false, false);
    for column in columns {
        created |= CREATED_COLUMNS.contains(&column);
        updated |= UPDATED_COLUMNS.contains(&column);
    }
    created && updated
}
