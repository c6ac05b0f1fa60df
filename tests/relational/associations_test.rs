//! Integration tests for association resolution.

mod common;

use std::collections::HashSet;

use common::{films, junction, not_null, persons, pg, pg_serial};
use dbscribe::catalog::RawTable;
use dbscribe::relational::{normalize_table, resolve_associations};
use dbscribe::schema::{ReferenceKind, Schema};
use insta::assert_snapshot;

fn resolve(tables: &[RawTable]) -> Schema {
    let mut schema = Schema::new();
    let mut constraints = Vec::new();
    for table in tables {
        let normalized = normalize_table(table);
        constraints.push(normalized.constraints);
        schema.insert(normalized.entity);
    }
    resolve_associations(&mut schema, &constraints);
    schema
}

fn render(schema: &Schema) -> String {
    schema
        .iter()
        .flat_map(|e| e.references.iter().map(|r| r.to_string()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_belongs_to_and_inverse() {
    let schema = resolve(&[films(), persons()]);

    assert_snapshot!(render(&schema), @r"
    films.author_id -belongsTo-> persons as author
    persons.id -hasMany-> films as films
    ");

    let author = schema.get("films").unwrap().reference("author").unwrap();
    assert_eq!(author.to_field.as_deref(), Some("id"));
    assert_eq!(author.foreign_key, "author_id");

    let films = schema.get("persons").unwrap().reference("films").unwrap();
    assert_eq!(films.kind, ReferenceKind::HasMany);
    assert_eq!(films.to_field.as_deref(), Some("author_id"));
    assert_eq!(films.foreign_key, "author_id");
}

#[test]
fn test_two_keys_to_the_same_target() {
    let films = films()
        .column(pg(4, "editor_id", "integer"))
        .foreign_key("editor_id", "persons", "id");
    let persons = RawTable::new("persons")
        .column(pg_serial(1, "id", "persons"))
        .column(pg(2, "full_name", "text"));

    let schema = resolve(&[films, persons]);

    assert_snapshot!(render(&schema), @r"
    films.author_id -belongsTo-> persons as author
    films.editor_id -belongsTo-> persons as editor
    persons.id -hasMany-> films as author_films
    persons.id -hasMany-> films as editor_films
    ");
}

#[test]
fn test_inverse_aliases_follow_target_naming() {
    let films = films()
        .column(pg(4, "editor_id", "integer"))
        .foreign_key("editor_id", "persons", "id");
    let persons = RawTable::new("persons")
        .column(pg(1, "id", "integer"))
        .column(pg(2, "fullName", "text"));

    let schema = resolve(&[films, persons]);
    let aliases: Vec<_> = schema
        .get("persons")
        .unwrap()
        .references
        .iter()
        .map(|r| r.alias.as_str())
        .collect();
    assert_eq!(aliases, vec!["authorFilms", "editorFilms"]);
}

#[test]
fn test_unique_key_gives_has_one() {
    let profiles = RawTable::new("profiles")
        .column(pg_serial(1, "id", "profiles"))
        .column(not_null(pg(2, "person_id", "integer")))
        .column(pg(3, "bio", "text"))
        .foreign_key("person_id", "persons", "id")
        .unique_index(&["person_id"]);

    let schema = resolve(&[persons(), profiles]);

    assert_snapshot!(render(&schema), @r"
    persons.id -hasOne-> profiles as profile
    profiles.person_id -belongsTo-> persons as person
    ");
}

#[test]
fn test_junction_gives_belongs_to_many() {
    let actors = RawTable::new("actors")
        .column(pg_serial(1, "id", "actors"))
        .column(pg(2, "name", "text"));
    let link = junction("films_actors", ("film_id", "films"), ("actor_id", "actors"));

    let films = RawTable::new("films")
        .column(pg_serial(1, "id", "films"))
        .column(pg(2, "title", "text"));

    let schema = resolve(&[films, actors, link]);

    assert_snapshot!(render(&schema), @r"
    films.id -belongsToMany-> actors as actors
    actors.id -belongsToMany-> films as films
    ");

    let through = schema
        .get("films")
        .unwrap()
        .reference("actors")
        .unwrap()
        .through
        .clone()
        .unwrap();
    assert_eq!(through.entity, "films_actors");
    assert_eq!(through.source_key, "film_id");
    assert_eq!(through.target_key, "actor_id");
    assert!(schema.get("films_actors").unwrap().references.is_empty());
}

#[test]
fn test_self_reference() {
    let employees = RawTable::new("employees")
        .column(pg_serial(1, "id", "employees"))
        .column(pg(2, "manager_id", "integer"))
        .foreign_key("manager_id", "employees", "id");

    let schema = resolve(&[employees]);

    assert_snapshot!(render(&schema), @r"
    employees.manager_id -belongsTo-> employees as manager
    employees.id -hasMany-> employees as employees
    ");
}

#[test]
fn test_missing_target_is_ignored() {
    let schema = resolve(&[films()]);
    assert!(schema.get("films").unwrap().references.is_empty());
}

#[test]
fn test_aliases_unique_per_entity() {
    let films = films()
        .column(pg(4, "editor_id", "integer"))
        .column(pg(5, "person_id", "integer"))
        .foreign_key("editor_id", "persons", "id")
        .foreign_key("person_id", "persons", "id");
    let reviews = RawTable::new("reviews")
        .column(pg_serial(1, "id", "reviews"))
        .column(pg(2, "author_id", "integer"))
        .column(pg(3, "film_id", "integer"))
        .foreign_key("author_id", "persons", "id")
        .foreign_key("film_id", "films", "id");

    let schema = resolve(&[films, persons(), reviews]);

    for entity in schema.iter() {
        let aliases: HashSet<_> = entity.references.iter().map(|r| &r.alias).collect();
        assert_eq!(aliases.len(), entity.references.len(), "{}", entity.name);
    }
}
