//! Integration tests for the relational schema normalizer.

mod common;

use common::{films, junction, not_null, pg, pg_serial, primary_key, with_default};
use dbscribe::catalog::{MySqlColumn, RawColumn, RawTable};
use dbscribe::relational::{is_underscored, normalize_table};
use dbscribe::schema::{DefaultValue, FieldType};

// ============================================================================
// Naming convention
// ============================================================================

#[test]
fn test_underscored_edge_cases() {
    let none: [&str; 0] = [];
    assert!(!is_underscored(none));
    assert!(is_underscored(["id"]));
}

#[test]
fn test_underscored_requires_every_column_snake_case() {
    assert!(is_underscored(["id", "author_id", "title"]));
    assert!(!is_underscored(["id", "authorId", "author_name"]));
    assert!(!is_underscored(["title"]));
}

#[test]
fn test_underscored_ignores_expression_artifacts() {
    // An underscore inside a computed name is not evidence of the convention
    assert!(!is_underscored(["firstName", "upper(last_name)"]));
    assert!(!is_underscored(["id", "count(author_id)"]));
}

// ============================================================================
// Fields and options
// ============================================================================

#[test]
fn test_films_table() {
    let table = films()
        .column(with_default(
            pg(4, "created_at", "timestamp with time zone"),
            "now()",
        ))
        .column(pg(5, "updated_at", "timestamp with time zone"));

    let normalized = normalize_table(&table);
    let entity = &normalized.entity;

    let names: Vec<_> = entity.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["id", "authorId", "title", "createdAt", "updatedAt"]);

    let id = entity.field("id").unwrap();
    assert!(id.is_primary_key);
    assert!(!id.is_required);
    assert!(id.default_value.as_ref().unwrap().is_expression());

    let author = entity.field("author_id").unwrap();
    assert_eq!(author.field_type, FieldType::Integer);
    assert!(author.is_required);
    assert!(!author.is_primary_key);

    let created = entity.field("created_at").unwrap();
    assert_eq!(created.field_type, FieldType::Date);
    assert_eq!(created.default_value, Some(DefaultValue::expression("now()")));
    assert!(!created.is_required);

    assert!(entity.options.underscored);
    assert!(entity.options.timestamps);
    assert!(entity.options.has_id_column);
    assert!(entity.options.has_primary_keys);
    assert!(!entity.options.is_junction);
    assert!(normalized.diagnostics.is_empty());
}

#[test]
fn test_field_order_follows_ordinal_position() {
    let table = RawTable::new("t")
        .column(pg(3, "c", "text"))
        .column(pg(1, "a", "text"))
        .column(pg(2, "b", "text"));

    let entity = normalize_table(&table).entity;
    let columns: Vec<_> = entity.fields.iter().map(|f| f.column_name.as_str()).collect();
    assert_eq!(columns, vec!["a", "b", "c"]);
}

#[test]
fn test_camel_case_table_keeps_column_names() {
    let table = RawTable::new("posts")
        .column(pg(1, "id", "uuid"))
        .column(pg(2, "authorId", "uuid"))
        .column(pg(3, "createdAt", "timestamp without time zone"))
        .column(pg(4, "updatedAt", "timestamp without time zone"));

    let entity = normalize_table(&table).entity;
    assert!(!entity.options.underscored);
    assert!(entity.options.timestamps);
    assert_eq!(entity.fields[1].name, "authorId");
    // `id` stands in for the missing key; `authorId` never does
    assert!(entity.fields[0].is_primary_key);
    assert!(!entity.fields[1].is_primary_key);
}

#[test]
fn test_explicit_key_disables_id_fallback() {
    let table = RawTable::new("codes")
        .column(primary_key(not_null(pg(1, "code", "character"))))
        .column(pg(2, "id", "integer"));

    let entity = normalize_table(&table).entity;
    assert!(entity.field("code").unwrap().is_primary_key);
    assert!(!entity.field("id").unwrap().is_primary_key);
    assert!(entity.options.has_id_column);
}

// ============================================================================
// Types
// ============================================================================

#[test]
fn test_parameterized_types() {
    let mut side = pg(1, "side", "USER-DEFINED");
    if let RawColumn::Postgres { enum_values, udt_name, .. } = &mut side {
        *enum_values = Some(vec!["LEFT".to_string(), "RIGHT".to_string()]);
        *udt_name = Some("side".to_string());
    }
    let mut scores = pg(2, "scores", "ARRAY");
    if let RawColumn::Postgres { udt_name, .. } = &mut scores {
        *udt_name = Some("_int4".to_string());
    }

    let table = RawTable::new("moves").column(side).column(scores);
    let entity = normalize_table(&table).entity;

    assert_eq!(entity.fields[0].field_type.to_string(), "ENUM('LEFT','RIGHT')");
    assert_eq!(entity.fields[1].field_type.to_string(), "ARRAY(INTEGER)");
}

fn mysql(position: i32, name: &str, column_type: &str, default: Option<&str>) -> MySqlColumn {
    MySqlColumn {
        column_name: name.to_string(),
        data_type: column_type.split('(').next().unwrap_or_default().to_string(),
        column_type: column_type.to_string(),
        is_nullable: "YES".to_string(),
        column_default: default.map(str::to_string),
        column_key: String::new(),
        extra: String::new(),
        ordinal_position: position,
    }
}

#[test]
fn test_mysql_and_mssql_columns() {
    let table = RawTable::new("flags")
        .column(RawColumn::MySql(MySqlColumn {
            is_nullable: "NO".to_string(),
            ..mysql(1, "active", "tinyint(1)", Some("1"))
        }))
        .column(RawColumn::MySql(mysql(2, "side", "enum('LEFT','RIGHT')", Some("LEFT"))))
        .column(RawColumn::MsSql {
            name: "archived".to_string(),
            type_name: "bit".to_string(),
            is_nullable: false,
            default_definition: Some("((0))".to_string()),
            is_primary_key: false,
            is_identity: false,
            column_id: 3,
        });

    let entity = normalize_table(&table).entity;

    assert_eq!(entity.fields[0].field_type, FieldType::Boolean);
    assert_eq!(entity.fields[0].default_value, Some(DefaultValue::literal(true)));
    assert_eq!(entity.fields[1].field_type.to_string(), "ENUM('LEFT','RIGHT')");
    assert_eq!(entity.fields[1].default_value, Some(DefaultValue::literal("LEFT")));
    assert_eq!(entity.fields[2].field_type, FieldType::Boolean);
    assert_eq!(entity.fields[2].default_value, Some(DefaultValue::literal(false)));
    assert!(!entity.fields[2].is_required);
}

#[test]
fn test_mariadb_null_default_is_absent() {
    let table = RawTable::new("persons")
        .column(RawColumn::MariaDb(mysql(1, "nickname", "varchar(40)", Some("NULL"))))
        .column(RawColumn::MariaDb(mysql(2, "status", "varchar(10)", Some("'NULL'"))))
        .column(RawColumn::MariaDb(mysql(3, "rank", "int(11)", Some("0"))))
        .column(RawColumn::MySql(mysql(4, "motto", "varchar(40)", Some("NULL"))));

    let entity = normalize_table(&table).entity;

    assert_eq!(entity.fields[0].default_value, None);
    assert!(!entity.fields[0].is_required);
    assert_eq!(entity.fields[1].default_value, Some(DefaultValue::literal("NULL")));
    assert_eq!(entity.fields[2].default_value, Some(DefaultValue::literal(0)));
    // MySQL reports string defaults unquoted
    assert_eq!(entity.fields[3].default_value, Some(DefaultValue::literal("NULL")));
}

#[test]
fn test_default_null_is_absent_across_dialects() {
    let table = RawTable::new("notes")
        .column(with_default(pg(1, "body", "character varying"), "NULL::character varying"))
        .column(RawColumn::MsSql {
            name: "title".to_string(),
            type_name: "nvarchar".to_string(),
            is_nullable: true,
            default_definition: Some("(NULL)".to_string()),
            is_primary_key: false,
            is_identity: false,
            column_id: 2,
        })
        .column(RawColumn::Sqlite {
            cid: 2,
            name: "tag".to_string(),
            declared_type: "TEXT".to_string(),
            notnull: 0,
            dflt_value: Some("NULL".to_string()),
            pk: 0,
        });

    let entity = normalize_table(&table).entity;
    for field in &entity.fields {
        assert_eq!(field.default_value, None, "{}", field.column_name);
    }
}

#[test]
fn test_unsupported_type_falls_back_with_warning() {
    let table = RawTable::new("places")
        .column(pg_serial(1, "id", "places"))
        .column(pg(2, "area", "geometry"));

    let normalized = normalize_table(&table);
    assert_eq!(normalized.entity.fields[1].field_type, FieldType::String);
    assert_eq!(normalized.diagnostics.len(), 1);
    assert_eq!(
        normalized.diagnostics[0].to_string(),
        "places.area: unsupported type 'geometry', using STRING"
    );
}

// ============================================================================
// Junctions
// ============================================================================

#[test]
fn test_junction_detection() {
    let table = junction("films_actors", ("film_id", "films"), ("actor_id", "actors"))
        .column(pg(3, "created_at", "timestamp with time zone"))
        .column(pg(4, "updated_at", "timestamp with time zone"));

    let entity = normalize_table(&table).entity;
    assert!(entity.options.is_junction);
    assert!(entity.options.timestamps);
}

#[test]
fn test_extra_field_breaks_junction() {
    let table = junction("films_actors", ("film_id", "films"), ("actor_id", "actors"))
        .column(pg(3, "role", "text"));

    assert!(!normalize_table(&table).entity.options.is_junction);
}

#[test]
fn test_junction_needs_two_distinct_targets() {
    let table = junction("friendships", ("person_id", "persons"), ("friend_id", "persons"));
    assert!(!normalize_table(&table).entity.options.is_junction);

    let table = RawTable::new("film_notes")
        .column(primary_key(not_null(pg(1, "film_id", "integer"))))
        .column(primary_key(not_null(pg(2, "position", "integer"))))
        .foreign_key("film_id", "films", "id");
    assert!(!normalize_table(&table).entity.options.is_junction);
}

#[test]
fn test_composite_foreign_keys_count_for_junctions() {
    let mut table = RawTable::new("screenings_seats")
        .column(primary_key(not_null(pg(1, "screening_id", "integer"))))
        .column(primary_key(not_null(pg(2, "hall_id", "integer"))))
        .column(primary_key(not_null(pg(3, "seat_no", "integer"))))
        .foreign_key("screening_id", "screenings", "id");
    table
        .foreign_keys
        .push(common::composite_fk(&["hall_id", "seat_no"], "seats", &["hall_id", "seat_no"]));

    assert!(normalize_table(&table).entity.options.is_junction);
}
