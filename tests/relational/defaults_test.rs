//! Integration tests for default-value classification.

use dbscribe::catalog::RawDefault;
use dbscribe::relational::classify_default;
use dbscribe::schema::{DefaultValue, FieldType};
use serde_json::json;

fn sql(text: &str, ty: FieldType) -> Option<DefaultValue> {
    classify_default(Some(&RawDefault::Sql(text.to_string())), &ty).value
}

fn text(text: &str, ty: FieldType) -> Option<DefaultValue> {
    classify_default(Some(&RawDefault::Text(text.to_string())), &ty).value
}

#[test]
fn test_no_default_is_absent() {
    let classified = classify_default(None, &FieldType::String);
    assert_eq!(classified.value, None);
    assert!(!classified.parse_failed);
}

#[test]
fn test_null_text_on_string_column_is_kept() {
    assert_eq!(text("NULL", FieldType::String), Some(DefaultValue::literal("NULL")));
    assert_eq!(
        sql("'NULL'::character varying", FieldType::String),
        Some(DefaultValue::literal("NULL"))
    );
    assert_eq!(text("NULL", FieldType::Integer), None);
    assert_eq!(sql("NULL::integer", FieldType::Integer), None);
}

#[test]
fn test_bare_sql_null_is_absent_on_string_columns() {
    // Postgres, SQL Server and SQLite spellings of `DEFAULT NULL`
    assert_eq!(sql("NULL::character varying", FieldType::String), None);
    assert_eq!(sql("(NULL)", FieldType::String), None);
    assert_eq!(sql("NULL", FieldType::Text), None);
    assert_eq!(sql("null", FieldType::Char), None);
}

#[test]
fn test_quoted_literals() {
    assert_eq!(
        sql("'draft'::character varying", FieldType::String),
        Some(DefaultValue::literal("draft"))
    );
    assert_eq!(
        sql("'it''s'::text", FieldType::Text),
        Some(DefaultValue::literal("it's"))
    );
    assert_eq!(sql("'t'", FieldType::Boolean), Some(DefaultValue::literal(true)));
    assert_eq!(sql("'42'", FieldType::Integer), Some(DefaultValue::literal(42)));
}

#[test]
fn test_bare_literals() {
    assert_eq!(sql("0", FieldType::Integer), Some(DefaultValue::literal(0)));
    assert_eq!(sql("-1.5", FieldType::Double), Some(DefaultValue::literal(-1.5)));
    assert_eq!(sql("false", FieldType::Boolean), Some(DefaultValue::literal(false)));
    assert_eq!(sql("b'1'", FieldType::Boolean), Some(DefaultValue::literal(true)));
}

#[test]
fn test_sql_server_wrapping() {
    assert_eq!(sql("((0))", FieldType::Integer), Some(DefaultValue::literal(0)));
    assert_eq!(sql("((1))", FieldType::Boolean), Some(DefaultValue::literal(true)));
    assert_eq!(sql("(N'draft')", FieldType::String), Some(DefaultValue::literal("draft")));
    assert_eq!(
        sql("(getdate())", FieldType::Date),
        Some(DefaultValue::expression("(getdate())"))
    );
}

#[test]
fn test_expressions_are_opaque() {
    assert_eq!(sql("now()", FieldType::Date), Some(DefaultValue::expression("now()")));
    assert_eq!(
        sql("CURRENT_TIMESTAMP", FieldType::Date),
        Some(DefaultValue::expression("CURRENT_TIMESTAMP"))
    );
    assert_eq!(
        sql("gen_random_uuid()", FieldType::Uuid),
        Some(DefaultValue::expression("gen_random_uuid()"))
    );
    assert_eq!(
        sql("nextval('films_id_seq'::regclass)", FieldType::Integer),
        Some(DefaultValue::expression("nextval('films_id_seq'::regclass)"))
    );
}

#[test]
fn test_json_default_is_parsed_deeply() {
    let value = sql(r#"'{"b": 1, "a": [1, {"c": null}]}'::jsonb"#, FieldType::Jsonb).unwrap();
    assert_eq!(
        value,
        DefaultValue::literal(json!({"b": 1, "a": [1, {"c": null}]}))
    );

    // Key order survives
    let literal = value.as_literal().unwrap();
    assert_eq!(literal.to_string(), r#"{"b":1,"a":[1,{"c":null}]}"#);
}

#[test]
fn test_malformed_literal_falls_back_to_expression() {
    let raw = RawDefault::Sql("'{not json'::json".to_string());
    let classified = classify_default(Some(&raw), &FieldType::Json);
    assert_eq!(
        classified.value,
        Some(DefaultValue::expression("'{not json'::json"))
    );
    assert!(classified.parse_failed);

    let raw = RawDefault::Sql("'maybe'".to_string());
    let classified = classify_default(Some(&raw), &FieldType::Boolean);
    assert!(classified.value.unwrap().is_expression());
    assert!(classified.parse_failed);
}

#[test]
fn test_mysql_text_defaults() {
    assert_eq!(text("abc", FieldType::String), Some(DefaultValue::literal("abc")));
    assert_eq!(text("3", FieldType::Integer), Some(DefaultValue::literal(3)));
    assert_eq!(text("0", FieldType::Boolean), Some(DefaultValue::literal(false)));
    assert_eq!(
        text("2020-01-01 00:00:00", FieldType::Date),
        Some(DefaultValue::literal("2020-01-01 00:00:00"))
    );
    assert_eq!(
        classify_default(
            Some(&RawDefault::Expression("CURRENT_TIMESTAMP".to_string())),
            &FieldType::Date
        )
        .value,
        Some(DefaultValue::expression("CURRENT_TIMESTAMP"))
    );
}
