//! Integration tests for document reference inference.

use dbscribe::config::{AnalysisSettings, SamplingSettings};
use dbscribe::document::{decide, CandidateDecision, DocumentAnalyzer, MemoryDocumentStore, ReferenceInferer};
use dbscribe::schema::{Field, FieldType, ReferenceKind, Schema};
use insta::assert_snapshot;
use serde_json::{json, Value};

fn oid(n: u32) -> Value {
    json!({ "$oid": format!("{:024x}", n) })
}

fn persons() -> Vec<Value> {
    (1..=5)
        .map(|n| {
            let manager = if n == 1 { Value::Null } else { oid(1) };
            json!({ "_id": oid(n), "name": format!("person {}", n), "manager": manager })
        })
        .collect()
}

fn films() -> Vec<Value> {
    (0..3)
        .map(|n| {
            json!({
                "_id": oid(100 + n),
                "title": format!("film {}", n),
                "actors": [oid(1 + n), oid(2 + n)],
                "director": oid(3),
            })
        })
        .collect()
}

fn store() -> MemoryDocumentStore {
    MemoryDocumentStore::new()
        .with_collection("films", films())
        .with_collection("persons", persons())
}

async fn analyze(store: &MemoryDocumentStore) -> Schema {
    let settings = AnalysisSettings::default();
    DocumentAnalyzer::new(store, &settings)
        .analyze()
        .await
        .unwrap()
        .schema
}

fn render(schema: &Schema) -> String {
    schema
        .iter()
        .flat_map(|e| e.references.iter().map(|r| r.to_string()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_decide() {
    let counts = |pairs: &[(&str, u64)]| -> Vec<(String, u64)> {
        pairs.iter().map(|(n, c)| (n.to_string(), *c)).collect()
    };

    assert_eq!(
        decide(&counts(&[("films", 0), ("persons", 3)])),
        CandidateDecision::Resolved("persons".to_string())
    );
    assert_eq!(
        decide(&counts(&[("persons", 3), ("actors", 3)])),
        CandidateDecision::Ambiguous(vec!["persons".to_string(), "actors".to_string()])
    );
    assert_eq!(decide(&counts(&[("films", 0)])), CandidateDecision::NoMatch);
}

#[tokio::test]
async fn test_references_to_persons() {
    let schema = analyze(&store()).await;

    assert_snapshot!(render(&schema), @r"
    films.actors -hasMany-> persons as actors
    films.director -belongsTo-> persons as director
    persons.manager -belongsTo-> persons as manager
    ");

    let actors = schema.get("films").unwrap().reference("actors").unwrap();
    assert_eq!(actors.kind, ReferenceKind::HasMany);
    assert_eq!(actors.to_field, None);
    assert_eq!(actors.foreign_key, "actors");
}

#[tokio::test]
async fn test_shared_identifiers_are_ambiguous() {
    let store = store().with_collection(
        "actors",
        vec![json!({ "_id": oid(1) }), json!({ "_id": oid(2) })],
    );

    let schema = analyze(&store).await;

    // oid(3) only lives in persons; oid(1) and oid(2) live in both
    assert_snapshot!(render(&schema), @"films.director -belongsTo-> persons as director");
}

#[tokio::test]
async fn test_unsampled_field_yields_nothing() {
    let store = MemoryDocumentStore::new().with_collection(
        "drafts",
        vec![
            json!({ "_id": oid(7), "reviewer": null }),
            json!({ "_id": oid(8) }),
        ],
    );
    let targets = vec!["drafts".to_string()];
    let inferer = ReferenceInferer::new(&store, &targets, SamplingSettings::default());

    let reviewer = Field::new("reviewer", FieldType::ObjectId);
    assert_eq!(inferer.infer("drafts", &reviewer).await.unwrap(), None);
}

#[tokio::test]
async fn test_only_identifier_fields_are_inferred() {
    let store = MemoryDocumentStore::new()
        .with_collection("topics", vec![json!({ "_id": oid(200), "name": "cinema" })])
        .with_collection(
            "comments",
            vec![
                json!({ "_id": oid(300), "refersTo": "topics", "subject": oid(200) }),
                json!({ "_id": oid(301), "refersTo": "topics", "subject": oid(200) }),
            ],
        );

    let schema = analyze(&store).await;

    assert_snapshot!(render(&schema), @"comments.subject -belongsTo-> topics as subject");
}

#[tokio::test]
async fn test_uuid_identifiers() {
    let uuid = |n: u32| json!({ "$uuid": format!("00000000-0000-4000-8000-{:012x}", n) });
    let store = MemoryDocumentStore::new()
        .with_collection("accounts", vec![json!({ "_id": uuid(1) }), json!({ "_id": uuid(2) })])
        .with_collection(
            "invoices",
            vec![
                json!({ "_id": uuid(10), "owner_id": uuid(1) }),
                json!({ "_id": uuid(11), "owner_id": uuid(2) }),
            ],
        );

    let schema = analyze(&store).await;

    let owner = schema.get("invoices").unwrap().reference("owner").unwrap();
    assert_eq!(owner.to_entity, "accounts");
    assert_eq!(owner.kind, ReferenceKind::BelongsTo);
    assert_eq!(owner.from_field, "owner_id");
}

#[tokio::test]
async fn test_seeded_runs_are_repeatable() {
    let settings = AnalysisSettings {
        sampling: SamplingSettings {
            sample_size: 3,
            array_elements: 2,
            documents: 5,
        },
        ..Default::default()
    };
    let build = || {
        let persons: Vec<Value> = (1..=40).map(|n| json!({ "_id": oid(n) })).collect();
        let films: Vec<Value> = (0..30)
            .map(|n| json!({ "_id": oid(1000 + n), "cast": [oid(1 + n), oid(2 + n), oid(3 + n)] }))
            .collect();
        MemoryDocumentStore::with_seed(42)
            .with_collection("films", films)
            .with_collection("persons", persons)
    };

    let (first, second) = (build(), build());
    let a = DocumentAnalyzer::new(&first, &settings).analyze().await.unwrap();
    let b = DocumentAnalyzer::new(&second, &settings).analyze().await.unwrap();
    assert_eq!(a.schema, b.schema);

    // Same store again, with the RNG advanced
    let c = DocumentAnalyzer::new(&first, &settings).analyze().await.unwrap();
    assert_eq!(render(&a.schema), render(&c.schema));
    assert_snapshot!(render(&a.schema), @"films.cast -hasMany-> persons as cast");
}
