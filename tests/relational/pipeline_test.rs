//! Integration tests for the relational analysis pipeline.

mod common;

use common::{films, persons, pg, pg_serial};
use dbscribe::analysis::{analyze, Source};
use dbscribe::catalog::{Dialect, MemoryCatalog, RawTable};
use dbscribe::config::AnalysisSettings;
use dbscribe::diagnostics::{AnalysisError, DiagnosticKind};
use dbscribe::relational::RelationalAnalyzer;
use dbscribe::worker::WorkerError;

fn catalog() -> MemoryCatalog {
    MemoryCatalog::new(Dialect::Postgres)
        .with_table(films())
        .with_table(persons())
}

#[tokio::test]
async fn test_analyze_catalog() {
    let catalog = catalog();
    let settings = AnalysisSettings::default();

    let report = RelationalAnalyzer::new(&catalog, &settings)
        .analyze()
        .await
        .unwrap();

    let names: Vec<_> = report.schema.names().collect();
    assert_eq!(names, vec!["films", "persons"]);
    assert!(report.diagnostics.is_empty());
    assert!(report.is_complete());

    let films = report.schema.get("films").unwrap();
    assert!(films.reference("author").is_some());
    assert!(report.schema.get("persons").unwrap().reference("films").is_some());
}

#[tokio::test]
async fn test_order_independent_of_concurrency() {
    let mut catalog = MemoryCatalog::new(Dialect::Postgres);
    for i in 0..12 {
        let name = format!("table_{:02}", i);
        catalog = catalog.with_table(
            RawTable::new(&name)
                .column(pg_serial(1, "id", &name))
                .column(pg(2, "label", "text")),
        );
    }

    let mut orders = Vec::new();
    for max_concurrency in [1, 3, 16] {
        let settings = AnalysisSettings {
            max_concurrency,
            ..Default::default()
        };
        let report = RelationalAnalyzer::new(&catalog, &settings)
            .analyze()
            .await
            .unwrap();
        orders.push(report.schema.names().map(str::to_string).collect::<Vec<_>>());
    }

    assert_eq!(orders[0].len(), 12);
    assert_eq!(orders[0][0], "table_00");
    assert_eq!(orders[0], orders[1]);
    assert_eq!(orders[0], orders[2]);
}

#[tokio::test]
async fn test_denied_table_is_skipped() {
    let catalog = catalog().deny("secrets");
    let settings = AnalysisSettings::default();

    let report = RelationalAnalyzer::new(&catalog, &settings)
        .analyze()
        .await
        .unwrap();

    assert_eq!(report.schema.len(), 2);
    assert!(!report.schema.contains("secrets"));
    assert!(!report.is_complete());

    let diagnostics: Vec<_> = report.diagnostics_for("secrets").collect();
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(diagnostics[0].kind, DiagnosticKind::CatalogRead { .. }));
    assert_eq!(
        diagnostics[0].to_string(),
        "secrets: could not read metadata: permission denied: permission denied for table secrets"
    );
}

#[tokio::test]
async fn test_reference_to_skipped_table_is_dropped() {
    let reviews = RawTable::new("reviews")
        .column(pg_serial(1, "id", "reviews"))
        .column(pg(2, "film_id", "integer"))
        .foreign_key("film_id", "films", "id");
    let catalog = MemoryCatalog::new(Dialect::Postgres)
        .with_table(reviews)
        .deny("films");
    let settings = AnalysisSettings::default();

    let report = RelationalAnalyzer::new(&catalog, &settings)
        .analyze()
        .await
        .unwrap();

    assert!(report.schema.get("reviews").unwrap().references.is_empty());
}

#[tokio::test]
async fn test_connection_loss_aborts() {
    let catalog = catalog().disconnect_on("persons");
    let settings = AnalysisSettings::default();

    let result = RelationalAnalyzer::new(&catalog, &settings).analyze().await;
    assert!(matches!(
        result,
        Err(AnalysisError::Connection(WorkerError::ConnectionFailed(_)))
    ));
}

#[tokio::test]
async fn test_unreachable_database_fails() {
    let catalog = catalog().unreachable();

    let result = analyze(Source::Catalog(&catalog), &AnalysisSettings::default()).await;
    assert!(matches!(result, Err(AnalysisError::Connection(_))));
}

#[tokio::test]
async fn test_report_serialization() {
    let catalog = catalog();
    let report = analyze(Source::Catalog(&catalog), &AnalysisSettings::default())
        .await
        .unwrap();

    let json = serde_json::to_value(&report.schema).unwrap();
    let names: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    assert_eq!(names, vec!["films", "persons"]);

    let author = &json["films"]["fields"][1];
    assert_eq!(author["name"], "authorId");
    assert_eq!(author["columnName"], "author_id");
    assert_eq!(author["type"], "INTEGER");
    assert_eq!(author["isRequired"], true);
}
