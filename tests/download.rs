use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use chrono::NaiveDate;
use exercise_report::store::NewExercise;
use exercise_report::{fonts, http, ExerciseStore, ReportConfig, ReportGenerator};
use tower::ServiceExt;

fn exercise(name: &str, weight: f64, day: u32, user: &str) -> NewExercise {
    NewExercise {
        name: name.to_string(),
        weight,
        date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        user_id: Some(user.to_string()),
    }
}

async fn seeded_store() -> ExerciseStore {
    let store = ExerciseStore::in_memory().await.expect("open store");
    store.ensure_schema().await.expect("create schema");
    for row in [
        exercise("Bench Press", 60.0, 3, "alice"),
        exercise("Squat", 90.0, 1, "alice"),
        exercise("Squat", 100.0, 15, "alice"),
        exercise("Deadlift", 140.0, 8, "bob"),
    ] {
        store.insert(&row).await.expect("insert row");
    }
    store
}

/// Inserts a row bypassing the typed API, so malformed values can be stored.
async fn insert_raw(store: &ExerciseStore, values: &str) {
    let sql = format!(
        "INSERT INTO exercise (exercise_name, weight, date, user_id) VALUES ({values})"
    );
    sqlx::query(&sql).execute(store.pool()).await.unwrap();
}

async fn get(store: &ExerciseStore, uri: &str) -> Response {
    let app = http::router(ReportGenerator::new(store.clone(), ReportConfig::default()));
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .expect("router responds")
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

fn page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes)
        .expect("response is a parseable PDF")
        .get_pages()
        .len()
}

fn fonts_available(test: &str) -> bool {
    let available = fonts::default_fonts_available(None);
    if !available {
        eprintln!(
            "Skipping {test}: fonts missing. Set {}.",
            fonts::FONTS_DIR_ENV
        );
    }
    available
}

#[tokio::test]
async fn user_report_is_served_inline_as_pdf() {
    if !fonts_available("user_report_is_served_inline_as_pdf") {
        return;
    }
    let store = seeded_store().await;

    let response = get(&store, "/api/download-pdf?userId=alice").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=ExerciseData.pdf"
    );

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF-"));
    // Table page plus Bench Press and Squat charts.
    assert_eq!(page_count(&bytes), 3);
}

#[tokio::test]
async fn unknown_user_still_gets_a_document() {
    if !fonts_available("unknown_user_still_gets_a_document") {
        return;
    }
    let store = seeded_store().await;

    let response = get(&store, "/api/download-pdf?userId=nobody").await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body_bytes(response).await;
    assert_eq!(page_count(&bytes), 1, "empty table and no chart pages");
}

#[tokio::test]
async fn missing_user_id_reports_every_user() {
    if !fonts_available("missing_user_id_reports_every_user") {
        return;
    }
    let store = seeded_store().await;

    let response = get(&store, "/api/download-pdf").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF-"));
    // Bench Press, Deadlift and Squat across both users.
    assert_eq!(page_count(&bytes), 4);
}

#[tokio::test]
async fn malformed_weight_fails_the_request() {
    let store = seeded_store().await;
    insert_raw(&store, "'Row', 'abc', '2024-01-10', 'alice'").await;

    let response = get(&store, "/api/download-pdf?userId=alice").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_bytes(response).await;
    assert_eq!(body, b"Stored exercise data could not be read");
}

#[tokio::test]
async fn malformed_weight_of_another_user_is_not_read() {
    let store = seeded_store().await;
    insert_raw(&store, "'Row', 'abc', '2024-01-10', 'carol'").await;

    let generator = ReportGenerator::new(store, ReportConfig::default());
    let data = generator.collect(Some("bob")).await.unwrap();
    assert_eq!(data.records.len(), 1);
    assert_eq!(data.series.len(), 1);
    assert!(generator.collect(None).await.unwrap_err().is_data_format());
}

#[tokio::test]
async fn database_failure_is_a_server_error() {
    let store = ExerciseStore::in_memory().await.unwrap();

    let response = get(&store, "/api/download-pdf").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn collected_rows_match_the_user_filter() {
    let store = seeded_store().await;
    let generator = ReportGenerator::new(store, ReportConfig::default());

    let alice = generator.collect(Some("alice")).await.unwrap();
    let ids: Vec<i64> = alice.records.iter().map(|record| record.id).collect();
    assert_eq!(ids, [1, 2, 3]);

    assert_eq!(alice.series.len(), 2);

    let everyone = generator.collect(None).await.unwrap();
    assert_eq!(everyone.records.len(), 4);
    assert_eq!(everyone.series.len(), 3);

    // The span ignores the user filter.
    let span = alice.span.expect("span present");
    assert_eq!(span.first_day, "2024-01-01");
    assert_eq!(span.last_day, "2024-01-15");
}

#[tokio::test]
async fn malformed_date_of_another_user_only_shows_in_the_summary() {
    let store = seeded_store().await;
    insert_raw(&store, "'Row', 40.0, '2024-13-40', 'carol'").await;
    let generator = ReportGenerator::new(store.clone(), ReportConfig::default());

    let alice = generator.collect(Some("alice")).await.unwrap();
    assert_eq!(alice.records.len(), 3);
    let span = alice.span.expect("span present");
    assert_eq!(span.last_day, "2024-13-40");

    if !fonts_available("malformed_date_of_another_user_only_shows_in_the_summary") {
        return;
    }
    let response = get(&store, "/api/download-pdf?userId=alice").await;
    assert_eq!(response.status(), StatusCode::OK);
}
