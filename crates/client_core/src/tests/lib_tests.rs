use super::*;

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use shared::domain::{BusinessFunction, CategoryFilter};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct CatalogServerState {
    queries: Arc<Mutex<Vec<String>>>,
}

fn paper_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "authors": "A. Author",
        "year": 2021,
        "venue": "KDD",
        "link": "https://example.org/paper",
        "doi": null,
        "open_access": 1,
        "summary": "summary",
        "function": "Fraud",
        "technique": "Graph",
        "industry": "Banking",
        "stage": "Research"
    })
}

async fn list_papers(
    State(state): State<CatalogServerState>,
    RawQuery(raw): RawQuery,
) -> Response {
    let raw = raw.unwrap_or_default();
    state.queries.lock().await.push(raw.clone());

    if raw.contains("q=boom") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "database exploded" })),
        )
            .into_response();
    }
    if raw.contains("q=teapot") {
        return (StatusCode::IM_A_TEAPOT, "short and stout").into_response();
    }
    if raw.contains("q=garbled") {
        return (StatusCode::OK, "not json").into_response();
    }
    if raw.contains("q=nothing") {
        return Json(json!({
            "count": 0, "page": 1, "limit": 20, "total_pages": 1, "papers": []
        }))
        .into_response();
    }

    Json(json!({
        "count": 2,
        "page": 1,
        "limit": 20,
        "total_pages": 1,
        "papers": [paper_json("p1", "Graph fraud detection"), paper_json("p2", "GNN AML")]
    }))
    .into_response()
}

async fn paper_detail(Path(paper_id): Path<String>) -> Response {
    if paper_id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Paper not found" })),
        )
            .into_response();
    }
    Json(paper_json(&paper_id, "Detail")).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "status": "healthy" }))
}

async fn spawn_catalog_server() -> anyhow::Result<(String, CatalogServerState)> {
    let state = CatalogServerState::default();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/api/papers", get(list_papers))
        .route("/api/papers/:paper_id", get(paper_detail))
        .route("/api/health", get(health))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn query_without_years() -> FilterState {
    let mut filters = FilterState::default();
    filters.year_from = None;
    filters.year_to = None;
    filters
}

#[tokio::test]
async fn list_papers_sends_only_selected_filters() {
    let (server_url, state) = spawn_catalog_server().await.expect("spawn server");
    let client = CatalogClient::new(&server_url).expect("client");

    let mut filters = query_without_years();
    filters.apply(FilterChange::Function(CategoryFilter::Only(
        BusinessFunction::Fraud,
    )));
    filters.apply(FilterChange::YearFrom(Some(2020)));
    filters.apply(FilterChange::YearTo(Some(2022)));

    let response = client
        .list_papers(&filters.to_query())
        .await
        .expect("list papers");
    assert_eq!(response.count, 2);
    assert_eq!(response.papers[0].title, "Graph fraud detection");

    let queries = state.queries.lock().await;
    assert_eq!(
        queries.as_slice(),
        ["page=1&limit=20&order=-year&function=Fraud&year_from=2020&year_to=2022"]
    );
}

#[tokio::test]
async fn multi_word_labels_are_form_encoded() {
    let (server_url, state) = spawn_catalog_server().await.expect("spawn server");
    let client = CatalogClient::new(&server_url).expect("client");

    let mut filters = query_without_years();
    filters.apply(FilterChange::Function(CategoryFilter::Only(
        BusinessFunction::CreditRisk,
    )));
    client
        .list_papers(&filters.to_query())
        .await
        .expect("list papers");

    let queries = state.queries.lock().await;
    assert!(
        queries[0].contains("function=Credit+Risk"),
        "unexpected query: {}",
        queries[0]
    );
    assert!(!queries[0].contains("All"));
}

#[tokio::test]
async fn server_error_surfaces_status_and_message() {
    let (server_url, _state) = spawn_catalog_server().await.expect("spawn server");
    let client = CatalogClient::new(&server_url).expect("client");

    let mut filters = query_without_years();
    filters.apply(FilterChange::Search("boom".into()));
    let err = client
        .list_papers(&filters.to_query())
        .await
        .expect_err("must fail");
    assert_eq!(err.status_code, 500);
    assert_eq!(err.code, ErrorCode::Server);
    assert_eq!(err.message, "database exploded");
}

#[tokio::test]
async fn error_without_body_message_uses_fallback() {
    let (server_url, _state) = spawn_catalog_server().await.expect("spawn server");
    let client = CatalogClient::new(&server_url).expect("client");

    let mut filters = query_without_years();
    filters.apply(FilterChange::Search("teapot".into()));
    let err = client
        .list_papers(&filters.to_query())
        .await
        .expect_err("must fail");
    assert_eq!(err.status_code, 418);
    assert_eq!(err.code, ErrorCode::Client);
    assert_eq!(err.message, "Failed to fetch papers");
}

#[tokio::test]
async fn undecodable_body_is_an_invalid_response() {
    let (server_url, _state) = spawn_catalog_server().await.expect("spawn server");
    let client = CatalogClient::new(&server_url).expect("client");

    let mut filters = query_without_years();
    filters.apply(FilterChange::Search("garbled".into()));
    let err = client
        .list_papers(&filters.to_query())
        .await
        .expect_err("must fail");
    assert_eq!(err.status_code, 500);
    assert_eq!(err.code, ErrorCode::InvalidResponse);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = CatalogClient::new(&format!("http://{addr}")).expect("client");
    let err = client
        .list_papers(&FilterState::default().to_query())
        .await
        .expect_err("must fail");
    assert_eq!(err.status_code, 500);
    assert_eq!(err.code, ErrorCode::Network);
    assert!(err.message.starts_with("Failed to fetch papers"));
}

#[tokio::test]
async fn get_paper_maps_not_found_detail() {
    let (server_url, _state) = spawn_catalog_server().await.expect("spawn server");
    let client = CatalogClient::new(&server_url).expect("client");

    let paper = client.get_paper("abc123").await.expect("paper");
    assert_eq!(paper.id, "abc123");
    assert!(paper.is_open_access());

    let err = client.get_paper("missing").await.expect_err("404");
    assert!(err.is_not_found());
    assert_eq!(err.status_code, 404);
    assert_eq!(err.message, "Paper not found");
}

#[tokio::test]
async fn health_reports_ok() {
    let (server_url, _state) = spawn_catalog_server().await.expect("spawn server");
    let client = CatalogClient::new(&format!("{server_url}/")).expect("client");

    let health = client.health().await.expect("health");
    assert!(health.ok);
    assert_eq!(health.status, "healthy");
}

#[test]
fn base_url_keeps_path_prefix() {
    let client = CatalogClient::new("papers.example.com/catalog").expect("client");
    assert_eq!(
        client.base_url().as_str(),
        "http://papers.example.com/catalog/"
    );
    assert_eq!(
        client
            .endpoint("api/papers", LIST_PAPERS_FALLBACK)
            .expect("endpoint")
            .as_str(),
        "http://papers.example.com/catalog/api/papers"
    );
}

#[tokio::test]
async fn controller_over_http_commits_pages_and_empty_results() {
    let (server_url, state) = spawn_catalog_server().await.expect("spawn server");
    let client = Arc::new(CatalogClient::new(&server_url).expect("client"));
    let controller = FetchController::mount(client, FilterState::default());

    let settled = controller.settled().await;
    assert_eq!(settled.error, None);
    assert_eq!(settled.data.as_ref().map(|d| d.papers.len()), Some(2));

    controller.apply(FilterChange::Search("nothing".into()));
    let settled = controller.settled().await;
    assert!(matches!(
        CatalogView::from_state(&settled),
        CatalogView::Empty {
            reset: ViewAction::ResetFilters
        }
    ));

    controller.dispatch(ViewAction::ResetFilters);
    let settled = controller.settled().await;
    assert_eq!(settled.data.as_ref().map(|d| d.count), Some(2));

    let queries = state.queries.lock().await;
    assert_eq!(queries.len(), 3);
    assert_eq!(queries[0], queries[2]);
    assert!(queries[1].contains("q=nothing"));
}

#[tokio::test]
async fn controller_over_http_stores_server_error() {
    let (server_url, _state) = spawn_catalog_server().await.expect("spawn server");
    let client = Arc::new(CatalogClient::new(&server_url).expect("client"));
    let mut filters = FilterState::default();
    filters.apply(FilterChange::Search("boom".into()));
    let controller = FetchController::mount(client, filters);

    let settled = controller.settled().await;
    let error = settled.error.expect("error stored");
    assert_eq!(error.status_code, 500);
    assert_eq!(error.message, "database exploded");
}
