//! JSON HTTP API for the ledger
//!
//! Routes are organized into modules:
//! - routes::persons: person list, creation, per-person entries and summary
//! - routes::expenses: entry list, creation, organization summary
//! - routes::settings: configuration display

pub mod error;
pub mod routes;

use anyhow::Context;
use axum::{routing::get, Router};
use khata_config::Config;
use khata_core::KhataRef;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub khata: KhataRef,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::expenses::{api_create_expense, api_expenses, api_summary};
    use routes::persons::{api_create_person, api_person_expenses, api_person_summary, api_persons};
    use routes::settings::api_settings;

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/persons", get(api_persons).post(api_create_person))
        .route("/api/persons/:id/expenses", get(api_person_expenses))
        .route("/api/persons/:id/summary", get(api_person_summary))
        .route("/api/expenses", get(api_expenses).post(api_create_expense))
        .route("/api/summary", get(api_summary))
        .route("/api/settings", get(api_settings))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!(target: "khata::api", "Failed to listen for shutdown signal: {}", e);
    }
    log::info!(target: "khata::api", "Shutdown signal received");
}

/// Bind the configured address and serve until Ctrl-C
pub async fn start_server(config: Config, khata: KhataRef) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState { khata, config };
    let router = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!(target: "khata::api", "Serving ledger API on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!(target: "khata::api", "Server stopped gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use async_trait::async_trait;
    use khata_core::store::{LocalStore, MemoryStorage, RecordStore, StoreError, StoreResult};
    use khata_core::{ExpenseEntry, Khata, NewExpenseEntry, Person};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> Router {
        let khata = Khata::new(Arc::new(LocalStore::new(MemoryStorage::new())));
        khata.initialize().await.unwrap();
        create_router(AppState {
            khata: Arc::new(khata),
            config: Config::default(),
        })
    }

    /// Store whose every call fails as if the disk and the network were gone
    struct UnavailableStore;

    fn unavailable<T>() -> StoreResult<T> {
        Err(StoreError::Io { message: "read-only file system".to_string() })
    }

    #[async_trait]
    impl RecordStore for UnavailableStore {
        fn backend(&self) -> &'static str {
            "unavailable"
        }

        async fn initialize(&self) -> StoreResult<()> {
            unavailable()
        }

        async fn list_persons(&self) -> StoreResult<Vec<Person>> {
            unavailable()
        }

        async fn add_person(&self, _name: &str) -> StoreResult<Person> {
            unavailable()
        }

        async fn list_expenses(&self) -> StoreResult<Vec<ExpenseEntry>> {
            unavailable()
        }

        async fn list_expenses_by_person(&self, _person_id: i64) -> StoreResult<Vec<ExpenseEntry>> {
            unavailable()
        }

        async fn add_expense_entry(&self, _entry: NewExpenseEntry) -> StoreResult<ExpenseEntry> {
            unavailable()
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().await.oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_and_create_persons() {
        let app = app().await;
        let (status, body) = send(&app, get("/api/persons")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(4));

        let (status, body) = send(&app, post("/api/persons", json!({ "name": "Lakshmi" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "id": 5, "name": "Lakshmi" }));

        let (status, body) = send(&app, post("/api/persons", json!({ "name": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_expense() {
        let app = app().await;
        let entry = json!({
            "personId": 2,
            "date": "2024-04-01",
            "amount": 1250.5,
            "type": "Debit",
            "description": "Transport"
        });
        let (status, body) = send(&app, post("/api/expenses", entry)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 6);
        assert_eq!(body["amount"], 1250.5);

        let negative = json!({ "personId": 2, "date": "2024-04-01", "amount": -5, "type": "Credit" });
        let (status, _) = send(&app, post("/api/expenses", negative)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_validation_errors() {
        let app = app().await;
        let missing_date = json!({ "personId": 1, "amount": 10, "type": "Credit" });
        let (status, body) = send(&app, post("/api/expenses", missing_date)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["message"].as_str().unwrap().contains("date"));

        let (status, body) = send(&app, post("/api/persons", json!({ "nickname": "Raju" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (_, body) = send(&app, get("/api/expenses")).await;
        assert_eq!(body.as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn test_unavailable_storage_is_503() {
        let app = create_router(AppState {
            khata: Arc::new(Khata::new(Arc::new(UnavailableStore))),
            config: Config::default(),
        });

        let (status, body) = send(&app, get("/api/persons")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "STORAGE_ERROR");

        let (status, body) = send(&app, post("/api/persons", json!({ "name": "Anita" }))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "STORAGE_ERROR");
    }

    #[tokio::test]
    async fn test_summaries() {
        let app = app().await;
        let (status, body) = send(&app, get("/api/summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "totalCredit": 6500.0, "totalDebit": 3000.0, "balance": 3500.0 }));

        let (_, body) = send(&app, get("/api/summary?start=2023-05-20&end=")).await;
        assert_eq!(body["totalCredit"], 2000.0);
        assert_eq!(body["totalDebit"], 3000.0);

        let (status, body) = send(&app, get("/api/persons/1/summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "John Smith (Worker)");
        assert_eq!(body["balance"], 1000.0);
    }

    #[tokio::test]
    async fn test_person_expenses_filtered() {
        let app = app().await;
        let (_, body) = send(&app, get("/api/persons/1/expenses?end=2023-05-31")).await;
        let ids: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let app = app().await;
        let (status, body) = send(&app, get("/api/persons/99/summary")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "PERSON_NOT_FOUND");

        let (status, _) = send(&app, get("/api/expenses?start=yesterday")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_settings_hide_api_key() {
        let app = app().await;
        let (status, body) = send(&app, get("/api/settings")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currency"]["code"], "INR");
        assert_eq!(body["storage"]["remote_configured"], false);
        assert!(!body.to_string().contains("api_key"));
    }
}
