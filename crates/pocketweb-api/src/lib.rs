//! HTTP API for pocketweb
//!
//! JSON over axum with permissive CORS. The upload endpoints accept
//! multipart forms; everything else is plain JSON. Authentication is not
//! handled here: requests arrive with their owner scope already resolved.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use log::info;
use tower_http::cors::CorsLayer;

use pocketweb_core::Books;
use pocketweb_store::KvStore;

pub use error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<Books<Box<dyn KvStore>>>,
}

/// Build the full API router
pub fn create_router(state: AppState) -> Router {
    let max_upload = state.books.config().ingest.max_upload_bytes;

    Router::new()
        .route("/api/health", get(routes::health))
        .route(
            "/api/transactions",
            get(routes::transactions::list).post(routes::transactions::create),
        )
        .route("/api/transactions/upload", post(routes::transactions::upload))
        .route(
            "/api/transactions/upload/preview",
            post(routes::transactions::preview),
        )
        .route(
            "/api/transactions/:id",
            put(routes::transactions::update).delete(routes::transactions::remove),
        )
        .route(
            "/api/holdings",
            get(routes::holdings::list).post(routes::holdings::create),
        )
        .route("/api/holdings/upload", post(routes::holdings::upload))
        .route(
            "/api/holdings/upload/preview",
            post(routes::holdings::preview),
        )
        .route(
            "/api/holdings/:id",
            put(routes::holdings::update).delete(routes::holdings::remove),
        )
        .route(
            "/api/pockets",
            get(routes::pockets::list).post(routes::pockets::create),
        )
        .route("/api/pockets/:id/contribute", post(routes::pockets::contribute))
        .route("/api/summary", get(routes::summary::get_summary))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn start_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("pocketweb API listening on {}", addr);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use pocketweb_config::Config;
    use pocketweb_store::MemoryKvStore;
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-POCKETWEB-TEST";

    fn test_router() -> Router {
        let store: Box<dyn KvStore> = Box::new(MemoryKvStore::new());
        let state = AppState {
            books: Arc::new(Books::new(store, Config::default())),
        };
        create_router(state)
    }

    fn multipart_body(fields: &[(&str, &str)], file: Option<&str>) -> (String, String) {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            ));
        }
        if let Some(content) = file {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload.csv\"\r\nContent-Type: text/csv\r\n\r\n{}\r\n",
                BOUNDARY, content
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        let content_type = format!("multipart/form-data; boundary={}", BOUNDARY);
        (body, content_type)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_router()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_then_list() {
        let router = test_router();
        let statement = "Date,Description,Amount\r\n2024-01-05,Coffee,-4.50\r\n2024-01-06,Salary,2500\r\n";
        let (body, content_type) =
            multipart_body(&[("householdId", "fam1")], Some(statement));

        let response = router
            .clone()
            .oneshot(
                Request::post("/api/transactions/upload")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["successCount"], 2);
        assert_eq!(json["failureCount"], 0);

        let response = router
            .oneshot(
                Request::get("/api/transactions?householdId=fam1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["total"], 2);
        assert_eq!(json["transactions"][0]["description"], "Salary");
    }

    #[tokio::test]
    async fn test_upload_without_header_row_is_400() {
        let (body, content_type) =
            multipart_body(&[("memberId", "u1")], Some("1,2,3\r\n4,5,6\r\n"));
        let response = test_router()
            .oneshot(
                Request::post("/api/transactions/upload")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INGEST_FAILED");
    }

    #[tokio::test]
    async fn test_upload_preview_returns_mapping() {
        let (body, content_type) = multipart_body(
            &[],
            Some("Date,Memo,Withdrawal,Deposit\r\n2024-01-05,Coffee,4.50,\r\n"),
        );
        let response = test_router()
            .oneshot(
                Request::post("/api/transactions/upload/preview")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["header"][1], "Memo");
        assert_eq!(json["proposed"]["schema"], "transaction");
        assert_eq!(json["proposed"]["description"], 1);
        assert_eq!(json["sampleRows"][0][0], "2024-01-05");
    }

    #[tokio::test]
    async fn test_list_without_scope_is_400() {
        let response = test_router()
            .oneshot(
                Request::get("/api/transactions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pocket_lifecycle_over_http() {
        let router = test_router();
        let response = router
            .clone()
            .oneshot(
                Request::post("/api/pockets?householdId=fam1")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"name": "Vacation", "targetAmount": 2000}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let id = json["pocket"]["id"].as_str().unwrap().to_string();

        let response = router
            .oneshot(
                Request::post(format!("/api/pockets/{}/contribute?householdId=fam1", id))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"amount": 150}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["pocket"]["currentAmount"], 150.0);
    }
}
