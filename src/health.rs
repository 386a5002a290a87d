use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{error, instrument};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DbInfo {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub ssl: bool,
}

#[derive(Debug, Serialize)]
pub struct PingRow {
    pub ok: i32,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub db: DbInfo,
    pub rows: Vec<PingRow>,
}

/// Unlike every other endpoint this one reports the driver error verbatim.
#[derive(Debug, Serialize)]
pub struct HealthFailure {
    pub ok: bool,
    pub error: String,
    pub code: Option<String>,
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(ok) => {
            let db = &state.config.database;
            Json(HealthResponse {
                ok: true,
                db: DbInfo {
                    host: db.host.clone(),
                    port: db.port,
                    name: db.name.clone(),
                    ssl: db.ssl,
                },
                rows: vec![PingRow { ok }],
            })
            .into_response()
        }
        Err(e) => {
            error!(error = %e, "health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthFailure {
                    ok: false,
                    code: e.code(),
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{async_trait, http::StatusCode};

    use crate::{
        testing::TestApp,
        users::{
            repo::{StoreError, UserStore},
            repo_types::{Role, User, UserChanges},
        },
    };

    #[tokio::test]
    async fn reports_connection_metadata_without_credentials() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["db"]["host"], "db.test");
        assert_eq!(body["db"]["port"], 5432);
        assert_eq!(body["db"]["name"], "kms_test");
        assert_eq!(body["db"]["ssl"], false);
        assert_eq!(body["rows"][0]["ok"], 1);
        assert!(!body.to_string().contains("hunter2"));
    }

    struct DownStore;

    #[async_trait]
    impl UserStore for DownStore {
        async fn find_by_email(&self, _: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_by_id(&self, _: i64) -> Result<Option<User>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn list(&self) -> Result<Vec<User>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn insert(&self, _: &str, _: &str, _: Role) -> Result<User, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn update(&self, _: i64, _: &UserChanges) -> Result<bool, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn delete(&self, _: i64) -> Result<bool, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn ping(&self) -> Result<i32, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn store_outage_is_500_everywhere() {
        let app = TestApp::with_store(Arc::new(DownStore));

        let (status, body) = app.get("/api/health").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().contains("timed out"));

        let (status, body) = app.get("/api/users").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Terjadi kesalahan saat mengambil data user");
        assert!(!body.to_string().contains("timed out"));

        let (status, body) = app
            .post(
                "/api/login",
                serde_json::json!({ "email": "a@x.com", "password": "secret1" }),
            )
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Terjadi kesalahan saat login");

        let (status, _) = app.delete("/api/users/1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
