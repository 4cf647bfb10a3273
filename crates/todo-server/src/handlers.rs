//! Handlers for the `/api/todos` routes.
//!
//! Each handler validates its own inputs and maps repository errors through
//! [`ApiError`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tokio::task;
use tracing::{debug, info};

use todo_core::{
    validate_content, CreateTodoRequest, PageRequest, TodoEnvelope, TodoError, TodoId, TodoPage,
};
use todo_store::TodoRepo;

use crate::error::ApiError;
use crate::server::AppState;

/// Raw `page`/`limit` query values, parsed by hand for field-specific errors.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    pub fn to_request(&self) -> Result<PageRequest, ApiError> {
        let page = parse_number_param("page", self.page.as_deref())?;
        let limit = parse_number_param("limit", self.limit.as_deref())?;
        Ok(PageRequest::new(page, limit))
    }
}

/// Accepts any finite numeral (`2`, `2.0`, `1e1`) and floors it. Values
/// beyond `i64` saturate. An empty value counts as absent.
fn parse_number_param(name: &str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    let invalid = || ApiError::field(name, format!("{name} must be a number"));
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => {
            let n = v.parse::<f64>().map_err(|_| invalid())?;
            if !n.is_finite() {
                return Err(invalid());
            }
            // `as` saturates at the i64 bounds.
            Ok(Some(n.floor() as i64))
        }
    }
}

/// Run a repository call on the blocking pool. Every store does synchronous
/// file or SQLite I/O.
pub(crate) async fn run_blocking<T, F>(repo: &TodoRepo, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&TodoRepo) -> Result<T, TodoError> + Send + 'static,
    T: Send + 'static,
{
    let repo = repo.clone();
    let result = task::spawn_blocking(move || f(&repo))
        .await
        .map_err(|e| ApiError::Internal(format!("repository task failed: {e}")))?;
    Ok(result?)
}

/// GET /api/todos
pub async fn list_todos(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<TodoPage>, ApiError> {
    let req = params.to_request()?;
    let page = run_blocking(&state.repo, move |repo| repo.list(req)).await?;
    Ok(Json(page))
}

/// POST /api/todos
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoEnvelope>), ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "rejected create body");
        ApiError::field(
            "content",
            format!(
                "body must be a JSON object with a string `content`: {}",
                rejection.body_text()
            ),
        )
    })?;
    validate_content(&body.content)?;

    let content = body.content;
    let todo = run_blocking(&state.repo, move |repo| repo.create_by_content(&content)).await?;
    info!(todo_id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(TodoEnvelope { todo })))
}

/// PUT /api/todos/{id}/toggle-done
pub async fn toggle_done(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoEnvelope>, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::field("id", "id is required"));
    }
    let id = TodoId::from_raw(id);
    let todo = run_blocking(&state.repo, move |repo| repo.toggle_done(&id)).await?;
    Ok(Json(TodoEnvelope { todo }))
}

/// DELETE /api/todos/{id}
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = TodoId::parse_uuid(id.trim())
        .ok_or_else(|| ApiError::field("id", "id must be a valid UUID"))?;
    let target = id.clone();
    run_blocking(&state.repo, move |repo| repo.delete_by_id(&target)).await?;
    info!(todo_id = %id, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::{mpsc, Arc, Mutex};
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::Router;
    use serde_json::Value;
    use todo_core::{Todo, TodoPatch};
    use todo_store::{JsonFileStore, MemoryStore, StoreError, TodoStore};
    use tower::ServiceExt;

    use crate::server::build_router;

    use super::*;

    fn app() -> (Router, TodoRepo) {
        let repo = TodoRepo::new(Arc::new(MemoryStore::new()));
        (build_router(AppState::new(repo.clone())), repo)
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn contents(body: &Value) -> Vec<&str> {
        body["todos"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["content"].as_str().unwrap())
            .collect()
    }

    // ── list ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn list_pages_newest_first() {
        let (app, repo) = app();
        for c in ["A", "B", "C"] {
            repo.create_by_content(c).unwrap();
        }

        let (status, body) = send(app.clone(), Method::GET, "/api/todos?page=1&limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["pages"], 2);
        assert_eq!(contents(&body), ["C", "B"]);

        let (_, body) = send(app, Method::GET, "/api/todos?page=2&limit=2", None).await;
        assert_eq!(contents(&body), ["A"]);
    }

    #[tokio::test]
    async fn list_defaults_without_params() {
        let (app, repo) = app();
        for i in 0..12 {
            repo.create_by_content(&format!("todo {i}")).unwrap();
        }
        let (status, body) = send(app, Method::GET, "/api/todos", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["todos"].as_array().unwrap().len(), 10);
        assert_eq!(body["pages"], 2);
    }

    #[tokio::test]
    async fn list_rejects_non_numeric_page() {
        let (app, _) = app();
        let (status, body) = send(app, Method::GET, "/api/todos?page=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["field"], "page");
        assert_eq!(body["error"]["message"], "page must be a number");
    }

    #[tokio::test]
    async fn list_rejects_non_numeric_limit() {
        let (app, _) = app();
        let (status, body) = send(app, Method::GET, "/api/todos?limit=ten", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "limit");
    }

    #[tokio::test]
    async fn list_accepts_decimal_and_exponent_numerals() {
        let (app, repo) = app();
        for i in 0..12 {
            repo.create_by_content(&format!("todo {i}")).unwrap();
        }

        let (status, body) = send(app.clone(), Method::GET, "/api/todos?page=1.0&limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(contents(&body), ["todo 11", "todo 10"]);

        let (status, body) = send(app.clone(), Method::GET, "/api/todos?limit=1e1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["todos"].as_array().unwrap().len(), 10);

        let (status, body) = send(app, Method::GET, "/api/todos?page=2.7&limit=5", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(contents(&body)[0], "todo 6");
    }

    #[tokio::test]
    async fn list_huge_page_is_empty_not_rejected() {
        let (app, repo) = app();
        repo.create_by_content("A").unwrap();
        let (status, body) =
            send(app, Method::GET, "/api/todos?page=99999999999999999999", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["todos"].as_array().unwrap().is_empty());
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn list_rejects_non_finite_numbers() {
        for query in ["page=NaN", "limit=inf", "page=-infinity"] {
            let (app, _) = app();
            let uri = format!("/api/todos?{query}");
            let (status, body) = send(app, Method::GET, &uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn list_clamps_zero_and_negative() {
        let (app, repo) = app();
        repo.create_by_content("A").unwrap();
        repo.create_by_content("B").unwrap();
        let (status, body) = send(app, Method::GET, "/api/todos?page=0&limit=-1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(contents(&body), ["B"]);
        assert_eq!(body["pages"], 2);
    }

    #[tokio::test]
    async fn list_past_end_is_empty() {
        let (app, repo) = app();
        repo.create_by_content("A").unwrap();
        let (status, body) = send(app, Method::GET, "/api/todos?page=9&limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["todos"].as_array().unwrap().is_empty());
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn list_storage_failure_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(&dir.path().join("db.json")).unwrap();
        std::fs::write(store.path(), "{broken").unwrap();
        let app = build_router(AppState::new(TodoRepo::new(Arc::new(store))));

        let (status, body) = send(app, Method::GET, "/api/todos", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], crate::error::INTERNAL_MESSAGE);
    }

    // ── create ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn create_returns_201_with_todo() {
        let (app, repo) = app();
        let (status, body) = send(
            app,
            Method::POST,
            "/api/todos",
            Some(r#"{"content":"Estudar"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["todo"]["content"], "Estudar");
        assert_eq!(body["todo"]["done"], false);
        assert!(!body["todo"]["id"].as_str().unwrap().is_empty());
        assert_eq!(repo.store().count().unwrap(), 1);
    }

    #[tokio::test]
    async fn create_without_content_persists_nothing() {
        let (app, repo) = app();
        let (status, body) = send(app, Method::POST, "/api/todos", Some("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "content");
        assert_eq!(repo.store().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn create_rejects_empty_and_non_string_content() {
        for payload in [r#"{"content":""}"#, r#"{"content":5}"#, "nope"] {
            let (app, repo) = app();
            let (status, _) = send(app, Method::POST, "/api/todos", Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
            assert_eq!(repo.store().count().unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn create_keeps_whitespace_content() {
        let (app, repo) = app();
        let (status, body) =
            send(app, Method::POST, "/api/todos", Some(r#"{"content":"   "}"#)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["todo"]["content"], "   ");
        assert_eq!(repo.store().count().unwrap(), 1);
    }

    #[tokio::test]
    async fn create_without_content_type_is_400() {
        let (app, _) = app();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/todos")
            .body(Body::from(r#"{"content":"x"}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // ── toggle ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn toggle_flips_done() {
        let (app, repo) = app();
        let todo = repo.create_by_content("A").unwrap();
        let uri = format!("/api/todos/{}/toggle-done", todo.id);

        let (status, body) = send(app.clone(), Method::PUT, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["todo"]["done"], true);
        assert_eq!(body["todo"]["id"], todo.id.as_str());

        let (_, body) = send(app, Method::PUT, &uri, None).await;
        assert_eq!(body["todo"]["done"], false);
    }

    #[tokio::test]
    async fn toggle_unknown_is_404_with_message() {
        let (app, _) = app();
        let (status, body) = send(app, Method::PUT, "/api/todos/missing/toggle-done", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "TODO_NOT_FOUND");
        assert_eq!(body["error"]["message"], "Todo with id \"missing\" not found");
    }

    #[tokio::test]
    async fn toggle_blank_id_is_400() {
        let (app, _) = app();
        let (status, body) = send(app, Method::PUT, "/api/todos/%20/toggle-done", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "id");
    }

    // ── delete ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn delete_returns_204_then_404() {
        let (app, repo) = app();
        let todo = repo.create_by_content("A").unwrap();
        let uri = format!("/api/todos/{}", todo.id);

        let (status, body) = send(app.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
        assert_eq!(repo.store().count().unwrap(), 0);

        let (status, _) = send(app.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let toggle = format!("/api/todos/{}/toggle-done", todo.id);
        let (status, _) = send(app, Method::PUT, &toggle, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_non_uuid_is_400() {
        let (app, _) = app();
        let (status, body) = send(app, Method::DELETE, "/api/todos/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "id must be a valid UUID");
    }

    #[tokio::test]
    async fn delete_unknown_uuid_is_404() {
        let (app, _) = app();
        let uri = format!("/api/todos/{}", TodoId::new());
        let (status, _) = send(app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_storage_failure_is_generic_500() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(&dir.path().join("db.json")).unwrap();
        std::fs::write(store.path(), "[1, 2").unwrap();
        let app = build_router(AppState::new(TodoRepo::new(Arc::new(store))));

        let uri = format!("/api/todos/{}", TodoId::new());
        let (status, body) = send(app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], crate::error::INTERNAL_MESSAGE);
    }

    // ── blocking pool ───────────────────────────────────────────────

    /// Store whose `count` waits for a release signal sent from the runtime.
    struct GatedStore {
        inner: MemoryStore,
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl TodoStore for GatedStore {
        fn kind(&self) -> &'static str {
            "gated"
        }

        fn read_all(&self) -> Result<Vec<Todo>, StoreError> {
            self.inner.read_all()
        }

        fn insert(&self, content: &str) -> Result<Todo, StoreError> {
            self.inner.insert(content)
        }

        fn replace(&self, id: &TodoId, patch: &TodoPatch) -> Result<Todo, StoreError> {
            self.inner.replace(id, patch)
        }

        fn remove(&self, id: &TodoId) -> Result<(), StoreError> {
            self.inner.remove(id)
        }

        fn clear(&self) -> Result<(), StoreError> {
            self.inner.clear()
        }

        fn count(&self) -> Result<usize, StoreError> {
            let gate = self.gate.lock().unwrap();
            gate.recv_timeout(Duration::from_secs(2))
                .map_err(|_| StoreError::Io("gate never opened".into()))?;
            self.inner.count()
        }
    }

    #[tokio::test]
    async fn store_calls_leave_the_runtime_free() {
        let (tx, rx) = mpsc::channel();
        let store = GatedStore {
            inner: MemoryStore::new(),
            gate: Mutex::new(rx),
        };
        let app = build_router(AppState::new(TodoRepo::new(Arc::new(store))));

        // The timer only fires if the handler is not holding the worker thread.
        let release = async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(());
        };
        let ((status, body), ()) = tokio::join!(send(app, Method::GET, "/api/todos", None), release);
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["total"], 0);
    }

    // ── params ──────────────────────────────────────────────────────

    #[test]
    fn fractional_params_floor_before_clamping() {
        let params = ListParams {
            page: Some("0.9".into()),
            limit: Some("3.99".into()),
        };
        let req = params.to_request().unwrap();
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 3);
    }

    #[test]
    fn empty_param_counts_as_absent() {
        let params = ListParams {
            page: Some(String::new()),
            limit: Some(" 3 ".into()),
        };
        let req = params.to_request().unwrap();
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 3);
    }
}
