//! HTTP access to the todo server.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use tracing::{debug, instrument};

use todo_core::{CreateTodoRequest, ErrorBody, Todo, TodoEnvelope, TodoId, TodoPage};

use crate::error::ClientError;

/// The four remote operations the controller needs.
#[async_trait]
pub trait TodoService: Send + Sync {
    async fn list(&self, page: u32, limit: u32) -> Result<TodoPage, ClientError>;
    async fn create(&self, content: &str) -> Result<Todo, ClientError>;
    async fn toggle_done(&self, id: &TodoId) -> Result<Todo, ClientError>;
    async fn delete(&self, id: &TodoId) -> Result<(), ClientError>;
}

/// reqwest-backed [`TodoService`].
#[derive(Clone, Debug)]
pub struct TodoApi {
    http: reqwest::Client,
    base_url: String,
}

impl TodoApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Pass success responses through; turn anything else into `ClientError::Api`.
async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    Err(api_error(status, &text))
}

fn api_error(status: StatusCode, text: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => ClientError::Api {
            status: status.as_u16(),
            code: Some(body.error.code),
            message: body.error.message,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            code: None,
            message: if text.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                text.to_string()
            },
        },
    }
}

#[async_trait]
impl TodoService for TodoApi {
    #[instrument(skip(self))]
    async fn list(&self, page: u32, limit: u32) -> Result<TodoPage, ClientError> {
        let url = self.url(&format!("/api/todos?page={page}&limit={limit}"));
        let resp = check(self.http.get(url).send().await?).await?;
        let page: TodoPage = resp.json().await?;
        debug!(total = page.total, pages = page.pages, "fetched page");
        Ok(page)
    }

    #[instrument(skip(self, content))]
    async fn create(&self, content: &str) -> Result<Todo, ClientError> {
        let body = CreateTodoRequest {
            content: content.to_string(),
        };
        let resp = self
            .http
            .post(self.url("/api/todos"))
            .json(&body)
            .send()
            .await?;
        let envelope: TodoEnvelope = check(resp).await?.json().await?;
        Ok(envelope.todo)
    }

    #[instrument(skip(self), fields(todo_id = %id))]
    async fn toggle_done(&self, id: &TodoId) -> Result<Todo, ClientError> {
        let url = self.url(&format!("/api/todos/{id}/toggle-done"));
        let envelope: TodoEnvelope = check(self.http.put(url).send().await?)
            .await?
            .json()
            .await?;
        Ok(envelope.todo)
    }

    #[instrument(skip(self), fields(todo_id = %id))]
    async fn delete(&self, id: &TodoId) -> Result<(), ClientError> {
        let url = self.url(&format!("/api/todos/{id}"));
        check(self.http.delete(url).send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let api = TodoApi::new("http://localhost:3000/");
        assert_eq!(api.base_url(), "http://localhost:3000");
        assert_eq!(api.url("/api/todos"), "http://localhost:3000/api/todos");
    }

    #[test]
    fn structured_error_body_decoded() {
        let err = api_error(
            StatusCode::NOT_FOUND,
            r#"{"error":{"code":"TODO_NOT_FOUND","message":"Todo with id \"x\" not found"}}"#,
        );
        match err {
            ClientError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 404);
                assert_eq!(code.as_deref(), Some("TODO_NOT_FOUND"));
                assert_eq!(message, "Todo with id \"x\" not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn plain_error_body_kept_as_message() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, ClientError::Api { status: 502, code: None, ref message } if message == "upstream down"));

        let err = api_error(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert!(matches!(err, ClientError::Api { ref message, .. } if message == "Internal Server Error"));
    }
}
