use std::sync::Arc;

use tracing::{debug, warn};

use todo_core::{validate_content, Todo, TodoId, TodoPage};

use crate::api::{TodoApi, TodoService};
use crate::error::ClientError;

/// Page size used by the feed.
pub const CLIENT_PAGE_SIZE: u32 = 2;

/// Client-side entry point for the feed: wraps the remote calls and does the
/// checks that need no round trip.
#[derive(Clone)]
pub struct TodoController {
    service: Arc<dyn TodoService>,
}

impl TodoController {
    pub fn new(service: Arc<dyn TodoService>) -> Self {
        Self { service }
    }

    pub fn from_url(base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(TodoApi::new(base_url)))
    }

    /// Fetch one page of [`CLIENT_PAGE_SIZE`] todos.
    pub async fn get(&self, page: u32) -> Result<TodoPage, ClientError> {
        self.service.list(page, CLIENT_PAGE_SIZE).await
    }

    /// Create a todo, reporting the outcome through exactly one callback.
    ///
    /// Empty content goes straight to `on_error` without a request.
    pub async fn create<S, E>(&self, content: &str, on_success: S, on_error: E)
    where
        S: FnOnce(Todo),
        E: FnOnce(ClientError),
    {
        if let Err(err) = validate_content(content) {
            debug!("rejected empty content");
            on_error(ClientError::Validation(err.to_string()));
            return;
        }
        match self.service.create(content).await {
            Ok(todo) => on_success(todo),
            Err(err) => {
                warn!(error = %err, "create failed");
                on_error(err);
            }
        }
    }

    /// Run `update_todo_on_screen` first, then ask the server to flip `done`.
    pub async fn toggle_done(
        &self,
        id: &TodoId,
        update_todo_on_screen: impl FnOnce(),
    ) -> Result<Todo, ClientError> {
        update_todo_on_screen();
        self.service.toggle_done(id).await
    }

    pub async fn delete_by_id(&self, id: &TodoId) -> Result<(), ClientError> {
        self.service.delete(id).await
    }
}

/// Case-insensitive substring match on content, keeping input order.
pub fn filter_todos_by_content<'a>(search: &str, todos: &'a [Todo]) -> Vec<&'a Todo> {
    let needle = search.to_lowercase();
    todos
        .iter()
        .filter(|t| t.content.to_lowercase().contains(&needle))
        .collect()
}
