//! In-memory view model for the paginated feed.
//!
//! Holds the loaded prefix of the newest-first sequence, the search text and
//! a per-todo sync state. Toggles are applied optimistically and rolled back
//! when the server rejects them.

use std::collections::HashMap;

use tracing::{debug, warn};

use todo_core::{Todo, TodoId};

use crate::controller::{filter_todos_by_content, TodoController};
use crate::error::ClientError;

/// Whether the server has acknowledged the last local change to a todo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    Pending,
    Confirmed,
    Failed,
}

pub struct TodoFeed {
    controller: TodoController,
    todos: Vec<Todo>,
    /// Last page loaded; 0 before the first load.
    page: u32,
    total_pages: u32,
    search: String,
    sync: HashMap<TodoId, SyncState>,
}

impl TodoFeed {
    pub fn new(controller: TodoController) -> Self {
        Self {
            controller,
            todos: Vec::new(),
            page: 0,
            total_pages: 0,
            search: String::new(),
            sync: HashMap::new(),
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn sync_state(&self, id: &TodoId) -> Option<SyncState> {
        self.sync.get(id).copied()
    }

    /// True until the first load, then while pages remain.
    pub fn has_more_pages(&self) -> bool {
        self.page == 0 || self.page < self.total_pages
    }

    /// Loaded todos matching the current search.
    pub fn visible(&self) -> Vec<&Todo> {
        filter_todos_by_content(&self.search, &self.todos)
    }

    /// Fetch the next page and append it. Returns how many todos arrived.
    pub async fn load_more(&mut self) -> Result<usize, ClientError> {
        let next = self.page + 1;
        let page = self.controller.get(next).await?;
        let count = page.todos.len();
        self.page = next;
        self.total_pages = page.pages;
        for todo in page.todos {
            self.sync.insert(todo.id.clone(), SyncState::Confirmed);
            self.todos.push(todo);
        }
        debug!(page = next, total_pages = self.total_pages, count, "loaded page");
        Ok(count)
    }

    /// Create a todo and put it at the top of the feed.
    pub async fn add(&mut self, content: &str) -> Result<(), ClientError> {
        let mut failure = None;
        let todos = &mut self.todos;
        let sync = &mut self.sync;
        self.controller
            .create(
                content,
                |todo| {
                    sync.insert(todo.id.clone(), SyncState::Confirmed);
                    todos.insert(0, todo);
                },
                |err| failure = Some(err),
            )
            .await;
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Flip `done` locally, then confirm with the server.
    ///
    /// On failure the local flip is undone and the todo is marked
    /// [`SyncState::Failed`].
    pub async fn toggle(&mut self, id: &TodoId) -> Result<(), ClientError> {
        let Some(index) = self.position(id) else {
            return Err(ClientError::Validation(format!("todo {id} is not loaded")));
        };
        let previous = self.todos[index].done;

        let todos = &mut self.todos;
        let sync = &mut self.sync;
        let result = self
            .controller
            .toggle_done(id, || {
                todos[index].done = !previous;
                sync.insert(id.clone(), SyncState::Pending);
            })
            .await;

        // The list may have changed while the request was in flight.
        let index = self.position(id);
        match result {
            Ok(confirmed) => {
                if let Some(i) = index {
                    self.todos[i] = confirmed;
                }
                self.sync.insert(id.clone(), SyncState::Confirmed);
                Ok(())
            }
            Err(err) => {
                warn!(todo_id = %id, error = %err, "toggle failed, rolling back");
                if let Some(i) = index {
                    self.todos[i].done = previous;
                }
                self.sync.insert(id.clone(), SyncState::Failed);
                Err(err)
            }
        }
    }

    /// Remove locally, then delete on the server. A server failure is logged
    /// and returned; the todo stays removed from the feed.
    pub async fn delete(&mut self, id: &TodoId) -> Result<(), ClientError> {
        self.todos.retain(|t| &t.id != id);
        self.sync.remove(id);
        if let Err(err) = self.controller.delete_by_id(id).await {
            warn!(todo_id = %id, error = %err, "delete failed");
            return Err(err);
        }
        Ok(())
    }

    fn position(&self, id: &TodoId) -> Option<usize> {
        self.todos.iter().position(|t| &t.id == id)
    }
}
