use parking_lot::Mutex;
use tracing::instrument;

use todo_core::todo::sort_newest_first;
use todo_core::{Todo, TodoId, TodoPatch};

use crate::error::StoreError;
use crate::store::{self, TodoStore};

/// Process-local backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    todos: Mutex<Vec<Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TodoStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn read_all(&self) -> Result<Vec<Todo>, StoreError> {
        let mut todos = self.todos.lock().clone();
        sort_newest_first(&mut todos);
        Ok(todos)
    }

    #[instrument(skip(self, content))]
    fn insert(&self, content: &str) -> Result<Todo, StoreError> {
        let todo = Todo::new(content);
        self.todos.lock().push(todo.clone());
        Ok(todo)
    }

    #[instrument(skip(self, patch), fields(todo_id = %id))]
    fn replace(&self, id: &TodoId, patch: &TodoPatch) -> Result<Todo, StoreError> {
        store::patch_in(&mut self.todos.lock(), id, patch)
    }

    #[instrument(skip(self), fields(todo_id = %id))]
    fn remove(&self, id: &TodoId) -> Result<(), StoreError> {
        store::remove_from(&mut self.todos.lock(), id)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.todos.lock().clear();
        Ok(())
    }
}
