use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use todo_core::{PageRequest, Todo, TodoId, TodoPage};

use crate::api::TodoService;
use crate::error::ClientError;

/// In-process [`TodoService`] with switchable failures.
#[derive(Default)]
pub(crate) struct FakeService {
    /// Insertion order; listing reverses it.
    todos: Mutex<Vec<Todo>>,
    pub fail_toggle: AtomicBool,
    pub fail_delete: AtomicBool,
    pub calls: AtomicUsize,
}

impl FakeService {
    pub fn with_contents(contents: &[&str]) -> Self {
        let fake = Self::default();
        fake.todos
            .lock()
            .extend(contents.iter().map(|c| Todo::new(*c)));
        fake
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<Todo> {
        self.todos.lock().iter().rev().cloned().collect()
    }

    fn not_found(id: &TodoId) -> ClientError {
        ClientError::Api {
            status: 404,
            code: Some("TODO_NOT_FOUND".into()),
            message: format!("Todo with id \"{id}\" not found"),
        }
    }

    fn unavailable() -> ClientError {
        ClientError::Api {
            status: 500,
            code: Some("INTERNAL_ERROR".into()),
            message: "An internal error occurred".into(),
        }
    }
}

#[async_trait]
impl TodoService for FakeService {
    async fn list(&self, page: u32, limit: u32) -> Result<TodoPage, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let all = self.snapshot();
        let req = PageRequest::new(Some(i64::from(page)), Some(i64::from(limit)));
        let (start, end) = req.bounds(all.len());
        Ok(TodoPage {
            total: all.len(),
            pages: req.page_count(all.len()),
            todos: all[start..end].to_vec(),
        })
    }

    async fn create(&self, content: &str) -> Result<Todo, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let todo = Todo::new(content);
        self.todos.lock().push(todo.clone());
        Ok(todo)
    }

    async fn toggle_done(&self, id: &TodoId) -> Result<Todo, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_toggle.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut todos = self.todos.lock();
        let todo = todos
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        todo.done = !todo.done;
        Ok(todo.clone())
    }

    async fn delete(&self, id: &TodoId) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut todos = self.todos.lock();
        let before = todos.len();
        todos.retain(|t| &t.id != id);
        if todos.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
