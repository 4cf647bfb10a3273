use std::sync::Arc;

use tracing::{debug, instrument};

use todo_core::{PageRequest, Todo, TodoError, TodoId, TodoPage, TodoPatch};

use crate::store::TodoStore;

/// Stateless mediator between the HTTP layer and a [`TodoStore`].
///
/// Store failures come back as [`TodoError`]: unknown ids as `NotFound`,
/// everything else as `StorageUnavailable`. Content validation belongs to the
/// controllers and is not repeated here.
#[derive(Clone)]
pub struct TodoRepo {
    store: Arc<dyn TodoStore>,
}

impl TodoRepo {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn TodoStore> {
        &self.store
    }

    /// One page of todos, newest first. A page past the end is empty.
    #[instrument(skip(self), fields(page = req.page(), limit = req.limit()))]
    pub fn list(&self, req: PageRequest) -> Result<TodoPage, TodoError> {
        let total = self.store.count()?;
        let (start, end) = req.bounds(total);
        let todos = if start < end {
            self.store.read_page(start, end - start)?
        } else {
            Vec::new()
        };
        let pages = req.page_count(total);
        debug!(total, pages, returned = todos.len(), "listed todos");
        Ok(TodoPage {
            total,
            pages,
            todos,
        })
    }

    #[instrument(skip(self, content))]
    pub fn create_by_content(&self, content: &str) -> Result<Todo, TodoError> {
        let todo = self.store.insert(content)?;
        debug!(todo_id = %todo.id, "created todo");
        Ok(todo)
    }

    #[instrument(skip(self), fields(todo_id = %id))]
    pub fn toggle_done(&self, id: &TodoId) -> Result<Todo, TodoError> {
        let current = self.find(id)?;
        Ok(self.store.replace(id, &TodoPatch::done(!current.done))?)
    }

    #[instrument(skip(self, content), fields(todo_id = %id))]
    pub fn update_content_by_id(&self, id: &TodoId, content: &str) -> Result<Todo, TodoError> {
        self.find(id)?;
        Ok(self.store.replace(id, &TodoPatch::content(content))?)
    }

    #[instrument(skip(self), fields(todo_id = %id))]
    pub fn delete_by_id(&self, id: &TodoId) -> Result<(), TodoError> {
        self.find(id)?;
        self.store.remove(id)?;
        debug!("deleted todo");
        Ok(())
    }

    fn find(&self, id: &TodoId) -> Result<Todo, TodoError> {
        self.store
            .get(id)?
            .ok_or_else(|| TodoError::NotFound(id.to_string()))
    }
}
