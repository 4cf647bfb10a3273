use todo_core::{Todo, TodoId, TodoPatch};

use crate::error::StoreError;

/// Persistence backend for todo records.
///
/// Implementations own the durable record set and persist every mutation
/// before returning. `read_all` and `read_page` always yield newest first.
///
/// Only the four core operations are required; the remaining methods have
/// defaults built on `read_all` that a backend with a query language should
/// override.
pub trait TodoStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn kind(&self) -> &'static str;

    fn read_all(&self) -> Result<Vec<Todo>, StoreError>;

    /// Store a new, not-done todo with a fresh id and the current date.
    fn insert(&self, content: &str) -> Result<Todo, StoreError>;

    /// Merge `patch` into the record with `id`.
    fn replace(&self, id: &TodoId, patch: &TodoPatch) -> Result<Todo, StoreError>;

    fn remove(&self, id: &TodoId) -> Result<(), StoreError>;

    /// Drop every record. Only the seeding routine calls this.
    fn clear(&self) -> Result<(), StoreError>;

    fn get(&self, id: &TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.read_all()?.into_iter().find(|t| &t.id == id))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.read_all()?.len())
    }

    fn read_page(&self, offset: usize, limit: usize) -> Result<Vec<Todo>, StoreError> {
        Ok(self
            .read_all()?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }
}

/// Patch the record with `id` inside an insertion-ordered list.
pub(crate) fn patch_in(
    todos: &mut [Todo],
    id: &TodoId,
    patch: &TodoPatch,
) -> Result<Todo, StoreError> {
    let todo = todos
        .iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    todo.apply(patch);
    Ok(todo.clone())
}

/// Remove the record with `id` from an insertion-ordered list.
pub(crate) fn remove_from(todos: &mut Vec<Todo>, id: &TodoId) -> Result<(), StoreError> {
    let before = todos.len();
    todos.retain(|t| &t.id != id);
    if todos.len() == before {
        return Err(StoreError::NotFound(id.to_string()));
    }
    Ok(())
}
