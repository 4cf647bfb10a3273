//! Explicit store seeding. Never runs as a side effect of opening a store.

use tracing::info;

use todo_core::{Todo, TodoPatch};

use crate::error::StoreError;
use crate::store::TodoStore;

/// Contents inserted by [`reseed`] when no custom list is given.
pub const DEFAULT_SEED: &[&str] = &["ToDo", "ToDo 2"];

/// Wipe `store` and repopulate it with the default demo data.
///
/// Besides the two kept records, this inserts a third one, renames it and
/// deletes it again, so a fresh data file exercises every write path once.
pub fn reseed(store: &dyn TodoStore) -> Result<Vec<Todo>, StoreError> {
    store.clear()?;
    for content in DEFAULT_SEED {
        store.insert(content)?;
    }

    let scratch = store.insert("ToDo 3")?;
    store.replace(&scratch.id, &TodoPatch::content("New Todo 3"))?;
    store.remove(&scratch.id)?;

    let todos = store.read_all()?;
    info!(backend = store.kind(), count = todos.len(), "store reseeded");
    Ok(todos)
}

/// Wipe `store` and insert `contents` in order.
pub fn reseed_with<S: AsRef<str>>(
    store: &dyn TodoStore,
    contents: &[S],
) -> Result<Vec<Todo>, StoreError> {
    store.clear()?;
    for content in contents {
        store.insert(content.as_ref())?;
    }
    let todos = store.read_all()?;
    info!(backend = store.kind(), count = todos.len(), "store reseeded");
    Ok(todos)
}
