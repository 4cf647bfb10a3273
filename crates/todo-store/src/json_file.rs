use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use todo_core::todo::sort_newest_first;
use todo_core::{Todo, TodoId, TodoPatch};

use crate::error::StoreError;
use crate::store::{self, TodoStore};

/// On-disk layout: `{ "todos": [...] }`, records in insertion order.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(default)]
    todos: Vec<Todo>,
}

/// Flat-file backend holding every record in one JSON document.
///
/// Each mutation reads the whole document, edits it in memory and rewrites
/// the file through a temp file + rename. The mutex only serialises writers
/// inside this process.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store at `path`, creating parent directories. The file itself
    /// is created lazily on first write.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("create dir: {e}")))?;
        }
        info!(path = %path.display(), "json store opened");
        Ok(Self {
            path: path.to_owned(),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Todo>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(format!("read {}: {e}", self.path.display()))),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let doc: TodoDocument = serde_json::from_str(&raw)?;
        Ok(doc.todos)
    }

    fn save(&self, todos: Vec<Todo>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&TodoDocument { todos })?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "json store written");
        Ok(())
    }

    /// Run a read-modify-write cycle under the process lock.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Vec<Todo>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock.lock();
        let mut todos = self.load()?;
        let out = f(&mut todos)?;
        self.save(todos)?;
        Ok(out)
    }
}

impl TodoStore for JsonFileStore {
    fn kind(&self) -> &'static str {
        "json"
    }

    fn read_all(&self) -> Result<Vec<Todo>, StoreError> {
        let _guard = self.lock.lock();
        let mut todos = self.load()?;
        sort_newest_first(&mut todos);
        Ok(todos)
    }

    #[instrument(skip(self, content))]
    fn insert(&self, content: &str) -> Result<Todo, StoreError> {
        let todo = Todo::new(content);
        self.mutate(|todos| {
            todos.push(todo.clone());
            Ok(())
        })?;
        Ok(todo)
    }

    #[instrument(skip(self, patch), fields(todo_id = %id))]
    fn replace(&self, id: &TodoId, patch: &TodoPatch) -> Result<Todo, StoreError> {
        self.mutate(|todos| store::patch_in(todos, id, patch))
    }

    #[instrument(skip(self), fields(todo_id = %id))]
    fn remove(&self, id: &TodoId) -> Result<(), StoreError> {
        self.mutate(|todos| store::remove_from(todos, id))
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        self.save(Vec::new())
    }
}
