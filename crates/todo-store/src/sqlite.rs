use tracing::instrument;

use todo_core::{Todo, TodoId, TodoPatch};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::{self, TODO_COLUMNS};
use crate::store::TodoStore;

/// Relational backend over the `todos` table.
///
/// Ordering, counting, lookups and paging are pushed down into SQL.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn query_todos(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Todo>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let mut rows = stmt.query(params)?;
            let mut todos = Vec::new();
            while let Some(row) = rows.next()? {
                todos.push(row_helpers::todo_from_row(row)?);
            }
            Ok(todos)
        })
    }
}

// Dates are stored in fixed-width millisecond RFC 3339, so text order is time order.
const NEWEST_FIRST: &str = "ORDER BY date DESC, rowid DESC";

impl TodoStore for SqliteStore {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    #[instrument(skip(self))]
    fn read_all(&self) -> Result<Vec<Todo>, StoreError> {
        self.query_todos(
            &format!("SELECT {TODO_COLUMNS} FROM todos {NEWEST_FIRST}"),
            [],
        )
    }

    #[instrument(skip(self, content))]
    fn insert(&self, content: &str) -> Result<Todo, StoreError> {
        let todo = Todo::new(content);
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO todos (id, date, content, done) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![todo.id.as_str(), todo.date_string(), todo.content, todo.done],
            )?;
            Ok(())
        })?;
        Ok(todo)
    }

    #[instrument(skip(self, patch), fields(todo_id = %id))]
    fn replace(&self, id: &TodoId, patch: &TodoPatch) -> Result<Todo, StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE todos SET content = COALESCE(?2, content), done = COALESCE(?3, done)
                 WHERE id = ?1",
                rusqlite::params![id.as_str(), patch.content, patch.done],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Ok(())
        })?;
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    #[instrument(skip(self), fields(todo_id = %id))]
    fn remove(&self, id: &TodoId) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM todos WHERE id = ?1", [id.as_str()])?;
            if changed == 0 {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Ok(())
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM todos", [])?;
            Ok(())
        })
    }

    #[instrument(skip(self), fields(todo_id = %id))]
    fn get(&self, id: &TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self
            .query_todos(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
                [id.as_str()],
            )?
            .into_iter()
            .next())
    }

    fn count(&self) -> Result<usize, StoreError> {
        self.db.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM todos", [], |row| row.get(0))?;
            Ok(n as usize)
        })
    }

    #[instrument(skip(self))]
    fn read_page(&self, offset: usize, limit: usize) -> Result<Vec<Todo>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        self.query_todos(
            &format!("SELECT {TODO_COLUMNS} FROM todos {NEWEST_FIRST} LIMIT ?1 OFFSET ?2"),
            [limit, offset],
        )
    }
}
