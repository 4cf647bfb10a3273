use todo_core::todo::parse_date;
use todo_core::{Todo, TodoId};

use crate::error::StoreError;

pub const TODO_COLUMNS: &str = "id, date, content, done";

/// Get a required column value from a row, returning CorruptRow on failure.
pub fn get<T: rusqlite::types::FromSql>(
    row: &rusqlite::Row<'_>,
    idx: usize,
    table: &'static str,
    column: &'static str,
) -> Result<T, StoreError> {
    row.get(idx).map_err(|e| StoreError::CorruptRow {
        table,
        column,
        detail: e.to_string(),
    })
}

/// Map a row selected with [`TODO_COLUMNS`] into a [`Todo`].
pub fn todo_from_row(row: &rusqlite::Row<'_>) -> Result<Todo, StoreError> {
    let raw_date: String = get(row, 1, "todos", "date")?;
    let date = parse_date(&raw_date).map_err(|e| StoreError::CorruptRow {
        table: "todos",
        column: "date",
        detail: format!("invalid timestamp {raw_date:?}: {e}"),
    })?;

    Ok(Todo {
        id: TodoId::from_raw(get::<String>(row, 0, "todos", "id")?),
        date,
        content: get(row, 2, "todos", "content")?,
        done: get(row, 3, "todos", "done")?,
    })
}
