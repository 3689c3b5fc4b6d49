//! Ward todo repository.
//!
//! # Invariants
//! - Listing order is unchecked before checked, then insertion order.

use crate::model::todo::{Todo, TodoId};
use crate::repo::drug_repo::{RepoError, RepoResult};
use crate::repo::{bool_to_int, ensure_tables, parse_flag, parse_uuid};
use rusqlite::{params, Connection, Row};

const TODO_SELECT_SQL: &str = "SELECT uuid, text, is_checked FROM todos";

pub trait TodoRepository {
    fn create_todo(&self, todo: &Todo) -> RepoResult<TodoId>;
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>>;
    fn list_todos(&self) -> RepoResult<Vec<Todo>>;
    /// Flips the check mark in one statement and returns the stored todo.
    fn toggle_checked(&self, id: TodoId) -> RepoResult<Todo>;
    fn delete_todo(&self, id: TodoId) -> RepoResult<()>;
}

pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["todos"])?;
        Ok(Self { conn })
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_todo(&self, todo: &Todo) -> RepoResult<TodoId> {
        self.conn.execute(
            "INSERT INTO todos (uuid, text, is_checked) VALUES (?1, ?2, ?3);",
            params![
                todo.uuid.to_string(),
                todo.text.as_str(),
                bool_to_int(todo.is_checked),
            ],
        )?;
        Ok(todo.uuid)
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }
        Ok(None)
    }

    fn list_todos(&self) -> RepoResult<Vec<Todo>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_SELECT_SQL} ORDER BY is_checked ASC, created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }
        Ok(todos)
    }

    fn toggle_checked(&self, id: TodoId) -> RepoResult<Todo> {
        let mut stmt = self.conn.prepare(
            "UPDATE todos SET is_checked = 1 - is_checked
             WHERE uuid = ?1
             RETURNING uuid, text, is_checked;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => parse_todo_row(row),
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM todos WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Todo {
        uuid: parse_uuid(&uuid_text, "todos.uuid")?,
        text: row.get("text")?,
        is_checked: parse_flag(row.get("is_checked")?, "todos.is_checked")?,
    })
}
