//! Ward todo use-case service.
//!
//! # Invariants
//! - Persisted todo text is trimmed and never empty.

use crate::model::todo::{Todo, TodoId};
use crate::repo::drug_repo::RepoError;
use crate::repo::todo_repo::TodoRepository;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum TodoServiceError {
    EmptyText,
    TodoNotFound(TodoId),
    Repo(RepoError),
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "todo text must not be blank"),
            Self::TodoNotFound(id) => write!(f, "todo not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TodoNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_todo(&self, text: &str) -> Result<Todo, TodoServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TodoServiceError::EmptyText);
        }
        let todo = Todo::new(text);
        self.repo.create_todo(&todo)?;
        Ok(todo)
    }

    /// Unchecked todos first, each group in creation order.
    pub fn list_todos(&self) -> Result<Vec<Todo>, TodoServiceError> {
        Ok(self.repo.list_todos()?)
    }

    /// Flips the check mark and returns the updated todo.
    pub fn toggle_todo(&self, id: TodoId) -> Result<Todo, TodoServiceError> {
        Ok(self.repo.toggle_checked(id)?)
    }

    pub fn delete_todo(&self, id: TodoId) -> Result<(), TodoServiceError> {
        Ok(self.repo.delete_todo(id)?)
    }
}
