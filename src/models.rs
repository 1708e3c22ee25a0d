use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// A todo that has not been stored yet.
///
/// The only way to build one is [`NewTodo::parse`], so every inserted title
/// is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    title: String,
}

impl NewTodo {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let title = raw.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title must not be empty".into()));
        }
        Ok(Self {
            title: title.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// JSON body returned when a todo is created.
#[derive(Debug, Serialize)]
pub struct TodoSummary {
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

impl From<Todo> for TodoSummary {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            completed: todo.completed,
        }
    }
}
