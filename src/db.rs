use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::{NewTodo, Todo};

/// Persistence for todos.
///
/// Handlers only talk to this trait, so any store that can create, fetch,
/// list, update and delete rows can back the app.
pub trait TodoRepository: Clone + Send + Sync + 'static {
    fn create(&self, todo: NewTodo) -> impl Future<Output = Result<Todo, AppError>> + Send;
    fn get(&self, id: i64) -> impl Future<Output = Result<Option<Todo>, AppError>> + Send;
    /// All todos, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Todo>, AppError>> + Send;
    /// Writes the mutable fields of `todo`. Returns `false` if the row is gone.
    fn update(&self, todo: &Todo) -> impl Future<Output = Result<bool, AppError>> + Send;
    /// Returns `false` if there was nothing to delete.
    fn delete(&self, id: i64) -> impl Future<Output = Result<bool, AppError>> + Send;
}

const SELECT_TODO: &str = "SELECT id, title, completed, created_at FROM todos";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn connect<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("opening database at {}", path.as_ref().display()))?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        migrate(&conn).context("creating todos table")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let value = tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await??;
        Ok(value)
    }
}

fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        "#,
    )
}

impl TodoRepository for Database {
    async fn create(&self, todo: NewTodo) -> Result<Todo, AppError> {
        // Stored with fixed precision so that text order matches time order.
        let now = Utc::now().trunc_subsecs(6);
        let created = self
            .with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO todos (title, completed, created_at) VALUES (?1, 0, ?2)",
                    params![todo.title(), format_datetime(&now)],
                )?;
                Ok(Todo {
                    id: conn.last_insert_rowid(),
                    title: todo.title().to_string(),
                    completed: false,
                    created_at: now,
                })
            })
            .await?;
        tracing::info!(id = created.id, title = %created.title, "todo created");
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<Todo>, AppError> {
        tracing::debug!(id, "looking up todo");
        self.with_conn(move |conn| {
            conn.query_row(&format!("{SELECT_TODO} WHERE id = ?1"), params![id], todo_from_row)
                .optional()
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Todo>, AppError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("{SELECT_TODO} ORDER BY created_at DESC, id DESC"))?;
            let rows = stmt.query_map([], todo_from_row)?;
            rows.collect()
        })
        .await
    }

    async fn update(&self, todo: &Todo) -> Result<bool, AppError> {
        let (id, completed) = (todo.id, todo.completed);
        let updated = self
            .with_conn(move |conn| {
                conn.execute(
                    "UPDATE todos SET completed = ?1 WHERE id = ?2",
                    params![completed, id],
                )
            })
            .await?;
        if updated > 0 {
            tracing::info!(id, completed, "todo updated");
        }
        Ok(updated > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let deleted = self
            .with_conn(move |conn| conn.execute("DELETE FROM todos WHERE id = ?1", params![id]))
            .await?;
        if deleted > 0 {
            tracing::info!(id, "todo deleted");
        }
        Ok(deleted > 0)
    }
}

fn todo_from_row(row: &Row<'_>) -> rusqlite::Result<Todo> {
    let created_at: String = row.get(3)?;
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        completed: row.get(2)?,
        created_at: parse_datetime(&created_at)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
    })
}

fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}
