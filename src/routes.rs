use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::db::TodoRepository;
use crate::error::AppError;
use crate::models::{NewTodo, TodoSummary};
use crate::views;

const LIST_PATH: &str = "/todos/";

#[derive(Clone)]
pub struct AppState<R> {
    pub repo: R,
}

pub fn router<R: TodoRepository>(repo: R) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!("http_request", method = ?request.method(), uri = %request.uri())
    });

    Router::new()
        .route("/", get(|| async { redirect_to_list() }))
        .route("/todos", get(|| async { redirect_to_list() }))
        .route(LIST_PATH, get(list_todos::<R>))
        .route(
            "/todos/add/",
            post(add_todo::<R>).fallback(method_not_allowed),
        )
        .route("/todos/:id/", get(todo_detail::<R>))
        .route(
            "/todos/:id/toggle/",
            post(toggle_todo::<R>).fallback(method_not_allowed),
        )
        .route(
            "/todos/:id/delete/",
            post(delete_todo::<R>).fallback(method_not_allowed),
        )
        .layer(trace_layer)
        .with_state(AppState { repo })
}

async fn list_todos<R: TodoRepository>(
    State(state): State<AppState<R>>,
) -> Result<Html<String>, AppError> {
    let todos = state.repo.list().await?;
    Ok(Html(views::render_list(&todos)))
}

async fn todo_detail<R: TodoRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let todo = state.repo.get(id).await?.ok_or(AppError::NotFound(id))?;
    Ok(Html(views::render_detail(&todo)))
}

async fn add_todo<R: TodoRepository>(
    State(state): State<AppState<R>>,
    body: Bytes,
) -> Result<(StatusCode, Json<TodoSummary>), AppError> {
    let title = submitted_title(&body).unwrap_or_default();
    let new_todo = NewTodo::parse(&title)?;
    let todo = state.repo.create(new_todo).await?;
    Ok((StatusCode::CREATED, Json(todo.into())))
}

async fn toggle_todo<R: TodoRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let mut todo = state.repo.get(id).await?.ok_or(AppError::NotFound(id))?;
    todo.toggle();
    // The row can vanish between the lookup and the write.
    if !state.repo.update(&todo).await? {
        return Err(AppError::NotFound(id));
    }
    Ok(redirect_to_list())
}

async fn delete_todo<R: TodoRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    if !state.repo.delete(id).await? {
        return Err(AppError::NotFound(id));
    }
    Ok(redirect_to_list())
}

/// Last `title` field of a url-encoded body. Bodies that do not decode
/// carry no title.
fn submitted_title(body: &[u8]) -> Option<String> {
    let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body).ok()?;
    fields
        .into_iter()
        .rev()
        .find_map(|(key, value)| (key == "title").then_some(value))
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn redirect_to_list() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, LIST_PATH)]).into_response()
}
