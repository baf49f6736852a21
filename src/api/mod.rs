//! JSON API routes under `/api/v1/`.
//!
//! Every success body is wrapped as `{"data": …}`; every failure as
//! `{"error": …}` (see [`ApiError`]).

mod error;

pub use error::ApiError;

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::models::{Todo, TodoListItem};
use crate::request::Request;
use crate::response::Json;
use crate::schema::{NewTodo, TodoPatch};
use crate::status::Status;
use crate::store::Store;

pub const TODOS_PATH: &str = "/api/v1/todos/";
pub const TODO_PATH: &str = "/api/v1/todos/{id}/";
pub const COUNTER_PATH: &str = "/api/v1/add";

/// The `{"data": …}` envelope.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

type ApiResult<T> = Result<Json<Data<T>>, ApiError>;

/// `GET /api/v1/todos/`
pub async fn list_todos(store: Store, _req: Request) -> ApiResult<Vec<TodoListItem>> {
    let todos = store.list_todos().await?;
    let data = todos.into_iter().map(TodoListItem::from).collect();
    Ok(Json::new(Data { data }))
}

/// `POST /api/v1/todos/`
pub async fn create_todo(store: Store, req: Request) -> ApiResult<Todo> {
    let new = NewTodo::from_json(req.body()).map_err(ApiError::unprocessable)?;
    let todo = store.insert_todo(new).await?;
    info!(id = todo.id, "todo created");
    Ok(Json::with_status(Status::Created, Data { data: todo }))
}

/// `GET /api/v1/todos/{id}/`
pub async fn get_todo(store: Store, req: Request) -> ApiResult<Todo> {
    let raw = req.param("id").unwrap_or_default();
    let id: i64 = raw
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid id: {raw}")))?;
    match store.get_todo(id).await? {
        Some(todo) => Ok(Json::new(Data { data: todo })),
        None => Err(not_found(id)),
    }
}

/// `PATCH /api/v1/todos/`
///
/// Validates every present field before touching the store, so a rejected
/// request leaves the record as it was.
pub async fn update_todo(store: Store, req: Request) -> ApiResult<Todo> {
    let TodoPatch { id, changes } = TodoPatch::from_json(req.body())?;
    match store.update_todo(id, changes).await? {
        Some(todo) => {
            info!(id, "todo updated");
            Ok(Json::new(Data { data: todo }))
        }
        None => Err(not_found(id)),
    }
}

/// `GET /api/v1/add`: records a page load and returns `{"count": n}`.
pub async fn add_count(store: Store, _req: Request) -> Result<Json<serde_json::Value>, ApiError> {
    let count = store.record_visit().await?;
    Ok(Json::new(json!({ "count": count })))
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("ToDo {id} not found"))
}
