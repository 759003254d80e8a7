//! In-memory backend for the task list REST API.
//!
//! Serves the four collection operations under `/api/todos`. Tasks live in an
//! insertion-ordered `Vec` behind a `RwLock`, so `GET /api/todos` returns
//! them in creation order. Every failure is answered with an
//! `{"error": "..."}` body.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    #[serde(rename = "_id")]
    pub id: String,
    pub body: String,
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub body: String,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub completed: bool,
}

pub type Db = Arc<RwLock<Vec<Todo>>>;

/// Error response carrying a status code and the message placed in `error`.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Todo not found")
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

pub fn app() -> Router {
    app_with_db(Db::default())
}

/// Build the router over an existing store, letting tests seed or inspect it.
pub fn app_with_db(db: Db) -> Router {
    let todos = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", patch(update_todo).delete(delete_todo))
        .with_state(db);
    Router::new().nest("/api", todos)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "todo server listening");
    }
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    let todos = db.read().await;
    debug!(count = todos.len(), "listing todos");
    Json(todos.clone())
}

async fn create_todo(
    State(db): State<Db>,
    input: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiFailure> {
    let Json(input) = input?;
    if input.body.is_empty() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, "Body is required"));
    }
    let todo = Todo {
        id: Uuid::new_v4().simple().to_string(),
        body: input.body,
        completed: false,
    };
    db.write().await.push(todo.clone());
    info!(id = %todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
    input: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>, ApiFailure> {
    let Json(input) = input?;
    let mut todos = db.write().await;
    let todo = todos
        .iter_mut()
        .find(|todo| todo.id == id)
        .ok_or_else(ApiFailure::not_found)?;
    todo.completed = input.completed;
    info!(%id, completed = todo.completed, "updated todo");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let mut todos = db.write().await;
    let position = todos
        .iter()
        .position(|todo| todo.id == id)
        .ok_or_else(ApiFailure::not_found)?;
    todos.remove(position);
    info!(%id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_with_wire_names() {
        let todo = Todo {
            id: "abc123".to_string(),
            body: "Test".to_string(),
            completed: false,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["_id"], "abc123");
        assert_eq!(json["body"], "Test");
        assert_eq!(json["completed"], false);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn create_todo_missing_body_defaults_to_empty() {
        let input: CreateTodo = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.body.is_empty());
    }

    #[test]
    fn update_todo_requires_completed() {
        let result: Result<UpdateTodo, _> = serde_json::from_str(r#"{}"#);
        assert!(result.is_err());
    }

    #[test]
    fn failure_renders_error_body() {
        let response = ApiFailure::not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
