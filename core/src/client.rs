//! Stateless HTTP request builder and response parser for the task API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! [`ResourceClient`](crate::ResourceClient) glues the two halves to a
//! [`Transport`](crate::Transport).

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTask, SetCompleted, Task, TaskId};

const ID_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Synchronous, stateless client for the task API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_path(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create(&self, text: &str) -> Result<HttpRequest, ApiError> {
        let body = to_json(&CreateTask { body: text })?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection_path(),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_set_completed(
        &self,
        id: &TaskId,
        completed: bool,
    ) -> Result<HttpRequest, ApiError> {
        let body = to_json(&SetCompleted { completed })?;
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            path: self.item_path(id),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_remove(&self, id: &TaskId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_path(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_set_completed(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_remove(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn collection_path(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn item_path(&self, id: &TaskId) -> String {
        let segment = utf8_percent_encode(id.as_str(), ID_SEGMENT);
        format!("{}/todos/{segment}", self.base_url)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Server {
        status: response.status,
        message: error_message(&response.body),
    })
}

/// Pull the message out of an `{"error": "..."}` body, falling back to the
/// raw text when the server sent something else.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:4000/api")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_produces_correct_request() {
        let req = client().build_list();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:4000/api/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_sends_body_field() {
        let req = client().build_create("Buy milk").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:4000/api/todos");
        assert_eq!(req.headers, json_headers());
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "body": "Buy milk" }));
    }

    #[test]
    fn build_create_does_not_reject_empty_text() {
        let req = client().build_create("").unwrap();
        assert_eq!(req.body.as_deref(), Some(r#"{"body":""}"#));
    }

    #[test]
    fn build_set_completed_patches_item() {
        let req = client()
            .build_set_completed(&TaskId::new("abc"), true)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, "http://localhost:4000/api/todos/abc");
        assert_eq!(req.body.as_deref(), Some(r#"{"completed":true}"#));
    }

    #[test]
    fn build_remove_produces_correct_request() {
        let req = client().build_remove(&TaskId::new("abc"));
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:4000/api/todos/abc");
        assert!(req.body.is_none());
    }

    #[test]
    fn item_path_escapes_reserved_characters() {
        let req = client().build_remove(&TaskId::new("a/b?c"));
        assert_eq!(req.path, "http://localhost:4000/api/todos/a%2Fb%3Fc");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:4000/api/");
        assert_eq!(client.build_list().path, "http://localhost:4000/api/todos");
    }

    #[test]
    fn parse_list_success() {
        let todos = client()
            .parse_list(response(200, r#"[{"_id":"1","body":"Test","completed":false}]"#))
            .unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].text, "Test");
    }

    #[test]
    fn parse_list_bad_json() {
        let err = client().parse_list(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn parse_list_rejects_invalid_task() {
        let err = client()
            .parse_list(response(200, r#"[{"_id":"1","body":"","completed":false}]"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn parse_create_accepts_any_2xx() {
        let body = r#"{"_id":"1","body":"New","completed":false}"#;
        assert!(client().parse_create(response(201, body)).is_ok());
        assert!(client().parse_create(response(200, body)).is_ok());
    }

    #[test]
    fn parse_create_extracts_error_message() {
        let err = client()
            .parse_create(response(400, r#"{"error":"Body is required"}"#))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 400,
                message: "Body is required".to_string()
            }
        );
    }

    #[test]
    fn server_error_falls_back_to_raw_body() {
        let err = client()
            .parse_list(response(500, "internal error\n"))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 500,
                message: "internal error".to_string()
            }
        );
    }

    #[test]
    fn parse_set_completed_success() {
        let todo = client()
            .parse_set_completed(response(200, r#"{"_id":"1","body":"Up","completed":true}"#))
            .unwrap();
        assert!(todo.completed);
    }

    #[test]
    fn parse_remove_success_and_not_found() {
        assert!(client().parse_remove(response(204, "")).is_ok());
        let err = client()
            .parse_remove(response(404, r#"{"error":"Todo not found"}"#))
            .unwrap_err();
        assert_eq!(err, ApiError::NotFound);
    }
}
