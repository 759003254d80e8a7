//! Shared fixtures: transports that keep tests off the real network.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use todo_core::view::TaskCache;
use todo_core::{
    ApiError, HttpMethod, HttpRequest, HttpResponse, InvalidationPolicy, ResourceClient,
    TodoContext, Transport,
};
use todo_server::Db;
use tokio::sync::Semaphore;
use tower::ServiceExt;

pub const BASE_URL: &str = "http://todo.test/api";

/// Routes requests straight into the server's router, in process.
pub struct RouterTransport {
    router: axum::Router,
}

impl RouterTransport {
    pub fn new(db: Db) -> Self {
        Self {
            router: todo_server::app_with_db(db),
        }
    }
}

#[async_trait]
impl Transport for RouterTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = Request::builder()
            .method(request.method.to_string().as_str())
            .uri(&request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let http_request = builder
            .body(Body::from(request.body.unwrap_or_default()))
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let response = self
            .router
            .clone()
            .oneshot(http_request)
            .await
            .map_err(|never| match never {})?;
        let status = response.status().as_u16();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?
            .to_bytes();

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Holds every mutating request until the test hands out a permit.
/// Reads pass straight through.
pub struct GatedTransport {
    inner: RouterTransport,
    gate: Arc<Semaphore>,
}

#[async_trait]
impl Transport for GatedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if request.method != HttpMethod::Get {
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            permit.forget();
        }
        self.inner.execute(request).await
    }
}

/// A backend that is never reachable.
pub struct DownTransport;

#[async_trait]
impl Transport for DownTransport {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
        Err(ApiError::Network("connection refused".to_string()))
    }
}

pub fn context(policy: InvalidationPolicy) -> (TodoContext<RouterTransport>, Db) {
    let db = Db::default();
    let client = ResourceClient::new(BASE_URL, RouterTransport::new(db.clone()));
    let ctx = TodoContext::new(client, Arc::new(TaskCache::new()), policy);
    (ctx, db)
}

/// Like [`context`], but mutations wait on the returned semaphore.
pub fn gated_context(
    policy: InvalidationPolicy,
) -> (TodoContext<GatedTransport>, Db, Arc<Semaphore>) {
    let db = Db::default();
    let gate = Arc::new(Semaphore::new(0));
    let transport = GatedTransport {
        inner: RouterTransport::new(db.clone()),
        gate: Arc::clone(&gate),
    };
    let client = ResourceClient::new(BASE_URL, transport);
    let ctx = TodoContext::new(client, Arc::new(TaskCache::new()), policy);
    (ctx, db, gate)
}
