//! Async resource client: the four task operations over a [`Transport`].

use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Task, TaskId};

/// Issues list/create/set-completed/remove calls and returns typed results.
///
/// Every failure is returned to the caller; nothing is swallowed here.
pub struct ResourceClient<T = ReqwestTransport> {
    api: TodoClient,
    transport: T,
}

impl<T: Transport> ResourceClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            api: TodoClient::new(base_url),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    pub async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let response = self.send(self.api.build_list()).await?;
        self.api.parse_list(response)
    }

    /// Create a task. Empty text is passed through; the server decides.
    pub async fn create(&self, text: &str) -> Result<Task, ApiError> {
        let request = self.api.build_create(text)?;
        let response = self.send(request).await?;
        self.api.parse_create(response)
    }

    pub async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<Task, ApiError> {
        let request = self.api.build_set_completed(id, completed)?;
        let response = self.send(request).await?;
        self.api.parse_set_completed(response)
    }

    pub async fn remove(&self, id: &TaskId) -> Result<(), ApiError> {
        let response = self.send(self.api.build_remove(id)).await?;
        self.api.parse_remove(response)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        match self.transport.execute(request).await {
            Ok(response) => {
                debug!(%method, %path, status = response.status, "request completed");
                Ok(response)
            }
            Err(err) => {
                warn!(%method, %path, error = %err, "request failed");
                Err(err)
            }
        }
    }
}
