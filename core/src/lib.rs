//! Client core for the task list service.
//!
//! # Overview
//! Lists, creates, toggles and deletes tasks against a REST backend, keeps
//! the collection in an observable query cache, and exposes view models that
//! render the cached collection.
//!
//! # Design
//! - `TodoClient` is stateless and sans-IO: `build_*` produces plain-data
//!   requests, `parse_*` consumes plain-data responses.
//! - `Transport` performs the I/O; `ResourceClient` composes the two.
//! - `QueryCache` is passed to views explicitly; mutations invalidate the
//!   collection key and the cache refetches with at most one fetch in flight.
//! - Tasks are validated as they are decoded; raw JSON stops at `client`.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
mod lock;
pub mod resource;
pub mod transport;
pub mod types;
pub mod view;

pub use cache::{QueryCache, QueryHandle, QueryState, QueryStatus};
pub use client::TodoClient;
pub use config::{ClientConfig, ConfigError, InvalidationPolicy, Mode};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use resource::ResourceClient;
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use types::{Task, TaskId};
pub use view::{CreateForm, ItemView, ListState, ListView, TodoContext, COLLECTION_KEY};
