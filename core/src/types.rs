//! Domain DTOs for the task list API.
//!
//! # Design
//! These types mirror the server's schema but are defined independently;
//! integration tests catch any drift. `Task` only deserializes through
//! [`RawTask`], so a payload with an empty id or empty text is rejected at
//! the network boundary and never reaches the cache or the views.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Server-assigned task identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single task returned by the API.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: TaskId,
    #[serde(rename = "body")]
    pub text: String,
    pub completed: bool,
}

/// Wire shape of a task before validation.
#[derive(Deserialize)]
struct RawTask {
    #[serde(rename = "_id")]
    id: String,
    body: String,
    #[serde(default)]
    completed: bool,
}

/// Reasons a received task payload is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("task id is empty")]
    EmptyId,
    #[error("task {0} has empty text")]
    EmptyText(String),
}

impl RawTask {
    fn validate(self) -> Result<Task, SchemaError> {
        if self.id.is_empty() {
            return Err(SchemaError::EmptyId);
        }
        if self.body.is_empty() {
            return Err(SchemaError::EmptyText(self.id));
        }
        Ok(Task {
            id: TaskId(self.id),
            text: self.body,
            completed: self.completed,
        })
    }
}

impl<'de> Deserialize<'de> for Task {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawTask::deserialize(deserializer)?
            .validate()
            .map_err(serde::de::Error::custom)
    }
}

/// Request payload for creating a task.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTask<'a> {
    pub body: &'a str,
}

/// Request payload for setting a task's completion flag.
#[derive(Debug, Clone, Serialize)]
pub struct SetCompleted {
    pub completed: bool,
}
