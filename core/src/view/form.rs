//! Create form: one text field and a submit action.
//!
//! All methods take `&self`, so the form can be rendered while a submit is
//! still waiting on the server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::{info, warn};

use crate::error::ApiError;
use crate::lock::mutex_lock;
use crate::transport::Transport;
use crate::types::Task;

use super::{Busy, TodoContext};

/// Single-field form that creates a task on submit.
pub struct CreateForm<T> {
    ctx: TodoContext<T>,
    text: Mutex<String>,
    pending: AtomicBool,
    last_error: Mutex<Option<ApiError>>,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex_lock(mutex, "view::form", "form_state")
}

impl<T: Transport + 'static> CreateForm<T> {
    pub fn new(ctx: &TodoContext<T>) -> Self {
        Self {
            ctx: ctx.clone(),
            text: Mutex::new(String::new()),
            pending: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    pub fn text(&self) -> String {
        lock(&self.text).clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        *lock(&self.text) = text.into();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<ApiError> {
        lock(&self.last_error).clone()
    }

    /// Send the current text as a new task.
    ///
    /// The field is cleared only when the server accepts it and nothing was
    /// typed meanwhile. Empty text is sent as-is; the server's rejection
    /// comes back as the error.
    pub async fn submit(&self) -> Result<Task, ApiError> {
        let _busy = Busy::enter(&self.pending);
        let text = self.text();
        let result = self.ctx.client.create(&text).await;

        match &result {
            Ok(task) => {
                info!(id = %task.id, "task created");
                let mut current = lock(&self.text);
                if *current == text {
                    current.clear();
                }
                *lock(&self.last_error) = None;
            }
            Err(err) => {
                warn!(error = %err, "task creation failed");
                *lock(&self.last_error) = Some(err.clone());
            }
        }
        self.ctx.mutation_settled(result.is_ok());
        result
    }

    pub fn render(&self) -> String {
        let mut line = format!("+ {}", self.text());
        if self.is_pending() {
            line.push_str("  …adding");
        }
        if let Some(err) = self.last_error() {
            line.push_str(&format!("\n  ! {err}"));
        }
        line
    }
}
