//! One task row: toggle and delete actions with their pending flags.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::error::ApiError;
use crate::lock::mutex_lock;
use crate::transport::Transport;
use crate::types::Task;

use super::{Busy, TodoContext};

/// One task row with toggle and delete actions.
///
/// `toggling` and `deleting` are independent: both actions take `&self` and
/// may run at the same time. The server applies whichever lands last.
pub struct ItemView<T> {
    ctx: TodoContext<T>,
    task: Mutex<Task>,
    toggling: AtomicBool,
    deleting: AtomicBool,
    last_error: Mutex<Option<ApiError>>,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex_lock(mutex, "view::item", "item_state")
}

impl<T: Transport + 'static> ItemView<T> {
    pub fn new(ctx: &TodoContext<T>, task: Task) -> Self {
        Self {
            ctx: ctx.clone(),
            task: Mutex::new(task),
            toggling: AtomicBool::new(false),
            deleting: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    pub fn task(&self) -> Task {
        lock(&self.task).clone()
    }

    pub fn is_toggling(&self) -> bool {
        self.toggling.load(Ordering::SeqCst)
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.load(Ordering::SeqCst)
    }

    /// Adopt the latest server copy of this task.
    pub(crate) fn sync(&self, task: Task) {
        *lock(&self.task) = task;
    }

    pub fn last_error(&self) -> Option<ApiError> {
        lock(&self.last_error).clone()
    }

    /// Flip `completed` on the server.
    pub async fn toggle(&self) -> Result<Task, ApiError> {
        let _busy = Busy::enter(&self.toggling);
        let (id, completed) = {
            let task = lock(&self.task);
            (task.id.clone(), task.completed)
        };
        let result = self.ctx.client.set_completed(&id, !completed).await;
        if let Ok(updated) = &result {
            *lock(&self.task) = updated.clone();
        }
        self.finish("toggle", &result);
        result
    }

    pub async fn delete(&self) -> Result<(), ApiError> {
        let _busy = Busy::enter(&self.deleting);
        let id = lock(&self.task).id.clone();
        let result = self.ctx.client.remove(&id).await;
        self.finish("delete", &result);
        result
    }

    fn finish<R>(&self, action: &'static str, result: &Result<R, ApiError>) {
        let error = match result {
            Ok(_) => None,
            Err(err) => {
                warn!(action, id = %lock(&self.task).id, error = %err, "task action failed");
                Some(err.clone())
            }
        };
        *lock(&self.last_error) = error;
        self.ctx.mutation_settled(result.is_ok());
    }

    pub fn render(&self) -> String {
        let task = self.task();
        let (mark, badge) = if task.completed {
            ("[x]", "done")
        } else {
            ("[ ]", "in progress")
        };
        let mut line = format!("{mark} {}  ({badge})", task.text);
        if self.is_toggling() {
            line.push_str("  …toggling");
        }
        if self.is_deleting() {
            line.push_str("  …deleting");
        }
        if let Some(err) = self.last_error() {
            line.push_str(&format!("  ! {err}"));
        }
        line
    }
}
