//! List view: loading, empty, populated and failed states over the cached
//! collection.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::cache::{QueryHandle, QueryState, QueryStatus};
use crate::lock::mutex_lock;
use crate::transport::Transport;
use crate::types::{Task, TaskId};

use super::{ItemView, TodoContext};

pub const LOADING_MESSAGE: &str = "Loading...";
pub const EMPTY_MESSAGE: &str = "All tasks completed! 🤞";

/// What the list shows for one cache state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Empty,
    /// Tasks in the order the server returned them.
    Populated(Vec<Task>),
    Failed(String),
}

impl ListState {
    pub fn from_query(state: &QueryState<Vec<Task>>) -> Self {
        if state.fetching {
            return ListState::Loading;
        }
        match (state.status, state.data.as_ref().map(|tasks| tasks.as_slice())) {
            (QueryStatus::Error, _) => ListState::Failed(
                state
                    .error
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
            (QueryStatus::Ready, Some([])) => ListState::Empty,
            (QueryStatus::Ready, Some(tasks)) => ListState::Populated(tasks.to_vec()),
            _ => ListState::Loading,
        }
    }
}

/// Renders the cached task collection.
///
/// Item views are kept per [`TaskId`] across renders, so a row's pending
/// flags and last error stay visible until the task leaves the collection.
pub struct ListView<T> {
    ctx: TodoContext<T>,
    handle: QueryHandle<Vec<Task>>,
    rows: Mutex<HashMap<TaskId, Arc<ItemView<T>>>>,
}

impl<T: Transport + 'static> ListView<T> {
    /// Mount the view; triggers the initial fetch when the cache is cold.
    pub fn mount(ctx: &TodoContext<T>) -> Self {
        Self {
            ctx: ctx.clone(),
            handle: ctx.tasks(),
            rows: Mutex::new(HashMap::new()),
        }
    }

    pub fn state(&self) -> ListState {
        ListState::from_query(&self.handle.state())
    }

    /// Wait for the next cache update.
    pub async fn next_state(&mut self) -> ListState {
        ListState::from_query(&self.handle.changed().await)
    }

    /// Wait for the in-flight refetch, if any, to finish.
    pub async fn settled(&mut self) -> ListState {
        ListState::from_query(&self.handle.settled().await)
    }

    /// Force a refetch of the collection.
    pub fn refresh(&self) {
        self.handle.invalidate();
    }

    /// One item view per task currently shown; empty unless populated.
    pub fn items(&self) -> Vec<Arc<ItemView<T>>> {
        match self.state() {
            ListState::Populated(tasks) => self.rows_for(tasks),
            ListState::Empty => {
                mutex_lock(&self.rows, "view::list", "clear_rows").clear();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn render(&self) -> String {
        match self.state() {
            ListState::Loading => LOADING_MESSAGE.to_string(),
            ListState::Empty => EMPTY_MESSAGE.to_string(),
            ListState::Failed(message) => format!("error: {message}"),
            ListState::Populated(tasks) => self
                .rows_for(tasks)
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{:>3}. {}", i + 1, item.render()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Reuse existing rows, refresh them from `tasks`, and drop rows whose
    /// task is gone.
    fn rows_for(&self, tasks: Vec<Task>) -> Vec<Arc<ItemView<T>>> {
        let mut rows = mutex_lock(&self.rows, "view::list", "rows_for");
        let ids: HashSet<TaskId> = tasks.iter().map(|task| task.id.clone()).collect();
        rows.retain(|id, _| ids.contains(id));
        tasks
            .into_iter()
            .map(|task| {
                let row = rows
                    .entry(task.id.clone())
                    .or_insert_with(|| Arc::new(ItemView::new(&self.ctx, task.clone())));
                row.sync(task);
                Arc::clone(row)
            })
            .collect()
    }
}
