//! Session state shared between the store, the orchestrator and whoever renders it.

use tasklist_core::model::{Filter, Task, TaskId, UserId};

/// A creation that has been shown to the user but not yet confirmed by the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub temp_id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub completed: bool,
}

impl PendingTask {
    /// The placeholder entry inserted into `todos` while the request is in flight.
    pub fn placeholder(&self) -> Task {
        Task {
            id: self.temp_id,
            user_id: self.user_id,
            title: self.title.clone(),
            completed: self.completed,
            is_loading: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// `None` until a load produced at least one task.
    pub todos: Option<Vec<Task>>,
    /// Always `todos` filtered by `filter`; maintained by the store.
    pub filtered_todos: Option<Vec<Task>>,
    pub pending_task: Option<PendingTask>,
    pub error: Option<String>,
    pub filter: Filter,
}

impl AppState {
    pub fn is_loaded(&self) -> bool {
        self.todos.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_task.is_some()
    }

    pub fn visible_tasks(&self) -> &[Task] {
        self.filtered_todos.as_deref().unwrap_or(&[])
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.todos.as_ref()?.iter().find(|task| task.id == id)
    }

    /// Number of tasks still to do, as shown next to the filter switcher.
    pub fn active_count(&self) -> usize {
        self.count_where(|task| !task.completed)
    }

    pub fn completed_count(&self) -> usize {
        self.count_where(|task| task.completed)
    }

    fn count_where(&self, predicate: impl Fn(&Task) -> bool) -> usize {
        self.todos
            .as_ref()
            .map(|todos| todos.iter().filter(|task| predicate(task)).count())
            .unwrap_or(0)
    }
}
