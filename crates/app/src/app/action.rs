//! Transitions accepted by the store.

use tasklist_core::model::{Filter, Task, TaskId, TaskPatch};

use crate::app::state::PendingTask;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetTasks(Option<Vec<Task>>),
    SetFilter(Filter),
    SetFilteredTasks(Option<Vec<Task>>),
    TaskCreated(Task),
    TaskUpdated { id: TaskId, patch: TaskPatch },
    TaskReplaced { id: TaskId, task: Task },
    TaskDeleted(TaskId),
    SetPendingTask(Option<PendingTask>),
    SetError(String),
    ClearError,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::SetTasks(_) => "set_tasks",
            Action::SetFilter(_) => "set_filter",
            Action::SetFilteredTasks(_) => "set_filtered_tasks",
            Action::TaskCreated(_) => "task_created",
            Action::TaskUpdated { .. } => "task_updated",
            Action::TaskReplaced { .. } => "task_replaced",
            Action::TaskDeleted(_) => "task_deleted",
            Action::SetPendingTask(_) => "set_pending_task",
            Action::SetError(_) => "set_error",
            Action::ClearError => "clear_error",
        }
    }
}
