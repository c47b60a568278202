//! Async procedures that map user intents into gateway calls and store transitions.

use std::sync::Arc;

use tasklist_core::draft::{DraftError, TaskDraft};
use tasklist_core::gateway::{GatewayError, TaskGateway};
use tasklist_core::model::{Filter, NewTask, Task, TaskId, TaskPatch, User};
use thiserror::Error;

use crate::app::action::Action;
use crate::app::state::{AppState, PendingTask};
use crate::app::store::Store;
use crate::app::temp_id::TempIdAllocator;
use crate::telemetry::{self, Event as TelemetryEvent};

pub const LOAD_ERROR: &str = "Unable to load a todos";
pub const ADD_ERROR: &str = "Unable to add a todo";
pub const DELETE_ERROR: &str = "Unable to delete a todo";
pub const UPDATE_ERROR: &str = "Unable to update a todo";

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("a task is already being created")]
    CreationInFlight,

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("{message}: {source}")]
    Gateway {
        message: &'static str,
        #[source]
        source: GatewayError,
    },
}

impl ActionError {
    fn gateway(message: &'static str, source: GatewayError) -> Self {
        ActionError::Gateway { message, source }
    }
}

/// The mutation entry points of a session.
///
/// Each procedure awaits at most one gateway call and never holds the
/// store lock across it; outcomes are always reflected in the store,
/// failures additionally surface as [`ActionError`].
pub struct TaskActions {
    store: Store,
    gateway: Arc<dyn TaskGateway>,
    user: Option<User>,
    temp_ids: TempIdAllocator,
    telemetry: telemetry::Handle,
}

impl TaskActions {
    pub fn new(store: Store, gateway: Arc<dyn TaskGateway>, user: Option<User>) -> Self {
        Self {
            store,
            gateway,
            user,
            temp_ids: TempIdAllocator::new(),
            telemetry: telemetry::Handle::new(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn user(&self) -> Option<User> {
        self.user
    }

    pub fn telemetry(&self) -> &telemetry::Handle {
        &self.telemetry
    }

    /// Fetch the user's collection. An empty collection leaves `todos` unloaded.
    pub async fn load_tasks(&self) -> Result<(), ActionError> {
        let Some(user) = self.user else {
            return Ok(());
        };

        self.telemetry.record(TelemetryEvent::LoadRequested);
        match self.gateway.fetch_tasks(user.id).await {
            Ok(tasks) => {
                let count = tasks.len();
                let todos = if tasks.is_empty() { None } else { Some(tasks) };
                self.store.dispatch(Action::SetTasks(todos));
                self.telemetry
                    .record(TelemetryEvent::LoadCompleted { count });
                Ok(())
            }
            Err(err) => {
                tracing::warn!(user_id = user.id, error = %err, "failed to load tasks");
                self.store.dispatch(Action::SetError(LOAD_ERROR.to_string()));
                self.telemetry.record(TelemetryEvent::LoadFailed {
                    error: err.to_string(),
                });
                Err(ActionError::gateway(LOAD_ERROR, err))
            }
        }
    }

    /// Create a task optimistically.
    ///
    /// A loading placeholder is listed immediately; it is swapped for the
    /// confirmed record on success or removed on failure. Only one creation
    /// may be in flight; another attempt meanwhile is rejected untouched.
    pub async fn create_task(
        &self,
        title: impl Into<String>,
        completed: bool,
    ) -> Result<Option<Task>, ActionError> {
        let Some(user) = self.user else {
            return Ok(None);
        };

        let draft = TaskDraft::new(title, completed);
        let title = match draft.require_title() {
            Ok(title) => title.to_string(),
            Err(err) => {
                self.store.dispatch(Action::SetError(err.to_string()));
                return Err(err.into());
            }
        };

        let pending = PendingTask {
            temp_id: self.temp_ids.next(),
            user_id: user.id,
            title: title.clone(),
            completed: draft.completed,
        };
        let temp_id = pending.temp_id;
        let placeholder = pending.placeholder();
        let started = self.store.dispatch_if(
            |state| !state.has_pending(),
            [
                Action::SetPendingTask(Some(pending)),
                Action::TaskCreated(placeholder),
            ],
        );
        if !started {
            self.telemetry.record(TelemetryEvent::CreateRejected);
            return Err(ActionError::CreationInFlight);
        }
        self.telemetry
            .record(TelemetryEvent::CreateStarted { temp_id });

        match self.gateway.create_task(&NewTask::new(title, user.id)).await {
            Ok(mut task) => {
                task.is_loading = false;
                self.confirm(temp_id, task.clone());
                self.telemetry.record(TelemetryEvent::CreateConfirmed {
                    temp_id,
                    id: task.id,
                });
                Ok(Some(task))
            }
            Err(err) => {
                tracing::warn!(temp_id, error = %err, "failed to create task");
                self.store.dispatch_if(
                    |_| true,
                    [
                        Action::TaskDeleted(temp_id),
                        Action::SetPendingTask(None),
                        Action::SetError(ADD_ERROR.to_string()),
                    ],
                );
                self.telemetry.record(TelemetryEvent::CreateRolledBack {
                    temp_id,
                    error: err.to_string(),
                });
                Err(ActionError::gateway(ADD_ERROR, err))
            }
        }
    }

    fn confirm(&self, temp_id: TaskId, task: Task) {
        let id = task.id;
        let replaced = self.store.dispatch_if(
            |state: &AppState| state.task(temp_id).is_some() && state.task(id).is_none(),
            [
                Action::TaskReplaced {
                    id: temp_id,
                    task: task.clone(),
                },
                Action::SetPendingTask(None),
            ],
        );
        if replaced {
            return;
        }

        // A reload dropped the placeholder before the record was listed.
        let appended = self.store.dispatch_if(
            |state: &AppState| state.task(id).is_none(),
            [Action::TaskCreated(task), Action::SetPendingTask(None)],
        );
        if appended {
            tracing::debug!(temp_id, task_id = id, "placeholder gone, appended confirmed task");
            return;
        }

        // A reload already listed the confirmed record.
        self.store.dispatch_if(
            |_| true,
            [Action::TaskDeleted(temp_id), Action::SetPendingTask(None)],
        );
    }

    /// Switch the visible slice; the store re-projects in the same transition.
    pub fn change_filter(&self, filter: Filter) {
        self.store.dispatch(Action::SetFilter(filter));
        self.telemetry.record(TelemetryEvent::FilterChanged(filter));
    }

    pub fn clear_error(&self) {
        self.store.dispatch(Action::ClearError);
        self.telemetry.record(TelemetryEvent::ErrorCleared);
    }

    pub async fn delete_task(&self, id: TaskId) -> Result<(), ActionError> {
        match self.gateway.delete_task(id).await {
            Ok(()) => {
                self.store.dispatch(Action::TaskDeleted(id));
                self.telemetry.record(TelemetryEvent::DeleteApplied(id));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(task_id = id, error = %err, "failed to delete task");
                self.store.dispatch(Action::SetError(DELETE_ERROR.to_string()));
                self.telemetry.record(TelemetryEvent::DeleteFailed {
                    id,
                    error: err.to_string(),
                });
                Err(ActionError::gateway(DELETE_ERROR, err))
            }
        }
    }

    /// Send `patch` and merge whatever the collection answered with.
    pub async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task, ActionError> {
        if let Some(title) = &patch.title {
            if let Err(err) = TaskDraft::new(title.clone(), false).require_title() {
                self.store.dispatch(Action::SetError(err.to_string()));
                return Err(err.into());
            }
        }

        match self.gateway.update_task(id, &patch).await {
            Ok(task) => {
                self.store.dispatch(Action::TaskUpdated {
                    id,
                    patch: TaskPatch::from(&task),
                });
                self.telemetry.record(TelemetryEvent::UpdateApplied(id));
                Ok(task)
            }
            Err(err) => {
                tracing::warn!(task_id = id, error = %err, "failed to update task");
                self.store.dispatch(Action::SetError(UPDATE_ERROR.to_string()));
                self.telemetry.record(TelemetryEvent::UpdateFailed {
                    id,
                    error: err.to_string(),
                });
                Err(ActionError::gateway(UPDATE_ERROR, err))
            }
        }
    }

    /// Flip completion of a listed task. Returns `Ok(None)` when the id is not listed.
    pub async fn toggle_task(&self, id: TaskId) -> Result<Option<Task>, ActionError> {
        let Some(completed) = self
            .store
            .select(|state| state.task(id).map(|task| task.completed))
        else {
            return Ok(None);
        };
        self.update_task(id, TaskPatch::completed(!completed))
            .await
            .map(Some)
    }
}
