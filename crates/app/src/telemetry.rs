//! Records what the orchestrator did so flows can be inspected while developing against a live API.

#[cfg(feature = "telemetry")]
use parking_lot::Mutex;
use tasklist_core::model::{Filter, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    LoadRequested,
    LoadCompleted { count: usize },
    LoadFailed { error: String },
    CreateStarted { temp_id: TaskId },
    CreateConfirmed { temp_id: TaskId, id: TaskId },
    CreateRolledBack { temp_id: TaskId, error: String },
    CreateRejected,
    FilterChanged(Filter),
    DeleteApplied(TaskId),
    DeleteFailed { id: TaskId, error: String },
    UpdateApplied(TaskId),
    UpdateFailed { id: TaskId, error: String },
    ErrorCleared,
}

pub struct Handle {
    #[cfg(feature = "telemetry")]
    events: Mutex<Vec<Event>>,
}

impl Handle {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "telemetry")]
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn record(&self, event: Event) {
        #[cfg(feature = "telemetry")]
        {
            match &event {
                Event::LoadRequested => tracing::debug!("telemetry load requested"),
                Event::LoadCompleted { count } => {
                    tracing::debug!(count, "telemetry load completed")
                }
                Event::LoadFailed { error } => {
                    tracing::debug!(error = %error, "telemetry load failed")
                }
                Event::CreateStarted { temp_id } => {
                    tracing::debug!(temp_id, "telemetry create started")
                }
                Event::CreateConfirmed { temp_id, id } => {
                    tracing::debug!(temp_id, task_id = id, "telemetry create confirmed")
                }
                Event::CreateRolledBack { temp_id, error } => tracing::debug!(
                    temp_id,
                    error = %error,
                    "telemetry create rolled back"
                ),
                Event::CreateRejected => tracing::debug!("telemetry create rejected"),
                Event::FilterChanged(filter) => {
                    tracing::debug!(filter = filter.as_str(), "telemetry filter changed")
                }
                Event::DeleteApplied(id) => tracing::debug!(task_id = id, "telemetry delete applied"),
                Event::DeleteFailed { id, error } => {
                    tracing::debug!(task_id = id, error = %error, "telemetry delete failed")
                }
                Event::UpdateApplied(id) => tracing::debug!(task_id = id, "telemetry update applied"),
                Event::UpdateFailed { id, error } => {
                    tracing::debug!(task_id = id, error = %error, "telemetry update failed")
                }
                Event::ErrorCleared => tracing::debug!("telemetry error cleared"),
            }
            self.events.lock().push(event);
        }
        #[cfg(not(feature = "telemetry"))]
        {
            let _ = event;
        }
    }

    pub fn is_enabled(&self) -> bool {
        cfg!(feature = "telemetry")
    }

    /// Events recorded so far, oldest first. Empty when the feature is off.
    pub fn events(&self) -> Vec<Event> {
        #[cfg(feature = "telemetry")]
        {
            self.events.lock().clone()
        }
        #[cfg(not(feature = "telemetry"))]
        {
            Vec::new()
        }
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}
