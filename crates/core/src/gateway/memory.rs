use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{GatewayError, TaskGateway};
use crate::model::{NewTask, Task, TaskId, TaskPatch, UserId};

/// Gateway operation, used to target failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    Fetch,
    Create,
    Delete,
    Update,
}

#[derive(Debug, Default)]
struct MemoryState {
    tasks: Vec<Task>,
    next_id: TaskId,
    failing: HashSet<GatewayOp>,
}

/// Process-local stand-in for the remote collection.
///
/// Assigns ids sequentially after the largest seeded id and can be told to
/// fail specific operations until [`InMemoryGateway::recover`] is called.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<MemoryState>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|task| task.id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(MemoryState {
                tasks,
                next_id,
                failing: HashSet::new(),
            }),
        }
    }

    /// Make every subsequent call of `op` fail with a 503.
    pub fn fail(&self, op: GatewayOp) {
        self.state.lock().failing.insert(op);
    }

    pub fn recover(&self, op: GatewayOp) {
        self.state.lock().failing.remove(&op);
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    fn check(state: &MemoryState, op: GatewayOp) -> Result<(), GatewayError> {
        if state.failing.contains(&op) {
            return Err(GatewayError::Status { status: 503 });
        }
        Ok(())
    }
}

#[async_trait]
impl TaskGateway for InMemoryGateway {
    async fn fetch_tasks(&self, user_id: UserId) -> Result<Vec<Task>, GatewayError> {
        let state = self.state.lock();
        Self::check(&state, GatewayOp::Fetch)?;
        Ok(state
            .tasks
            .iter()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, GatewayError> {
        let mut state = self.state.lock();
        Self::check(&state, GatewayOp::Create)?;
        let id = state.next_id.max(1);
        state.next_id = id + 1;
        let created = Task::new(id, task.user_id, task.title.clone(), task.completed);
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        Self::check(&state, GatewayOp::Delete)?;
        let before = state.tasks.len();
        state.tasks.retain(|task| task.id != id);
        if state.tasks.len() == before {
            return Err(GatewayError::Status { status: 404 });
        }
        Ok(())
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, GatewayError> {
        let mut state = self.state.lock();
        Self::check(&state, GatewayOp::Update)?;
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(GatewayError::Status { status: 404 })?;
        task.apply(patch);
        Ok(task.clone())
    }
}
