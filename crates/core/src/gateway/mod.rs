//! Contract with the remote `/todos` collection plus the implementations the workspace ships.

mod http;
mod memory;

pub use http::HttpGateway;
pub use memory::{GatewayOp, InMemoryGateway};

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{NewTask, Task, TaskId, TaskPatch, UserId};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server responded with status {status}")]
    Status { status: u16 },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            GatewayError::Status {
                status: status.as_u16(),
            }
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// Request/response seam to the task collection service.
///
/// Every method maps to exactly one HTTP verb on `/todos`; any non-2xx
/// response or transport problem is a [`GatewayError`].
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// `GET /todos?userId={user_id}`
    async fn fetch_tasks(&self, user_id: UserId) -> Result<Vec<Task>, GatewayError>;

    /// `POST /todos`, returns the confirmed record with its server id.
    async fn create_task(&self, task: &NewTask) -> Result<Task, GatewayError>;

    /// `DELETE /todos/{id}`
    async fn delete_task(&self, id: TaskId) -> Result<(), GatewayError>;

    /// `PATCH /todos/{id}`, returns the updated record.
    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, GatewayError>;
}
