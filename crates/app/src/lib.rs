//! State management for a single user's task list: store, reducer, filter projection and orchestration.

mod app;
pub mod telemetry;

pub use app::commands::{ADD_ERROR, DELETE_ERROR, LOAD_ERROR, UPDATE_ERROR};
pub use app::{
    project, reduce, Action, ActionError, AppState, PendingTask, Store, Subscription, TaskActions,
};
