//! Client-side state engine: the session store, its reducer and the procedures that drive it.

pub use self::action::Action;
pub use self::commands::{ActionError, TaskActions};
pub use self::projection::project;
pub use self::state::{AppState, PendingTask};
pub use self::store::{Store, Subscription};
pub use self::update::reduce;

pub mod action;
pub mod commands;
mod projection;
pub mod state;
mod store;
mod temp_id;
mod update;

#[cfg(test)]
mod tests;
