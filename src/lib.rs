pub use tasklist_cli::cli;
pub use tasklist_cli::commands;
pub use tasklist_cli::config;

pub use tasklist_app as app;
pub use tasklist_app::{Store, TaskActions};

pub use tasklist_core as core;
pub use tasklist_core::gateway;
pub use tasklist_core::model;

pub use tasklist_cli::{run, run_blocking};
