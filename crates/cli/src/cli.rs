use std::path::PathBuf;

use clap::{value_parser, Args, Parser, Subcommand};
use tasklist_core::model::{Filter, TaskId, UserId};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tasklist",
    version,
    about = "Manage a personal task list stored on a remote /todos collection.",
    after_help = "Examples:\n  tasklist --user-id 42 list --filter active\n  tasklist add Buy milk\n  tasklist toggle 17\n  tasklist delete 17 18"
)]
pub struct Cli {
    /// Base URL of the task collection service
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Id of the authenticated user whose tasks are managed
    #[arg(long = "user-id", value_name = "ID", global = true, value_parser = value_parser!(i64))]
    pub user_id: Option<UserId>,

    /// Read settings from this JSON file instead of the platform config dir
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Override the tracing filter (e.g. "info", "debug", or full directives)
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Show tasks (default command)
    List(ListArgs),
    /// Create a task
    Add(AddArgs),
    /// Delete one or more tasks by id
    Delete(DeleteArgs),
    /// Flip a task between active and completed
    Toggle(ToggleArgs),
    /// Change a task's title
    Rename(RenameArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Which tasks to show
    #[arg(long, value_enum, default_value_t = Filter::All)]
    pub filter: Filter,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Task title
    #[arg(value_name = "TITLE", required = true)]
    pub title: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// One or more task ids to delete
    #[arg(value_name = "ID", required = true, value_parser = value_parser!(i64))]
    pub ids: Vec<TaskId>,
}

#[derive(Args, Debug, Clone)]
pub struct ToggleArgs {
    #[arg(value_name = "ID", value_parser = value_parser!(i64))]
    pub id: TaskId,
}

#[derive(Args, Debug, Clone)]
pub struct RenameArgs {
    #[arg(value_name = "ID", value_parser = value_parser!(i64))]
    pub id: TaskId,

    /// New title
    #[arg(value_name = "TITLE", required = true)]
    pub title: Vec<String>,
}
