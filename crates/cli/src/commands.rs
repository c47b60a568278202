use std::fmt;
use std::io::Write;

use anyhow::{Context, Result};
use tasklist_app::{AppState, TaskActions};
use tasklist_core::draft::TaskDraft;
use tasklist_core::model::{Task, TaskId, TaskPatch};

use crate::cli::{AddArgs, CliCommand, DeleteArgs, ListArgs, RenameArgs, ToggleArgs};

/// Run one command against a fresh session: load the collection, apply the intent, print the outcome.
pub async fn execute<W: Write>(
    actions: &TaskActions,
    command: CliCommand,
    mut writer: W,
) -> Result<()> {
    let result = dispatch(actions, command, &mut writer).await;
    if let Some(error) = actions.store().select(|state| state.error.clone()) {
        writeln!(writer, "Error: {error}")?;
    }
    result
}

async fn dispatch<W: Write>(actions: &TaskActions, command: CliCommand, mut writer: W) -> Result<()> {
    actions.load_tasks().await?;

    match command {
        CliCommand::List(args) => handle_list(actions, &args, &mut writer),
        CliCommand::Add(args) => handle_add(actions, &args, &mut writer).await,
        CliCommand::Delete(args) => handle_delete(actions, &args, &mut writer).await,
        CliCommand::Toggle(args) => handle_toggle(actions, &args, &mut writer).await,
        CliCommand::Rename(args) => handle_rename(actions, &args, &mut writer).await,
    }
}

fn handle_list<W: Write>(actions: &TaskActions, args: &ListArgs, mut writer: W) -> Result<()> {
    actions.change_filter(args.filter);
    let state = actions.store().state();
    write_list(&state, &mut writer)
}

async fn handle_add<W: Write>(actions: &TaskActions, args: &AddArgs, mut writer: W) -> Result<()> {
    let draft = TaskDraft::from_words(&args.title);
    match actions.create_task(draft.title, draft.completed).await? {
        Some(task) => writeln!(writer, "Added {}", TaskLine(&task))?,
        None => writeln!(writer, "No user configured; pass --user-id to add tasks")?,
    }
    Ok(())
}

async fn handle_delete<W: Write>(
    actions: &TaskActions,
    args: &DeleteArgs,
    mut writer: W,
) -> Result<()> {
    let mut outcome = DeleteOutcome::default();
    let mut last_error = None;
    for &id in &args.ids {
        match actions.delete_task(id).await {
            Ok(()) => outcome.deleted += 1,
            Err(err) => {
                outcome.kept.push(id);
                last_error = Some(err);
            }
        }
    }
    write!(writer, "{outcome}")?;
    match last_error {
        Some(err) => Err(err).with_context(|| {
            format!(
                "{} of {} deletes failed",
                outcome.kept.len(),
                args.ids.len()
            )
        }),
        None => Ok(()),
    }
}

async fn handle_toggle<W: Write>(
    actions: &TaskActions,
    args: &ToggleArgs,
    mut writer: W,
) -> Result<()> {
    match actions.toggle_task(args.id).await? {
        Some(task) => writeln!(writer, "Updated {}", TaskLine(&task))?,
        None => writeln!(writer, "Not found: {}", args.id)?,
    }
    Ok(())
}

async fn handle_rename<W: Write>(
    actions: &TaskActions,
    args: &RenameArgs,
    mut writer: W,
) -> Result<()> {
    let draft = TaskDraft::from_words(&args.title);
    let task = actions
        .update_task(args.id, TaskPatch::title(draft.title))
        .await?;
    writeln!(writer, "Updated {}", TaskLine(&task))?;
    Ok(())
}

fn write_list<W: Write>(state: &AppState, mut writer: W) -> Result<()> {
    if !state.is_loaded() {
        writeln!(writer, "No tasks yet")?;
        return Ok(());
    }

    for task in state.visible_tasks() {
        writeln!(writer, "{}", TaskLine(task))?;
    }
    let left = state.active_count();
    writeln!(
        writer,
        "{} item{} left ({})",
        left,
        if left == 1 { "" } else { "s" },
        state.filter
    )?;
    Ok(())
}

struct TaskLine<'a>(&'a Task);

impl fmt::Display for TaskLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let task = self.0;
        let mark = if task.completed { "x" } else { " " };
        write!(f, "[{}] {} {}", mark, task.id, task.title)?;
        if task.is_loading {
            write!(f, " (saving)")?;
        }
        Ok(())
    }
}

/// Tally of a batch delete; ids the collection refused stay listed.
#[derive(Default)]
struct DeleteOutcome {
    deleted: usize,
    kept: Vec<TaskId>,
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.deleted {
            0 => writeln!(f, "No tasks deleted")?,
            1 => writeln!(f, "Deleted 1 task")?,
            n => writeln!(f, "Deleted {n} tasks")?,
        }
        if let Some((first, rest)) = self.kept.split_first() {
            write!(f, "Not deleted: {first}")?;
            for id in rest {
                write!(f, ", {id}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
