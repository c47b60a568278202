//! Pure reducer translating actions into state changes.

use crate::app::action::Action;
use crate::app::state::AppState;

/// Apply one action. Never fails: actions aimed at a collection that has not
/// been loaded, or at an id that is not present, leave the state untouched.
pub fn reduce(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::SetTasks(todos) => state.todos = todos,
        Action::SetFilter(filter) => state.filter = filter,
        Action::SetFilteredTasks(filtered) => state.filtered_todos = filtered,
        Action::TaskCreated(task) => state.todos.get_or_insert_with(Vec::new).push(task),
        Action::TaskUpdated { id, patch } => {
            if let Some(task) = state
                .todos
                .as_mut()
                .and_then(|todos| todos.iter_mut().find(|task| task.id == id))
            {
                task.apply(&patch);
            }
        }
        Action::TaskReplaced { id, task } => {
            if let Some(slot) = state
                .todos
                .as_mut()
                .and_then(|todos| todos.iter_mut().find(|entry| entry.id == id))
            {
                *slot = task;
            }
        }
        Action::TaskDeleted(id) => {
            if let Some(todos) = state.todos.as_mut() {
                todos.retain(|task| task.id != id);
            }
        }
        Action::SetPendingTask(pending) => state.pending_task = pending,
        Action::SetError(message) => state.error = Some(message),
        Action::ClearError => state.error = None,
    }
    state
}
