use tasklist_core::model::{Filter, Task};

/// Derive the visible subset of `todos` for `filter`, keeping relative order.
pub fn project(todos: Option<&[Task]>, filter: Filter) -> Option<Vec<Task>> {
    todos.map(|todos| {
        todos
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect()
    })
}
