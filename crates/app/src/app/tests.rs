//! End-to-end flows through the orchestrator, store and an in-memory collection.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rstest::rstest;
use tasklist_core::gateway::{GatewayError, GatewayOp, InMemoryGateway, TaskGateway};
use tasklist_core::model::{Filter, NewTask, Task, TaskId, TaskPatch, User, UserId};
use tokio::sync::Semaphore;

use super::commands::{ActionError, TaskActions, ADD_ERROR, DELETE_ERROR, LOAD_ERROR, UPDATE_ERROR};
use super::projection::project;
use super::state::AppState;
use super::store::Store;
use crate::telemetry::Event;

fn seed() -> Vec<Task> {
    vec![Task::new(1, 1, "a", false), Task::new(2, 1, "b", true)]
}

fn actions_with(gateway: Arc<dyn TaskGateway>) -> TaskActions {
    TaskActions::new(Store::new(), gateway, Some(User::new(1)))
}

fn ids(state: &AppState) -> BTreeSet<TaskId> {
    state
        .todos
        .as_ref()
        .map(|todos| todos.iter().map(|task| task.id).collect())
        .unwrap_or_default()
}

fn assert_consistent(state: &AppState) {
    assert_eq!(
        state.filtered_todos,
        project(state.todos.as_deref(), state.filter)
    );
}

/// Holds `create_task` calls until the test releases them.
struct GatedGateway {
    inner: InMemoryGateway,
    gate: Semaphore,
    store_before_gate: bool,
}

impl GatedGateway {
    fn new(inner: InMemoryGateway) -> Self {
        Self {
            inner,
            gate: Semaphore::new(0),
            store_before_gate: false,
        }
    }

    /// The record is stored right away; only the response is held back.
    fn responding_late(inner: InMemoryGateway) -> Self {
        Self {
            store_before_gate: true,
            ..Self::new(inner)
        }
    }

    fn open(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl TaskGateway for GatedGateway {
    async fn fetch_tasks(&self, user_id: UserId) -> Result<Vec<Task>, GatewayError> {
        self.inner.fetch_tasks(user_id).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, GatewayError> {
        let stored = if self.store_before_gate {
            Some(self.inner.create_task(task).await?)
        } else {
            None
        };
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        match stored {
            Some(task) => Ok(task),
            None => self.inner.create_task(task).await,
        }
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), GatewayError> {
        self.inner.delete_task(id).await
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, GatewayError> {
        self.inner.update_task(id, patch).await
    }
}

#[tokio::test]
async fn load_without_user_stays_unloaded() {
    let gateway = Arc::new(InMemoryGateway::with_tasks(seed()));
    let actions = TaskActions::new(Store::new(), gateway, None);

    actions.load_tasks().await.unwrap();

    let state = actions.store().state();
    assert!(state.todos.is_none());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn load_then_filter_active_shows_open_tasks() {
    let actions = actions_with(Arc::new(InMemoryGateway::with_tasks(seed())));

    actions.load_tasks().await.unwrap();
    actions.change_filter(Filter::Active);

    let state = actions.store().state();
    assert_eq!(state.visible_tasks(), &[Task::new(1, 1, "a", false)]);
    assert_eq!(state.active_count(), 1);
    assert_eq!(state.completed_count(), 1);
    assert_consistent(&state);
}

#[tokio::test]
async fn empty_collection_is_treated_as_unloaded() {
    let gateway = Arc::new(InMemoryGateway::with_tasks(vec![Task::new(5, 2, "theirs", false)]));
    let actions = actions_with(gateway);

    actions.load_tasks().await.unwrap();

    let state = actions.store().state();
    assert!(!state.is_loaded());
    assert!(state.filtered_todos.is_none());
}

#[tokio::test]
async fn load_failure_keeps_previous_todos_and_sets_error() {
    let gateway = Arc::new(InMemoryGateway::with_tasks(seed()));
    let actions = actions_with(gateway.clone());
    actions.load_tasks().await.unwrap();

    gateway.fail(GatewayOp::Fetch);
    let err = actions.load_tasks().await.unwrap_err();

    assert!(matches!(err, ActionError::Gateway { message, .. } if message == LOAD_ERROR));
    let state = actions.store().state();
    assert_eq!(ids(&state), BTreeSet::from([1, 2]));
    assert_eq!(state.error.as_deref(), Some(LOAD_ERROR));
}

#[tokio::test]
async fn create_confirms_with_server_id() {
    let actions = actions_with(Arc::new(InMemoryGateway::with_tasks(seed())));
    actions.load_tasks().await.unwrap();

    let created = actions.create_task("buy milk", false).await.unwrap().unwrap();

    assert_eq!(created, Task::new(3, 1, "buy milk", false));
    let state = actions.store().state();
    let todos = state.todos.clone().unwrap();
    assert_eq!(todos.iter().filter(|task| task.id == 3).count(), 1);
    assert_eq!(todos.len(), 3);
    assert!(todos.iter().all(|task| !task.is_loading));
    assert!(!state.has_pending());
    assert_consistent(&state);
}

#[tokio::test]
async fn create_with_gateway_returning_id_99() {
    let mut seeded = seed();
    seeded.push(Task::new(98, 2, "someone else's", true));
    let actions = actions_with(Arc::new(InMemoryGateway::with_tasks(seeded)));

    let created = actions.create_task("buy milk", false).await.unwrap().unwrap();

    assert_eq!(created, Task::new(99, 1, "buy milk", false));
    let state = actions.store().state();
    assert_eq!(state.todos, Some(vec![Task::new(99, 1, "buy milk", false)]));
    assert!(state.pending_task.is_none());
}

#[tokio::test]
async fn create_failure_rolls_back_placeholder() {
    let gateway = Arc::new(InMemoryGateway::with_tasks(seed()));
    let actions = actions_with(gateway.clone());
    actions.load_tasks().await.unwrap();
    let before = ids(&actions.store().state());

    gateway.fail(GatewayOp::Create);
    let err = actions.create_task("doomed", false).await.unwrap_err();

    assert!(matches!(err, ActionError::Gateway { message, .. } if message == ADD_ERROR));
    let state = actions.store().state();
    assert_eq!(ids(&state), before);
    assert_eq!(state.error.as_deref(), Some(ADD_ERROR));
    assert!(!state.has_pending());
    assert_consistent(&state);
}

#[tokio::test]
async fn placeholder_is_visible_while_in_flight_and_second_create_is_rejected() {
    let gateway = Arc::new(GatedGateway::new(InMemoryGateway::with_tasks(seed())));
    let actions = Arc::new(actions_with(gateway.clone()));
    actions.load_tasks().await.unwrap();

    let first = tokio::spawn({
        let actions = Arc::clone(&actions);
        async move { actions.create_task("first", false).await }
    });
    while !actions.store().select(|state| state.has_pending()) {
        tokio::task::yield_now().await;
    }

    let in_flight = actions.store().state();
    let temp_id = in_flight.pending_task.as_ref().unwrap().temp_id;
    let placeholder = in_flight.task(temp_id).unwrap();
    assert!(placeholder.is_loading);
    assert_eq!(placeholder.title, "first");
    assert!(in_flight.visible_tasks().iter().any(|task| task.id == temp_id));

    let second = actions.create_task("second", false).await;
    assert!(matches!(second, Err(ActionError::CreationInFlight)));
    assert_eq!(actions.store().state(), in_flight);

    gateway.open();
    let created = first.await.unwrap().unwrap().unwrap();

    let state = actions.store().state();
    assert!(state.task(temp_id).is_none());
    assert_eq!(state.task(created.id), Some(&created));
    assert!(!state.has_pending());
}

type CreateHandle = tokio::task::JoinHandle<Result<Option<Task>, ActionError>>;

async fn start_create(actions: &Arc<TaskActions>, title: &'static str) -> (CreateHandle, TaskId) {
    let handle = tokio::spawn({
        let actions = Arc::clone(actions);
        async move { actions.create_task(title, false).await }
    });
    loop {
        if let Some(pending) = actions.store().select(|state| state.pending_task.clone()) {
            return (handle, pending.temp_id);
        }
        tokio::task::yield_now().await;
    }
}

fn assert_settled(state: &AppState, created: &Task, temp_id: TaskId) {
    assert!(!state.has_pending());
    assert!(state.task(temp_id).is_none());
    assert_eq!(state.task(created.id), Some(created));
    let listed = state
        .todos
        .iter()
        .flatten()
        .filter(|task| task.id == created.id)
        .count();
    assert_eq!(listed, 1);
    assert!(state.todos.iter().flatten().all(|task| !task.is_loading));
    assert_consistent(state);
}

#[tokio::test]
async fn reload_during_create_keeps_confirmed_task() {
    let gateway = Arc::new(GatedGateway::new(InMemoryGateway::with_tasks(seed())));
    let actions = Arc::new(actions_with(gateway.clone()));
    actions.load_tasks().await.unwrap();

    let (create, temp_id) = start_create(&actions, "third").await;
    actions.load_tasks().await.unwrap();

    let reloaded = actions.store().state();
    assert!(reloaded.has_pending());
    assert!(reloaded.task(temp_id).is_none());
    assert_eq!(ids(&reloaded), BTreeSet::from([1, 2]));
    assert_consistent(&reloaded);

    gateway.open();
    let created = create.await.unwrap().unwrap().unwrap();

    let state = actions.store().state();
    assert_eq!(ids(&state), BTreeSet::from([1, 2, created.id]));
    assert_settled(&state, &created, temp_id);
}

#[tokio::test]
async fn reload_to_empty_during_create_keeps_confirmed_task() {
    let gateway = Arc::new(GatedGateway::new(InMemoryGateway::new()));
    let actions = Arc::new(actions_with(gateway.clone()));

    let (create, temp_id) = start_create(&actions, "first").await;
    actions.load_tasks().await.unwrap();
    assert!(!actions.store().select(|state| state.is_loaded()));

    gateway.open();
    let created = create.await.unwrap().unwrap().unwrap();

    let state = actions.store().state();
    assert_eq!(state.todos, Some(vec![created.clone()]));
    assert_settled(&state, &created, temp_id);
}

#[tokio::test]
async fn reload_listing_created_task_leaves_a_single_entry() {
    let gateway = Arc::new(GatedGateway::responding_late(InMemoryGateway::with_tasks(
        seed(),
    )));
    let actions = Arc::new(actions_with(gateway.clone()));
    actions.load_tasks().await.unwrap();

    let (create, temp_id) = start_create(&actions, "third").await;
    actions.load_tasks().await.unwrap();
    assert_eq!(ids(&actions.store().state()).len(), 3);

    gateway.open();
    let created = create.await.unwrap().unwrap().unwrap();

    let state = actions.store().state();
    assert_eq!(ids(&state), BTreeSet::from([1, 2, created.id]));
    assert_settled(&state, &created, temp_id);
}

#[tokio::test]
async fn create_requires_user_and_title() {
    let gateway = Arc::new(InMemoryGateway::with_tasks(seed()));
    let anonymous = TaskActions::new(Store::new(), gateway.clone(), None);
    assert_eq!(anonymous.create_task("x", false).await.unwrap(), None);
    assert!(anonymous.store().state().todos.is_none());

    let actions = actions_with(gateway.clone());
    let err = actions.create_task("   ", false).await.unwrap_err();
    assert!(matches!(err, ActionError::Draft(_)));
    assert_eq!(
        actions.store().state().error.as_deref(),
        Some("Title should not be empty")
    );
    assert_eq!(gateway.tasks().len(), 2);
}

#[tokio::test]
async fn delete_success_removes_task() {
    let actions = actions_with(Arc::new(InMemoryGateway::with_tasks(seed())));
    actions.load_tasks().await.unwrap();

    actions.delete_task(1).await.unwrap();

    let state = actions.store().state();
    assert_eq!(ids(&state), BTreeSet::from([2]));
    assert_consistent(&state);
}

#[tokio::test]
async fn delete_failure_keeps_task() {
    let gateway = Arc::new(InMemoryGateway::with_tasks(seed()));
    let actions = actions_with(gateway.clone());
    actions.load_tasks().await.unwrap();
    let before = actions.store().state().todos;

    gateway.fail(GatewayOp::Delete);
    actions.delete_task(1).await.unwrap_err();

    let state = actions.store().state();
    assert_eq!(state.todos, before);
    assert_eq!(state.error.as_deref(), Some(DELETE_ERROR));
}

#[tokio::test]
async fn toggle_updates_and_reprojects() {
    let actions = actions_with(Arc::new(InMemoryGateway::with_tasks(seed())));
    actions.load_tasks().await.unwrap();
    actions.change_filter(Filter::Completed);

    let toggled = actions.toggle_task(1).await.unwrap().unwrap();

    assert!(toggled.completed);
    let state = actions.store().state();
    assert_eq!(state.visible_tasks().len(), 2);
    assert_eq!(state.active_count(), 0);
    assert_eq!(actions.toggle_task(404).await.unwrap(), None);
}

#[tokio::test]
async fn update_failure_sets_error_and_keeps_task() {
    let gateway = Arc::new(InMemoryGateway::with_tasks(seed()));
    let actions = actions_with(gateway.clone());
    actions.load_tasks().await.unwrap();

    gateway.fail(GatewayOp::Update);
    actions
        .update_task(2, TaskPatch::title("renamed"))
        .await
        .unwrap_err();

    let state = actions.store().state();
    assert_eq!(state.task(2), Some(&Task::new(2, 1, "b", true)));
    assert_eq!(state.error.as_deref(), Some(UPDATE_ERROR));
}

#[tokio::test]
async fn errors_survive_unrelated_success_until_cleared() {
    let gateway = Arc::new(InMemoryGateway::with_tasks(seed()));
    let actions = actions_with(gateway.clone());
    gateway.fail(GatewayOp::Fetch);
    actions.load_tasks().await.unwrap_err();

    gateway.recover(GatewayOp::Fetch);
    actions.load_tasks().await.unwrap();
    actions.create_task("c", false).await.unwrap();
    assert_eq!(actions.store().state().error.as_deref(), Some(LOAD_ERROR));

    actions.clear_error();
    assert!(actions.store().state().error.is_none());
}

#[rstest]
#[case(Filter::All)]
#[case(Filter::Active)]
#[case(Filter::Completed)]
#[tokio::test]
async fn repeated_filter_change_is_idempotent(#[case] filter: Filter) {
    let actions = actions_with(Arc::new(InMemoryGateway::with_tasks(seed())));
    actions.load_tasks().await.unwrap();

    actions.change_filter(filter);
    let once = actions.store().state().filtered_todos;
    actions.change_filter(filter);
    let twice = actions.store().state().filtered_todos;

    assert_eq!(once, twice);
}

#[tokio::test]
async fn projection_holds_across_mixed_sequence() {
    let gateway = Arc::new(InMemoryGateway::with_tasks(seed()));
    let actions = actions_with(gateway.clone());
    let store = actions.store().clone();
    let violations = Arc::new(parking_lot::Mutex::new(0usize));
    let _subscription = store.subscribe({
        let violations = Arc::clone(&violations);
        move |state: &AppState| {
            if state.filtered_todos != project(state.todos.as_deref(), state.filter) {
                *violations.lock() += 1;
            }
        }
    });

    actions.change_filter(Filter::Active);
    actions.load_tasks().await.unwrap();
    actions.create_task("c", false).await.unwrap();
    gateway.fail(GatewayOp::Create);
    actions.create_task("d", false).await.unwrap_err();
    actions.toggle_task(1).await.unwrap();
    actions.delete_task(2).await.unwrap();
    actions.change_filter(Filter::Completed);

    assert_eq!(*violations.lock(), 0);
    assert_consistent(&store.state());
}

#[tokio::test]
async fn telemetry_tracks_create_lifecycle() {
    let gateway = Arc::new(InMemoryGateway::with_tasks(seed()));
    let actions = actions_with(gateway.clone());
    gateway.fail(GatewayOp::Create);
    actions.create_task("x", false).await.unwrap_err();

    let events = actions.telemetry().events();
    if actions.telemetry().is_enabled() {
        assert!(matches!(events[0], Event::CreateStarted { .. }));
        assert!(matches!(events[1], Event::CreateRolledBack { .. }));
    } else {
        assert!(events.is_empty());
    }
}
