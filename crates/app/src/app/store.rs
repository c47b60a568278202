//! Session-scoped owner of [`AppState`] with synchronous change notification.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::app::action::Action;
use crate::app::projection::project;
use crate::app::state::AppState;
use crate::app::update::reduce;

type Listener = dyn Fn(&AppState) + Send + Sync;

struct Inner {
    state: AppState,
    listeners: Vec<(u64, Arc<Listener>)>,
    next_listener_id: u64,
}

/// Holds the single authoritative [`AppState`] of a session.
///
/// Every dispatch runs the reducer and then the filter projection, both
/// under one lock, so `filtered_todos` is always derived from the final
/// `todos` and `filter` of the batch. Listeners are invoked afterwards,
/// outside the lock, with the resulting state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<Inner>>,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    /// Start a session from a prepared state; `filtered_todos` is derived, not trusted.
    pub fn with_state(mut state: AppState) -> Self {
        state.filtered_todos = project(state.todos.as_deref(), state.filter);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state,
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
        }
    }

    pub fn state(&self) -> AppState {
        self.inner.lock().state.clone()
    }

    /// Read part of the state without cloning all of it.
    pub fn select<T>(&self, selector: impl FnOnce(&AppState) -> T) -> T {
        selector(&self.inner.lock().state)
    }

    pub fn dispatch(&self, action: Action) {
        self.dispatch_if(|_| true, [action]);
    }

    /// Apply `actions` as one transition if `guard` accepts the current state.
    ///
    /// Returns `false`, without notifying anyone, when the guard rejects.
    pub fn dispatch_if<G, I>(&self, guard: G, actions: I) -> bool
    where
        G: FnOnce(&AppState) -> bool,
        I: IntoIterator<Item = Action>,
    {
        let (snapshot, listeners) = {
            let mut inner = self.inner.lock();
            if !guard(&inner.state) {
                return false;
            }

            let mut state = std::mem::take(&mut inner.state);
            for action in actions {
                tracing::trace!(action = action.label(), "store dispatch");
                state = reduce(state, action);
            }
            let filtered = project(state.todos.as_deref(), state.filter);
            inner.state = reduce(state, Action::SetFilteredTasks(filtered));

            if inner.listeners.is_empty() {
                return true;
            }
            let listeners: Vec<Arc<Listener>> = inner
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (inner.state.clone(), listeners)
        };

        for listener in listeners {
            listener(&snapshot);
        }
        true
    }

    /// Register `listener` to run after every completed dispatch.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AppState) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a listener registered; dropping it (or calling [`Subscription::unsubscribe`]) detaches.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    store: Weak<Mutex<Inner>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.lock().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
