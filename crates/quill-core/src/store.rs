//! The store: owns the current [`State`], applies actions through the
//! reducer, tells subscribers, and writes the snapshot back.

use std::fmt;

use tracing::{debug, warn};

use crate::action::Action;
use crate::model::State;
use crate::persist::{PersistError, Storage, load_state, save_state};
use crate::reducer::{Allocator, SystemAllocator, reduce_with};
use crate::seed::seed_state;

type Subscriber = Box<dyn FnMut(&State)>;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Store {
    state: State,
    storage: Box<dyn Storage>,
    key: String,
    alloc: Box<dyn Allocator>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("key", &self.key)
            .field("works", &self.state.works.len())
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Load the snapshot under `key` (or the seed) using UUID ids.
    pub fn open(storage: Box<dyn Storage>, key: impl Into<String>) -> Self {
        Self::with_allocator(storage, key, Box::new(SystemAllocator))
    }

    pub fn with_allocator(
        storage: Box<dyn Storage>,
        key: impl Into<String>,
        mut alloc: Box<dyn Allocator>,
    ) -> Self {
        let key = key.into();
        let state = load_state(storage.as_ref(), &key, alloc.as_mut());
        Self {
            state,
            storage,
            key,
            alloc,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Apply one action, notify subscribers, and persist.
    ///
    /// A failed write is logged and otherwise ignored; the in-memory state
    /// still advances.
    pub fn dispatch(&mut self, action: Action) {
        debug!(action = action.tag(), "dispatch");
        let state = std::mem::take(&mut self.state);
        self.state = reduce_with(state, action, self.alloc.as_mut());

        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.state);
        }

        if let Err(err) = save_state(self.storage.as_mut(), &self.key, &self.state) {
            warn!(key = %self.key, code = %err.code(), error = %err, "failed to persist state");
        }
    }

    /// Write the current state now.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the snapshot cannot be written.
    pub fn save(&mut self) -> Result<(), PersistError> {
        save_state(self.storage.as_mut(), &self.key, &self.state)
    }

    /// Replace everything with a fresh seed.
    pub fn reset(&mut self) {
        let seed = seed_state(self.alloc.as_mut());
        self.dispatch(Action::ImportData(Box::new(seed)));
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&State) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }
}
