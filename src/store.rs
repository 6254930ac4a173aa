//! The player store: single source of truth for the queue and playback intent.
//!
//! Every mutation is synchronous. Observers run after the state is fully
//! updated and before the mutating call returns; they only ever see a
//! `&PlayerState`, so they cannot mutate the store re-entrantly.

mod actions;
mod model;
mod watch;

pub use model::PlayerState;
pub use watch::SubscriptionId;

use crate::persist::QueuePersistence;

use watch::Watchers;

pub struct PlayerStore {
    state: PlayerState,
    watchers: Watchers,
    persistence: QueuePersistence,
}

impl PlayerStore {
    pub fn new(persistence: QueuePersistence) -> Self {
        Self {
            state: PlayerState::default(),
            watchers: Watchers::default(),
            persistence,
        }
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Observe one projection of the state.
    ///
    /// `on_change` runs after a mutation only when `selector` yields a value
    /// different from the one it yielded after the previous mutation (or at
    /// subscription time). Progress updates therefore never wake a listener
    /// that selects something else.
    pub fn subscribe_with_selector<T, S, F>(&mut self, selector: S, on_change: F) -> SubscriptionId
    where
        T: PartialEq + 'static,
        S: Fn(&PlayerState) -> T + 'static,
        F: FnMut(&T, &PlayerState) + 'static,
    {
        self.watchers.add(&self.state, selector, on_change)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.watchers.remove(id)
    }

    /// Wait for queued snapshot writes to land.
    pub fn flush_persistence(&self) {
        self.persistence.flush();
    }

    fn commit(&mut self) {
        self.watchers.notify(&self.state);
    }

    fn persist(&self) {
        self.persistence
            .save(&self.state.queue, self.state.current_index);
    }
}

#[cfg(test)]
mod tests;
