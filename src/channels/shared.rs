//! Shared Dataset Registry
//!
//! A root-scoped mapping from a logical string id to a dataset handle plus
//! its "data available" state, letting an unrelated subtree consume data
//! published elsewhere without a tree ancestor/descendant relationship.
//!
//! Semantics:
//! - Last writer for a given id wins; the registry performs no merging.
//! - Subscriptions return tokens; [`unsubscribe`](SharedDatasetRegistry::unsubscribe)
//!   drops them.
//! - **Late join**: a subscriber arriving after data was already published
//!   receives an immediate synchronous callback with the current state.
//! - [`reset`](SharedDatasetRegistry::reset) clears everything, for test
//!   isolation.

use rustc_hash::FxHashMap;

use crate::channels::ChannelCx;
use crate::engine::{EngineHandle, RenderingBackend};

/// Callback fired with the published dataset.
pub type SharedCallback = Box<dyn FnMut(&mut ChannelCx<'_>, EngineHandle)>;

/// Identifies one subscription for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedToken {
    id: String,
    serial: u64,
}

#[derive(Default)]
struct SharedEntry {
    dataset: Option<EngineHandle>,
    available: bool,
    on_available: Vec<(u64, SharedCallback)>,
    on_changed: Vec<(u64, SharedCallback)>,
}

/// Process-wide (per tree) dataset sharing by logical id.
#[derive(Default)]
pub struct SharedDatasetRegistry {
    entries: FxHashMap<String, SharedEntry>,
    next_serial: u64,
}

impl SharedDatasetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `dataset` under `id`, replacing any previous publication.
    pub fn register(&mut self, id: &str, dataset: EngineHandle) {
        self.entries.entry(id.to_owned()).or_default().dataset = Some(dataset);
    }

    /// Withdraws the publication for `id`; subscribers stay registered.
    pub fn unregister(&mut self, id: &str) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.dataset = None;
            entry.available = false;
        }
    }

    /// The dataset currently published under `id`, if any.
    #[must_use]
    pub fn dataset(&self, id: &str) -> Option<EngineHandle> {
        self.entries.get(id).and_then(|e| e.dataset)
    }

    /// Whether `id` has published data marked available.
    #[must_use]
    pub fn is_available(&self, id: &str) -> bool {
        self.entries.get(id).is_some_and(|e| e.available && e.dataset.is_some())
    }

    /// Marks `id` available and notifies every availability subscriber.
    pub fn dispatch_data_available(&mut self, backend: &mut dyn RenderingBackend, id: &str) {
        let Some(entry) = self.entries.get_mut(id) else { return };
        entry.available = true;
        let Some(dataset) = entry.dataset else { return };
        let callbacks = std::mem::take(&mut entry.on_available);
        let callbacks = self.run_callbacks(backend, dataset, callbacks);
        self.restore(id, callbacks, false);
    }

    /// Notifies every change subscriber that `id`'s data mutated in place.
    pub fn dispatch_data_changed(&mut self, backend: &mut dyn RenderingBackend, id: &str) {
        let Some(entry) = self.entries.get_mut(id) else { return };
        let Some(dataset) = entry.dataset else { return };
        let callbacks = std::mem::take(&mut entry.on_changed);
        let callbacks = self.run_callbacks(backend, dataset, callbacks);
        self.restore(id, callbacks, true);
    }

    /// Subscribes to availability of `id`, firing immediately if data was
    /// already published and marked available.
    pub fn on_data_available(
        &mut self,
        backend: &mut dyn RenderingBackend,
        id: &str,
        mut callback: SharedCallback,
    ) -> SharedToken {
        let token = self.next_token(id);
        if self.is_available(id) {
            let dataset = self.dataset(id).expect("available implies dataset");
            let mut cx = ChannelCx { backend, shared: self };
            callback(&mut cx, dataset);
        }
        self.entries
            .entry(id.to_owned())
            .or_default()
            .on_available
            .push((token.serial, callback));
        token
    }

    /// Subscribes to in-place changes of `id`.
    pub fn on_data_changed(&mut self, id: &str, callback: SharedCallback) -> SharedToken {
        let token = self.next_token(id);
        self.entries
            .entry(id.to_owned())
            .or_default()
            .on_changed
            .push((token.serial, callback));
        token
    }

    /// Removes the subscription behind `token`.
    pub fn unsubscribe(&mut self, token: &SharedToken) {
        if let Some(entry) = self.entries.get_mut(&token.id) {
            entry.on_available.retain(|(serial, _)| *serial != token.serial);
            entry.on_changed.retain(|(serial, _)| *serial != token.serial);
        }
    }

    /// Clears all publications and subscriptions (test isolation).
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    fn next_token(&mut self, id: &str) -> SharedToken {
        let serial = self.next_serial;
        self.next_serial += 1;
        SharedToken { id: id.to_owned(), serial }
    }

    fn run_callbacks(
        &mut self,
        backend: &mut dyn RenderingBackend,
        dataset: EngineHandle,
        mut callbacks: Vec<(u64, SharedCallback)>,
    ) -> Vec<(u64, SharedCallback)> {
        let mut cx = ChannelCx { backend, shared: self };
        for (_, callback) in &mut callbacks {
            callback(&mut cx, dataset);
        }
        callbacks
    }

    fn restore(&mut self, id: &str, mut callbacks: Vec<(u64, SharedCallback)>, changed: bool) {
        let Some(entry) = self.entries.get_mut(id) else { return };
        let slot = if changed { &mut entry.on_changed } else { &mut entry.on_available };
        let added = std::mem::take(slot);
        callbacks.extend(added);
        *slot = callbacks;
    }
}
