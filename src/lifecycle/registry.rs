//! Resource Lifecycle Registry
//!
//! Tracks externally-owned engine objects with an explicit reference count
//! and a pending-deletion flag, replacing garbage collection with
//! deterministic, deferred disposal.
//!
//! # Contract
//!
//! - [`register`](ResourceRegistry::register) begins tracking at count 0
//!   with a disposal callback.
//! - Every component that depends on an object without owning it calls
//!   [`inc_ref_count`](ResourceRegistry::inc_ref_count) on attach and
//!   [`dec_ref_count`](ResourceRegistry::dec_ref_count) on detach (e.g. a
//!   renderer sharing a window).
//! - The owning component calls
//!   [`mark_for_deletion`](ResourceRegistry::mark_for_deletion) on unmount.
//! - The disposer fires exactly once, only when the object is marked AND
//!   its count has returned to 0, after which all bookkeeping is removed.
//!
//! Decrementing a count of 0 is a double-release bug and is reported as
//! [`TrellisError::RefCountUnderflow`].

use rustc_hash::FxHashMap;

use crate::engine::{EngineHandle, RenderingBackend};
use crate::errors::{Result, TrellisError};

/// Disposal callback run against the backend when an object is released.
pub type Disposer = Box<dyn FnOnce(&mut dyn RenderingBackend)>;

struct Entry {
    ref_count: u32,
    pending_delete: bool,
    disposer: Option<Disposer>,
}

/// Ref-counted, deferred-deletion tracking for engine objects.
#[derive(Default)]
pub struct ResourceRegistry {
    entries: FxHashMap<EngineHandle, Entry>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: FxHashMap::default() }
    }

    /// Begins tracking `handle` at reference count 0.
    ///
    /// Re-registering a tracked handle replaces its disposer and resets the
    /// pending flag; the count is preserved.
    pub fn register(&mut self, handle: EngineHandle, disposer: Disposer) {
        match self.entries.get_mut(&handle) {
            Some(entry) => {
                entry.disposer = Some(disposer);
                entry.pending_delete = false;
            }
            None => {
                self.entries.insert(
                    handle,
                    Entry { ref_count: 0, pending_delete: false, disposer: Some(disposer) },
                );
            }
        }
    }

    /// Whether `handle` is currently tracked.
    #[must_use]
    pub fn is_tracked(&self, handle: EngineHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Current reference count of a tracked handle.
    #[must_use]
    pub fn ref_count(&self, handle: EngineHandle) -> Option<u32> {
        self.entries.get(&handle).map(|e| e.ref_count)
    }

    /// Records one more dependent of `handle`. Returns the new count.
    pub fn inc_ref_count(&mut self, handle: EngineHandle) -> Result<u32> {
        let entry =
            self.entries.get_mut(&handle).ok_or(TrellisError::NotTracked { handle })?;
        entry.ref_count += 1;
        Ok(entry.ref_count)
    }

    /// Records that one dependent of `handle` detached. Returns the new
    /// count, and disposes the object if it was already marked and this was
    /// the last dependent.
    pub fn dec_ref_count(
        &mut self,
        handle: EngineHandle,
        backend: &mut dyn RenderingBackend,
    ) -> Result<u32> {
        let entry =
            self.entries.get_mut(&handle).ok_or(TrellisError::NotTracked { handle })?;
        if entry.ref_count == 0 {
            log::error!("double release of engine object {handle}");
            return Err(TrellisError::RefCountUnderflow { handle });
        }
        entry.ref_count -= 1;
        let remaining = entry.ref_count;
        self.try_dispose(handle, backend);
        Ok(remaining)
    }

    /// Marks `handle` for deletion and immediately attempts disposal.
    pub fn mark_for_deletion(
        &mut self,
        handle: EngineHandle,
        backend: &mut dyn RenderingBackend,
    ) -> Result<()> {
        let entry =
            self.entries.get_mut(&handle).ok_or(TrellisError::NotTracked { handle })?;
        entry.pending_delete = true;
        self.try_dispose(handle, backend);
        Ok(())
    }

    /// Stops tracking `handle` without disposing it, for objects whose
    /// lifetime is guaranteed elsewhere.
    pub fn unregister(&mut self, handle: EngineHandle) {
        self.entries.remove(&handle);
    }

    fn try_dispose(&mut self, handle: EngineHandle, backend: &mut dyn RenderingBackend) {
        let ready = self
            .entries
            .get(&handle)
            .is_some_and(|e| e.pending_delete && e.ref_count == 0);
        if !ready {
            return;
        }
        // Remove the bookkeeping before running the disposer so a re-entrant
        // registration of the same handle starts clean.
        if let Some(entry) = self.entries.remove(&handle)
            && let Some(disposer) = entry.disposer
        {
            disposer(backend);
        }
    }
}
