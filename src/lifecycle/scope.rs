//! Ordered Teardown Scopes
//!
//! A scope is a node in a tree mirroring the component tree, holding a list
//! of cleanup callbacks and a list of child scopes. Destroying a scope first
//! recursively destroys its child scopes (last-registered first), then runs
//! the scope's own callbacks in registration order, then clears both lists.
//!
//! This guarantees that descendants fully detach from shared engine objects
//! before the owning object itself is torn down — the ordering half of the
//! contract whose counting half lives in
//! [`ResourceRegistry`](crate::lifecycle::ResourceRegistry).

use slotmap::{SlotMap, new_key_type};

use crate::tree::ServiceCx;

new_key_type! {
    /// Handle of one teardown scope.
    pub struct ScopeKey;
}

/// A cleanup callback, run with access to the backend and tree services.
pub type Cleanup = Box<dyn FnOnce(&mut ServiceCx<'_>)>;

/// Identifies one registered cleanup for out-of-order manual execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupToken {
    scope: ScopeKey,
    index: usize,
}

#[derive(Default)]
struct Scope {
    parent: Option<ScopeKey>,
    children: Vec<ScopeKey>,
    cleanups: Vec<Option<Cleanup>>,
}

/// Arena owning the whole scope tree.
#[derive(Default)]
pub struct ScopeArena {
    scopes: SlotMap<ScopeKey, Scope>,
}

impl ScopeArena {
    #[must_use]
    pub fn new() -> Self {
        Self { scopes: SlotMap::with_key() }
    }

    /// Creates a scope, registering it as a child of `parent` when given.
    pub fn create_scope(&mut self, parent: Option<ScopeKey>) -> ScopeKey {
        let key = self.scopes.insert(Scope { parent, ..Scope::default() });
        if let Some(p) = parent
            && let Some(parent_scope) = self.scopes.get_mut(p)
        {
            parent_scope.children.push(key);
        }
        key
    }

    /// Whether `scope` is still alive (not yet destroyed).
    #[must_use]
    pub fn is_alive(&self, scope: ScopeKey) -> bool {
        self.scopes.contains_key(scope)
    }

    /// Registers a cleanup on `scope`; the returned token allows running it
    /// early (and exactly once) via [`run_now`](Self::run_now).
    pub fn wrap(&mut self, scope: ScopeKey, cleanup: Cleanup) -> CleanupToken {
        let Some(s) = self.scopes.get_mut(scope) else {
            log::error!("cleanup registered on a destroyed scope");
            return CleanupToken { scope, index: usize::MAX };
        };
        s.cleanups.push(Some(cleanup));
        CleanupToken { scope, index: s.cleanups.len() - 1 }
    }

    /// Unregisters the token's cleanup and runs it immediately.
    ///
    /// A later `destroy` of the scope will not run it again.
    pub fn run_now(&mut self, token: CleanupToken, cx: &mut ServiceCx<'_>) {
        let cleanup = self
            .scopes
            .get_mut(token.scope)
            .and_then(|s| s.cleanups.get_mut(token.index))
            .and_then(Option::take);
        if let Some(cleanup) = cleanup {
            cleanup(cx);
        }
    }

    /// Destroys `scope` and its whole subtree. Idempotent.
    ///
    /// Child scopes are destroyed first (last-registered first), then the
    /// scope's own callbacks run in registration order.
    pub fn destroy(&mut self, scope: ScopeKey, cx: &mut ServiceCx<'_>) {
        // Detach from the parent before recursing; the subtree below is
        // removed wholesale.
        if let Some(parent) = self.scopes.get(scope).and_then(|s| s.parent)
            && let Some(parent_scope) = self.scopes.get_mut(parent)
        {
            parent_scope.children.retain(|c| *c != scope);
        }
        self.destroy_inner(scope, cx);
    }

    fn destroy_inner(&mut self, scope: ScopeKey, cx: &mut ServiceCx<'_>) {
        let Some(mut s) = self.scopes.remove(scope) else {
            return;
        };
        for child in std::mem::take(&mut s.children).into_iter().rev() {
            self.destroy_inner(child, cx);
        }
        for cleanup in s.cleanups.drain(..).flatten() {
            cleanup(cx);
        }
    }
}
