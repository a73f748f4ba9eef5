//! Resource Lifecycle Primitives
//!
//! Three small building blocks the rest of the tree is built on:
//!
//! - [`registry::ResourceRegistry`] — ref-counted, deferred disposal of
//!   externally-owned engine objects.
//! - [`scope::ScopeArena`] — ordered-teardown scopes guaranteeing that
//!   descendants detach from shared engine objects before their owner is
//!   destroyed.
//! - [`effect::DepEffect`] — a dependency-gated effect guard with optional
//!   custom equality, used wherever re-running work on every pass would be
//!   wasteful (e.g. manipulator rebuilds).

pub mod effect;
pub mod registry;
pub mod scope;

pub use effect::DepEffect;
pub use registry::{Disposer, ResourceRegistry};
pub use scope::{Cleanup, CleanupToken, ScopeArena, ScopeKey};
