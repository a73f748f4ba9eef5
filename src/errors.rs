//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! [`TrellisError`] distinguishes three failure classes:
//! - **usage errors** — structural wiring bugs (a channel read outside its
//!   provider's subtree, a double release of a tracked resource, picking
//!   against an unmounted view). These are returned loudly as `Err` so the
//!   bug is fixed at development time.
//! - **advisory conditions** — logged via `log::warn!` and never returned
//!   as errors (multiple reader inputs, a style without center-of-rotation
//!   support, an empty pick result).
//! - **external failures** — errors raised by the rendering engine itself,
//!   propagated verbatim in [`TrellisError::External`].
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, TrellisError>`.

use thiserror::Error;

use crate::engine::EngineHandle;

/// The main error type for trellis.
#[derive(Error, Debug)]
pub enum TrellisError {
    // ========================================================================
    // Usage Errors (wiring bugs)
    // ========================================================================
    /// A tree-scoped channel was read with no providing ancestor in scope.
    #[error("No {channel} channel provided by any ancestor")]
    MissingChannel {
        /// Name of the channel that was looked up.
        channel: &'static str,
    },

    /// A resource reference count was decremented below zero.
    ///
    /// This always indicates a double-release bug in a dependent component.
    #[error("Reference count underflow for engine object {handle} (double release)")]
    RefCountUnderflow {
        /// The over-released handle.
        handle: EngineHandle,
    },

    /// A resource operation targeted a handle the registry is not tracking.
    #[error("Engine object {handle} is not tracked by the resource registry")]
    NotTracked {
        /// The unknown handle.
        handle: EngineHandle,
    },

    /// A view-scoped API (picking, manual render) was invoked before the
    /// owning view mounted, or after it unmounted.
    #[error("View is not mounted")]
    ViewNotMounted,

    // ========================================================================
    // External Engine Errors
    // ========================================================================
    /// The engine rejected an object handle it does not know.
    #[error("Unknown engine object: {handle}")]
    UnknownObject {
        /// The rejected handle.
        handle: EngineHandle,
    },

    /// The engine does not expose the requested object class.
    #[error("Unknown engine class: {0}")]
    UnknownClass(String),

    /// An asynchronous engine operation (e.g. a reader URL fetch) failed.
    /// The core does not retry; retry policy belongs to the caller.
    #[error("External engine error: {0}")]
    External(String),

    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// Base64 decoding of a reader input failed.
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

/// Alias for `Result<T, TrellisError>`.
pub type Result<T> = std::result::Result<T, TrellisError>;
