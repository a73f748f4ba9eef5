#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Declarative scene-tree synchronization for retained-mode 3D rendering
//! engines.
//!
//! A caller describes the scene as a tree of [`Element`]s — views,
//! representations, sources, algorithms, readers — and hands it to
//! [`SceneTree::update`]. The tree reconciles the description against the
//! mounted state, creating, updating and destroying externally-owned engine
//! objects as needed, with deterministic ref-counted teardown, batched
//! render flushing, viewport composition for multi-view layouts and
//! pick-based selection.

pub mod channels;
pub mod engine;
pub mod errors;
pub mod host;
pub mod lifecycle;
pub mod picking;
pub mod pipeline;
pub mod tree;
pub mod view;

pub use channels::{DownstreamLink, FieldLocation, SharedToken};
pub use engine::mock::MockEngine;
pub use engine::{DisplayRect, EngineHandle, PropBag, RenderingBackend};
pub use errors::{Result, TrellisError};
pub use host::{ContainerKey, HostRect};
pub use picking::{
    AreaPickResult, FrustumPickResult, ModifierKeys, PickResult, PointerButton, PointerEvent,
    PointerEventKind, SubscriptionToken,
};
pub use pipeline::{
    AlgorithmProps, DataSourceProps, FieldArrayProps, ReaderProps, RepresentationProps,
    ShareDataSetProps,
};
pub use tree::{Element, ElementSpec, SceneTree};
pub use view::{
    ManipulatorAction, ManipulatorSettings, MountedView, MultiViewRootProps, ViewProps, ViewRef,
};
