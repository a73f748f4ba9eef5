//! Tree-Scoped Pipeline Channels
//!
//! A channel is a value a node provides to its own subtree; descendants read
//! the nearest ancestor's value and any node may re-provide for the nodes
//! below it. Nesting thereby builds the implicit producer → consumer
//! pipeline: a source looks up its nearest Downstream consumer and feeds it,
//! a representation provides a Downstream that forwards to its mapper, and
//! so on.
//!
//! Channel values are cheap cloneable links, not component references —
//! calls dispatch either straight to the backend or through small shared
//! state cells, so no component ever borrows another.

pub mod shared;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::engine::{EngineHandle, OutputPort, RenderingBackend};
use crate::host::ContainerKey;
use crate::tree::render_queue::{DataRenderTarget, RenderQueueHandle, RenderRequest};

pub use shared::{SharedDatasetRegistry, SharedToken};

/// Context handed to channel calls: the backend plus the shared-dataset
/// registry (the one channel that outlives any single subtree).
pub struct ChannelCx<'a> {
    pub backend: &'a mut dyn RenderingBackend,
    pub shared: &'a mut SharedDatasetRegistry,
}

// ============================================================================
// Downstream channel
// ============================================================================

/// The nearest consumer a producer should feed.
#[derive(Clone, Debug)]
pub enum DownstreamLink {
    /// A concrete engine consumer (mapper or filter input).
    Consumer {
        /// The consuming engine object.
        consumer: EngineHandle,
    },
    /// A shared-dataset id; datasets pushed here are published process-wide.
    Shared {
        /// Logical id to publish under.
        id: String,
    },
}

impl DownstreamLink {
    /// Pushes a dataset by value into the consumer's input `port`.
    pub fn set_input_data(&self, cx: &mut ChannelCx<'_>, data: EngineHandle, port: u32) {
        match self {
            Self::Consumer { consumer } => cx.backend.set_input_data(*consumer, data, port),
            Self::Shared { id } => {
                cx.shared.register(id, data);
                cx.shared.dispatch_data_available(cx.backend, id);
            }
        }
    }

    /// Binds a producer output to the consumer's input `port`.
    pub fn set_input_connection(&self, cx: &mut ChannelCx<'_>, source: OutputPort, port: u32) {
        match self {
            Self::Consumer { consumer } => {
                cx.backend.set_input_connection(*consumer, source, port);
            }
            Self::Shared { id } => {
                log::warn!(
                    "shared dataset channel '{id}' accepts datasets only; \
                     output connections are ignored"
                );
            }
        }
    }
}

// ============================================================================
// Representation channel
// ============================================================================

pub(crate) struct RepState {
    pub actor: EngineHandle,
    pub data_available: bool,
    pub requested_visibility: bool,
    pub view: Option<ViewLink>,
}

/// Callbacks a representation exposes to its upstream producers.
///
/// Owns the visibility gate: the actor stays hidden until its first valid
/// data arrives, independent of the user-requested visibility.
#[derive(Clone)]
pub struct RepresentationLink {
    pub(crate) state: Rc<RefCell<RepState>>,
}

impl RepresentationLink {
    pub(crate) fn new(actor: EngineHandle, requested_visibility: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(RepState {
                actor,
                data_available: false,
                requested_visibility,
                view: None,
            })),
        }
    }

    /// Signals that upstream data is (or is no longer) available.
    ///
    /// The first `true` flips the actor from forced-hidden to the requested
    /// visibility and requests a data render; repeated `true` behaves like
    /// [`data_changed`](Self::data_changed); `false` re-hides the actor.
    pub fn data_available(&self, backend: &mut dyn RenderingBackend, available: bool) {
        let (apply, view) = {
            let mut state = self.state.borrow_mut();
            let was = state.data_available;
            state.data_available = available;
            let apply = if available != was {
                let visible = available && state.requested_visibility;
                Some((state.actor, visible))
            } else {
                None
            };
            (apply, state.view.clone())
        };
        if let Some((actor, visible)) = apply {
            backend.set_visibility(actor, visible);
        }
        if available
            && let Some(view) = view
        {
            view.request_data_render();
        }
    }

    /// Signals that already-available upstream data changed in place.
    pub fn data_changed(&self) {
        let state = self.state.borrow();
        if state.data_available
            && let Some(view) = &state.view
        {
            view.request_data_render();
        }
    }

    /// Whether data has arrived.
    #[must_use]
    pub fn is_data_available(&self) -> bool {
        self.state.borrow().data_available
    }
}

// ============================================================================
// Dataset channel
// ============================================================================

pub(crate) struct DatasetState {
    pub dataset: EngineHandle,
    pub downstream: Option<DownstreamLink>,
    pub port: u32,
    pub representation: Option<RepresentationLink>,
}

/// The dataset currently published by the nearest source node.
#[derive(Clone)]
pub struct DatasetLink {
    pub(crate) state: Rc<RefCell<DatasetState>>,
}

impl DatasetLink {
    pub(crate) fn new(
        dataset: EngineHandle,
        downstream: Option<DownstreamLink>,
        port: u32,
        representation: Option<RepresentationLink>,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(DatasetState {
                dataset,
                downstream,
                port,
                representation,
            })),
        }
    }

    /// The current dataset handle.
    #[must_use]
    pub fn get_dataset(&self) -> EngineHandle {
        self.state.borrow().dataset
    }

    /// Re-pushes the current data downstream and, once the dataset is
    /// non-empty, flips the owning representation's data-available flag.
    pub fn modified(&self, cx: &mut ChannelCx<'_>) {
        let (dataset, downstream, port, representation) = {
            let state = self.state.borrow();
            (state.dataset, state.downstream.clone(), state.port, state.representation.clone())
        };
        if let Some(downstream) = downstream {
            downstream.set_input_data(cx, dataset, port);
        }
        if let Some(rep) = representation {
            if cx.backend.dataset_is_empty(dataset) {
                rep.data_changed();
            } else {
                rep.data_available(cx.backend, true);
            }
        }
    }
}

// ============================================================================
// Field-data channel
// ============================================================================

/// Where array-producing descendants should attach their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLocation {
    PointData,
    CellData,
    Field,
}

/// The dataset and attribute location array components write into.
#[derive(Debug, Clone, Copy)]
pub struct FieldsLink {
    pub dataset: EngineHandle,
    pub location: FieldLocation,
}

// ============================================================================
// View channel
// ============================================================================

/// Camera-policy flags of a view.
///
/// Held in a cell shared by every clone of the view's link, so a prop
/// update reaches representations wired up in earlier passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewPolicy {
    /// Reset the camera whenever pipeline data changes.
    pub auto_reset_camera: bool,
    /// Whether the view participates in interaction.
    pub interactive: bool,
}

/// The render target the nearest ancestor view exposes to its subtree.
#[derive(Clone)]
pub struct ViewLink {
    pub window: EngineHandle,
    pub renderer: EngineHandle,
    pub interactor: Option<EngineHandle>,
    pub style: Option<EngineHandle>,
    pub(crate) policy: Rc<Cell<ViewPolicy>>,
    pub(crate) queue: RenderQueueHandle,
}

impl ViewLink {
    /// The view's current camera-policy flags.
    #[must_use]
    pub fn policy(&self) -> ViewPolicy {
        self.policy.get()
    }

    pub(crate) fn set_policy(&self, policy: ViewPolicy) {
        self.policy.set(policy);
    }

    /// Requests a property render of the owning window.
    pub fn request_render(&self) {
        self.queue.borrow_mut().request(self.window, RenderRequest::Property);
    }

    /// Requests a data render, subject to the view's camera-reset policy.
    pub fn request_data_render(&self) {
        let policy = self.policy.get();
        self.queue.borrow_mut().request(
            self.window,
            RenderRequest::Data(DataRenderTarget {
                renderer: self.renderer,
                style: self.style,
                auto_reset_camera: policy.auto_reset_camera,
                interactive: policy.interactive,
            }),
        );
    }
}

// ============================================================================
// View-root channel
// ============================================================================

/// The shared surface/window/interactor triple a multi-view root exposes.
///
/// Owned by the root; child views attach their renderer and must never
/// destroy any of these.
#[derive(Clone, Copy, Debug)]
pub struct ViewRootLink {
    pub surface: EngineHandle,
    pub window: EngineHandle,
    pub interactor: EngineHandle,
    pub container: ContainerKey,
}

// ============================================================================
// Per-node channel set
// ============================================================================

/// The channels a single tree node provides to its subtree.
#[derive(Clone, Default)]
pub struct Channels {
    pub downstream: Option<DownstreamLink>,
    pub dataset: Option<DatasetLink>,
    pub representation: Option<RepresentationLink>,
    pub fields: Option<FieldsLink>,
    pub view: Option<ViewLink>,
    pub view_root: Option<ViewRootLink>,
}
