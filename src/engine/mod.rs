//! External Rendering Engine Boundary
//!
//! The scene objects themselves (windows, renderers, cameras, actors,
//! mappers, algorithms, readers) are owned by an external retained-mode
//! rendering engine. This crate never reaches past the narrow contract
//! defined here: every engine object is an opaque [`EngineHandle`] whose
//! properties are passed through verbatim as a [`PropBag`].
//!
//! [`RenderingBackend`] is the full handle contract consumed by the tree:
//! generic `create`/`set`/`get`/`delete`, the pipeline port operations,
//! window/renderer/interactor composition, picking queries and reader
//! feeding. [`mock::MockEngine`] implements the whole trait in memory and
//! is what the integration tests drive.

pub mod mock;

use glam::{DVec2, DVec3};

use crate::errors::Result;

/// Opaque identity of an externally-owned engine object.
///
/// Handles are allocated by the backend and have no meaning beyond it;
/// the tree only stores, compares and hands them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineHandle(pub u64);

impl std::fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque property bag applied to engine objects verbatim.
pub type PropBag = serde_json::Map<String, serde_json::Value>;

/// One output slot of a producer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputPort {
    /// The producing object.
    pub producer: EngineHandle,
    /// Output slot index on the producer.
    pub index: u32,
}

/// What is currently bound to one input port of a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputBinding {
    /// A live producer connection.
    Connection(OutputPort),
    /// A dataset pushed by value.
    Data(EngineHandle),
}

/// One raw hit returned by the backend's pick queries.
///
/// Carries engine-internal identities; the picking subsystem maps these
/// back to logical representation ids before anything reaches a caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// The hit prop (actor) handle.
    pub prop: EngineHandle,
    /// Display-space position of the hit (x, y, depth in [0, 1]).
    pub display_position: DVec3,
    /// Engine-side composite index within the prop, if any.
    pub composite_id: Option<u64>,
}

/// An axis-aligned rectangle in display coordinates (pixels, top-down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl DisplayRect {
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Returns `true` if `p` lies inside the rectangle (inclusive).
    #[must_use]
    pub fn contains(&self, p: DVec2) -> bool {
        let (xa, xb) = (self.x0.min(self.x1), self.x0.max(self.x1));
        let (ya, yb) = (self.y0.min(self.y1), self.y0.max(self.y1));
        p.x >= xa && p.x <= xb && p.y >= ya && p.y <= yb
    }
}

/// The contract every wrapped rendering engine must satisfy.
///
/// The tree assumes nothing about an object beyond this shape. Class names
/// are plain strings; unknown classes are the backend's to reject. All
/// mutating calls are synchronous — ordering, not parallelism, is the
/// concern of this crate.
pub trait RenderingBackend {
    // ========================================================================
    // Generic object contract
    // ========================================================================
    /// Instantiates an engine object of `class` with initial properties.
    fn create(&mut self, class: &str, initial: &PropBag) -> Result<EngineHandle>;

    /// Applies `props` to an object. Returns `true` if anything changed.
    fn set(&mut self, handle: EngineHandle, props: &PropBag) -> Result<bool>;

    /// Reads back a single property, if present.
    fn get(&self, handle: EngineHandle, key: &str) -> Option<serde_json::Value>;

    /// Destroys an object. Calls on handles already destroyed are no-ops.
    fn delete(&mut self, handle: EngineHandle);

    // ========================================================================
    // Pipeline ports
    // ========================================================================
    /// Returns the producer's output port at `index`.
    fn output_port(&self, producer: EngineHandle, index: u32) -> OutputPort {
        OutputPort { producer, index }
    }

    /// Number of input ports the consumer exposes (0 for sources).
    fn num_input_ports(&self, consumer: EngineHandle) -> u32;

    /// Binds a producer output to the consumer's input `port`.
    fn set_input_connection(&mut self, consumer: EngineHandle, source: OutputPort, port: u32);

    /// Pushes a dataset by value into the consumer's input `port`.
    fn set_input_data(&mut self, consumer: EngineHandle, data: EngineHandle, port: u32);

    /// What is currently bound to the consumer's input `port`.
    fn input_binding(&self, consumer: EngineHandle, port: u32) -> Option<InputBinding>;

    /// Whether a dataset currently holds no geometry.
    fn dataset_is_empty(&self, dataset: EngineHandle) -> bool;

    // ========================================================================
    // Window / renderer composition
    // ========================================================================
    /// Ties a render window to its rendering surface.
    fn attach_surface(&mut self, window: EngineHandle, surface: EngineHandle);

    /// Resizes the window's surface, in device pixels.
    fn set_window_size(&mut self, window: EngineHandle, width: u32, height: u32);

    /// Adds a renderer (viewport) to a window.
    fn add_renderer(&mut self, window: EngineHandle, renderer: EngineHandle);

    /// Removes a renderer from a window.
    fn remove_renderer(&mut self, window: EngineHandle, renderer: EngineHandle);

    /// Sets the renderer's normalized viewport `[x_min, y_min, x_max, y_max]`.
    fn set_viewport(&mut self, renderer: EngineHandle, viewport: [f64; 4]);

    /// Adds an actor to a renderer.
    fn add_actor(&mut self, renderer: EngineHandle, actor: EngineHandle);

    /// Removes an actor from a renderer.
    fn remove_actor(&mut self, renderer: EngineHandle, actor: EngineHandle);

    /// Assigns a mapper to an actor.
    fn set_mapper(&mut self, actor: EngineHandle, mapper: EngineHandle);

    /// Shows or hides an actor.
    fn set_visibility(&mut self, actor: EngineHandle, visible: bool);

    /// The renderer's active camera (engine-owned, created lazily).
    fn active_camera(&mut self, renderer: EngineHandle) -> EngineHandle;

    /// Resets the renderer's camera to frame its props.
    ///
    /// Returns the new focal point so the caller can re-center an
    /// interactor style's center of rotation.
    fn reset_camera(&mut self, renderer: EngineHandle) -> DVec3;

    /// Renders one frame of the window.
    fn render(&mut self, window: EngineHandle);

    // ========================================================================
    // Interactor / style
    // ========================================================================
    /// Binds an interactor to the surface it listens on.
    fn bind_interactor(&mut self, interactor: EngineHandle, surface: EngineHandle);

    /// Switches the interactor's current renderer.
    fn set_current_renderer(&mut self, interactor: EngineHandle, renderer: EngineHandle);

    /// Switches the interactor's current style.
    fn set_interactor_style(&mut self, interactor: EngineHandle, style: EngineHandle);

    /// Removes (and destroys) all manipulators from a style.
    fn clear_manipulators(&mut self, style: EngineHandle);

    /// Adds a configured manipulator object to a style.
    fn add_manipulator(&mut self, style: EngineHandle, manipulator: EngineHandle);

    /// Whether the style exposes a center-of-rotation. Not all styles do.
    fn style_supports_center_of_rotation(&self, style: EngineHandle) -> bool;

    /// Re-centers the style's center of rotation.
    fn set_center_of_rotation(&mut self, style: EngineHandle, center: DVec3);

    // ========================================================================
    // Picking
    // ========================================================================
    /// Picks the props within `tolerance` pixels of `display`, nearest first.
    fn pick(&mut self, renderer: EngineHandle, display: DVec2, tolerance: f64) -> Vec<PickHit>;

    /// Picks every prop whose display position falls inside `rect`.
    fn area_pick(&mut self, renderer: EngineHandle, rect: DisplayRect) -> Vec<PickHit>;

    /// Back-projects a display coordinate (z in [0, 1]) to world space.
    fn display_to_world(&self, renderer: EngineHandle, display: DVec3) -> DVec3;

    // ========================================================================
    // Readers
    // ========================================================================
    /// Points a reader at a URL and loads it. Fetch failures propagate.
    fn set_reader_url(&mut self, reader: EngineHandle, url: &str, options: &PropBag)
    -> Result<()>;

    /// Feeds a reader from in-memory text.
    fn parse_as_text(&mut self, reader: EngineHandle, text: &str) -> Result<()>;

    /// Feeds a reader from an in-memory byte buffer.
    fn parse_as_bytes(&mut self, reader: EngineHandle, bytes: &[u8]) -> Result<()>;
}
