//! Views & Viewport Composition
//!
//! A view couples one renderer to one host container. Standalone views own
//! their whole surface/window/interactor stack; views nested under a
//! [`MultiViewRootComponent`] instead attach a renderer to the root's shared
//! window and occupy a normalized viewport computed from their container's
//! rectangle within the root's.

pub mod manipulators;
pub mod multi_root;
pub mod view;
pub mod viewport;

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::EngineHandle;
use crate::host::ContainerKey;

pub use manipulators::{
    ManipulatorAction, ManipulatorSettings, default_settings, rebuild_manipulators,
};
pub use multi_root::{MultiViewRootComponent, MultiViewRootProps};
pub use view::{ViewComponent, ViewProps};
pub use viewport::{MIN_SURFACE_PX, Viewport, normalized_viewport, pixel_rect,
    scaled_surface_size};

/// The engine objects backing a mounted view, as exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountedView {
    pub window: EngineHandle,
    pub renderer: EngineHandle,
    pub container: ContainerKey,
    pub interactor: Option<EngineHandle>,
    pub style: Option<EngineHandle>,
}

/// A forwarded reference slot filled in when its view mounts.
///
/// Create one, pass it in [`ViewProps::view_ref`], and read it back after an
/// update pass to drive picking or manual renders against that view. The
/// slot empties again when the view unmounts. Compared by identity, so a
/// prop diff does not consider two clones of the same ref a change.
#[derive(Clone, Default)]
pub struct ViewRef {
    slot: Rc<RefCell<Option<MountedView>>>,
}

impl ViewRef {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The mounted view, if its component is currently in the tree.
    #[must_use]
    pub fn get(&self) -> Option<MountedView> {
        *self.slot.borrow()
    }

    pub(crate) fn set(&self, view: MountedView) {
        *self.slot.borrow_mut() = Some(view);
    }

    pub(crate) fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }
}

impl PartialEq for ViewRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl std::fmt::Debug for ViewRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewRef").field("mounted", &self.get().is_some()).finish()
    }
}
