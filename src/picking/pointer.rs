//! Pointer Events & Routing
//!
//! The host application forwards its pointer events to the tree through
//! [`SceneTree::dispatch_pointer`](crate::tree::SceneTree::dispatch_pointer),
//! tagged with the container they occurred in. The router does two jobs:
//!
//! - **view switching** — in multi-view mode, entering (or wheeling over) a
//!   child view's container makes that view's renderer and style current on
//!   the shared interactor, with no prior focus required;
//! - **pick subscriptions** — hover (debounced) and down/up/click
//!   (immediate) callbacks registered against a view.

use bitflags::bitflags;
use glam::DVec2;
use rustc_hash::FxHashMap;

use crate::engine::EngineHandle;
use crate::host::ContainerKey;
use crate::picking::PickResult;
use crate::picking::debounce::Debouncer;
use crate::view::MountedView;

bitflags! {
    /// Keyboard modifiers held during a pointer event.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ModifierKeys: u8 {
        const SHIFT   = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT     = 1 << 2;
    }
}

/// Pointer button, in host terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerButton {
    #[default]
    None,
    Left,
    Middle,
    Right,
}

impl PointerButton {
    /// Engine-side button number (0 = none).
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Left => 1,
            Self::Middle => 2,
            Self::Right => 3,
        }
    }
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Enter,
    Leave,
    Move,
    Down,
    Up,
    Wheel,
}

/// One pointer event in display coordinates of the originating container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: DVec2,
    pub button: PointerButton,
    pub modifiers: ModifierKeys,
}

/// Callback receiving the structured pick results and the originating event.
pub type PickCallback = Box<dyn FnMut(&[PickResult], &PointerEvent)>;

/// Identifies one pointer subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(pub(crate) u64);

/// Renderer/style pair made current when the pointer enters a container.
#[derive(Debug, Clone, Copy)]
pub struct SwitchTarget {
    pub interactor: EngineHandle,
    pub renderer: EngineHandle,
    pub style: EngineHandle,
}

pub(crate) enum SubKind {
    Hover(Debouncer<PointerEvent>),
    Click { last_down: Option<DVec2> },
    Down,
    Up,
}

pub(crate) struct PointerSub {
    pub token: SubscriptionToken,
    pub container: ContainerKey,
    pub view: MountedView,
    pub tolerance: f64,
    pub kind: SubKind,
    pub callback: PickCallback,
}

/// All pointer routing state of one tree.
#[derive(Default)]
pub struct PointerRouter {
    pub(crate) switch_targets: FxHashMap<ContainerKey, SwitchTarget>,
    pub(crate) subs: Vec<PointerSub>,
    next_token: u64,
}

impl PointerRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the renderer/style to activate for a container.
    pub fn register_switch(&mut self, container: ContainerKey, target: SwitchTarget) {
        self.switch_targets.insert(container, target);
    }

    /// Removes a container's switch target.
    pub fn remove_switch(&mut self, container: ContainerKey) {
        self.switch_targets.remove(&container);
    }

    pub(crate) fn subscribe(
        &mut self,
        container: ContainerKey,
        view: MountedView,
        tolerance: f64,
        kind: SubKind,
        callback: PickCallback,
    ) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token);
        self.next_token += 1;
        self.subs.push(PointerSub { token, container, view, tolerance, kind, callback });
        token
    }

    /// Removes one subscription, dropping any pending debounced call.
    pub fn unsubscribe(&mut self, token: SubscriptionToken) {
        self.subs.retain_mut(|sub| {
            if sub.token != token {
                return true;
            }
            if let SubKind::Hover(debouncer) = &mut sub.kind {
                debouncer.cancel();
            }
            false
        });
    }

    /// Removes every subscription and switch target tied to `container`.
    ///
    /// Called from a view's teardown scope so no callback or pending
    /// debounce survives the view's engine objects.
    pub fn remove_container(&mut self, container: ContainerKey) {
        self.switch_targets.remove(&container);
        self.subs.retain_mut(|sub| {
            if sub.container != container {
                return true;
            }
            if let SubKind::Hover(debouncer) = &mut sub.kind {
                debouncer.cancel();
            }
            false
        });
    }

    /// Number of active subscriptions (all containers).
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subs.len()
    }
}
