//! Picking & Pointer Interaction
//!
//! Geometry queries against a rendered view (single, area and frustum
//! picks) plus the pointer routing that drives them: debounced hover and
//! immediate down/up/click subscriptions, and per-container view switching
//! for multi-view layouts.

pub mod debounce;
pub mod picker;
pub mod pointer;

pub use debounce::Debouncer;
pub use picker::{AreaPickResult, FrustumPickResult, PickResult};
pub use pointer::{
    ModifierKeys, PickCallback, PointerButton, PointerEvent, PointerEventKind, PointerRouter,
    SubscriptionToken, SwitchTarget,
};
