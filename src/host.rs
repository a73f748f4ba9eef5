//! Host Surface Containers
//!
//! The embedding application owns the screen real estate; this module is
//! the DOM-equivalent boundary. A [`Container`] is a rectangle in host
//! (logical-pixel, top-down) coordinates plus a device-pixel ratio. The
//! application creates containers, hands their keys to views, and reports
//! geometry changes through
//! [`SceneTree::set_container_rect`](crate::tree::SceneTree::set_container_rect).
//!
//! [`ResizeWatcher`] fans a container's size changes out to any number of
//! independent callbacks — a shared surface is watched by the root for
//! surface sizing and by each child view for viewport sizing.

use glam::DVec2;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::tree::ServiceCx;

new_key_type! {
    /// Handle of one host container.
    pub struct ContainerKey;
}

/// An axis-aligned rectangle in host coordinates (logical pixels, top-down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HostRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl HostRect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Returns `true` if `p` lies inside the rectangle (inclusive).
    #[must_use]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// One rectangle of host screen space a view can occupy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    pub rect: HostRect,
    pub device_pixel_ratio: f64,
}

/// Registry of all host containers known to a tree.
#[derive(Default)]
pub struct Hosts {
    containers: SlotMap<ContainerKey, Container>,
}

impl Hosts {
    #[must_use]
    pub fn new() -> Self {
        Self { containers: SlotMap::with_key() }
    }

    /// Registers a container with its initial geometry.
    pub fn create_container(&mut self, rect: HostRect, device_pixel_ratio: f64) -> ContainerKey {
        self.containers.insert(Container { rect, device_pixel_ratio })
    }

    /// Removes a container. Views referencing it must already be unmounted.
    pub fn remove_container(&mut self, container: ContainerKey) {
        self.containers.remove(container);
    }

    #[must_use]
    pub fn rect(&self, container: ContainerKey) -> Option<HostRect> {
        self.containers.get(container).map(|c| c.rect)
    }

    #[must_use]
    pub fn device_pixel_ratio(&self, container: ContainerKey) -> f64 {
        self.containers.get(container).map_or(1.0, |c| c.device_pixel_ratio)
    }

    pub(crate) fn set_rect(&mut self, container: ContainerKey, rect: HostRect) {
        if let Some(c) = self.containers.get_mut(container) {
            c.rect = rect;
        } else {
            log::warn!("resize reported for unknown container");
        }
    }
}

/// Callback invoked with the container's new rectangle.
pub type ResizeCallback = Box<dyn FnMut(&mut ServiceCx<'_>, HostRect)>;

/// Identifies one resize watch for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchToken(u64);

/// Fan-out dispatcher for container size changes.
///
/// Multiple independent callbacks may watch the same container; all of them
/// run on every reported change. Watches must be removed on unmount so no
/// callback fires against destroyed engine objects.
#[derive(Default)]
pub struct ResizeWatcher {
    watches: FxHashMap<ContainerKey, Vec<(WatchToken, ResizeCallback)>>,
    next_token: u64,
}

impl ResizeWatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts watching `container`.
    pub fn watch(&mut self, container: ContainerKey, callback: ResizeCallback) -> WatchToken {
        let token = WatchToken(self.next_token);
        self.next_token += 1;
        self.watches.entry(container).or_default().push((token, callback));
        token
    }

    /// Stops the watch identified by `token`.
    pub fn unwatch(&mut self, container: ContainerKey, token: WatchToken) {
        if let Some(list) = self.watches.get_mut(&container) {
            list.retain(|(t, _)| *t != token);
            if list.is_empty() {
                self.watches.remove(&container);
            }
        }
    }

    /// Number of active watches on `container`.
    #[must_use]
    pub fn watch_count(&self, container: ContainerKey) -> usize {
        self.watches.get(&container).map_or(0, Vec::len)
    }

    /// Takes the callback list out for dispatch, leaving the watcher free
    /// to accept new registrations from inside the callbacks.
    pub(crate) fn take(&mut self, container: ContainerKey) -> Vec<(WatchToken, ResizeCallback)> {
        self.watches.remove(&container).unwrap_or_default()
    }

    /// Restores a callback list after dispatch, keeping any watches added
    /// while it was out.
    pub(crate) fn restore(
        &mut self,
        container: ContainerKey,
        mut callbacks: Vec<(WatchToken, ResizeCallback)>,
    ) {
        if callbacks.is_empty() {
            return;
        }
        let slot = self.watches.entry(container).or_default();
        let added = std::mem::take(slot);
        callbacks.extend(added);
        *slot = callbacks;
    }
}
