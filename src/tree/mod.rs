//! Scene Tree & Reconciler
//!
//! [`SceneTree`] owns everything: the rendering backend, the mounted node
//! arena, the teardown scope arena and the shared tree services. Each call
//! to [`update`](SceneTree::update) reconciles a declarative [`Element`]
//! tree against the mounted one — matching nodes by key, then by kind and
//! position — mounting, updating and unmounting components as needed, and
//! finally flushes the render queue so any number of synchronous requests
//! against a window collapse into one frame.
//!
//! # Design Principles
//!
//! - Components never hold references to one another; they communicate
//!   through the channels their ancestors provide and through small shared
//!   state cells, so reconciliation needs no graph-wide borrow.
//! - During mount and update a node's component is taken out of the arena,
//!   run against a [`Ctx`], and put back — the component can then freely
//!   walk the arena for channel lookups.
//! - An error in one subtree does not abort the pass: the rest of the tree
//!   still reconciles, and the first error is returned at the end.

pub mod element;
pub mod render_queue;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use glam::DVec2;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::channels::{
    Channels, DatasetLink, DownstreamLink, FieldsLink, RepresentationLink, SharedDatasetRegistry,
    ViewLink, ViewRootLink,
};
use crate::engine::{DisplayRect, EngineHandle, RenderingBackend};
use crate::errors::{Result, TrellisError};
use crate::host::{ContainerKey, HostRect, Hosts, ResizeWatcher};
use crate::lifecycle::{Cleanup, CleanupToken, ResourceRegistry, ScopeArena, ScopeKey};
use crate::picking::pointer::SubKind;
use crate::picking::{
    AreaPickResult, Debouncer, FrustumPickResult, PickCallback, PickResult, PointerEvent,
    PointerEventKind, PointerRouter, SubscriptionToken, picker,
};
use crate::pipeline::{
    AlgorithmComponent, DataSourceComponent, FieldArrayComponent, ReaderComponent,
    RepresentationComponent, ShareDataSetComponent,
};
use crate::view::{MultiViewRootComponent, ViewComponent, ViewRef};

pub use element::{Element, ElementKind, ElementSpec};
pub use render_queue::{RenderQueue, RenderQueueHandle, RenderRequest};

use render_queue::DataRenderTarget;

new_key_type! {
    /// Handle of one mounted tree node.
    pub struct NodeKey;
}

/// Maximum distance between a press and release for them to count as a
/// click, in display pixels.
const CLICK_SLOP_PX: f64 = 5.0;

/// Shared services every component can reach through its [`Ctx`].
pub struct Services {
    pub registry: ResourceRegistry,
    pub hosts: Hosts,
    pub watcher: ResizeWatcher,
    pub queue: RenderQueueHandle,
    pub shared: SharedDatasetRegistry,
    pub pointer: PointerRouter,
    pub(crate) actor_index: FxHashMap<EngineHandle, String>,
    pub(crate) next_rep_id: u64,
}

impl Services {
    pub(crate) fn new() -> Self {
        Self {
            registry: ResourceRegistry::new(),
            hosts: Hosts::new(),
            watcher: ResizeWatcher::new(),
            queue: Rc::new(RefCell::new(RenderQueue::new())),
            shared: SharedDatasetRegistry::new(),
            pointer: PointerRouter::new(),
            actor_index: FxHashMap::default(),
            next_rep_id: 1,
        }
    }
}

/// Backend plus services, the context scope cleanups and resize callbacks
/// run against.
pub struct ServiceCx<'a> {
    pub backend: &'a mut dyn RenderingBackend,
    pub svc: &'a mut Services,
}

/// One mounted node.
pub(crate) struct TreeNode {
    parent: Option<NodeKey>,
    children: SmallVec<[NodeKey; 4]>,
    key: Option<String>,
    kind: ElementKind,
    component: Option<Box<dyn Component>>,
    pub(crate) channels: Channels,
    scope: ScopeKey,
}

/// A mounted component behind a tree node.
///
/// Prop updates are dispatched through a concrete-type downcast in the
/// reconciler, so the trait itself only covers the kind-independent surface.
pub trait Component {
    /// Creates the component's engine objects and registers its teardown.
    fn mount(&mut self, cx: &mut Ctx<'_>) -> Result<()>;

    /// Runs before the node's scope is destroyed. Most components tear down
    /// entirely through scope cleanups and leave this empty.
    fn unmount(&mut self, _cx: &mut Ctx<'_>) {}

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

/// Context a component runs against during mount and update.
pub struct Ctx<'a> {
    pub(crate) node: NodeKey,
    pub(crate) nodes: &'a mut SlotMap<NodeKey, TreeNode>,
    pub(crate) scopes: &'a mut ScopeArena,
    pub backend: &'a mut dyn RenderingBackend,
    pub svc: &'a mut Services,
}

impl Ctx<'_> {
    /// Mutates the channel set this node provides to its subtree.
    pub fn provide(&mut self, f: impl FnOnce(&mut Channels)) {
        if let Some(node) = self.nodes.get_mut(self.node) {
            f(&mut node.channels);
        }
    }

    fn walk<T>(&self, f: impl Fn(&Channels) -> Option<T>) -> Option<T> {
        let mut cursor = self.nodes.get(self.node).and_then(|n| n.parent);
        while let Some(key) = cursor {
            let node = self.nodes.get(key)?;
            if let Some(value) = f(&node.channels) {
                return Some(value);
            }
            cursor = node.parent;
        }
        None
    }

    /// The nearest ancestor's downstream consumer. Producers with no
    /// consumer in scope are wiring bugs.
    pub fn find_downstream(&self) -> Result<DownstreamLink> {
        self.walk(|ch| ch.downstream.clone())
            .ok_or(TrellisError::MissingChannel { channel: "downstream" })
    }

    /// The nearest ancestor representation, if the node sits under one.
    #[must_use]
    pub fn find_representation(&self) -> Option<RepresentationLink> {
        self.walk(|ch| ch.representation.clone())
    }

    /// The nearest ancestor dataset, if the node sits under a source.
    #[must_use]
    pub fn find_dataset(&self) -> Option<DatasetLink> {
        self.walk(|ch| ch.dataset.clone())
    }

    /// The nearest ancestor field target, if the node sits under a source.
    #[must_use]
    pub fn find_fields(&self) -> Option<FieldsLink> {
        self.walk(|ch| ch.fields)
    }

    /// The nearest ancestor view. Representations outside a view are
    /// wiring bugs.
    pub fn find_view(&self) -> Result<ViewLink> {
        self.walk(|ch| ch.view.clone())
            .ok_or(TrellisError::MissingChannel { channel: "view" })
    }

    /// The nearest ancestor multi-view root, deciding a view's mount mode.
    #[must_use]
    pub fn find_view_root(&self) -> Option<ViewRootLink> {
        self.walk(|ch| ch.view_root)
    }

    /// The node's teardown scope.
    #[must_use]
    pub fn scope(&self) -> ScopeKey {
        self.nodes.get(self.node).map(|n| n.scope).unwrap_or_default()
    }

    /// Registers a cleanup on the node's scope.
    pub fn wrap_cleanup(&mut self, cleanup: Cleanup) -> CleanupToken {
        let scope = self.scope();
        self.scopes.wrap(scope, cleanup)
    }

    /// Unregisters and immediately runs one registered cleanup.
    pub fn run_cleanup_now(&mut self, token: CleanupToken) {
        let mut scx = ServiceCx { backend: &mut *self.backend, svc: &mut *self.svc };
        self.scopes.run_now(token, &mut scx);
    }

    /// Shared handle to the tree's render queue.
    #[must_use]
    pub fn queue(&self) -> RenderQueueHandle {
        self.svc.queue.clone()
    }

    /// Context for channel calls (backend plus shared-dataset registry).
    pub fn channel_cx(&mut self) -> crate::channels::ChannelCx<'_> {
        crate::channels::ChannelCx {
            backend: &mut *self.backend,
            shared: &mut self.svc.shared,
        }
    }
}

fn build_component(spec: ElementSpec, has_children: bool) -> Box<dyn Component> {
    match spec {
        ElementSpec::View(p) => Box::new(ViewComponent::new(p)),
        ElementSpec::MultiViewRoot(p) => Box::new(MultiViewRootComponent::new(p)),
        ElementSpec::Representation(p) => Box::new(RepresentationComponent::new(p)),
        ElementSpec::Algorithm(p) => Box::new(AlgorithmComponent::new(p)),
        ElementSpec::DataSource(p) => Box::new(DataSourceComponent::new(p)),
        ElementSpec::FieldArray(p) => Box::new(FieldArrayComponent::new(p)),
        ElementSpec::Reader(p) => Box::new(ReaderComponent::new(p)),
        ElementSpec::ShareDataSet(p) => Box::new(ShareDataSetComponent::new(p, has_children)),
    }
}

fn apply_component(
    component: &mut dyn Component,
    cx: &mut Ctx<'_>,
    spec: ElementSpec,
) -> Result<()> {
    // The reconciler only updates kind-matched nodes, so the downcast holds.
    let any = component.as_any_mut();
    match spec {
        ElementSpec::View(p) => {
            any.downcast_mut::<ViewComponent>().expect("kind matched").apply(cx, p)
        }
        ElementSpec::MultiViewRoot(p) => {
            any.downcast_mut::<MultiViewRootComponent>().expect("kind matched").apply(cx, p)
        }
        ElementSpec::Representation(p) => {
            any.downcast_mut::<RepresentationComponent>().expect("kind matched").apply(cx, p)
        }
        ElementSpec::Algorithm(p) => {
            any.downcast_mut::<AlgorithmComponent>().expect("kind matched").apply(cx, p)
        }
        ElementSpec::DataSource(p) => {
            any.downcast_mut::<DataSourceComponent>().expect("kind matched").apply(cx, p)
        }
        ElementSpec::FieldArray(p) => {
            any.downcast_mut::<FieldArrayComponent>().expect("kind matched").apply(cx, p)
        }
        ElementSpec::Reader(p) => {
            any.downcast_mut::<ReaderComponent>().expect("kind matched").apply(cx, p)
        }
        ElementSpec::ShareDataSet(p) => {
            any.downcast_mut::<ShareDataSetComponent>().expect("kind matched").apply(cx, p)
        }
    }
}

/// The mounted scene tree, generic over the wrapped rendering engine.
pub struct SceneTree<B: RenderingBackend> {
    backend: B,
    nodes: SlotMap<NodeKey, TreeNode>,
    roots: Vec<NodeKey>,
    scopes: ScopeArena,
    svc: Services,
}

impl<B: RenderingBackend> SceneTree<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
            scopes: ScopeArena::new(),
            svc: Services::new(),
        }
    }

    // ========================================================================
    // Host containers
    // ========================================================================

    /// Registers a host container with its initial geometry.
    pub fn create_container(&mut self, rect: HostRect, device_pixel_ratio: f64) -> ContainerKey {
        self.svc.hosts.create_container(rect, device_pixel_ratio)
    }

    /// Removes a host container and everything routed through it.
    pub fn remove_container(&mut self, container: ContainerKey) {
        self.svc.pointer.remove_container(container);
        self.svc.hosts.remove_container(container);
    }

    /// Reports a container's new rectangle, fanning it out to every watcher
    /// and flushing any renders they requested.
    pub fn set_container_rect(&mut self, container: ContainerKey, rect: HostRect) {
        self.svc.hosts.set_rect(container, rect);
        let mut callbacks = self.svc.watcher.take(container);
        {
            let mut scx = ServiceCx { backend: &mut self.backend, svc: &mut self.svc };
            for (_, callback) in &mut callbacks {
                callback(&mut scx, rect);
            }
        }
        self.svc.watcher.restore(container, callbacks);
        self.flush_renders();
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Reconciles the declarative `elements` against the mounted tree.
    ///
    /// An error in one subtree is contained: the failing node is skipped
    /// (a failed mount is rolled back, a failed update keeps its previous
    /// state), the rest of the pass completes, renders flush, and the first
    /// error is returned.
    pub fn update(&mut self, elements: Vec<Element>) -> Result<()> {
        let mut first_err = None;
        let existing = std::mem::take(&mut self.roots);
        self.roots = self.reconcile_children(None, None, existing, elements, &mut first_err);
        self.flush_renders();
        match first_err {
            None => Ok(()),
            Some(err) => {
                log::error!("update pass finished with an error: {err}");
                Err(err)
            }
        }
    }

    /// Unmounts the whole tree, last root first.
    pub fn unmount_all(&mut self) {
        let roots = std::mem::take(&mut self.roots);
        for root in roots.into_iter().rev() {
            self.unmount_node(root);
        }
        self.flush_renders();
    }

    fn reconcile_children(
        &mut self,
        parent: Option<NodeKey>,
        parent_scope: Option<ScopeKey>,
        existing: Vec<NodeKey>,
        elements: Vec<Element>,
        first_err: &mut Option<TrellisError>,
    ) -> Vec<NodeKey> {
        let mut remaining: Vec<Option<NodeKey>> = existing.into_iter().map(Some).collect();
        let mut next = Vec::with_capacity(elements.len());
        for element in elements {
            let kind = element.spec.kind();
            let pos = remaining.iter().position(|slot| {
                slot.is_some_and(|key| {
                    self.nodes
                        .get(key)
                        .is_some_and(|n| n.kind == kind && n.key == element.key)
                })
            });
            match pos.and_then(|i| remaining[i].take()) {
                Some(node) => {
                    self.update_node(node, element, first_err);
                    next.push(node);
                }
                None => {
                    if let Some(node) = self.mount_node(parent, parent_scope, element, first_err)
                    {
                        next.push(node);
                    }
                }
            }
        }
        for node in remaining.into_iter().flatten() {
            self.unmount_node(node);
        }
        next
    }

    fn mount_node(
        &mut self,
        parent: Option<NodeKey>,
        parent_scope: Option<ScopeKey>,
        element: Element,
        first_err: &mut Option<TrellisError>,
    ) -> Option<NodeKey> {
        let Element { key, spec, children } = element;
        let kind = spec.kind();
        let scope = self.scopes.create_scope(parent_scope);
        let mut component = build_component(spec, !children.is_empty());
        let node = self.nodes.insert(TreeNode {
            parent,
            children: SmallVec::new(),
            key,
            kind,
            component: None,
            channels: Channels::default(),
            scope,
        });
        let mounted = {
            let mut cx = Ctx {
                node,
                nodes: &mut self.nodes,
                scopes: &mut self.scopes,
                backend: &mut self.backend,
                svc: &mut self.svc,
            };
            component.mount(&mut cx)
        };
        match mounted {
            Ok(()) => {
                if let Some(n) = self.nodes.get_mut(node) {
                    n.component = Some(component);
                }
                let mounted_children =
                    self.reconcile_children(Some(node), Some(scope), Vec::new(), children,
                        first_err);
                if let Some(n) = self.nodes.get_mut(node) {
                    n.children = SmallVec::from_vec(mounted_children);
                }
                Some(node)
            }
            Err(err) => {
                // Roll back: run whatever cleanups the partial mount managed
                // to register, then drop the node.
                if first_err.is_none() {
                    *first_err = Some(err);
                }
                let mut scx = ServiceCx { backend: &mut self.backend, svc: &mut self.svc };
                self.scopes.destroy(scope, &mut scx);
                self.nodes.remove(node);
                None
            }
        }
    }

    fn update_node(
        &mut self,
        node: NodeKey,
        element: Element,
        first_err: &mut Option<TrellisError>,
    ) {
        let Element { spec, children, .. } = element;
        let Some(mut component) = self.nodes.get_mut(node).and_then(|n| n.component.take())
        else {
            return;
        };
        let applied = {
            let mut cx = Ctx {
                node,
                nodes: &mut self.nodes,
                scopes: &mut self.scopes,
                backend: &mut self.backend,
                svc: &mut self.svc,
            };
            apply_component(component.as_mut(), &mut cx, spec)
        };
        if let Some(n) = self.nodes.get_mut(node) {
            n.component = Some(component);
        }
        if let Err(err) = applied
            && first_err.is_none()
        {
            // The node keeps its previous state; the subtree still updates.
            *first_err = Some(err);
        }
        let Some((existing, scope)) = self
            .nodes
            .get_mut(node)
            .map(|n| (std::mem::take(&mut n.children), n.scope))
        else {
            return;
        };
        let next_children =
            self.reconcile_children(Some(node), Some(scope), existing.into_vec(), children,
                first_err);
        if let Some(n) = self.nodes.get_mut(node) {
            n.children = SmallVec::from_vec(next_children);
        }
    }

    fn unmount_node(&mut self, node: NodeKey) {
        let Some((children, component, scope)) = self
            .nodes
            .get_mut(node)
            .map(|n| (std::mem::take(&mut n.children), n.component.take(), n.scope))
        else {
            return;
        };
        for child in children.into_iter().rev() {
            self.unmount_node(child);
        }
        if let Some(mut component) = component {
            let mut cx = Ctx {
                node,
                nodes: &mut self.nodes,
                scopes: &mut self.scopes,
                backend: &mut self.backend,
                svc: &mut self.svc,
            };
            component.unmount(&mut cx);
        }
        let mut scx = ServiceCx { backend: &mut self.backend, svc: &mut self.svc };
        self.scopes.destroy(scope, &mut scx);
        self.nodes.remove(node);
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Drains the render queue: one frame per requested window, with the
    /// camera-reset policy applied to each data-dirty renderer first.
    fn flush_renders(&mut self) {
        let pending = self.svc.queue.borrow_mut().drain();
        for (window, work) in pending {
            for target in work.data_targets {
                self.apply_camera_policy(&target);
            }
            self.backend.render(window);
        }
    }

    fn apply_camera_policy(&mut self, target: &DataRenderTarget) {
        if !target.auto_reset_camera {
            return;
        }
        let focal = self.backend.reset_camera(target.renderer);
        if !target.interactive {
            return;
        }
        if let Some(style) = target.style {
            if self.backend.style_supports_center_of_rotation(style) {
                self.backend.set_center_of_rotation(style, focal);
            } else {
                log::warn!("interactor style does not expose a center of rotation");
            }
        }
    }

    /// Renders the view's window immediately, bypassing the queue.
    pub fn render(&mut self, view: &ViewRef) -> Result<()> {
        let mounted = view.get().ok_or(TrellisError::ViewNotMounted)?;
        self.backend.render(mounted.window);
        Ok(())
    }

    /// Queues a property render for the view's window and flushes.
    pub fn request_render(&mut self, view: &ViewRef) -> Result<()> {
        let mounted = view.get().ok_or(TrellisError::ViewNotMounted)?;
        self.svc.queue.borrow_mut().request(mounted.window, RenderRequest::Property);
        self.flush_renders();
        Ok(())
    }

    // ========================================================================
    // Picking
    // ========================================================================

    /// Single-point pick against a mounted view, nearest hit first.
    pub fn pick(
        &mut self,
        view: &ViewRef,
        display: DVec2,
        tolerance: f64,
    ) -> Result<Vec<PickResult>> {
        let mounted = view.get().ok_or(TrellisError::ViewNotMounted)?;
        Ok(picker::single_pick(
            &mut self.backend,
            &self.svc.actor_index,
            mounted.renderer,
            display,
            tolerance,
        ))
    }

    /// Rectangle pick against a mounted view.
    pub fn area_pick(&mut self, view: &ViewRef, rect: DisplayRect) -> Result<AreaPickResult> {
        let mounted = view.get().ok_or(TrellisError::ViewNotMounted)?;
        Ok(picker::area_pick(&mut self.backend, &self.svc.actor_index, mounted.renderer, rect))
    }

    /// Rectangle pick plus the world-space selection frustum.
    pub fn frustum_pick(
        &mut self,
        view: &ViewRef,
        rect: DisplayRect,
    ) -> Result<FrustumPickResult> {
        let mounted = view.get().ok_or(TrellisError::ViewNotMounted)?;
        Ok(picker::frustum_pick(
            &mut self.backend,
            &self.svc.actor_index,
            mounted.renderer,
            rect,
        ))
    }

    // ========================================================================
    // Pointer routing
    // ========================================================================

    /// Routes one host pointer event: switches the current renderer in
    /// multi-view layouts and feeds pick subscriptions. `now` drives the
    /// hover debounce clock.
    pub fn dispatch_pointer(&mut self, container: ContainerKey, event: PointerEvent,
        now: Instant)
    {
        if matches!(event.kind, PointerEventKind::Enter | PointerEventKind::Wheel)
            && let Some(target) = self.svc.pointer.switch_targets.get(&container).copied()
        {
            self.backend.set_current_renderer(target.interactor, target.renderer);
            self.backend.set_interactor_style(target.interactor, target.style);
        }

        let backend = &mut self.backend;
        let actor_index = &self.svc.actor_index;
        for sub in &mut self.svc.pointer.subs {
            if sub.container != container {
                continue;
            }
            match (&mut sub.kind, event.kind) {
                (SubKind::Hover(debouncer), PointerEventKind::Move) => {
                    debouncer.call(event, now);
                }
                (SubKind::Hover(debouncer), PointerEventKind::Leave) => {
                    debouncer.cancel();
                }
                (SubKind::Down, PointerEventKind::Down)
                | (SubKind::Up, PointerEventKind::Up) => {
                    let results = picker::single_pick(
                        &mut *backend,
                        actor_index,
                        sub.view.renderer,
                        event.position,
                        sub.tolerance,
                    );
                    (sub.callback)(&results, &event);
                }
                (SubKind::Click { last_down }, PointerEventKind::Down) => {
                    *last_down = Some(event.position);
                }
                (SubKind::Click { last_down }, PointerEventKind::Up) => {
                    if let Some(down) = last_down.take()
                        && (down - event.position).length() <= CLICK_SLOP_PX
                    {
                        let results = picker::single_pick(
                            &mut *backend,
                            actor_index,
                            sub.view.renderer,
                            event.position,
                            sub.tolerance,
                        );
                        (sub.callback)(&results, &event);
                    }
                }
                _ => {}
            }
        }
    }

    /// Fires every hover subscription whose debounce deadline has passed.
    pub fn poll(&mut self, now: Instant) {
        let backend = &mut self.backend;
        let actor_index = &self.svc.actor_index;
        for sub in &mut self.svc.pointer.subs {
            if let SubKind::Hover(debouncer) = &mut sub.kind
                && let Some(event) = debouncer.poll(now)
            {
                let results = picker::single_pick(
                    &mut *backend,
                    actor_index,
                    sub.view.renderer,
                    event.position,
                    sub.tolerance,
                );
                (sub.callback)(&results, &event);
            }
        }
    }

    fn subscribe(
        &mut self,
        view: &ViewRef,
        tolerance: f64,
        kind: SubKind,
        callback: PickCallback,
    ) -> Result<SubscriptionToken> {
        let mounted = view.get().ok_or(TrellisError::ViewNotMounted)?;
        Ok(self.svc.pointer.subscribe(mounted.container, mounted, tolerance, kind, callback))
    }

    /// Subscribes to debounced hover picks over the view.
    pub fn on_hover(
        &mut self,
        view: &ViewRef,
        delay: Duration,
        tolerance: f64,
        callback: PickCallback,
    ) -> Result<SubscriptionToken> {
        self.subscribe(view, tolerance, SubKind::Hover(Debouncer::new(delay)), callback)
    }

    /// Subscribes to click picks (press and release within a small slop).
    pub fn on_click(
        &mut self,
        view: &ViewRef,
        tolerance: f64,
        callback: PickCallback,
    ) -> Result<SubscriptionToken> {
        self.subscribe(view, tolerance, SubKind::Click { last_down: None }, callback)
    }

    /// Subscribes to pointer-press picks.
    pub fn on_pointer_down(
        &mut self,
        view: &ViewRef,
        tolerance: f64,
        callback: PickCallback,
    ) -> Result<SubscriptionToken> {
        self.subscribe(view, tolerance, SubKind::Down, callback)
    }

    /// Subscribes to pointer-release picks.
    pub fn on_pointer_up(
        &mut self,
        view: &ViewRef,
        tolerance: f64,
        callback: PickCallback,
    ) -> Result<SubscriptionToken> {
        self.subscribe(view, tolerance, SubKind::Up, callback)
    }

    /// Removes one pointer subscription.
    pub fn unsubscribe(&mut self, token: SubscriptionToken) {
        self.svc.pointer.unsubscribe(token);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.svc.registry
    }

    #[must_use]
    pub fn hosts(&self) -> &Hosts {
        &self.svc.hosts
    }

    #[must_use]
    pub fn pointer(&self) -> &PointerRouter {
        &self.svc.pointer
    }

    #[must_use]
    pub fn shared_datasets(&self) -> &SharedDatasetRegistry {
        &self.svc.shared
    }
}

impl<B: RenderingBackend> Drop for SceneTree<B> {
    fn drop(&mut self) {
        self.unmount_all();
    }
}
