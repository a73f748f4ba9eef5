//! View Component
//!
//! One renderer bound to one host container. The component runs in one of
//! two modes, decided at mount time by the presence of an ancestor
//! multi-view root:
//!
//! - **standalone** — the view owns a full surface/window/interactor/style
//!   stack and sizes the window's surface from its container rectangle;
//! - **shared** — the view creates only a renderer and style, attaches the
//!   renderer to the root's shared window, and occupies the normalized
//!   viewport its container rectangle covers within the root's.
//!
//! In both modes teardown is registered on the node's scope, so descendants
//! (representations) detach from the renderer before the renderer itself is
//! released.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;

use crate::channels::{ViewLink, ViewPolicy, ViewRootLink};
use crate::engine::PropBag;
use crate::errors::Result;
use crate::host::ContainerKey;
use crate::lifecycle::DepEffect;
use crate::picking::SwitchTarget;
use crate::tree::render_queue::RenderRequest;
use crate::tree::{Component, Ctx, ServiceCx};
use crate::view::manipulators::{ManipulatorSettings, default_settings, rebuild_manipulators};
use crate::view::viewport::{normalized_viewport, scaled_surface_size};
use crate::view::{MountedView, ViewRef};

/// Declarative view configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewProps {
    /// Host container the view occupies.
    pub container: ContainerKey,
    /// Renderer background color.
    pub background: [f64; 3],
    /// Properties applied to the renderer's active camera.
    pub camera: PropBag,
    /// Extra properties applied to the renderer verbatim.
    pub renderer: PropBag,
    /// Interactor style class. Fixed after mount.
    pub style_class: String,
    /// Pointer-to-camera-action bindings.
    pub interactor_settings: Vec<ManipulatorSettings>,
    /// Reset the camera whenever pipeline data changes.
    pub auto_reset_camera: bool,
    /// Whether the view participates in interaction at all.
    pub interactive: bool,
    /// Slot filled with the mounted engine objects, for picking and manual
    /// renders.
    pub view_ref: Option<ViewRef>,
}

impl ViewProps {
    #[must_use]
    pub fn new(container: ContainerKey) -> Self {
        Self {
            container,
            background: [0.2, 0.2, 0.2],
            camera: PropBag::new(),
            renderer: PropBag::new(),
            style_class: "InteractorStyleManipulator".to_owned(),
            interactor_settings: default_settings(),
            auto_reset_camera: true,
            interactive: true,
            view_ref: None,
        }
    }
}

fn policy_cell(props: &ViewProps) -> Rc<Cell<ViewPolicy>> {
    Rc::new(Cell::new(ViewPolicy {
        auto_reset_camera: props.auto_reset_camera,
        interactive: props.interactive,
    }))
}

fn renderer_props(props: &ViewProps) -> PropBag {
    let mut bag = props.renderer.clone();
    bag.insert("background".into(), json!(props.background));
    bag
}

struct Mounted {
    view: MountedView,
    link: ViewLink,
    manip_effect: DepEffect<Vec<ManipulatorSettings>>,
}

/// The view component. See the module docs for the two mount modes.
pub struct ViewComponent {
    props: ViewProps,
    mounted: Option<Mounted>,
}

impl ViewComponent {
    #[must_use]
    pub fn new(props: ViewProps) -> Self {
        Self { props, mounted: None }
    }

    fn mount_standalone(&mut self, cx: &mut Ctx<'_>) -> Result<Mounted> {
        let container = self.props.container;
        let surface = cx.backend.create("RenderSurface", &PropBag::new())?;
        let window = cx.backend.create("RenderWindow", &PropBag::new())?;
        cx.backend.attach_surface(window, surface);

        let renderer = cx.backend.create("Renderer", &renderer_props(&self.props))?;
        cx.backend.add_renderer(window, renderer);

        let interactor = cx.backend.create("RenderWindowInteractor", &PropBag::new())?;
        cx.backend.bind_interactor(interactor, surface);
        let style = cx.backend.create(&self.props.style_class, &PropBag::new())?;
        cx.backend.set_interactor_style(interactor, style);
        cx.backend.set_current_renderer(interactor, renderer);

        for handle in [surface, window, renderer, interactor, style] {
            cx.svc.registry.register(handle, Box::new(move |b| b.delete(handle)));
        }
        // The renderer holds the window until it detaches.
        cx.svc.registry.inc_ref_count(window)?;

        if let Some(rect) = cx.svc.hosts.rect(container) {
            let dpr = cx.svc.hosts.device_pixel_ratio(container);
            let (w, h) = scaled_surface_size(rect, dpr);
            cx.backend.set_window_size(window, w, h);
        }
        let watch = cx.svc.watcher.watch(
            container,
            Box::new(move |scx: &mut ServiceCx<'_>, rect| {
                let dpr = scx.svc.hosts.device_pixel_ratio(container);
                let (w, h) = scaled_surface_size(rect, dpr);
                scx.backend.set_window_size(window, w, h);
                scx.svc.queue.borrow_mut().request(window, RenderRequest::Property);
            }),
        );

        cx.svc
            .pointer
            .register_switch(container, SwitchTarget { interactor, renderer, style });

        let view_ref = self.props.view_ref.clone();
        cx.wrap_cleanup(Box::new(move |scx| {
            scx.svc.watcher.unwatch(container, watch);
            scx.svc.pointer.remove_container(container);
            if let Some(view_ref) = &view_ref {
                view_ref.clear();
            }
            scx.backend.remove_renderer(window, renderer);
            if let Err(err) = scx.svc.registry.dec_ref_count(window, scx.backend) {
                log::error!("view teardown: {err}");
            }
            for handle in [style, interactor, renderer, window, surface] {
                if let Err(err) = scx.svc.registry.mark_for_deletion(handle, scx.backend) {
                    log::error!("view teardown: {err}");
                }
            }
        }));

        // Fallible configuration comes after the teardown is registered, so
        // a failed mount rolls the engine objects back.
        if !self.props.camera.is_empty() {
            let camera = cx.backend.active_camera(renderer);
            cx.backend.set(camera, &self.props.camera)?;
        }
        let mut manip_effect = DepEffect::new();
        if self.props.interactive && manip_effect.changed(self.props.interactor_settings.clone())
        {
            rebuild_manipulators(cx.backend, style, &self.props.interactor_settings)?;
        }

        let view = MountedView {
            window,
            renderer,
            container,
            interactor: Some(interactor),
            style: Some(style),
        };
        let link = ViewLink {
            window,
            renderer,
            interactor: Some(interactor),
            style: Some(style),
            policy: policy_cell(&self.props),
            queue: cx.svc.queue.clone(),
        };
        link.request_render();
        Ok(Mounted { view, link, manip_effect })
    }

    fn mount_shared(&mut self, cx: &mut Ctx<'_>, root: ViewRootLink) -> Result<Mounted> {
        let container = self.props.container;
        let root_container = root.container;
        let window = root.window;

        let renderer = cx.backend.create("Renderer", &renderer_props(&self.props))?;
        cx.backend.add_renderer(window, renderer);
        let style = cx.backend.create(&self.props.style_class, &PropBag::new())?;

        cx.svc.registry.register(renderer, Box::new(move |b| b.delete(renderer)));
        cx.svc.registry.register(style, Box::new(move |b| b.delete(style)));
        // Keep the shared window alive until this renderer detaches.
        cx.svc.registry.inc_ref_count(window)?;

        if let (Some(root_rect), Some(child_rect)) =
            (cx.svc.hosts.rect(root_container), cx.svc.hosts.rect(container))
        {
            let vp = normalized_viewport(root_rect, child_rect);
            cx.backend.set_viewport(renderer, vp.as_array());
        }
        // Either rectangle moving changes the normalized viewport, so both
        // containers are watched with the same refresh.
        let refresh = move |scx: &mut ServiceCx<'_>| {
            let (Some(root_rect), Some(child_rect)) =
                (scx.svc.hosts.rect(root_container), scx.svc.hosts.rect(container))
            else {
                return;
            };
            let vp = normalized_viewport(root_rect, child_rect);
            scx.backend.set_viewport(renderer, vp.as_array());
            scx.svc.queue.borrow_mut().request(window, RenderRequest::Property);
        };
        let child_watch = cx.svc.watcher.watch(container, Box::new(move |scx, _| refresh(scx)));
        let root_watch =
            cx.svc.watcher.watch(root_container, Box::new(move |scx, _| refresh(scx)));

        cx.svc.pointer.register_switch(
            container,
            SwitchTarget { interactor: root.interactor, renderer, style },
        );

        let view_ref = self.props.view_ref.clone();
        cx.wrap_cleanup(Box::new(move |scx| {
            scx.svc.watcher.unwatch(container, child_watch);
            scx.svc.watcher.unwatch(root_container, root_watch);
            scx.svc.pointer.remove_container(container);
            if let Some(view_ref) = &view_ref {
                view_ref.clear();
            }
            scx.backend.remove_renderer(window, renderer);
            if let Err(err) = scx.svc.registry.dec_ref_count(window, scx.backend) {
                log::error!("view teardown: {err}");
            }
            for handle in [style, renderer] {
                if let Err(err) = scx.svc.registry.mark_for_deletion(handle, scx.backend) {
                    log::error!("view teardown: {err}");
                }
            }
        }));

        if !self.props.camera.is_empty() {
            let camera = cx.backend.active_camera(renderer);
            cx.backend.set(camera, &self.props.camera)?;
        }
        let mut manip_effect = DepEffect::new();
        if self.props.interactive && manip_effect.changed(self.props.interactor_settings.clone())
        {
            rebuild_manipulators(cx.backend, style, &self.props.interactor_settings)?;
        }

        let view = MountedView {
            window,
            renderer,
            container,
            interactor: Some(root.interactor),
            style: Some(style),
        };
        let link = ViewLink {
            window,
            renderer,
            interactor: Some(root.interactor),
            style: Some(style),
            policy: policy_cell(&self.props),
            queue: cx.svc.queue.clone(),
        };
        link.request_render();
        Ok(Mounted { view, link, manip_effect })
    }

    /// Diffs `next` against the current props and applies the changes.
    pub fn apply(&mut self, cx: &mut Ctx<'_>, next: ViewProps) -> Result<()> {
        let Some(mounted) = &mut self.mounted else {
            self.props = next;
            return Ok(());
        };
        if next.container != self.props.container {
            log::warn!("view container cannot change after mount; remount with a new key");
        }
        if next.style_class != self.props.style_class {
            log::warn!("interactor style class cannot change after mount");
        }

        let mut dirty = false;
        if (next.background != self.props.background || next.renderer != self.props.renderer)
            && cx.backend.set(mounted.view.renderer, &renderer_props(&next))?
        {
            dirty = true;
        }
        if next.camera != self.props.camera && !next.camera.is_empty() {
            let camera = cx.backend.active_camera(mounted.view.renderer);
            if cx.backend.set(camera, &next.camera)? {
                dirty = true;
            }
        }
        if next.interactive
            && let Some(style) = mounted.view.style
            && mounted.manip_effect.changed(next.interactor_settings.clone())
        {
            rebuild_manipulators(cx.backend, style, &next.interactor_settings)?;
            dirty = true;
        }
        if next.view_ref != self.props.view_ref {
            if let Some(old) = &self.props.view_ref {
                old.clear();
            }
            if let Some(new_ref) = &next.view_ref {
                new_ref.set(mounted.view);
            }
        }
        if next.auto_reset_camera != self.props.auto_reset_camera
            || next.interactive != self.props.interactive
        {
            // Link clones held by mounted representations share the cell.
            mounted.link.set_policy(ViewPolicy {
                auto_reset_camera: next.auto_reset_camera,
                interactive: next.interactive,
            });
        }
        if dirty {
            mounted.link.request_render();
        }
        self.props = next;
        Ok(())
    }
}

impl Component for ViewComponent {
    fn mount(&mut self, cx: &mut Ctx<'_>) -> Result<()> {
        let mounted = match cx.find_view_root() {
            Some(root) => self.mount_shared(cx, root)?,
            None => self.mount_standalone(cx)?,
        };
        let link = mounted.link.clone();
        cx.provide(|ch| ch.view = Some(link));
        if let Some(view_ref) = &self.props.view_ref {
            view_ref.set(mounted.view);
        }
        self.mounted = Some(mounted);
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
