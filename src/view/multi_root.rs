//! Multi-View Root Component
//!
//! Owns one surface, render window and interactor shared by every
//! descendant view. Child views attach renderers to the shared window and
//! carve it into normalized viewports; the root only keeps the surface
//! sized to its own container.
//!
//! On unmount the window is marked for deletion but holds a reference for
//! each attached child renderer, so actual disposal waits until the last
//! child view has detached — teardown scope ordering guarantees the
//! children run first.

use crate::channels::ViewRootLink;
use crate::engine::PropBag;
use crate::errors::Result;
use crate::host::ContainerKey;
use crate::tree::render_queue::RenderRequest;
use crate::tree::{Component, Ctx, ServiceCx};
use crate::view::viewport::scaled_surface_size;

/// Declarative multi-view root configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiViewRootProps {
    /// Host container the shared surface fills.
    pub container: ContainerKey,
}

/// The multi-view root component.
pub struct MultiViewRootComponent {
    props: MultiViewRootProps,
}

impl MultiViewRootComponent {
    #[must_use]
    pub fn new(props: MultiViewRootProps) -> Self {
        Self { props }
    }

    /// Diffs `next` against the current props.
    pub fn apply(&mut self, _cx: &mut Ctx<'_>, next: MultiViewRootProps) -> Result<()> {
        if next.container != self.props.container {
            log::warn!("multi-view root container cannot change after mount");
        }
        Ok(())
    }
}

impl Component for MultiViewRootComponent {
    fn mount(&mut self, cx: &mut Ctx<'_>) -> Result<()> {
        let container = self.props.container;
        let surface = cx.backend.create("RenderSurface", &PropBag::new())?;
        let window = cx.backend.create("RenderWindow", &PropBag::new())?;
        cx.backend.attach_surface(window, surface);
        let interactor = cx.backend.create("RenderWindowInteractor", &PropBag::new())?;
        cx.backend.bind_interactor(interactor, surface);

        for handle in [surface, window, interactor] {
            cx.svc.registry.register(handle, Box::new(move |b| b.delete(handle)));
        }

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

        cx.provide(|ch| {
            ch.view_root = Some(ViewRootLink { surface, window, interactor, container });
        });

        cx.wrap_cleanup(Box::new(move |scx| {
            scx.svc.watcher.unwatch(container, watch);
            // Child renderers each hold a reference on the window; marking
            // defers disposal until the last one detaches.
            for handle in [interactor, window, surface] {
                if let Err(err) = scx.svc.registry.mark_for_deletion(handle, scx.backend) {
                    log::error!("multi-view root teardown: {err}");
                }
            }
        }));
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
