//! Render Request Batching
//!
//! Several nodes updating in one pass may each ask for a render; issuing a
//! frame per request would be wasted work. [`RenderQueue`] records requests
//! per window and the tree flushes it once at the end of each pass, so k
//! synchronous requests collapse into one actual render call.
//!
//! Requests come in two explicit kinds. A **property** request only needs a
//! redraw. A **data** request signals that pipeline output changed and
//! carries the target renderer, so the flush can apply the camera-reset
//! policy before drawing.

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::EngineHandle;

/// Target of a data-driven render request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataRenderTarget {
    /// Renderer whose pipeline output changed.
    pub renderer: EngineHandle,
    /// The view's interactor style, if interactive.
    pub style: Option<EngineHandle>,
    /// Whether the view auto-resets its camera on data changes.
    pub auto_reset_camera: bool,
    /// Whether the view is interactive (gates center-of-rotation updates).
    pub interactive: bool,
}

/// One render request against a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderRequest {
    /// A property changed; redraw only.
    Property,
    /// Pipeline data changed; redraw and apply the camera-reset policy.
    Data(DataRenderTarget),
}

/// Pending work for one window within the current pass.
#[derive(Debug, Default)]
pub struct PendingWindow {
    pub(crate) data_targets: Vec<DataRenderTarget>,
}

/// Per-pass render request collector.
#[derive(Default)]
pub struct RenderQueue {
    // Insertion-ordered so flushes are deterministic.
    pending: Vec<(EngineHandle, PendingWindow)>,
}

/// Shared handle to a tree's render queue.
pub type RenderQueueHandle = Rc<RefCell<RenderQueue>>;

impl RenderQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a render request for `window`.
    pub fn request(&mut self, window: EngineHandle, request: RenderRequest) {
        let pending = match self.pending.iter_mut().find(|(w, _)| *w == window) {
            Some((_, pending)) => pending,
            None => {
                self.pending.push((window, PendingWindow::default()));
                &mut self.pending.last_mut().expect("just pushed").1
            }
        };
        if let RenderRequest::Data(target) = request {
            // One target per renderer; a repeat request within the pass
            // carries the freshest view policy, so it wins.
            match pending.data_targets.iter_mut().find(|t| t.renderer == target.renderer) {
                Some(existing) => *existing = target,
                None => pending.data_targets.push(target),
            }
        }
    }

    /// Whether any request is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Takes all pending requests, leaving the queue empty.
    pub(crate) fn drain(&mut self) -> Vec<(EngineHandle, PendingWindow)> {
        std::mem::take(&mut self.pending)
    }
}
