//! Shared Dataset Component
//!
//! Bridges datasets across unrelated subtrees through the tree-wide
//! [`SharedDatasetRegistry`](crate::channels::SharedDatasetRegistry). One
//! component, two roles decided by whether it has children:
//!
//! - **producer** — wraps a pipeline subtree and re-provides the downstream
//!   channel as a publication under a logical id;
//! - **consumer** — a leaf under a representation that forwards whatever is
//!   published under the id into the nearest downstream consumer, including
//!   data published before it mounted (late join).

use crate::channels::DownstreamLink;
use crate::errors::Result;
use crate::tree::{Component, Ctx};

/// Declarative shared-dataset configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareDataSetProps {
    /// Logical publication id. Fixed after mount.
    pub id: String,
    /// Downstream input port the consumer side pushes into.
    pub port: u32,
}

impl ShareDataSetProps {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), port: 0 }
    }
}

/// The shared-dataset component.
pub struct ShareDataSetComponent {
    props: ShareDataSetProps,
    // Producer when the element has pipeline children, consumer when a leaf.
    has_children: bool,
}

impl ShareDataSetComponent {
    #[must_use]
    pub fn new(props: ShareDataSetProps, has_children: bool) -> Self {
        Self { props, has_children }
    }

    /// Diffs `next` against the current props.
    pub fn apply(&mut self, _cx: &mut Ctx<'_>, next: ShareDataSetProps) -> Result<()> {
        if next.id != self.props.id || next.port != self.props.port {
            log::warn!("shared dataset id and port cannot change after mount");
        }
        Ok(())
    }

    fn mount_producer(&self, cx: &mut Ctx<'_>) {
        let id = self.props.id.clone();
        cx.provide(|ch| ch.downstream = Some(DownstreamLink::Shared { id: id.clone() }));
        cx.wrap_cleanup(Box::new(move |scx| {
            scx.svc.shared.unregister(&id);
        }));
    }

    fn mount_consumer(&self, cx: &mut Ctx<'_>) -> Result<()> {
        let downstream = cx.find_downstream()?;
        let representation = cx.find_representation();
        let port = self.props.port;
        let id = &self.props.id;

        let forward_rep = representation.clone();
        let forward = downstream.clone();
        let available = cx.svc.shared.on_data_available(
            cx.backend,
            id,
            Box::new(move |ccx, dataset| {
                forward.set_input_data(ccx, dataset, port);
                if let Some(rep) = &forward_rep {
                    rep.data_available(ccx.backend, true);
                }
            }),
        );
        let changed = cx.svc.shared.on_data_changed(
            id,
            Box::new(move |_ccx, _dataset| {
                if let Some(rep) = &representation {
                    rep.data_changed();
                }
            }),
        );

        cx.wrap_cleanup(Box::new(move |scx| {
            scx.svc.shared.unsubscribe(&available);
            scx.svc.shared.unsubscribe(&changed);
        }));
        Ok(())
    }
}

impl Component for ShareDataSetComponent {
    fn mount(&mut self, cx: &mut Ctx<'_>) -> Result<()> {
        if self.has_children {
            self.mount_producer(cx);
            Ok(())
        } else {
            self.mount_consumer(cx)
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
