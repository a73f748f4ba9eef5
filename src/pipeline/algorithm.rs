//! Algorithm Component
//!
//! Wraps one engine algorithm (source or filter), connects its first output
//! to the nearest downstream consumer and re-provides the downstream channel
//! so nested producers feed its inputs. Zero-input algorithms generate their
//! own data, so they flip the representation's data-available gate on mount.
//!
//! Changing the class migrates in place: a replacement object is created,
//! every input binding of the old object is copied onto it, the downstream
//! connection is re-pointed and the old object is released through the
//! registry.

use std::cell::Cell;
use std::rc::Rc;

use crate::channels::DownstreamLink;
use crate::engine::{EngineHandle, InputBinding, PropBag};
use crate::errors::Result;
use crate::tree::{Component, Ctx};

/// Declarative algorithm configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmProps {
    /// Algorithm class.
    pub class: String,
    /// Properties applied verbatim.
    pub props: PropBag,
    /// Downstream input port the output connects to.
    pub port: u32,
}

impl AlgorithmProps {
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self { class: class.into(), props: PropBag::new(), port: 0 }
    }
}

/// The algorithm component.
pub struct AlgorithmComponent {
    props: AlgorithmProps,
    // Shared with the teardown cleanup so a class swap releases the
    // replacement, not the original.
    current: Rc<Cell<EngineHandle>>,
    mounted: bool,
}

impl AlgorithmComponent {
    #[must_use]
    pub fn new(props: AlgorithmProps) -> Self {
        Self { props, current: Rc::new(Cell::new(EngineHandle(0))), mounted: false }
    }

    fn migrate_class(&mut self, cx: &mut Ctx<'_>, next: &AlgorithmProps) -> Result<()> {
        let old = self.current.get();
        let replacement = cx.backend.create(&next.class, &next.props)?;
        for port in 0..cx.backend.num_input_ports(old) {
            match cx.backend.input_binding(old, port) {
                Some(InputBinding::Connection(source)) => {
                    cx.backend.set_input_connection(replacement, source, port);
                }
                Some(InputBinding::Data(data)) => {
                    cx.backend.set_input_data(replacement, data, port);
                }
                None => {}
            }
        }
        cx.svc.registry.register(replacement, Box::new(move |b| b.delete(replacement)));

        if let Ok(downstream) = cx.find_downstream() {
            let source = cx.backend.output_port(replacement, 0);
            downstream.set_input_connection(&mut cx.channel_cx(), source, next.port);
        }
        cx.provide(|ch| {
            ch.downstream = Some(DownstreamLink::Consumer { consumer: replacement });
        });

        if let Err(err) = cx.svc.registry.mark_for_deletion(old, cx.backend) {
            log::error!("algorithm class swap: {err}");
        }
        self.current.set(replacement);
        Ok(())
    }

    /// Diffs `next` against the current props and applies the changes.
    pub fn apply(&mut self, cx: &mut Ctx<'_>, next: AlgorithmProps) -> Result<()> {
        if !self.mounted {
            self.props = next;
            return Ok(());
        }
        let mut data_changed = false;

        if next.class != self.props.class {
            self.migrate_class(cx, &next)?;
            data_changed = true;
        } else {
            if next.props != self.props.props
                && cx.backend.set(self.current.get(), &next.props)?
            {
                data_changed = true;
            }
            if next.port != self.props.port
                && let Ok(downstream) = cx.find_downstream()
            {
                let source = cx.backend.output_port(self.current.get(), 0);
                downstream.set_input_connection(&mut cx.channel_cx(), source, next.port);
                data_changed = true;
            }
        }

        if data_changed
            && let Some(rep) = cx.find_representation()
        {
            rep.data_changed();
        }
        self.props = next;
        Ok(())
    }
}

impl Component for AlgorithmComponent {
    fn mount(&mut self, cx: &mut Ctx<'_>) -> Result<()> {
        let downstream = cx.find_downstream()?;

        let handle = cx.backend.create(&self.props.class, &self.props.props)?;
        self.current.set(handle);
        cx.svc.registry.register(handle, Box::new(move |b| b.delete(handle)));

        let source = cx.backend.output_port(handle, 0);
        downstream.set_input_connection(&mut cx.channel_cx(), source, self.props.port);
        cx.provide(|ch| {
            ch.downstream = Some(DownstreamLink::Consumer { consumer: handle });
        });

        // A zero-input algorithm produces data by itself.
        if cx.backend.num_input_ports(handle) == 0
            && let Some(rep) = cx.find_representation()
        {
            rep.data_available(cx.backend, true);
        }

        let current = Rc::clone(&self.current);
        cx.wrap_cleanup(Box::new(move |scx| {
            if let Err(err) = scx.svc.registry.mark_for_deletion(current.get(), scx.backend) {
                log::error!("algorithm teardown: {err}");
            }
        }));

        self.mounted = true;
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
