//! Reader Component
//!
//! Wraps an engine reader fed from exactly one of four inputs: a URL, raw
//! bytes, base64-encoded bytes or text. Supplying more than one is
//! tolerated with a warning; inputs are applied in a fixed order
//! (url, bytes, base64, text) so the last-applied one wins
//! deterministically. URL fetch failures propagate to the caller of the
//! update pass; the component does not retry.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::channels::DownstreamLink;
use crate::engine::{EngineHandle, PropBag};
use crate::errors::Result;
use crate::tree::{Component, Ctx};

/// Declarative reader configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderProps {
    /// Reader class. Fixed after mount.
    pub class: String,
    /// URL to fetch and parse.
    pub url: Option<String>,
    /// Options forwarded with the URL fetch.
    pub options: PropBag,
    /// In-memory text input.
    pub text: Option<String>,
    /// In-memory binary input.
    pub bytes: Option<Vec<u8>>,
    /// Base64-encoded binary input.
    pub base64: Option<String>,
    /// Downstream input port the output connects to.
    pub port: u32,
}

impl ReaderProps {
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            url: None,
            options: PropBag::new(),
            text: None,
            bytes: None,
            base64: None,
            port: 0,
        }
    }

    fn input_count(&self) -> usize {
        usize::from(self.url.is_some())
            + usize::from(self.bytes.is_some())
            + usize::from(self.base64.is_some())
            + usize::from(self.text.is_some())
    }
}

/// The reader component.
pub struct ReaderComponent {
    props: ReaderProps,
    reader: Option<EngineHandle>,
}

impl ReaderComponent {
    #[must_use]
    pub fn new(props: ReaderProps) -> Self {
        Self { props, reader: None }
    }

    /// Feeds every provided input in the fixed order; returns whether any
    /// input was applied.
    fn feed(cx: &mut Ctx<'_>, reader: EngineHandle, props: &ReaderProps) -> Result<bool> {
        if props.input_count() > 1 {
            log::warn!("reader got multiple inputs; the last-applied one wins");
        }
        let mut fed = false;
        if let Some(url) = &props.url {
            cx.backend.set_reader_url(reader, url, &props.options)?;
            fed = true;
        }
        if let Some(bytes) = &props.bytes {
            cx.backend.parse_as_bytes(reader, bytes)?;
            fed = true;
        }
        if let Some(encoded) = &props.base64 {
            let decoded = STANDARD.decode(encoded)?;
            cx.backend.parse_as_bytes(reader, &decoded)?;
            fed = true;
        }
        if let Some(text) = &props.text {
            cx.backend.parse_as_text(reader, text)?;
            fed = true;
        }
        Ok(fed)
    }

    /// Diffs `next` against the current props and applies the changes.
    pub fn apply(&mut self, cx: &mut Ctx<'_>, next: ReaderProps) -> Result<()> {
        let Some(reader) = self.reader else {
            self.props = next;
            return Ok(());
        };
        if next.class != self.props.class {
            log::warn!("reader class cannot change after mount; remount with a new key");
        }

        let inputs_changed = next.url != self.props.url
            || next.options != self.props.options
            || next.bytes != self.props.bytes
            || next.base64 != self.props.base64
            || next.text != self.props.text;
        if inputs_changed && Self::feed(cx, reader, &next)? {
            if let Some(rep) = cx.find_representation() {
                rep.data_available(cx.backend, true);
                rep.data_changed();
            }
        }
        if next.port != self.props.port
            && let Ok(downstream) = cx.find_downstream()
        {
            let source = cx.backend.output_port(reader, 0);
            downstream.set_input_connection(&mut cx.channel_cx(), source, next.port);
        }
        self.props = next;
        Ok(())
    }
}

impl Component for ReaderComponent {
    fn mount(&mut self, cx: &mut Ctx<'_>) -> Result<()> {
        let downstream = cx.find_downstream()?;

        let reader = cx.backend.create(&self.props.class, &PropBag::new())?;
        cx.svc.registry.register(reader, Box::new(move |b| b.delete(reader)));
        // Registered before feeding, so a failed fetch rolls the object back.
        cx.wrap_cleanup(Box::new(move |scx| {
            if let Err(err) = scx.svc.registry.mark_for_deletion(reader, scx.backend) {
                log::error!("reader teardown: {err}");
            }
        }));

        let source = cx.backend.output_port(reader, 0);
        downstream.set_input_connection(&mut cx.channel_cx(), source, self.props.port);
        cx.provide(|ch| {
            ch.downstream = Some(DownstreamLink::Consumer { consumer: reader });
        });

        if Self::feed(cx, reader, &self.props)?
            && let Some(rep) = cx.find_representation()
        {
            rep.data_available(cx.backend, true);
        }

        self.reader = Some(reader);
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
