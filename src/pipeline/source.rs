//! Data Source Component
//!
//! Owns one dataset object whose content is set declaratively, pushes it by
//! value into the nearest downstream consumer, and provides the dataset and
//! field channels for descendants that write into it. Flips the owning
//! representation's data-available gate once the dataset is non-empty.

use crate::channels::{DatasetLink, FieldLocation, FieldsLink};
use crate::engine::PropBag;
use crate::errors::Result;
use crate::tree::{Component, Ctx};

/// Declarative dataset configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSourceProps {
    /// Dataset class. Changing it recreates the dataset object.
    pub class: String,
    /// Dataset content, applied verbatim.
    pub data: PropBag,
    /// Downstream input port the dataset is pushed into.
    pub port: u32,
    /// Attribute location descendants attach arrays to.
    pub field_location: FieldLocation,
}

impl Default for DataSourceProps {
    fn default() -> Self {
        Self {
            class: "PolyData".to_owned(),
            data: PropBag::new(),
            port: 0,
            field_location: FieldLocation::PointData,
        }
    }
}

/// The data source component.
pub struct DataSourceComponent {
    props: DataSourceProps,
    link: Option<DatasetLink>,
}

impl DataSourceComponent {
    #[must_use]
    pub fn new(props: DataSourceProps) -> Self {
        Self { props, link: None }
    }

    /// Diffs `next` against the current props and applies the changes.
    pub fn apply(&mut self, cx: &mut Ctx<'_>, next: DataSourceProps) -> Result<()> {
        let Some(link) = self.link.clone() else {
            self.props = next;
            return Ok(());
        };

        // The consumer above may have been replaced since the last pass (an
        // ancestor algorithm migrating its class re-provides the channel),
        // so the link is re-pointed before anything is pushed.
        if let Ok(downstream) = cx.find_downstream() {
            link.state.borrow_mut().downstream = Some(downstream);
        }

        if next.class != self.props.class {
            // Recreate under the new class and migrate the channel in place;
            // downstream consumers see the replacement on the next push.
            let dataset = cx.backend.create(&next.class, &next.data)?;
            cx.svc.registry.register(dataset, Box::new(move |b| b.delete(dataset)));
            let old = {
                let mut state = link.state.borrow_mut();
                let old = state.dataset;
                state.dataset = dataset;
                state.port = next.port;
                old
            };
            if let Err(err) = cx.svc.registry.mark_for_deletion(old, cx.backend) {
                log::error!("data source class swap: {err}");
            }
            link.modified(&mut cx.channel_cx());
        } else {
            let dataset = link.get_dataset();
            let mut dirty = false;
            if next.data != self.props.data && cx.backend.set(dataset, &next.data)? {
                dirty = true;
            }
            if next.port != self.props.port {
                link.state.borrow_mut().port = next.port;
                dirty = true;
            }
            if dirty {
                link.modified(&mut cx.channel_cx());
            }
        }

        if next.field_location != self.props.field_location {
            let dataset = link.get_dataset();
            let location = next.field_location;
            cx.provide(|ch| ch.fields = Some(FieldsLink { dataset, location }));
        }
        self.props = next;
        Ok(())
    }
}

impl Component for DataSourceComponent {
    fn mount(&mut self, cx: &mut Ctx<'_>) -> Result<()> {
        let downstream = cx.find_downstream()?;
        let representation = cx.find_representation();

        let dataset = cx.backend.create(&self.props.class, &self.props.data)?;
        cx.svc.registry.register(dataset, Box::new(move |b| b.delete(dataset)));

        let link = DatasetLink::new(
            dataset,
            Some(downstream),
            self.props.port,
            representation,
        );
        let location = self.props.field_location;
        cx.provide(|ch| {
            ch.dataset = Some(link.clone());
            ch.fields = Some(FieldsLink { dataset, location });
        });

        // Initial push, and the availability flip if content was inlined.
        link.modified(&mut cx.channel_cx());

        let cleanup_link = link.clone();
        cx.wrap_cleanup(Box::new(move |scx| {
            let dataset = cleanup_link.get_dataset();
            if let Err(err) = scx.svc.registry.mark_for_deletion(dataset, scx.backend) {
                log::error!("data source teardown: {err}");
            }
        }));

        self.link = Some(link);
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
