//! Representation Component
//!
//! Creates a mapper and an actor, attaches the actor to the nearest view's
//! renderer, and provides the downstream channel its pipeline children feed.
//! The actor is force-hidden until the first valid data arrives upstream;
//! after that the user-requested visibility applies. The actor handle is
//! indexed under a logical representation id so pick results can name it.

use serde_json::Value;

use crate::channels::{DownstreamLink, RepresentationLink};
use crate::engine::{EngineHandle, PropBag};
use crate::errors::Result;
use crate::tree::{Component, Ctx};

/// Declarative representation configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RepresentationProps {
    /// Logical id reported by pick results. Generated when omitted.
    pub id: Option<String>,
    /// Mapper class. Fixed after mount.
    pub mapper_class: String,
    /// Properties applied to the actor verbatim.
    pub actor: PropBag,
    /// Properties applied to the mapper verbatim.
    pub mapper: PropBag,
    /// Display properties, nested under the actor's `property` key.
    pub property: PropBag,
    /// User-requested visibility, gated behind data availability.
    pub visibility: bool,
}

impl Default for RepresentationProps {
    fn default() -> Self {
        Self {
            id: None,
            mapper_class: "Mapper".to_owned(),
            actor: PropBag::new(),
            mapper: PropBag::new(),
            property: PropBag::new(),
            visibility: true,
        }
    }
}

fn actor_props(props: &RepresentationProps) -> PropBag {
    let mut bag = props.actor.clone();
    if !props.property.is_empty() {
        bag.insert("property".into(), Value::Object(props.property.clone()));
    }
    bag
}

/// The representation component.
pub struct RepresentationComponent {
    props: RepresentationProps,
    mounted: Option<MountedRep>,
}

struct MountedRep {
    actor: EngineHandle,
    mapper: EngineHandle,
    id: String,
    link: RepresentationLink,
}

impl RepresentationComponent {
    #[must_use]
    pub fn new(props: RepresentationProps) -> Self {
        Self { props, mounted: None }
    }

    /// Diffs `next` against the current props and applies the changes.
    pub fn apply(&mut self, cx: &mut Ctx<'_>, next: RepresentationProps) -> Result<()> {
        let Some(mounted) = &mut self.mounted else {
            self.props = next;
            return Ok(());
        };
        if next.mapper_class != self.props.mapper_class {
            log::warn!("mapper class cannot change after mount; remount with a new key");
        }

        let mut dirty = false;
        if (next.actor != self.props.actor || next.property != self.props.property)
            && cx.backend.set(mounted.actor, &actor_props(&next))?
        {
            dirty = true;
        }
        if next.mapper != self.props.mapper && cx.backend.set(mounted.mapper, &next.mapper)? {
            dirty = true;
        }
        if next.visibility != self.props.visibility {
            let (actor, effective) = {
                let mut state = mounted.link.state.borrow_mut();
                state.requested_visibility = next.visibility;
                (state.actor, state.data_available && next.visibility)
            };
            cx.backend.set_visibility(actor, effective);
            dirty = true;
        }
        if let Some(id) = &next.id
            && *id != mounted.id
        {
            cx.svc.actor_index.insert(mounted.actor, id.clone());
            mounted.id = id.clone();
        }
        if dirty {
            let view = mounted.link.state.borrow().view.clone();
            if let Some(view) = view {
                view.request_render();
            }
        }
        self.props = next;
        Ok(())
    }
}

impl Component for RepresentationComponent {
    fn mount(&mut self, cx: &mut Ctx<'_>) -> Result<()> {
        let view = cx.find_view()?;

        let mapper = cx.backend.create(&self.props.mapper_class, &self.props.mapper)?;
        let actor = cx.backend.create("Actor", &actor_props(&self.props))?;
        cx.backend.set_mapper(actor, mapper);
        cx.backend.add_actor(view.renderer, actor);
        // Hidden until upstream data arrives, whatever the requested flag.
        cx.backend.set_visibility(actor, false);

        for handle in [mapper, actor] {
            cx.svc.registry.register(handle, Box::new(move |b| b.delete(handle)));
        }

        let id = match &self.props.id {
            Some(id) => id.clone(),
            None => {
                let id = format!("rep-{}", cx.svc.next_rep_id);
                cx.svc.next_rep_id += 1;
                id
            }
        };
        cx.svc.actor_index.insert(actor, id.clone());

        let link = RepresentationLink::new(actor, self.props.visibility);
        link.state.borrow_mut().view = Some(view.clone());

        cx.provide(|ch| {
            ch.representation = Some(link.clone());
            ch.downstream = Some(DownstreamLink::Consumer { consumer: mapper });
        });

        let renderer = view.renderer;
        cx.wrap_cleanup(Box::new(move |scx| {
            scx.backend.remove_actor(renderer, actor);
            scx.svc.actor_index.remove(&actor);
            for handle in [actor, mapper] {
                if let Err(err) = scx.svc.registry.mark_for_deletion(handle, scx.backend) {
                    log::error!("representation teardown: {err}");
                }
            }
        }));

        view.request_render();
        self.mounted = Some(MountedRep { actor, mapper, id, link });
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
