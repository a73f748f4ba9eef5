//! In-Memory Reference Backend
//!
//! [`MockEngine`] implements the whole [`RenderingBackend`] contract against
//! a plain object table. It performs no rasterization; it records the scene
//! graph mutations the tree drives so tests can assert on them.
//!
//! Conventions:
//! - `create` reads `numberOfInputPorts` from the initial props when
//!   present; otherwise classes containing `"Filter"` get one input port and
//!   everything else gets zero.
//! - A dataset is non-empty once it carries a non-empty `points` array.
//! - Actors become pickable through a `displayPosition: [x, y, z?]` prop
//!   (and only while visible).
//! - `display_to_world` is the fixed affine map
//!   `(x, y, z) -> (x / 100, y / 100, z - 0.5)`, deterministic and
//!   invertible so tests can predict rays and frustum corners.
//! - Styles of class `InteractorStyleManipulator` support a center of
//!   rotation; other styles do not unless created with
//!   `supportsCenterOfRotation: true`.

use glam::{DVec2, DVec3};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::engine::{
    DisplayRect, EngineHandle, InputBinding, OutputPort, PickHit, PropBag, RenderingBackend,
};
use crate::errors::{Result, TrellisError};

#[derive(Default)]
struct MockObject {
    class: String,
    props: PropBag,
    num_input_ports: u32,
    inputs: FxHashMap<u32, InputBinding>,
    // window state
    surface: Option<EngineHandle>,
    renderers: Vec<EngineHandle>,
    window_size: (u32, u32),
    // renderer state
    actors: Vec<EngineHandle>,
    viewport: [f64; 4],
    camera: Option<EngineHandle>,
    // actor state
    mapper: Option<EngineHandle>,
    visible: bool,
    // interactor state
    bound_surface: Option<EngineHandle>,
    current_renderer: Option<EngineHandle>,
    current_style: Option<EngineHandle>,
    // style state
    manipulators: Vec<EngineHandle>,
    center_of_rotation: DVec3,
}

/// A recording backend with no GPU behind it.
pub struct MockEngine {
    objects: FxHashMap<EngineHandle, MockObject>,
    deleted: FxHashSet<EngineHandle>,
    next_id: u64,
    render_counts: FxHashMap<EngineHandle, u32>,
    reset_counts: FxHashMap<EngineHandle, u32>,
    clear_counts: FxHashMap<EngineHandle, u32>,
}

impl MockEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: FxHashMap::default(),
            deleted: FxHashSet::default(),
            next_id: 1,
            render_counts: FxHashMap::default(),
            reset_counts: FxHashMap::default(),
            clear_counts: FxHashMap::default(),
        }
    }

    fn obj(&self, handle: EngineHandle) -> Option<&MockObject> {
        self.objects.get(&handle)
    }

    fn obj_mut(&mut self, handle: EngineHandle) -> Option<&mut MockObject> {
        let found = self.objects.get_mut(&handle);
        if found.is_none() {
            log::warn!("mock engine: operation on unknown object {handle}");
        }
        found
    }

    // ========================================================================
    // Test-facing accessors
    // ========================================================================

    /// Number of live objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Whether `handle` has been destroyed.
    #[must_use]
    pub fn is_deleted(&self, handle: EngineHandle) -> bool {
        self.deleted.contains(&handle)
    }

    /// Whether `handle` refers to a live object.
    #[must_use]
    pub fn is_alive(&self, handle: EngineHandle) -> bool {
        self.objects.contains_key(&handle)
    }

    /// Class name of a live object.
    #[must_use]
    pub fn class_of(&self, handle: EngineHandle) -> Option<&str> {
        self.obj(handle).map(|o| o.class.as_str())
    }

    /// Reads back a property of a live object.
    #[must_use]
    pub fn prop(&self, handle: EngineHandle, key: &str) -> Option<serde_json::Value> {
        self.obj(handle).and_then(|o| o.props.get(key).cloned())
    }

    /// Frames rendered for a window.
    #[must_use]
    pub fn render_count(&self, window: EngineHandle) -> u32 {
        self.render_counts.get(&window).copied().unwrap_or(0)
    }

    /// Camera resets performed on a renderer.
    #[must_use]
    pub fn reset_count(&self, renderer: EngineHandle) -> u32 {
        self.reset_counts.get(&renderer).copied().unwrap_or(0)
    }

    /// How many times a style's manipulators were cleared.
    #[must_use]
    pub fn clear_count(&self, style: EngineHandle) -> u32 {
        self.clear_counts.get(&style).copied().unwrap_or(0)
    }

    /// Renderers attached to a window, in attachment order.
    #[must_use]
    pub fn renderers_of(&self, window: EngineHandle) -> Vec<EngineHandle> {
        self.obj(window).map(|o| o.renderers.clone()).unwrap_or_default()
    }

    /// Actors attached to a renderer.
    #[must_use]
    pub fn actors_of(&self, renderer: EngineHandle) -> Vec<EngineHandle> {
        self.obj(renderer).map(|o| o.actors.clone()).unwrap_or_default()
    }

    /// The surface attached to a window.
    #[must_use]
    pub fn surface_of(&self, window: EngineHandle) -> Option<EngineHandle> {
        self.obj(window).and_then(|o| o.surface)
    }

    /// Current normalized viewport of a renderer.
    #[must_use]
    pub fn viewport_of(&self, renderer: EngineHandle) -> [f64; 4] {
        self.obj(renderer).map_or([0.0, 0.0, 1.0, 1.0], |o| o.viewport)
    }

    /// Current device-pixel size of a window.
    #[must_use]
    pub fn window_size_of(&self, window: EngineHandle) -> (u32, u32) {
        self.obj(window).map_or((0, 0), |o| o.window_size)
    }

    /// Actor visibility flag.
    #[must_use]
    pub fn visibility_of(&self, actor: EngineHandle) -> bool {
        self.obj(actor).is_some_and(|o| o.visible)
    }

    /// Mapper assigned to an actor.
    #[must_use]
    pub fn mapper_of(&self, actor: EngineHandle) -> Option<EngineHandle> {
        self.obj(actor).and_then(|o| o.mapper)
    }

    /// What is bound to a consumer's input port.
    #[must_use]
    pub fn input_of(&self, consumer: EngineHandle, port: u32) -> Option<InputBinding> {
        self.obj(consumer).and_then(|o| o.inputs.get(&port).copied())
    }

    /// The interactor's current renderer.
    #[must_use]
    pub fn current_renderer_of(&self, interactor: EngineHandle) -> Option<EngineHandle> {
        self.obj(interactor).and_then(|o| o.current_renderer)
    }

    /// The interactor's current style.
    #[must_use]
    pub fn current_style_of(&self, interactor: EngineHandle) -> Option<EngineHandle> {
        self.obj(interactor).and_then(|o| o.current_style)
    }

    /// Classes of the manipulators attached to a style, in order.
    #[must_use]
    pub fn manipulator_classes(&self, style: EngineHandle) -> Vec<String> {
        self.obj(style)
            .map(|o| {
                o.manipulators
                    .iter()
                    .filter_map(|m| self.class_of(*m).map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The style's current center of rotation.
    #[must_use]
    pub fn center_of_rotation_of(&self, style: EngineHandle) -> DVec3 {
        self.obj(style).map_or(DVec3::ZERO, |o| o.center_of_rotation)
    }

    fn pickable_position(&self, actor: EngineHandle) -> Option<DVec3> {
        let obj = self.obj(actor)?;
        if !obj.visible {
            return None;
        }
        let pos = obj.props.get("displayPosition")?.as_array()?;
        let x = pos.first()?.as_f64()?;
        let y = pos.get(1)?.as_f64()?;
        let z = pos.get(2).and_then(serde_json::Value::as_f64).unwrap_or(0.5);
        Some(DVec3::new(x, y, z))
    }

    fn hit_for(&self, actor: EngineHandle, position: DVec3) -> PickHit {
        let composite_id = self
            .prop(actor, "compositeId")
            .and_then(|v| v.as_u64());
        PickHit { prop: actor, display_position: position, composite_id }
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn default_input_ports(class: &str, initial: &PropBag) -> u32 {
    if let Some(n) = initial.get("numberOfInputPorts").and_then(serde_json::Value::as_u64) {
        return n as u32;
    }
    if class.contains("Filter") { 1 } else { 0 }
}

impl RenderingBackend for MockEngine {
    fn create(&mut self, class: &str, initial: &PropBag) -> Result<EngineHandle> {
        if class.is_empty() {
            return Err(TrellisError::UnknownClass(class.to_owned()));
        }
        let handle = EngineHandle(self.next_id);
        self.next_id += 1;
        let object = MockObject {
            class: class.to_owned(),
            props: initial.clone(),
            num_input_ports: default_input_ports(class, initial),
            visible: true,
            viewport: [0.0, 0.0, 1.0, 1.0],
            ..MockObject::default()
        };
        self.objects.insert(handle, object);
        Ok(handle)
    }

    fn set(&mut self, handle: EngineHandle, props: &PropBag) -> Result<bool> {
        let Some(obj) = self.objects.get_mut(&handle) else {
            return Err(TrellisError::UnknownObject { handle });
        };
        let mut changed = false;
        for (key, value) in props {
            if obj.props.get(key) != Some(value) {
                obj.props.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        Ok(changed)
    }

    fn get(&self, handle: EngineHandle, key: &str) -> Option<serde_json::Value> {
        self.prop(handle, key)
    }

    fn delete(&mut self, handle: EngineHandle) {
        if let Some(obj) = self.objects.remove(&handle) {
            self.deleted.insert(handle);
            // Engine-owned children go down with their owner.
            for child in obj.manipulators.iter().copied().chain(obj.camera) {
                self.delete(child);
            }
        } else {
            log::warn!("mock engine: delete on unknown object {handle}");
        }
    }

    fn num_input_ports(&self, consumer: EngineHandle) -> u32 {
        self.obj(consumer).map_or(0, |o| o.num_input_ports)
    }

    fn set_input_connection(&mut self, consumer: EngineHandle, source: OutputPort, port: u32) {
        if let Some(obj) = self.obj_mut(consumer) {
            obj.inputs.insert(port, InputBinding::Connection(source));
        }
    }

    fn set_input_data(&mut self, consumer: EngineHandle, data: EngineHandle, port: u32) {
        if let Some(obj) = self.obj_mut(consumer) {
            obj.inputs.insert(port, InputBinding::Data(data));
        }
    }

    fn input_binding(&self, consumer: EngineHandle, port: u32) -> Option<InputBinding> {
        self.input_of(consumer, port)
    }

    fn dataset_is_empty(&self, dataset: EngineHandle) -> bool {
        self.prop(dataset, "points")
            .and_then(|v| v.as_array().map(|a| a.is_empty()))
            .unwrap_or(true)
    }

    fn attach_surface(&mut self, window: EngineHandle, surface: EngineHandle) {
        if let Some(obj) = self.obj_mut(window) {
            obj.surface = Some(surface);
        }
    }

    fn set_window_size(&mut self, window: EngineHandle, width: u32, height: u32) {
        if let Some(obj) = self.obj_mut(window) {
            obj.window_size = (width, height);
        }
    }

    fn add_renderer(&mut self, window: EngineHandle, renderer: EngineHandle) {
        if let Some(obj) = self.obj_mut(window)
            && !obj.renderers.contains(&renderer)
        {
            obj.renderers.push(renderer);
        }
    }

    fn remove_renderer(&mut self, window: EngineHandle, renderer: EngineHandle) {
        if let Some(obj) = self.obj_mut(window) {
            obj.renderers.retain(|r| *r != renderer);
        }
    }

    fn set_viewport(&mut self, renderer: EngineHandle, viewport: [f64; 4]) {
        if let Some(obj) = self.obj_mut(renderer) {
            obj.viewport = viewport;
        }
    }

    fn add_actor(&mut self, renderer: EngineHandle, actor: EngineHandle) {
        if let Some(obj) = self.obj_mut(renderer)
            && !obj.actors.contains(&actor)
        {
            obj.actors.push(actor);
        }
    }

    fn remove_actor(&mut self, renderer: EngineHandle, actor: EngineHandle) {
        if let Some(obj) = self.obj_mut(renderer) {
            obj.actors.retain(|a| *a != actor);
        }
    }

    fn set_mapper(&mut self, actor: EngineHandle, mapper: EngineHandle) {
        if let Some(obj) = self.obj_mut(actor) {
            obj.mapper = Some(mapper);
        }
    }

    fn set_visibility(&mut self, actor: EngineHandle, visible: bool) {
        if let Some(obj) = self.obj_mut(actor) {
            obj.visible = visible;
        }
    }

    fn active_camera(&mut self, renderer: EngineHandle) -> EngineHandle {
        if let Some(existing) = self.obj(renderer).and_then(|o| o.camera) {
            return existing;
        }
        let camera = EngineHandle(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            camera,
            MockObject { class: "Camera".to_owned(), ..MockObject::default() },
        );
        if let Some(obj) = self.obj_mut(renderer) {
            obj.camera = Some(camera);
        }
        camera
    }

    fn reset_camera(&mut self, renderer: EngineHandle) -> DVec3 {
        *self.reset_counts.entry(renderer).or_insert(0) += 1;
        // Frame the average of the pickable actors, origin otherwise.
        let positions: Vec<DVec3> = self
            .actors_of(renderer)
            .into_iter()
            .filter_map(|a| self.pickable_position(a))
            .collect();
        if positions.is_empty() {
            DVec3::ZERO
        } else {
            let sum: DVec3 = positions.iter().copied().sum();
            let center = sum / positions.len() as f64;
            self.display_to_world(renderer, center)
        }
    }

    fn render(&mut self, window: EngineHandle) {
        *self.render_counts.entry(window).or_insert(0) += 1;
    }

    fn bind_interactor(&mut self, interactor: EngineHandle, surface: EngineHandle) {
        if let Some(obj) = self.obj_mut(interactor) {
            obj.bound_surface = Some(surface);
        }
    }

    fn set_current_renderer(&mut self, interactor: EngineHandle, renderer: EngineHandle) {
        if let Some(obj) = self.obj_mut(interactor) {
            obj.current_renderer = Some(renderer);
        }
    }

    fn set_interactor_style(&mut self, interactor: EngineHandle, style: EngineHandle) {
        if let Some(obj) = self.obj_mut(interactor) {
            obj.current_style = Some(style);
        }
    }

    fn clear_manipulators(&mut self, style: EngineHandle) {
        *self.clear_counts.entry(style).or_insert(0) += 1;
        let manipulators = match self.obj_mut(style) {
            Some(obj) => std::mem::take(&mut obj.manipulators),
            None => return,
        };
        for m in manipulators {
            self.delete(m);
        }
    }

    fn add_manipulator(&mut self, style: EngineHandle, manipulator: EngineHandle) {
        if let Some(obj) = self.obj_mut(style) {
            obj.manipulators.push(manipulator);
        }
    }

    fn style_supports_center_of_rotation(&self, style: EngineHandle) -> bool {
        let Some(obj) = self.obj(style) else { return false };
        if let Some(explicit) =
            obj.props.get("supportsCenterOfRotation").and_then(serde_json::Value::as_bool)
        {
            return explicit;
        }
        obj.class == "InteractorStyleManipulator"
    }

    fn set_center_of_rotation(&mut self, style: EngineHandle, center: DVec3) {
        if let Some(obj) = self.obj_mut(style) {
            obj.center_of_rotation = center;
        }
    }

    fn pick(&mut self, renderer: EngineHandle, display: DVec2, tolerance: f64) -> Vec<PickHit> {
        let mut hits: Vec<(f64, PickHit)> = self
            .actors_of(renderer)
            .into_iter()
            .filter_map(|actor| {
                let pos = self.pickable_position(actor)?;
                let dist = (DVec2::new(pos.x, pos.y) - display).length();
                (dist <= tolerance).then(|| (dist, self.hit_for(actor, pos)))
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, hit)| hit).collect()
    }

    fn area_pick(&mut self, renderer: EngineHandle, rect: DisplayRect) -> Vec<PickHit> {
        self.actors_of(renderer)
            .into_iter()
            .filter_map(|actor| {
                let pos = self.pickable_position(actor)?;
                rect.contains(DVec2::new(pos.x, pos.y)).then(|| self.hit_for(actor, pos))
            })
            .collect()
    }

    fn display_to_world(&self, _renderer: EngineHandle, display: DVec3) -> DVec3 {
        DVec3::new(display.x / 100.0, display.y / 100.0, display.z - 0.5)
    }

    fn set_reader_url(
        &mut self,
        reader: EngineHandle,
        url: &str,
        options: &PropBag,
    ) -> Result<()> {
        if url.starts_with("bad://") {
            return Err(TrellisError::External(format!("failed to fetch {url}")));
        }
        if let Some(obj) = self.obj_mut(reader) {
            obj.props.insert("url".into(), serde_json::Value::String(url.to_owned()));
            for (key, value) in options {
                obj.props.insert(key.clone(), value.clone());
            }
            obj.props.insert("loaded".into(), serde_json::Value::Bool(true));
        }
        Ok(())
    }

    fn parse_as_text(&mut self, reader: EngineHandle, text: &str) -> Result<()> {
        if let Some(obj) = self.obj_mut(reader) {
            obj.props.insert("text".into(), serde_json::Value::String(text.to_owned()));
            obj.props.insert("loaded".into(), serde_json::Value::Bool(true));
        }
        Ok(())
    }

    fn parse_as_bytes(&mut self, reader: EngineHandle, bytes: &[u8]) -> Result<()> {
        if let Some(obj) = self.obj_mut(reader) {
            obj.props.insert("byteLength".into(), serde_json::Value::from(bytes.len()));
            obj.props.insert("loaded".into(), serde_json::Value::Bool(true));
        }
        Ok(())
    }
}
