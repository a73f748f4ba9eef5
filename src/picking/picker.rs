//! Pick Queries
//!
//! Pure functions that turn the backend's raw hits into caller-facing
//! results: hits are back-projected to world space and mapped from engine
//! prop handles to logical representation ids — callers never see
//! engine-internal identities. Picking an empty scene returns an empty
//! result list, never an error.

use glam::{DVec2, DVec3};
use rustc_hash::FxHashMap;

use crate::engine::{DisplayRect, EngineHandle, RenderingBackend};

/// One resolved pick hit.
#[derive(Debug, Clone, PartialEq)]
pub struct PickResult {
    /// Hit position in world space.
    pub world_position: DVec3,
    /// Hit position in display space (z = depth in [0, 1]).
    pub display_position: DVec3,
    /// Logical id of the representation owning the hit prop.
    pub representation_id: Option<String>,
    /// Engine-side composite index within the prop, if any.
    pub composite_id: Option<u64>,
    /// World-space ray through the query point at the near (z = 0) and far
    /// (z = 1) planes.
    pub ray: [DVec3; 2],
}

/// Result of an area pick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AreaPickResult {
    /// Every hit inside the rectangle.
    pub picks: Vec<PickResult>,
}

/// Result of a frustum pick.
#[derive(Debug, Clone, PartialEq)]
pub struct FrustumPickResult {
    /// Every hit inside the rectangle.
    pub picks: Vec<PickResult>,
    /// The eight rectangle corners back-projected at the near then far
    /// plane, counter-clockwise from the rectangle's min corner.
    pub frustum: [DVec3; 8],
    /// Distinct representation ids among the hits, first-hit order.
    pub representation_ids: Vec<String>,
}

fn query_ray(
    backend: &dyn RenderingBackend,
    renderer: EngineHandle,
    display: DVec2,
) -> [DVec3; 2] {
    [
        backend.display_to_world(renderer, DVec3::new(display.x, display.y, 0.0)),
        backend.display_to_world(renderer, DVec3::new(display.x, display.y, 1.0)),
    ]
}

/// Single-point pick with a tolerance radius, nearest hit first.
pub fn single_pick(
    backend: &mut dyn RenderingBackend,
    actor_index: &FxHashMap<EngineHandle, String>,
    renderer: EngineHandle,
    display: DVec2,
    tolerance: f64,
) -> Vec<PickResult> {
    let ray = query_ray(backend, renderer, display);
    let hits = backend.pick(renderer, display, tolerance);
    hits.into_iter()
        .map(|hit| PickResult {
            world_position: backend.display_to_world(renderer, hit.display_position),
            display_position: hit.display_position,
            representation_id: actor_index.get(&hit.prop).cloned(),
            composite_id: hit.composite_id,
            ray,
        })
        .collect()
}

/// All hits whose display positions fall inside `rect`.
pub fn area_pick(
    backend: &mut dyn RenderingBackend,
    actor_index: &FxHashMap<EngineHandle, String>,
    renderer: EngineHandle,
    rect: DisplayRect,
) -> AreaPickResult {
    let hits = backend.area_pick(renderer, rect);
    let picks = hits
        .into_iter()
        .map(|hit| {
            let display = DVec2::new(hit.display_position.x, hit.display_position.y);
            PickResult {
                world_position: backend.display_to_world(renderer, hit.display_position),
                display_position: hit.display_position,
                representation_id: actor_index.get(&hit.prop).cloned(),
                composite_id: hit.composite_id,
                ray: query_ray(backend, renderer, display),
            }
        })
        .collect();
    AreaPickResult { picks }
}

/// Area pick plus the world-space selection frustum and the distinct
/// representation ids among the hits.
pub fn frustum_pick(
    backend: &mut dyn RenderingBackend,
    actor_index: &FxHashMap<EngineHandle, String>,
    renderer: EngineHandle,
    rect: DisplayRect,
) -> FrustumPickResult {
    let area = area_pick(backend, actor_index, renderer, rect);

    let (x0, x1) = (rect.x0.min(rect.x1), rect.x0.max(rect.x1));
    let (y0, y1) = (rect.y0.min(rect.y1), rect.y0.max(rect.y1));
    let corners = [
        DVec2::new(x0, y0),
        DVec2::new(x1, y0),
        DVec2::new(x1, y1),
        DVec2::new(x0, y1),
    ];
    let mut frustum = [DVec3::ZERO; 8];
    for (plane, z) in [0.0, 1.0].into_iter().enumerate() {
        for (i, corner) in corners.iter().enumerate() {
            frustum[plane * 4 + i] =
                backend.display_to_world(renderer, DVec3::new(corner.x, corner.y, z));
        }
    }

    let mut representation_ids = Vec::new();
    for pick in &area.picks {
        if let Some(id) = &pick.representation_id
            && !representation_ids.contains(id)
        {
            representation_ids.push(id.clone());
        }
    }

    FrustumPickResult { picks: area.picks, frustum, representation_ids }
}
