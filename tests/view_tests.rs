//! View Tests
//!
//! Tests for:
//! - Standalone views: surface sizing from the container rectangle at the
//!   device pixel ratio, resize propagation, the minimum surface clamp
//! - Multi-view roots: shared window composition, per-child normalized
//!   viewports, pointer-driven renderer/style switching
//! - The camera-reset policy on data renders
//! - Manipulator binding rebuilds keyed on real settings changes

use glam::DVec3;
use serde_json::json;

use trellis::engine::mock::MockEngine;
use trellis::tree::{Element, SceneTree};
use trellis::view::MIN_SURFACE_PX;
use trellis::{
    ContainerKey, DataSourceProps, HostRect, ManipulatorAction, ManipulatorSettings,
    MultiViewRootProps, PointerButton, PointerEvent, PointerEventKind, PropBag,
    RepresentationProps, ViewProps, ViewRef,
};

fn bag(value: serde_json::Value) -> PropBag {
    value.as_object().expect("object literal").clone()
}

fn view_element(view_ref: &ViewRef, container: ContainerKey) -> Element {
    let mut props = ViewProps::new(container);
    props.view_ref = Some(view_ref.clone());
    Element::view(props)
}

fn pointer_event(kind: PointerEventKind, x: f64, y: f64) -> PointerEvent {
    PointerEvent {
        kind,
        position: glam::DVec2::new(x, y),
        button: PointerButton::None,
        modifiers: trellis::ModifierKeys::empty(),
    }
}

/// A representation whose actor sits at display (50, 50) with non-empty
/// upstream data, so data renders have something to frame.
fn pickable_scene(view_props: ViewProps) -> Vec<Element> {
    pickable_scene_with(view_props, json!({ "points": [0.0, 1.0, 2.0] }))
}

fn pickable_scene_with(view_props: ViewProps, data: serde_json::Value) -> Vec<Element> {
    vec![Element::view(view_props).child(
        Element::representation(RepresentationProps {
            actor: bag(json!({ "displayPosition": [50.0, 50.0] })),
            ..RepresentationProps::default()
        })
        .child(Element::data_source(DataSourceProps {
            data: bag(data),
            ..DataSourceProps::default()
        })),
    )]
}

// ============================================================================
// Standalone View Tests
// ============================================================================

#[test]
fn window_is_sized_from_the_container_at_device_pixel_ratio() {
    let mut tree = SceneTree::new(MockEngine::new());
    let container = tree.create_container(HostRect::new(0.0, 0.0, 800.0, 600.0), 2.0);
    let view_ref = ViewRef::new();
    tree.update(vec![view_element(&view_ref, container)]).unwrap();

    let mounted = view_ref.get().expect("view mounted");
    assert_eq!(tree.backend().window_size_of(mounted.window), (1600, 1200));
    assert_eq!(tree.backend().renderers_of(mounted.window), vec![mounted.renderer]);
    assert_eq!(tree.backend().render_count(mounted.window), 1);
}

#[test]
fn container_resize_resizes_the_window_and_renders() {
    let mut tree = SceneTree::new(MockEngine::new());
    let container = tree.create_container(HostRect::new(0.0, 0.0, 800.0, 600.0), 1.0);
    let view_ref = ViewRef::new();
    tree.update(vec![view_element(&view_ref, container)]).unwrap();
    let window = view_ref.get().unwrap().window;

    tree.set_container_rect(container, HostRect::new(0.0, 0.0, 400.0, 300.0));
    assert_eq!(tree.backend().window_size_of(window), (400, 300));
    assert_eq!(tree.backend().render_count(window), 2);
}

#[test]
fn tiny_containers_are_clamped_to_the_minimum_surface() {
    let mut tree = SceneTree::new(MockEngine::new());
    let container = tree.create_container(HostRect::new(0.0, 0.0, 2.0, 3.0), 1.0);
    let view_ref = ViewRef::new();
    tree.update(vec![view_element(&view_ref, container)]).unwrap();

    let window = view_ref.get().unwrap().window;
    assert_eq!(
        tree.backend().window_size_of(window),
        (MIN_SURFACE_PX, MIN_SURFACE_PX)
    );
}

// ============================================================================
// Multi-View Tests
// ============================================================================

struct SplitScreen {
    tree: SceneTree<MockEngine>,
    root: ContainerKey,
    right: ContainerKey,
    left_ref: ViewRef,
    right_ref: ViewRef,
}

fn split_screen() -> SplitScreen {
    let mut tree = SceneTree::new(MockEngine::new());
    let root = tree.create_container(HostRect::new(0.0, 0.0, 800.0, 600.0), 1.0);
    let left = tree.create_container(HostRect::new(0.0, 0.0, 400.0, 600.0), 1.0);
    let right = tree.create_container(HostRect::new(400.0, 0.0, 400.0, 600.0), 1.0);
    let left_ref = ViewRef::new();
    let right_ref = ViewRef::new();

    tree.update(vec![
        Element::multi_view_root(MultiViewRootProps { container: root }).children(vec![
            view_element(&left_ref, left).keyed("left"),
            view_element(&right_ref, right).keyed("right"),
        ]),
    ])
    .unwrap();
    SplitScreen { tree, root, right, left_ref, right_ref }
}

#[test]
fn child_views_share_the_root_window_with_partitioned_viewports() {
    let s = split_screen();
    let left = s.left_ref.get().expect("left mounted");
    let right = s.right_ref.get().expect("right mounted");

    assert_eq!(left.window, right.window);
    assert_eq!(
        s.tree.backend().renderers_of(left.window),
        vec![left.renderer, right.renderer]
    );
    assert_eq!(s.tree.backend().viewport_of(left.renderer), [0.0, 0.0, 0.5, 1.0]);
    assert_eq!(s.tree.backend().viewport_of(right.renderer), [0.5, 0.0, 1.0, 1.0]);
}

#[test]
fn root_resize_recomputes_child_viewports() {
    let mut s = split_screen();
    let right = s.right_ref.get().unwrap();

    // The root doubles in width; the unchanged right half now covers the
    // second quarter.
    s.tree.set_container_rect(s.root, HostRect::new(0.0, 0.0, 1600.0, 600.0));
    assert_eq!(s.tree.backend().viewport_of(right.renderer), [0.25, 0.0, 0.5, 1.0]);
}

#[test]
fn entering_a_child_container_switches_the_shared_interactor() {
    let mut s = split_screen();
    let right = s.right_ref.get().unwrap();
    let interactor = right.interactor.expect("shared interactor");

    s.tree.dispatch_pointer(
        s.right,
        pointer_event(PointerEventKind::Enter, 10.0, 10.0),
        std::time::Instant::now(),
    );
    assert_eq!(s.tree.backend().current_renderer_of(interactor), Some(right.renderer));
    assert_eq!(s.tree.backend().current_style_of(interactor), right.style);
}

// ============================================================================
// Camera Policy Tests
// ============================================================================

#[test]
fn data_render_resets_the_camera_and_centers_rotation() {
    let mut tree = SceneTree::new(MockEngine::new());
    let container = tree.create_container(HostRect::new(0.0, 0.0, 640.0, 480.0), 1.0);
    let view_ref = ViewRef::new();
    let mut props = ViewProps::new(container);
    props.view_ref = Some(view_ref.clone());
    tree.update(pickable_scene(props)).unwrap();

    let mounted = view_ref.get().unwrap();
    assert_eq!(tree.backend().reset_count(mounted.renderer), 1);
    let style = mounted.style.expect("standalone style");
    assert_eq!(
        tree.backend().center_of_rotation_of(style),
        DVec3::new(0.5, 0.5, 0.0)
    );
}

#[test]
fn property_updates_render_without_resetting_the_camera() {
    let mut tree = SceneTree::new(MockEngine::new());
    let container = tree.create_container(HostRect::new(0.0, 0.0, 640.0, 480.0), 1.0);
    let view_ref = ViewRef::new();
    let mut props = ViewProps::new(container);
    props.view_ref = Some(view_ref.clone());
    tree.update(pickable_scene(props.clone())).unwrap();

    let mounted = view_ref.get().unwrap();
    assert_eq!(tree.backend().render_count(mounted.window), 1);
    assert_eq!(tree.backend().reset_count(mounted.renderer), 1);

    props.background = [0.0, 0.0, 0.0];
    tree.update(pickable_scene(props)).unwrap();
    assert_eq!(tree.backend().render_count(mounted.window), 2);
    assert_eq!(tree.backend().reset_count(mounted.renderer), 1);
}

#[test]
fn camera_reset_can_be_opted_out() {
    let mut tree = SceneTree::new(MockEngine::new());
    let container = tree.create_container(HostRect::new(0.0, 0.0, 640.0, 480.0), 1.0);
    let view_ref = ViewRef::new();
    let mut props = ViewProps::new(container);
    props.view_ref = Some(view_ref.clone());
    props.auto_reset_camera = false;
    tree.update(pickable_scene(props)).unwrap();

    let mounted = view_ref.get().unwrap();
    // The data render still happens; only the reset is suppressed.
    assert_eq!(tree.backend().render_count(mounted.window), 1);
    assert_eq!(tree.backend().reset_count(mounted.renderer), 0);
}

#[test]
fn camera_policy_updates_reach_mounted_representations() {
    let mut tree = SceneTree::new(MockEngine::new());
    let container = tree.create_container(HostRect::new(0.0, 0.0, 640.0, 480.0), 1.0);
    let view_ref = ViewRef::new();
    let mut props = ViewProps::new(container);
    props.view_ref = Some(view_ref.clone());
    tree.update(pickable_scene(props.clone())).unwrap();

    let mounted = view_ref.get().unwrap();
    assert_eq!(tree.backend().render_count(mounted.window), 1);
    assert_eq!(tree.backend().reset_count(mounted.renderer), 1);

    // Opting out of resets and changing the data in the same pass: the
    // representation wired at mount must render under the new policy.
    props.auto_reset_camera = false;
    tree.update(pickable_scene_with(props.clone(), json!({ "points": [3.0, 4.0, 5.0] })))
        .unwrap();
    assert_eq!(tree.backend().render_count(mounted.window), 2);
    assert_eq!(tree.backend().reset_count(mounted.renderer), 1);

    // Opting back in takes effect the same way.
    props.auto_reset_camera = true;
    tree.update(pickable_scene_with(props, json!({ "points": [6.0, 7.0, 8.0] }))).unwrap();
    assert_eq!(tree.backend().render_count(mounted.window), 3);
    assert_eq!(tree.backend().reset_count(mounted.renderer), 2);
}

// ============================================================================
// Manipulator Tests
// ============================================================================

#[test]
fn manipulators_rebuild_only_on_real_settings_changes() {
    let mut tree = SceneTree::new(MockEngine::new());
    let container = tree.create_container(HostRect::new(0.0, 0.0, 640.0, 480.0), 1.0);
    let view_ref = ViewRef::new();
    let mut props = ViewProps::new(container);
    props.view_ref = Some(view_ref.clone());

    tree.update(vec![Element::view(props.clone())]).unwrap();
    let style = view_ref.get().unwrap().style.expect("standalone style");
    assert_eq!(tree.backend().clear_count(style), 1);
    let classes = tree.backend().manipulator_classes(style);
    assert_eq!(classes.first().map(String::as_str), Some("GestureManipulator"));
    assert_eq!(classes.len(), 5);

    // Same bindings by value: no rebuild.
    tree.update(vec![Element::view(props.clone())]).unwrap();
    assert_eq!(tree.backend().clear_count(style), 1);

    props.interactor_settings =
        vec![ManipulatorSettings::new(ManipulatorAction::Rotate, PointerButton::Left)];
    tree.update(vec![Element::view(props)]).unwrap();
    assert_eq!(tree.backend().clear_count(style), 2);
    assert_eq!(
        tree.backend().manipulator_classes(style),
        vec!["GestureManipulator".to_owned(), "RotateManipulator".to_owned()]
    );
}
