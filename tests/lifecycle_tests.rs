//! Resource Lifecycle Tests
//!
//! Tests for:
//! - ResourceRegistry: ref counting, pending-deletion deferral, underflow
//!   reporting, re-registration semantics
//! - SceneTree teardown: a full unmount releases every engine object, with
//!   shared windows deferred until the last dependent detaches

use serde_json::json;

use trellis::engine::mock::MockEngine;
use trellis::lifecycle::ResourceRegistry;
use trellis::tree::{Element, SceneTree};
use trellis::{
    DataSourceProps, HostRect, MultiViewRootProps, PropBag, RenderingBackend,
    RepresentationProps, TrellisError, ViewProps, ViewRef,
};

fn bag(value: serde_json::Value) -> PropBag {
    value.as_object().expect("object literal").clone()
}

// ============================================================================
// ResourceRegistry Tests
// ============================================================================

#[test]
fn marked_object_with_zero_refs_is_disposed_immediately() {
    let mut backend = MockEngine::new();
    let handle = backend.create("PolyData", &PropBag::new()).unwrap();
    let mut registry = ResourceRegistry::new();
    registry.register(handle, Box::new(move |b| b.delete(handle)));

    registry.mark_for_deletion(handle, &mut backend).unwrap();
    assert!(backend.is_deleted(handle));
    assert!(!registry.is_tracked(handle));
}

#[test]
fn disposal_waits_for_the_last_reference() {
    let mut backend = MockEngine::new();
    let handle = backend.create("RenderWindow", &PropBag::new()).unwrap();
    let mut registry = ResourceRegistry::new();
    registry.register(handle, Box::new(move |b| b.delete(handle)));

    assert_eq!(registry.inc_ref_count(handle).unwrap(), 1);
    assert_eq!(registry.inc_ref_count(handle).unwrap(), 2);
    registry.mark_for_deletion(handle, &mut backend).unwrap();
    assert!(backend.is_alive(handle));

    registry.dec_ref_count(handle, &mut backend).unwrap();
    assert!(backend.is_alive(handle));
    registry.dec_ref_count(handle, &mut backend).unwrap();
    assert!(backend.is_deleted(handle));
}

#[test]
fn unmarked_object_survives_its_last_release() {
    let mut backend = MockEngine::new();
    let handle = backend.create("RenderWindow", &PropBag::new()).unwrap();
    let mut registry = ResourceRegistry::new();
    registry.register(handle, Box::new(move |b| b.delete(handle)));

    registry.inc_ref_count(handle).unwrap();
    registry.dec_ref_count(handle, &mut backend).unwrap();
    assert!(backend.is_alive(handle));
    assert_eq!(registry.ref_count(handle), Some(0));
}

#[test]
fn dec_below_zero_reports_underflow() {
    let mut backend = MockEngine::new();
    let handle = backend.create("Actor", &PropBag::new()).unwrap();
    let mut registry = ResourceRegistry::new();
    registry.register(handle, Box::new(move |b| b.delete(handle)));

    let err = registry.dec_ref_count(handle, &mut backend).unwrap_err();
    assert!(matches!(err, TrellisError::RefCountUnderflow { .. }));
    // The object itself is untouched by the failed release.
    assert!(backend.is_alive(handle));
}

#[test]
fn operations_on_untracked_handles_fail() {
    let mut backend = MockEngine::new();
    let handle = backend.create("Actor", &PropBag::new()).unwrap();
    let mut registry = ResourceRegistry::new();

    assert!(matches!(
        registry.inc_ref_count(handle),
        Err(TrellisError::NotTracked { .. })
    ));
    assert!(matches!(
        registry.mark_for_deletion(handle, &mut backend),
        Err(TrellisError::NotTracked { .. })
    ));
}

#[test]
fn re_registration_clears_a_pending_mark() {
    let mut backend = MockEngine::new();
    let handle = backend.create("Mapper", &PropBag::new()).unwrap();
    let mut registry = ResourceRegistry::new();
    registry.register(handle, Box::new(move |b| b.delete(handle)));
    registry.inc_ref_count(handle).unwrap();
    registry.mark_for_deletion(handle, &mut backend).unwrap();

    // A new owner claims the handle before disposal happened.
    registry.register(handle, Box::new(move |b| b.delete(handle)));
    registry.dec_ref_count(handle, &mut backend).unwrap();
    assert!(backend.is_alive(handle));
}

#[test]
fn unregister_forgets_without_disposing() {
    let mut backend = MockEngine::new();
    let handle = backend.create("Mapper", &PropBag::new()).unwrap();
    let mut registry = ResourceRegistry::new();
    registry.register(handle, Box::new(move |b| b.delete(handle)));

    registry.unregister(handle);
    assert!(!registry.is_tracked(handle));
    assert!(backend.is_alive(handle));
}

// ============================================================================
// Tree Teardown Tests
// ============================================================================

fn scene(view_ref: &ViewRef, container: trellis::ContainerKey) -> Vec<Element> {
    let mut view_props = ViewProps::new(container);
    view_props.view_ref = Some(view_ref.clone());
    vec![
        Element::view(view_props).child(
            Element::representation(RepresentationProps::default()).child(Element::data_source(
                DataSourceProps {
                    data: bag(json!({ "points": [0.0, 0.0, 0.0] })),
                    ..DataSourceProps::default()
                },
            )),
        ),
    ]
}

#[test]
fn unmount_releases_every_engine_object() {
    let mut tree = SceneTree::new(MockEngine::new());
    let container = tree.create_container(HostRect::new(0.0, 0.0, 640.0, 480.0), 1.0);
    let view_ref = ViewRef::new();
    tree.update(scene(&view_ref, container)).unwrap();

    let mounted = view_ref.get().expect("view mounted");
    assert!(tree.backend().is_alive(mounted.window));
    assert!(tree.backend().object_count() > 0);

    tree.unmount_all();
    assert!(view_ref.get().is_none());
    assert!(tree.backend().is_deleted(mounted.window));
    assert!(tree.backend().is_deleted(mounted.renderer));
    // Cameras are engine-owned; everything the tree created is gone.
    assert_eq!(tree.backend().object_count(), 0);
}

#[test]
fn shared_window_disposal_waits_for_child_views() {
    let mut tree = SceneTree::new(MockEngine::new());
    let root = tree.create_container(HostRect::new(0.0, 0.0, 800.0, 600.0), 1.0);
    let left = tree.create_container(HostRect::new(0.0, 0.0, 400.0, 600.0), 1.0);
    let right = tree.create_container(HostRect::new(400.0, 0.0, 400.0, 600.0), 1.0);

    let left_ref = ViewRef::new();
    let right_ref = ViewRef::new();
    let mut left_props = ViewProps::new(left);
    left_props.view_ref = Some(left_ref.clone());
    let mut right_props = ViewProps::new(right);
    right_props.view_ref = Some(right_ref.clone());

    tree.update(vec![
        Element::multi_view_root(MultiViewRootProps { container: root }).children(vec![
            Element::view(left_props.clone()).keyed("left"),
            Element::view(right_props).keyed("right"),
        ]),
    ])
    .unwrap();

    let window = left_ref.get().unwrap().window;
    assert_eq!(right_ref.get().unwrap().window, window);
    assert_eq!(tree.registry().ref_count(window), Some(2));

    // Dropping one child releases one reference; the window stays up.
    tree.update(vec![
        Element::multi_view_root(MultiViewRootProps { container: root })
            .children(vec![Element::view(left_props).keyed("left")]),
    ])
    .unwrap();
    assert!(right_ref.get().is_none());
    assert_eq!(tree.registry().ref_count(window), Some(1));
    assert!(tree.backend().is_alive(window));
    assert_eq!(tree.backend().renderers_of(window).len(), 1);

    tree.unmount_all();
    assert!(tree.backend().is_deleted(window));
}
