//! Pipeline Tests
//!
//! Tests for:
//! - DataSource: feeding the nearest consumer, the visibility gate on data
//!   arrival, class swapping
//! - Algorithm: chaining between source and mapper, zero-input generators,
//!   in-place class migration preserving input bindings
//! - FieldArray: named arrays written into the nearest source's dataset
//! - Reader: in-memory feeds, URL failure rollback
//! - ShareDataSet: cross-subtree publication with late join
//! - Update passes: render batching and per-subtree error containment

use serde_json::json;

use trellis::engine::mock::MockEngine;
use trellis::engine::{EngineHandle, InputBinding};
use trellis::tree::{Element, SceneTree};
use trellis::{
    AlgorithmProps, ContainerKey, DataSourceProps, FieldArrayProps, FieldLocation, HostRect,
    PropBag, ReaderProps, RepresentationProps, ShareDataSetProps, TrellisError, ViewProps,
    ViewRef,
};

fn bag(value: serde_json::Value) -> PropBag {
    value.as_object().expect("object literal").clone()
}

fn points_source() -> Element {
    Element::data_source(DataSourceProps {
        data: bag(json!({ "points": [0.0, 1.0, 2.0] })),
        ..DataSourceProps::default()
    })
}

fn new_tree() -> (SceneTree<MockEngine>, ViewRef, ContainerKey) {
    let mut tree = SceneTree::new(MockEngine::new());
    let container = tree.create_container(HostRect::new(0.0, 0.0, 640.0, 480.0), 1.0);
    (tree, ViewRef::new(), container)
}

fn view_element(view_ref: &ViewRef, container: ContainerKey) -> Element {
    let mut props = ViewProps::new(container);
    props.view_ref = Some(view_ref.clone());
    Element::view(props)
}

fn first_actor(tree: &SceneTree<MockEngine>, view_ref: &ViewRef) -> EngineHandle {
    let renderer = view_ref.get().expect("view mounted").renderer;
    tree.backend().actors_of(renderer)[0]
}

// ============================================================================
// DataSource Tests
// ============================================================================

#[test]
fn source_feeds_mapper_and_reveals_actor() {
    let (mut tree, view_ref, container) = new_tree();
    tree.update(vec![view_element(&view_ref, container).child(
        Element::representation(RepresentationProps::default()).child(points_source()),
    )])
    .unwrap();

    let actor = first_actor(&tree, &view_ref);
    assert!(tree.backend().visibility_of(actor));
    let mapper = tree.backend().mapper_of(actor).expect("mapper assigned");
    assert!(matches!(tree.backend().input_of(mapper, 0), Some(InputBinding::Data(_))));

    // Every request of the mount pass collapsed into one frame.
    let window = view_ref.get().unwrap().window;
    assert_eq!(tree.backend().render_count(window), 1);
}

#[test]
fn empty_source_keeps_actor_hidden() {
    let (mut tree, view_ref, container) = new_tree();
    tree.update(vec![view_element(&view_ref, container).child(
        Element::representation(RepresentationProps::default()).child(Element::data_source(
            DataSourceProps {
                data: bag(json!({ "points": [] })),
                ..DataSourceProps::default()
            },
        )),
    )])
    .unwrap();

    let actor = first_actor(&tree, &view_ref);
    assert!(!tree.backend().visibility_of(actor));
}

#[test]
fn filling_an_empty_source_reveals_the_actor() {
    let (mut tree, view_ref, container) = new_tree();
    let empty = |data: serde_json::Value| {
        vec![view_element(&view_ref, container).child(
            Element::representation(RepresentationProps::default()).child(
                Element::data_source(DataSourceProps {
                    data: bag(data),
                    ..DataSourceProps::default()
                }),
            ),
        )]
    };
    tree.update(empty(json!({ "points": [] }))).unwrap();
    let actor = first_actor(&tree, &view_ref);
    let window = view_ref.get().unwrap().window;
    let renderer = view_ref.get().unwrap().renderer;
    assert!(!tree.backend().visibility_of(actor));
    let resets = tree.backend().reset_count(renderer);

    tree.update(empty(json!({ "points": [3.0, 4.0, 5.0] }))).unwrap();
    assert!(tree.backend().visibility_of(actor));
    // Data arrival renders with a camera reset; the mount pass did not.
    assert_eq!(tree.backend().reset_count(renderer), resets + 1);
    assert_eq!(tree.backend().render_count(window), 2);
}

#[test]
fn unchanged_update_renders_nothing() {
    let (mut tree, view_ref, container) = new_tree();
    let scene = || {
        vec![view_element(&view_ref, container).child(
            Element::representation(RepresentationProps::default()).child(points_source()),
        )]
    };
    tree.update(scene()).unwrap();
    let window = view_ref.get().unwrap().window;
    assert_eq!(tree.backend().render_count(window), 1);

    tree.update(scene()).unwrap();
    assert_eq!(tree.backend().render_count(window), 1);
}

// ============================================================================
// Algorithm Tests
// ============================================================================

#[test]
fn algorithm_chains_between_source_and_mapper() {
    let (mut tree, view_ref, container) = new_tree();
    tree.update(vec![view_element(&view_ref, container).child(
        Element::representation(RepresentationProps::default()).child(
            Element::algorithm(AlgorithmProps::new("ElevationFilter")).child(points_source()),
        ),
    )])
    .unwrap();

    let actor = first_actor(&tree, &view_ref);
    let mapper = tree.backend().mapper_of(actor).unwrap();
    let Some(InputBinding::Connection(port)) = tree.backend().input_of(mapper, 0) else {
        panic!("mapper should be connected to the filter output");
    };
    assert_eq!(port.index, 0);
    // The filter's own input carries the dataset pushed by value.
    assert!(matches!(
        tree.backend().input_of(port.producer, 0),
        Some(InputBinding::Data(_))
    ));
    assert!(tree.backend().visibility_of(actor));
}

#[test]
fn zero_input_algorithm_supplies_its_own_data() {
    let (mut tree, view_ref, container) = new_tree();
    tree.update(vec![view_element(&view_ref, container).child(
        Element::representation(RepresentationProps::default())
            .child(Element::algorithm(AlgorithmProps::new("ConeSource"))),
    )])
    .unwrap();

    let actor = first_actor(&tree, &view_ref);
    assert!(tree.backend().visibility_of(actor));
}

#[test]
fn algorithm_class_swap_migrates_input_bindings() {
    let (mut tree, view_ref, container) = new_tree();
    let scene = |class: &str| {
        vec![view_element(&view_ref, container).child(
            Element::representation(RepresentationProps::default())
                .child(Element::algorithm(AlgorithmProps::new(class)).child(points_source())),
        )]
    };
    tree.update(scene("ElevationFilter")).unwrap();

    let actor = first_actor(&tree, &view_ref);
    let mapper = tree.backend().mapper_of(actor).unwrap();
    let Some(InputBinding::Connection(before)) = tree.backend().input_of(mapper, 0) else {
        panic!("mapper should be connected");
    };
    let old_filter = before.producer;
    let Some(InputBinding::Data(dataset)) = tree.backend().input_of(old_filter, 0) else {
        panic!("filter input should carry the dataset");
    };

    tree.update(scene("DecimateFilter")).unwrap();
    let Some(InputBinding::Connection(after)) = tree.backend().input_of(mapper, 0) else {
        panic!("mapper should stay connected");
    };
    assert_ne!(after.producer, old_filter);
    assert_eq!(tree.backend().class_of(after.producer), Some("DecimateFilter"));
    // The replacement inherited the old object's input binding.
    assert_eq!(
        tree.backend().input_of(after.producer, 0),
        Some(InputBinding::Data(dataset))
    );
    assert!(tree.backend().is_deleted(old_filter));
}

#[test]
fn source_follows_a_migrated_consumer() {
    let (mut tree, view_ref, container) = new_tree();
    let scene = |filter: &str, dataset_class: &str, data: serde_json::Value| {
        vec![view_element(&view_ref, container).child(
            Element::representation(RepresentationProps::default()).child(
                Element::algorithm(AlgorithmProps::new(filter)).child(Element::data_source(
                    DataSourceProps {
                        class: dataset_class.to_owned(),
                        data: bag(data),
                        ..DataSourceProps::default()
                    },
                )),
            ),
        )]
    };
    tree.update(scene("ElevationFilter", "PolyData", json!({ "points": [0.0, 1.0, 2.0] })))
        .unwrap();

    let actor = first_actor(&tree, &view_ref);
    let mapper = tree.backend().mapper_of(actor).unwrap();
    let Some(InputBinding::Connection(before)) = tree.backend().input_of(mapper, 0) else {
        panic!("mapper should be connected");
    };
    let old_filter = before.producer;
    let Some(InputBinding::Data(old_dataset)) = tree.backend().input_of(old_filter, 0) else {
        panic!("filter input should carry the dataset");
    };

    // Filter and dataset class change in the same pass. The source must
    // feed the replacement filter, not the disposed original.
    tree.update(scene("DecimateFilter", "ImageData", json!({ "points": [0.0, 1.0, 2.0] })))
        .unwrap();
    let Some(InputBinding::Connection(after)) = tree.backend().input_of(mapper, 0) else {
        panic!("mapper should stay connected");
    };
    let new_filter = after.producer;
    assert_eq!(tree.backend().class_of(new_filter), Some("DecimateFilter"));
    let Some(InputBinding::Data(bound)) = tree.backend().input_of(new_filter, 0) else {
        panic!("replacement filter should carry the dataset");
    };
    assert!(tree.backend().is_alive(bound));
    assert_eq!(tree.backend().class_of(bound), Some("ImageData"));
    assert!(tree.backend().is_deleted(old_filter));
    assert!(tree.backend().is_deleted(old_dataset));

    // Later data changes keep landing on the live replacement.
    tree.update(scene("DecimateFilter", "ImageData", json!({ "points": [7.0, 8.0, 9.0] })))
        .unwrap();
    assert_eq!(tree.backend().input_of(new_filter, 0), Some(InputBinding::Data(bound)));
    assert_eq!(tree.backend().prop(bound, "points"), Some(json!([7.0, 8.0, 9.0])));
}

// ============================================================================
// FieldArray Tests
// ============================================================================

#[test]
fn field_arrays_write_into_the_source_dataset() {
    let (mut tree, view_ref, container) = new_tree();
    let scene = |values: Vec<f64>| {
        vec![view_element(&view_ref, container).child(
            Element::representation(RepresentationProps::default()).child(
                points_source().child(Element::field_array(FieldArrayProps {
                    values,
                    ..FieldArrayProps::new("temperature")
                })),
            ),
        )]
    };
    tree.update(scene(vec![1.0, 2.0, 3.0])).unwrap();

    let actor = first_actor(&tree, &view_ref);
    let mapper = tree.backend().mapper_of(actor).unwrap();
    let Some(InputBinding::Data(dataset)) = tree.backend().input_of(mapper, 0) else {
        panic!("mapper should carry the dataset");
    };
    // The source declares point data, so the array lands there.
    assert_eq!(
        tree.backend().prop(dataset, "pointData:temperature"),
        Some(json!([1.0, 2.0, 3.0]))
    );
    let window = view_ref.get().unwrap().window;
    assert_eq!(tree.backend().render_count(window), 1);

    // New values rewrite the array and trigger a data render.
    tree.update(scene(vec![4.0, 5.0, 6.0])).unwrap();
    assert_eq!(
        tree.backend().prop(dataset, "pointData:temperature"),
        Some(json!([4.0, 5.0, 6.0]))
    );
    assert_eq!(tree.backend().render_count(window), 2);

    // Same values: nothing written, nothing rendered.
    tree.update(scene(vec![4.0, 5.0, 6.0])).unwrap();
    assert_eq!(tree.backend().render_count(window), 2);
}

#[test]
fn field_array_location_override_beats_the_source_default() {
    let (mut tree, view_ref, container) = new_tree();
    tree.update(vec![view_element(&view_ref, container).child(
        Element::representation(RepresentationProps::default()).child(
            points_source().child(Element::field_array(FieldArrayProps {
                values: vec![1.0],
                location: Some(FieldLocation::CellData),
                ..FieldArrayProps::new("ids")
            })),
        ),
    )])
    .unwrap();

    let actor = first_actor(&tree, &view_ref);
    let mapper = tree.backend().mapper_of(actor).unwrap();
    let Some(InputBinding::Data(dataset)) = tree.backend().input_of(mapper, 0) else {
        panic!("mapper should carry the dataset");
    };
    assert_eq!(tree.backend().prop(dataset, "cellData:ids"), Some(json!([1.0])));
    assert_eq!(tree.backend().prop(dataset, "pointData:ids"), None);
}

#[test]
fn field_array_outside_a_source_is_a_wiring_bug() {
    let (mut tree, view_ref, container) = new_tree();
    let err = tree
        .update(vec![view_element(&view_ref, container).child(
            Element::representation(RepresentationProps::default())
                .child(Element::field_array(FieldArrayProps::new("temperature"))),
        )])
        .unwrap_err();
    assert!(matches!(err, TrellisError::MissingChannel { channel: "fields" }));
}

// ============================================================================
// Reader Tests
// ============================================================================

#[test]
fn reader_text_feed_reveals_actor() {
    let (mut tree, view_ref, container) = new_tree();
    tree.update(vec![view_element(&view_ref, container).child(
        Element::representation(RepresentationProps::default()).child(Element::reader(
            ReaderProps { text: Some("v 0 0 0".to_owned()), ..ReaderProps::new("ObjReader") },
        )),
    )])
    .unwrap();

    let actor = first_actor(&tree, &view_ref);
    assert!(tree.backend().visibility_of(actor));
    let mapper = tree.backend().mapper_of(actor).unwrap();
    let Some(InputBinding::Connection(port)) = tree.backend().input_of(mapper, 0) else {
        panic!("mapper should be connected to the reader");
    };
    assert_eq!(tree.backend().prop(port.producer, "loaded"), Some(json!(true)));
}

#[test]
fn reader_url_failure_rolls_the_node_back() {
    let (mut tree, view_ref, container) = new_tree();
    let representation =
        || Element::representation(RepresentationProps::default());
    tree.update(vec![view_element(&view_ref, container).child(representation())]).unwrap();
    let objects_before = tree.backend().object_count();

    let err = tree
        .update(vec![view_element(&view_ref, container).child(representation().child(
            Element::reader(ReaderProps {
                url: Some("bad://missing.vtp".to_owned()),
                ..ReaderProps::new("PolyDataReader")
            }),
        ))])
        .unwrap_err();
    assert!(matches!(err, TrellisError::External(_)));

    // The failed reader was disposed; the rest of the tree is untouched.
    assert_eq!(tree.backend().object_count(), objects_before);
    assert!(view_ref.get().is_some());
}

// ============================================================================
// ShareDataSet Tests
// ============================================================================

#[test]
fn shared_dataset_bridges_subtrees_with_late_join() {
    let (mut tree, view_ref, container) = new_tree();
    tree.update(vec![view_element(&view_ref, container).children(vec![
        // Producer publishes before any consumer exists.
        Element::share_dataset(ShareDataSetProps::new("mesh")).child(points_source()),
        Element::representation(RepresentationProps::default())
            .child(Element::share_dataset(ShareDataSetProps::new("mesh"))),
    ])])
    .unwrap();

    let actor = first_actor(&tree, &view_ref);
    assert!(tree.backend().visibility_of(actor));
    let mapper = tree.backend().mapper_of(actor).unwrap();
    let Some(InputBinding::Data(dataset)) = tree.backend().input_of(mapper, 0) else {
        panic!("consumer mapper should receive the shared dataset");
    };
    assert_eq!(tree.shared_datasets().dataset("mesh"), Some(dataset));

    // A consumer mounted in a later pass still receives the data.
    tree.update(vec![view_element(&view_ref, container).children(vec![
        Element::share_dataset(ShareDataSetProps::new("mesh")).child(points_source()),
        Element::representation(RepresentationProps::default())
            .child(Element::share_dataset(ShareDataSetProps::new("mesh"))),
        Element::representation(RepresentationProps { id: Some("late".to_owned()),
            ..RepresentationProps::default() })
            .child(Element::share_dataset(ShareDataSetProps::new("mesh"))),
    ])])
    .unwrap();

    let renderer = view_ref.get().unwrap().renderer;
    let actors = tree.backend().actors_of(renderer);
    assert_eq!(actors.len(), 2);
    assert!(tree.backend().visibility_of(actors[1]));
    let late_mapper = tree.backend().mapper_of(actors[1]).unwrap();
    assert_eq!(tree.backend().input_of(late_mapper, 0), Some(InputBinding::Data(dataset)));
}

#[test]
fn unmounting_the_producer_withdraws_the_publication() {
    let (mut tree, view_ref, container) = new_tree();
    tree.update(vec![view_element(&view_ref, container)
        .child(Element::share_dataset(ShareDataSetProps::new("mesh")).child(points_source()))])
    .unwrap();
    assert!(tree.shared_datasets().dataset("mesh").is_some());

    tree.update(vec![view_element(&view_ref, container)]).unwrap();
    assert!(tree.shared_datasets().dataset("mesh").is_none());
}

// ============================================================================
// Error Containment Tests
// ============================================================================

#[test]
fn a_failing_subtree_does_not_block_its_siblings() {
    let (mut tree, view_ref, container) = new_tree();
    // A representation outside any view is a wiring bug.
    let err = tree
        .update(vec![
            Element::representation(RepresentationProps::default()),
            view_element(&view_ref, container),
        ])
        .unwrap_err();
    assert!(matches!(err, TrellisError::MissingChannel { channel: "view" }));
    assert!(view_ref.get().is_some());
}
