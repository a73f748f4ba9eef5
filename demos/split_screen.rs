//! Two views sharing one window, driven against the in-memory backend.
//!
//! Run with `RUST_LOG=debug` to watch the tree's mount and render logging.

use glam::DVec2;
use serde_json::json;

use trellis::tree::{Element, SceneTree};
use trellis::{
    DataSourceProps, HostRect, MockEngine, MultiViewRootProps, RepresentationProps, ViewProps,
    ViewRef,
};

fn main() {
    env_logger::init();

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

    let cone = |position: [f64; 2]| {
        Element::representation(RepresentationProps {
            actor: json!({ "displayPosition": position })
                .as_object()
                .expect("object literal")
                .clone(),
            ..RepresentationProps::default()
        })
        .child(Element::data_source(DataSourceProps {
            data: json!({ "points": [0.0, 1.0, 2.0] })
                .as_object()
                .expect("object literal")
                .clone(),
            ..DataSourceProps::default()
        }))
    };

    tree.update(vec![
        Element::multi_view_root(MultiViewRootProps { container: root }).children(vec![
            Element::view(left_props).keyed("left").child(cone([30.0, 40.0])),
            Element::view(right_props).keyed("right").child(cone([70.0, 60.0])),
        ]),
    ])
    .expect("scene mounts");

    let backend = tree.backend();
    let left_view = left_ref.get().expect("left mounted");
    let right_view = right_ref.get().expect("right mounted");
    println!(
        "shared window {} renders {} renderers",
        left_view.window,
        backend.renderers_of(left_view.window).len()
    );
    println!("left viewport  {:?}", backend.viewport_of(left_view.renderer));
    println!("right viewport {:?}", backend.viewport_of(right_view.renderer));

    let picks = tree.pick(&left_ref, DVec2::new(30.0, 40.0), 5.0).expect("left view is mounted");
    for pick in picks {
        println!(
            "picked {:?} at world {:?}",
            pick.representation_id, pick.world_position
        );
    }
}
