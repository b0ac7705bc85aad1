//! Integration tests for the sceneslim pipeline
//!
//! These tests run the full optimizer over small hand-built scenes and check
//! the resulting scene, timeline and report together.

use approx::assert_relative_eq;
use nalgebra::Vector3;
use sceneslim::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// A `cells` x `cells` grid where every quad has its own four corners.
///
/// Shared corners are duplicated, as an importer that emits one vertex per
/// face corner would do.
fn split_grid(cells: u32) -> Mesh {
    let mut mesh = Mesh::new();
    let scale = cells as f32;
    for y in 0..cells {
        for x in 0..cells {
            let base = mesh.point_count() as u32;
            for (cx, cy) in [(x, y), (x + 1, y), (x + 1, y + 1), (x, y + 1)] {
                mesh.add_point(cx as f32, cy as f32, 0.0);
                mesh.add_texcoord(cx as f32 / scale, cy as f32 / scale);
            }
            let (a, b, c, d) = (base, base + 1, base + 2, base + 3);
            mesh.add_face([a, a, b, b, c, c]);
            mesh.add_face([a, a, c, c, d, d]);
        }
    }
    mesh
}

/// One good triangle and one collinear sliver
fn sliver_mesh() -> Mesh {
    Mesh::from_arrays(
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 0.0],
        vec![0.0, 0.0],
        vec![0, 0, 1, 0, 2, 0, 0, 0, 1, 0, 3, 0],
    )
}

struct Fixture {
    scene: Scene,
    spin: PropertyTarget,
    grid: NodeId,
}

/// root
/// ├── wrapper (plain group, no transforms)
/// │   └── grid mesh [identity translate, translate, scale]
/// ├── spinner [rotate, animated]
/// └── pane (container)
///     └── inside (plain group)
///         └── sliver mesh
fn fixture() -> Fixture {
    let mut grid_mesh = split_grid(2);
    grid_mesh.add_face([0, 0, 0, 0, 1, 1]);
    let grid = SceneNode::mesh(grid_mesh)
        .with_name("grid")
        .with_transform(Transform::translate(0.0, 0.0, 0.0))
        .with_transform(Transform::translate(1.0, 2.0, 3.0))
        .with_transform(Transform::scale(2.0, 2.0, 2.0));
    let grid_id = grid.id();

    let rotate = Transform::rotate(0.0, Vector3::y());
    let spin = PropertyTarget::transform(rotate.id(), TransformProperty::Angle);

    let root = SceneNode::group(vec![
        SceneNode::group(vec![grid]).with_name("wrapper"),
        SceneNode::empty().with_name("spinner").with_transform(rotate),
        SceneNode::container(
            "pane",
            vec![SceneNode::group(vec![SceneNode::mesh(sliver_mesh()).with_name("sliver")]).with_name("inside")],
        )
        .with_name("pane"),
    ]);

    let timeline = Timeline::new(
        [(0.0, 0.0), (1.0, 90.0), (2.0, 90.0), (3.0, 90.0), (4.0, 0.0)]
            .into_iter()
            .map(|(time, angle)| KeyFrame::new(time, vec![KeyValue::new(spin.clone(), angle)]))
            .collect(),
    );

    Fixture {
        scene: Scene::new(root).with_timeline(timeline),
        spin,
        grid: grid_id,
    }
}

fn child_names(node: &SceneNode) -> Vec<String> {
    node.children()
        .iter()
        .map(|child| child.name.clone().unwrap_or_default())
        .collect()
}

#[derive(Clone, Default)]
struct CollectingSink(Rc<RefCell<Vec<OptimizationReport>>>);

impl ReportSink for CollectingSink {
    fn report(&self, report: &OptimizationReport) {
        self.0.borrow_mut().push(report.clone());
    }
}

#[test]
fn test_pipeline_end_to_end() {
    let Fixture { mut scene, grid, .. } = fixture();
    validate_scene(&scene.root).unwrap();

    let report = Optimizer::default().with_sink(NullSink).optimize(&mut scene).unwrap();

    let timeline_stats = report.timeline.unwrap();
    assert_eq!(timeline_stats.key_values_before, 5);
    assert_eq!(timeline_stats.key_values_removed, 1);
    assert_eq!(timeline_stats.key_frames_removed, 1);
    assert_eq!(timeline_stats.key_values_discretized, 4);
    assert_eq!(report.bound_transforms, 1);

    assert_eq!(report.prune.transforms_total, 4);
    assert_eq!(report.prune.transforms_removed, 1);
    assert_eq!(report.prune.merge_opportunities, 1);
    assert_eq!(report.prune.groups_total, 3);
    assert_eq!(report.prune.groups_flattened, 1);

    assert_eq!(report.meshes, 2);
    assert_eq!(report.dedup.points_before, 20);
    assert_eq!(report.dedup.points_after, 13);
    assert_eq!(report.dedup.texcoords_before, 17);
    assert_eq!(report.dedup.texcoords_after, 10);
    assert_eq!(report.degenerate.faces_before, 11);
    assert_eq!(report.degenerate.same_index, 1);
    assert_eq!(report.degenerate.small_area, 1);
    assert_eq!(report.degenerate.faces_after(), 9);

    assert_eq!(child_names(&scene.root), vec!["grid", "spinner", "pane"]);
    let pane = &scene.root.children()[2];
    assert_eq!(child_names(pane), vec!["inside"]);

    let grid_node = scene.root.find(grid).unwrap();
    assert_eq!(grid_node.transforms.len(), 2);
    let grid_mesh = grid_node.mesh_ref().unwrap();
    assert_eq!(grid_mesh.point_count(), 9);
    assert_eq!(grid_mesh.face_count(), 8);

    assert_eq!(validate_scene(&scene.root).unwrap(), 2);
}

#[test]
fn test_reduced_timeline_samples_like_the_original() {
    let Fixture { mut scene, spin, .. } = fixture();
    let original = scene.timeline.clone().unwrap();

    let config = OptimizerConfig::default().with_downgrade_to_discrete(false);
    Optimizer::new(config).with_sink(NullSink).optimize(&mut scene).unwrap();

    let reduced = scene.timeline.as_ref().unwrap();
    assert_eq!(reduced.key_frames.len(), 4);
    for step in 0..=50 {
        let time = step as f64 * 0.1;
        assert_relative_eq!(
            sample(&original, &spin, time, 0.0),
            sample(reduced, &spin, time, 0.0),
            epsilon = 1e-9
        );
    }
}

#[test]
fn test_configuration_fault_leaves_scene_untouched() {
    let Fixture { mut scene, .. } = fixture();
    let stray = PropertyTarget::External {
        owner: "material".to_string(),
        property: "opacity".to_string(),
    };
    if let Some(timeline) = scene.timeline.as_mut() {
        timeline.key_frames[2].values.push(KeyValue::new(stray, 0.5));
    }
    let before = scene.clone();

    let sink = CollectingSink::default();
    let err = Optimizer::default().with_sink(sink.clone()).optimize(&mut scene).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(scene, before);
    assert!(sink.0.borrow().is_empty());
}

#[test]
fn test_target_outside_the_scene_is_a_configuration_fault() {
    let Fixture { mut scene, .. } = fixture();
    let detached = Transform::translate(1.0, 0.0, 0.0);
    let target = PropertyTarget::transform(detached.id(), TransformProperty::X);
    scene.timeline = Some(Timeline::new(vec![KeyFrame::new(0.0, vec![KeyValue::new(target, 2.0)])]));

    let err = Optimizer::default().with_sink(NullSink).optimize(&mut scene).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn test_bound_identity_survives_without_timeline_reduction() {
    let animated = Transform::translate(0.0, 0.0, 0.0);
    let target = PropertyTarget::transform(animated.id(), TransformProperty::Y);
    let root = SceneNode::group(vec![SceneNode::group(vec![SceneNode::mesh(sliver_mesh())])
        .with_name("bouncing")
        .with_transform(animated)]);
    let timeline = Timeline::new(vec![
        KeyFrame::new(0.0, vec![KeyValue::new(target.clone(), 0.0)]),
        KeyFrame::new(1.0, vec![KeyValue::new(target, 0.0)]),
    ]);
    let mut scene = Scene::new(root).with_timeline(timeline.clone());

    let config = OptimizerConfig::default().with_optimize_timeline(false);
    let report = Optimizer::new(config).with_sink(NullSink).optimize(&mut scene).unwrap();

    assert!(report.timeline.is_none());
    assert_eq!(report.bound_transforms, 1);
    assert_eq!(report.prune.transforms_removed, 0);
    assert_eq!(report.prune.groups_flattened, 0);
    assert_eq!(child_names(&scene.root), vec!["bouncing"]);
    assert_eq!(scene.timeline, Some(timeline));
}

#[test]
fn test_scene_without_timeline() {
    let mut scene = Scene::new(SceneNode::group(vec![
        SceneNode::mesh(split_grid(3)).with_transform(Transform::identity())
    ]));
    let report = Optimizer::default().with_sink(NullSink).optimize(&mut scene).unwrap();

    assert!(report.timeline.is_none());
    assert_eq!(report.bound_transforms, 0);
    assert_eq!(report.prune.transforms_removed, 1);
    assert_eq!(report.dedup.points_before, 36);
    assert_eq!(report.dedup.points_after, 16);
    assert_eq!(report.degenerate.removed(), 0);
}

#[test]
fn test_remove_unreferenced_after_face_filtering() {
    let mut scene = Scene::new(SceneNode::group(vec![SceneNode::mesh(sliver_mesh())]));
    let config = OptimizerConfig::default().with_remove_unreferenced(true);
    let report = Optimizer::new(config).with_sink(NullSink).optimize(&mut scene).unwrap();

    // The sliver was the only face using point 3.
    assert_eq!(report.unreferenced_points, 1);
    assert_eq!(report.unreferenced_texcoords, 0);
    assert_eq!(report.points_after(), 3);
    let mesh = scene.root.children()[0].mesh_ref().unwrap();
    assert_eq!(mesh.point_count(), 3);
    validate_mesh(mesh, "sliver").unwrap();
}

#[test]
fn test_disabled_passes_leave_geometry_alone() {
    let mut scene = Scene::new(SceneNode::group(vec![SceneNode::mesh(split_grid(2))]));
    let before = scene.clone();
    let config = OptimizerConfig::default()
        .with_dedup_geometry(false)
        .with_remove_degenerate(false)
        .with_prune_transforms(false)
        .with_flatten_groups(false);

    let report = Optimizer::new(config).with_sink(NullSink).optimize(&mut scene).unwrap();
    assert_eq!(scene, before);
    assert_eq!(report.dedup.points_before, report.dedup.points_after);
    assert_eq!(report.degenerate.faces_after(), 8);
}

#[test]
fn test_optimizing_twice_changes_nothing_more() {
    let Fixture { mut scene, .. } = fixture();
    let optimizer = Optimizer::default().with_sink(NullSink);
    optimizer.optimize(&mut scene).unwrap();
    let once = scene.clone();

    let report = optimizer.optimize(&mut scene).unwrap();
    assert_eq!(scene, once);
    assert_eq!(report.dedup.duplicate_points(), 0);
    assert_eq!(report.degenerate.removed(), 0);
    assert_eq!(report.prune.transforms_removed, 0);
    assert_eq!(report.prune.groups_flattened, 0);
}

#[test]
fn test_sink_receives_report() {
    let Fixture { mut scene, .. } = fixture();
    let sink = CollectingSink::default();
    let report = Optimizer::default().with_sink(sink.clone()).optimize(&mut scene).unwrap();

    let received = sink.0.borrow();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0], report);
}

#[test]
fn test_report_and_config_serialize() {
    let Fixture { mut scene, .. } = fixture();
    let report = Optimizer::default().with_sink(NullSink).optimize(&mut scene).unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let parsed: OptimizationReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);

    let config: OptimizerConfig = serde_json::from_str(r#"{"remove_unreferenced": true}"#).unwrap();
    assert!(config.remove_unreferenced);
    assert!(config.dedup_geometry);
}

#[test]
fn test_validator_rejects_malformed_mesh() {
    let mut mesh = sliver_mesh();
    mesh.faces.push(7);
    let root = SceneNode::group(vec![SceneNode::mesh(mesh).with_name("broken")]);

    let err = validate_scene(&root).unwrap_err();
    match err {
        Error::Structural { mesh, fault } => {
            assert!(mesh.starts_with("broken"));
            assert_eq!(fault, StructuralFault::FacesLength(13));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_smoothing_groups_after_optimization() {
    // Two coplanar triangles sharing an edge, with separate vertex normals per corner.
    let mut mesh = Mesh::from_arrays(
        vec![
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
        ],
        vec![0.0, 0.0],
        vec![0, 0, 1, 0, 2, 0, 3, 0, 4, 0, 5, 0],
    );
    let mut scene = Scene::new(SceneNode::group(vec![SceneNode::mesh(mesh.clone())]));
    Optimizer::default().with_sink(NullSink).optimize(&mut scene).unwrap();
    mesh = scene.root.children()[0].mesh_ref().unwrap().clone();
    assert_eq!(mesh.point_count(), 4);

    let up = Vector3::new(0.0f32, 0.0, 1.0);
    SmoothingGroupSolver::default()
        .apply_to_mesh(&mut mesh, &[0, 0, 0, 0, 0, 0], &[up])
        .unwrap();
    assert_eq!(mesh.face_smoothing_groups, Some(vec![1, 1]));
}
