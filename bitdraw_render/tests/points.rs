mod common;

use bitdraw_render::points::{TRANSFORM_STRIDE, group_by_color};
use bitdraw_render::{PointInstancingEngine, PointStyle, UnlitMaterialCache};
use common::{NodeId, RecordingRenderer, init_tracing};
use glamx::Vec3;
use more_asserts::assert_lt;

const STYLE: PointStyle = PointStyle {
    opacity: 1.0,
    size: 3.0,
    updatable: true,
};

fn line_of_points(count: usize) -> Vec<Vec3> {
    (0..count).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect()
}

fn alternating_colors(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| if i % 2 == 0 { "#ff0000" } else { "#00ff00" }.to_string())
        .collect()
}

#[test]
fn groups_keep_first_appearance_order() {
    let points = line_of_points(4);
    let colors: Vec<String> = ["#b", "#a", "#b", "#c"].map(String::from).to_vec();

    let groups = group_by_color(&points, &colors);
    let order: Vec<&str> = groups.iter().map(|g| g.color.as_str()).collect();
    assert_eq!(order, ["#b", "#a", "#c"]);
    assert_eq!(groups[0].points, vec![(0, points[0]), (2, points[2])]);
}

#[test]
fn one_batch_per_color() {
    init_tracing();
    let mut renderer = RecordingRenderer::default();
    let mut materials = UnlitMaterialCache::default();
    let mut engine = PointInstancingEngine::default();

    let points = line_of_points(5);
    let root = engine.create_or_update(
        &mut renderer,
        &mut materials,
        &points,
        &alternating_colors(5),
        STYLE,
        None,
    );

    assert_eq!(engine.batch_count(&root), Some(2));
    assert_eq!(engine.instance_count(&root), Some(5));
    assert_eq!(materials.len(), 2);

    let batches = engine.batches(&root);
    assert_eq!(batches[0].indices, vec![0, 2, 4]);
    assert_eq!(batches[1].indices, vec![1, 3]);
    assert_eq!(batches[0].transforms.len(), 3 * TRANSFORM_STRIDE);

    // translation sits in the last column of the column-major matrix
    let second_slot = &batches[0].transforms[TRANSFORM_STRIDE..2 * TRANSFORM_STRIDE];
    assert_eq!(&second_slot[12..15], &[2.0, 0.0, 0.0]);

    assert_eq!(renderer.children(root).len(), 2);
    let batch = renderer.node(batches[0].mesh);
    assert!(!batch.pickable);
    assert_eq!(batch.instances.as_ref().map(Vec::len), Some(3 * TRANSFORM_STRIDE));
}

#[test]
fn same_count_updates_in_place() {
    let mut renderer = RecordingRenderer::default();
    let mut materials = UnlitMaterialCache::default();
    let mut engine = PointInstancingEngine::default();
    let colors = alternating_colors(4);

    let root = engine.create_or_update(
        &mut renderer,
        &mut materials,
        &line_of_points(4),
        &colors,
        STYLE,
        None,
    );
    let nodes_before = renderer.nodes.len();
    let materials_before = materials.len();

    let moved: Vec<Vec3> = line_of_points(4).iter().map(|p| *p + Vec3::Y).collect();
    let updated = engine.create_or_update(
        &mut renderer,
        &mut materials,
        &moved,
        &colors,
        STYLE,
        Some(&root),
    );

    assert_eq!(updated, root);
    assert_eq!(engine.batch_count(&root), Some(2));
    assert_eq!(materials.len(), materials_before);
    assert_eq!(renderer.nodes.len(), nodes_before);

    let batch = &engine.batches(&root)[1];
    assert_eq!(renderer.node(batch.mesh).instance_updates, 1);
    // slot 0 of the second batch is point 1, now at (1, 1, 0)
    assert_eq!(&batch.transforms[12..15], &[1.0, 1.0, 0.0]);
}

#[test]
fn different_count_rebuilds_batches() {
    let mut renderer = RecordingRenderer::default();
    let mut materials = UnlitMaterialCache::default();
    let mut engine = PointInstancingEngine::default();

    let root = engine.create_or_update(
        &mut renderer,
        &mut materials,
        &line_of_points(4),
        &alternating_colors(4),
        STYLE,
        None,
    );
    let old_batches: Vec<NodeId> = engine.batches(&root).iter().map(|b| b.mesh).collect();

    let colors = vec!["#0000ff".to_string(); 7];
    let rebuilt = engine.create_or_update(
        &mut renderer,
        &mut materials,
        &line_of_points(7),
        &colors,
        STYLE,
        Some(&root),
    );

    assert_eq!(rebuilt, root);
    let total: usize = engine.batches(&root).iter().map(|b| b.len()).sum();
    assert_eq!(total, 7);
    assert!(old_batches.iter().all(|b| renderer.node(*b).disposed));
    assert_eq!(renderer.children(root).len(), 1);
}

#[test]
fn not_updatable_always_rebuilds() {
    let mut renderer = RecordingRenderer::default();
    let mut materials = UnlitMaterialCache::default();
    let mut engine = PointInstancingEngine::default();
    let style = PointStyle {
        updatable: false,
        ..STYLE
    };
    let colors = vec!["#0000ff".to_string(); 3];

    let root = engine.create_or_update(
        &mut renderer,
        &mut materials,
        &line_of_points(3),
        &colors,
        style,
        None,
    );
    let first_batch = engine.batches(&root)[0].mesh;

    engine.create_or_update(
        &mut renderer,
        &mut materials,
        &line_of_points(3),
        &colors,
        style,
        Some(&root),
    );
    assert!(renderer.node(first_batch).disposed);
    assert_ne!(engine.batches(&root)[0].mesh, first_batch);
}

#[test]
fn empty_cloud_has_no_batches() {
    let mut renderer = RecordingRenderer::default();
    let mut materials = UnlitMaterialCache::default();
    let mut engine = PointInstancingEngine::default();

    let root = engine.create_or_update(&mut renderer, &mut materials, &[], &[], STYLE, None);
    assert_eq!(engine.batch_count(&root), Some(0));
    assert!(renderer.children(root).is_empty());
    assert!(materials.is_empty());
}

#[test]
fn large_groups_use_coarser_spheres() {
    let mut renderer = RecordingRenderer::default();
    let mut materials = UnlitMaterialCache::default();
    let mut engine = PointInstancingEngine::new(6, 1, 3);

    let small = engine.create_or_update(
        &mut renderer,
        &mut materials,
        &line_of_points(3),
        &vec!["#ff0000".to_string(); 3],
        STYLE,
        None,
    );
    let large = engine.create_or_update(
        &mut renderer,
        &mut materials,
        &line_of_points(4),
        &vec!["#ff0000".to_string(); 4],
        STYLE,
        None,
    );

    let vertices = |root: NodeId| {
        let batch = engine.batches(&root)[0].mesh;
        renderer.node(batch).vertex_data.as_ref().unwrap().vertex_count()
    };
    assert_lt!(vertices(large), vertices(small));
}

#[test]
fn forgotten_clouds_are_rebuilt() {
    let mut renderer = RecordingRenderer::default();
    let mut materials = UnlitMaterialCache::default();
    let mut engine = PointInstancingEngine::default();
    let colors = vec!["#ff0000".to_string(); 2];

    let root = engine.create_or_update(
        &mut renderer,
        &mut materials,
        &line_of_points(2),
        &colors,
        STYLE,
        None,
    );
    assert!(engine.forget(&root));
    assert_eq!(engine.batch_count(&root), None);
    assert!(!engine.forget(&root));
}
