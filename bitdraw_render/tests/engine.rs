mod common;

use bitdraw_asset::SideOrientation;
use bitdraw_asset::kernel::{
    JscadMesh, JscadMeshPart, ManifoldDecomposition, ManifoldMesh, OcctEdge, OcctFace,
    OcctShapeMesh,
};
use bitdraw_render::{
    BACK_FACE_Z_BIAS, DrawBasicGeometryOptions, DrawConfig, DrawEngine, DrawError,
    DrawManifoldOrCrossSectionOptions, DrawOcctShapeOptions, DrawPointsOptions,
    DrawPolylinesOptions,
};
use common::{RecordingRenderer, init_tracing};
use glamx::Vec3;

type Engine = DrawEngine<RecordingRenderer>;

fn jscad_triangle(color: Option<Vec<f32>>) -> JscadMesh {
    JscadMesh {
        parts: vec![JscadMeshPart::untransformed(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            vec![0, 1, 2],
        )],
        color,
    }
}

fn occt_shape(with_face: bool) -> OcctShapeMesh {
    let face_list = if with_face {
        vec![OcctFace {
            face_index: 0,
            vertex_coord: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normal_coord: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            tri_indexes: vec![0, 1, 2],
            uvs: None,
        }]
    } else {
        Vec::new()
    };

    OcctShapeMesh {
        face_list,
        edge_list: vec![
            OcctEdge {
                edge_index: 0,
                vertex_coord: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            },
            OcctEdge {
                edge_index: 1,
                vertex_coord: vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            },
        ],
        points_list: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    }
}

fn manifold_tetra() -> ManifoldDecomposition {
    ManifoldDecomposition::Manifold(ManifoldMesh {
        num_prop: 3,
        vert_properties: vec![
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0,
        ],
        tri_verts: vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
    })
}

fn unit_square_section() -> ManifoldDecomposition {
    ManifoldDecomposition::CrossSection(vec![vec![
        [0.0, 0.0],
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 1.0],
    ]])
}

#[test]
fn jscad_mesh_gets_a_mirrored_back_face() {
    init_tracing();
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();

    let root = engine
        .draw_jscad_meshes(
            &mut renderer,
            &[jscad_triangle(None)],
            &DrawBasicGeometryOptions::default(),
            None,
        )
        .unwrap()
        .unwrap();

    let surfaces = engine.surfaces(&root);
    assert_eq!(surfaces.len(), 1);
    let (front, back) = surfaces[0];
    let back = back.unwrap();

    assert_eq!(renderer.node(front).parent, Some(root));
    assert_eq!(renderer.node_material(front).spec.color, "#ff0000");
    assert_eq!(renderer.node_material(front).spec.z_offset, 0.0);

    let back_node = renderer.node(back);
    assert_eq!(back_node.parent, Some(root));
    assert!(!back_node.pickable);
    assert_eq!(back_node.side, Some(SideOrientation::Clockwise));
    // jscad back faces keep their winding, only the normals flip
    let back_mesh = back_node.vertex_data.as_ref().unwrap();
    assert_eq!(back_mesh.indices(), &[0, 1, 2]);
    assert_eq!(&back_mesh.normals()[0..3], &[0.0, 0.0, -1.0]);

    let back_material = &renderer.node_material(back).spec;
    assert_eq!(back_material.color, "#0000ff");
    assert_eq!(back_material.z_offset, BACK_FACE_Z_BIAS);
    assert_eq!(engine.materials().created(), 2);
}

#[test]
fn one_sided_draws_skip_the_back_face() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();
    let options = DrawBasicGeometryOptions::builder()
        .draw_two_sided(false)
        .build();

    let root = engine
        .draw_jscad_meshes(&mut renderer, &[jscad_triangle(None)], &options, None)
        .unwrap()
        .unwrap();

    assert_eq!(engine.surfaces(&root)[0].1, None);
    assert_eq!(engine.materials().created(), 1);
    assert_eq!(renderer.children(root).len(), 1);
}

#[test]
fn config_can_disable_back_faces_globally() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::new(DrawConfig::builder().two_sided(false).build());

    let root = engine
        .draw_jscad_meshes(
            &mut renderer,
            &[jscad_triangle(None)],
            &DrawBasicGeometryOptions::default(),
            None,
        )
        .unwrap()
        .unwrap();

    assert_eq!(engine.surfaces(&root)[0].1, None);
}

#[test]
fn baked_colors_win_over_requested_colors() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();
    let options = DrawBasicGeometryOptions::builder()
        .colors(["#ffffff", "#ffffff"])
        .build();

    let root = engine
        .draw_jscad_meshes(
            &mut renderer,
            &[jscad_triangle(Some(vec![0.0, 1.0, 0.0])), jscad_triangle(None)],
            &options,
            None,
        )
        .unwrap()
        .unwrap();

    let surfaces = engine.surfaces(&root);
    assert_eq!(renderer.node_material(surfaces[0].0).spec.color, "#00ff00");
    assert_eq!(renderer.node_material(surfaces[1].0).spec.color, "#ffffff");
}

#[test]
fn empty_entities_keep_their_color_slot() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();
    let empty = JscadMesh {
        parts: Vec::new(),
        color: None,
    };
    let options = DrawBasicGeometryOptions::builder()
        .colors(["#aaaaaa", "#bbbbbb", "#cccccc"])
        .build();

    let root = engine
        .draw_jscad_meshes(
            &mut renderer,
            &[jscad_triangle(None), empty, jscad_triangle(None)],
            &options,
            None,
        )
        .unwrap()
        .unwrap();

    let colors: Vec<String> = engine
        .surfaces(&root)
        .iter()
        .map(|(front, _)| renderer.node_material(*front).spec.color.clone())
        .collect();
    assert_eq!(colors, ["#aaaaaa", "#cccccc"]);
}

#[test]
fn jscad_without_triangles_draws_nothing() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();
    let empty = JscadMesh {
        parts: Vec::new(),
        color: None,
    };

    let drawn = engine
        .draw_jscad_meshes(
            &mut renderer,
            &[empty],
            &DrawBasicGeometryOptions::default(),
            None,
        )
        .unwrap();
    assert_eq!(drawn, None);
    assert!(renderer.nodes.is_empty());
}

#[test]
fn updatable_redraw_reuses_the_nodes() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();
    let options = DrawBasicGeometryOptions::builder().updatable(true).build();
    let meshes = [jscad_triangle(None)];

    let root = engine
        .draw_jscad_meshes(&mut renderer, &meshes, &options, None)
        .unwrap()
        .unwrap();
    let (front, back) = engine.surfaces(&root)[0];

    let redrawn = engine
        .draw_jscad_meshes(&mut renderer, &meshes, &options, Some(&root))
        .unwrap()
        .unwrap();

    assert_eq!(redrawn, root);
    assert_eq!(engine.surfaces(&root), vec![(front, back)]);
    assert_eq!(renderer.node(front).vertex_uploads, 2);
    assert_eq!(renderer.node(back.unwrap()).vertex_uploads, 2);
    assert_eq!(engine.materials().created(), 2);
}

#[test]
fn plain_redraw_replaces_the_nodes() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();
    let options = DrawBasicGeometryOptions::default();
    let meshes = [jscad_triangle(None)];

    let root = engine
        .draw_jscad_meshes(&mut renderer, &meshes, &options, None)
        .unwrap()
        .unwrap();
    let (front, back) = engine.surfaces(&root)[0];

    engine
        .draw_jscad_meshes(&mut renderer, &meshes, &options, Some(&root))
        .unwrap();

    assert!(renderer.node(front).disposed);
    assert!(renderer.node(back.unwrap()).disposed);
    assert_eq!(renderer.children(root).len(), 2);
}

#[test]
fn occt_shape_draws_faces_edges_and_vertices() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();
    let options = DrawOcctShapeOptions::builder().draw_vertices(true).build();

    let root = engine
        .draw_occt_shape(&mut renderer, &occt_shape(true), &options, None)
        .unwrap()
        .unwrap();

    assert_eq!(engine.surfaces(&root).len(), 1);
    let (edges, vertices) = engine.shape_children(&root);
    let (edges, vertices) = (edges.unwrap(), vertices.unwrap());

    assert_eq!(renderer.node(edges).parent, Some(root));
    assert_eq!(renderer.node(vertices).parent, Some(root));
    assert_eq!(engine.lines().batches(&edges)[0].segment_count, 2);
    assert_eq!(engine.lines().batches(&edges)[0].color, "#ffffff");
    assert_eq!(engine.points().instance_count(&vertices), Some(3));
    assert_eq!(engine.points().batches(&vertices)[0].color, "#ffaaff");
}

#[test]
fn occt_shape_without_faces_keeps_its_edges() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();

    let root = engine
        .draw_occt_shape(
            &mut renderer,
            &occt_shape(false),
            &DrawOcctShapeOptions::default(),
            None,
        )
        .unwrap()
        .unwrap();

    assert!(engine.surfaces(&root).is_empty());
    let (edges, vertices) = engine.shape_children(&root);
    assert!(edges.is_some());
    assert_eq!(vertices, None);
}

#[test]
fn empty_occt_shape_draws_nothing() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();

    let drawn = engine
        .draw_occt_shape(
            &mut renderer,
            &OcctShapeMesh::default(),
            &DrawOcctShapeOptions::default(),
            None,
        )
        .unwrap();
    assert_eq!(drawn, None);
}

#[test]
fn occt_shapes_get_a_root_each() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();

    let roots = engine
        .draw_occt_shapes(
            &mut renderer,
            &[occt_shape(true), OcctShapeMesh::default(), occt_shape(false)],
            &DrawOcctShapeOptions::default(),
        )
        .unwrap();

    assert_eq!(roots.len(), 3);
    assert!(roots[0].is_some());
    assert_eq!(roots[1], None);
    assert_ne!(roots[0], roots[2]);
}

#[test]
fn manifold_draws_a_two_sided_surface() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();

    let root = engine
        .draw_manifold_or_cross_section(
            &mut renderer,
            &manifold_tetra(),
            &DrawManifoldOrCrossSectionOptions::default(),
            None,
        )
        .unwrap()
        .unwrap();

    let surfaces = engine.surfaces(&root);
    assert_eq!(surfaces.len(), 1);
    let front = renderer.node(surfaces[0].0).vertex_data.as_ref().unwrap();
    let back = renderer.node(surfaces[0].1.unwrap()).vertex_data.as_ref().unwrap();
    assert_eq!(front.triangle_count(), 4);
    assert_ne!(front.indices(), back.indices());
}

#[test]
fn empty_manifold_draws_nothing() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();
    let empty = ManifoldDecomposition::Manifold(ManifoldMesh {
        num_prop: 3,
        vert_properties: Vec::new(),
        tri_verts: Vec::new(),
    });

    let drawn = engine
        .draw_manifold_or_cross_section(
            &mut renderer,
            &empty,
            &DrawManifoldOrCrossSectionOptions::default(),
            None,
        )
        .unwrap();
    assert_eq!(drawn, None);
}

#[test]
fn cross_section_draws_closed_outlines() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();

    let root = engine
        .draw_manifold_or_cross_section(
            &mut renderer,
            &unit_square_section(),
            &DrawManifoldOrCrossSectionOptions::default(),
            None,
        )
        .unwrap()
        .unwrap();

    assert!(engine.surfaces(&root).is_empty());
    let edges = engine.shape_children(&root).0.unwrap();
    let batch = &engine.lines().batches(&edges)[0];
    assert_eq!(batch.color, "#ff00ff");
    assert_eq!(batch.segment_count, 4);
}

#[test]
fn redrawing_a_cross_section_as_a_manifold_drops_the_outlines() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();
    let options = DrawManifoldOrCrossSectionOptions::default();

    let root = engine
        .draw_manifold_or_cross_section(&mut renderer, &unit_square_section(), &options, None)
        .unwrap()
        .unwrap();
    let edges = engine.shape_children(&root).0.unwrap();

    engine
        .draw_manifold_or_cross_section(&mut renderer, &manifold_tetra(), &options, Some(&root))
        .unwrap();

    assert!(renderer.node(edges).disposed);
    assert_eq!(engine.shape_children(&root), (None, None));
    assert_eq!(engine.surfaces(&root).len(), 1);
}

#[test]
fn points_and_polylines_use_unlit_materials() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();

    let points = engine
        .draw_points(
            &mut renderer,
            &[Vec3::ZERO, Vec3::X],
            &DrawPointsOptions::builder().colors("#00ff00").build(),
            None,
        )
        .unwrap();
    assert_eq!(engine.points().batch_count(&points), Some(1));

    let lines = engine
        .draw_polylines(
            &mut renderer,
            &[vec![Vec3::ZERO, Vec3::X, Vec3::Y]],
            &DrawPolylinesOptions::builder()
                .colors("#00ff00")
                .closed(true)
                .build(),
            None,
        )
        .unwrap()
        .unwrap();
    assert_eq!(engine.lines().batches(&lines)[0].segment_count, 3);

    assert_eq!(engine.unlit_materials().created(), 1);
    assert!(engine.materials().is_empty());
}

#[test]
fn polylines_without_segments_draw_nothing() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();

    let drawn = engine
        .draw_polylines(
            &mut renderer,
            &[vec![Vec3::ONE]],
            &DrawPolylinesOptions::default(),
            None,
        )
        .unwrap();
    assert_eq!(drawn, None);
}

#[test]
fn hidden_draws_are_invisible() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();

    let root = engine
        .draw_jscad_meshes(
            &mut renderer,
            &[jscad_triangle(None)],
            &DrawBasicGeometryOptions::builder().hidden(true).build(),
            None,
        )
        .unwrap()
        .unwrap();
    assert!(!renderer.node(root).visible);

    let points = engine
        .draw_points(
            &mut renderer,
            &[Vec3::ZERO],
            &DrawPointsOptions::builder().hidden(true).build(),
            None,
        )
        .unwrap();
    assert!(!renderer.node(points).visible);
}

#[test]
fn malformed_colors_are_rejected() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();

    let err = engine
        .draw_jscad_meshes(
            &mut renderer,
            &[jscad_triangle(None)],
            &DrawBasicGeometryOptions::builder().colors("red").build(),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, DrawError::Color { .. }));

    let err = engine
        .draw_occt_shape(
            &mut renderer,
            &occt_shape(true),
            &DrawOcctShapeOptions::builder().edge_color("#12").build(),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, DrawError::Color { .. }));
    assert!(renderer.nodes.is_empty());
}

#[test]
fn malformed_payloads_are_rejected() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();
    let mut mesh = jscad_triangle(None);
    mesh.parts[0].indices = vec![0, 1, 7];

    let err = engine
        .draw_jscad_meshes(
            &mut renderer,
            &[mesh],
            &DrawBasicGeometryOptions::default(),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, DrawError::Normalize { .. }));
    assert!(renderer.nodes.is_empty());
}

#[test]
fn dispose_releases_every_material() {
    let mut renderer = RecordingRenderer::default();
    let mut engine = Engine::default();

    engine
        .draw_jscad_meshes(
            &mut renderer,
            &[jscad_triangle(None)],
            &DrawBasicGeometryOptions::default(),
            None,
        )
        .unwrap();
    engine
        .draw_points(
            &mut renderer,
            &[Vec3::ZERO],
            &DrawPointsOptions::default(),
            None,
        )
        .unwrap();
    assert_eq!(renderer.live_materials(), 3);

    engine.dispose(&mut renderer);
    assert_eq!(renderer.live_materials(), 0);
    assert!(engine.materials().is_empty());
    assert!(engine.unlit_materials().is_empty());
}
