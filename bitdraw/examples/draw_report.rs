//! Draws a few kernel payloads into a renderer that only logs what it is asked to do.
//!
//! Engine settings come from the command line, try `--no-two-sided` or
//! `--max-materials 2` and compare the logs:
//!
//! ```sh
//! RUST_LOG=info,bitdraw_render=trace cargo run --example draw_report -- --max-materials 2
//! ```

use bitdraw::{
    DisposeError, DrawBasicGeometryOptions, DrawConfig, DrawEngine, DrawManifoldOrCrossSectionOptions,
    DrawPointsOptions, Handedness, JscadMesh, JscadMeshPart, ManifoldDecomposition, ManifoldMesh,
    MaterialSpec, MeshData, SceneRenderer, SideOrientation, ThickLines,
};
use glamx::Vec3;
use std::error::Error;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Default)]
struct LoggingRenderer {
    nodes: usize,
    materials: usize,
}

impl SceneRenderer for LoggingRenderer {
    type Mesh = usize;
    type Material = usize;

    fn handedness(&self) -> Handedness {
        Handedness::Right
    }

    fn create_mesh_node(&mut self, name: &str) -> usize {
        self.nodes += 1;
        info!("node #{} {name:?}", self.nodes);
        self.nodes
    }

    fn apply_vertex_data(&mut self, mesh: &usize, data: &MeshData, _updatable: bool) {
        info!(
            "node #{mesh}: {} vertices, {} triangles",
            data.vertex_count(),
            data.triangle_count()
        );
    }

    fn create_material(&mut self, spec: &MaterialSpec) -> usize {
        self.materials += 1;
        info!("material #{} {spec:?}", self.materials);
        self.materials
    }

    fn is_material_disposed(&self, _material: &usize) -> bool {
        false
    }

    fn assign_material(&mut self, mesh: &usize, material: &usize) {
        info!("node #{mesh}: material #{material}");
    }

    fn set_side_orientation(&mut self, mesh: &usize, orientation: SideOrientation) {
        info!("node #{mesh}: {orientation:?}");
    }

    fn set_visibility(&mut self, _mesh: &usize, _visible: bool) {}

    fn set_pickable(&mut self, _mesh: &usize, _pickable: bool) {}

    fn set_parent(&mut self, child: &usize, parent: Option<&usize>) {
        info!("node #{child}: parent {parent:?}");
    }

    fn dispose_mesh(&mut self, mesh: &usize) -> Result<(), DisposeError> {
        info!("node #{mesh} disposed");
        Ok(())
    }

    fn dispose_material(&mut self, material: &usize) -> Result<(), DisposeError> {
        info!("material #{material} disposed");
        Ok(())
    }

    fn create_thin_instances(&mut self, mesh: &usize, transforms: &[f32]) {
        info!("node #{mesh}: {} instances", transforms.len() / 16);
    }

    fn update_thin_instances(&mut self, mesh: &usize, transforms: &[f32]) {
        info!("node #{mesh}: {} instances moved", transforms.len() / 16);
    }

    fn create_thick_lines(
        &mut self,
        name: &str,
        lines: ThickLines<'_>,
        existing: Option<&usize>,
    ) -> usize {
        let mesh = match existing {
            Some(mesh) => *mesh,
            None => self.create_mesh_node(name),
        };
        info!("node #{mesh}: {} line segments", lines.segments.len() / 2);
        mesh
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env()))
        .init();

    let config = DrawConfig::from_args();
    info!("{config:?}");

    let mut renderer = LoggingRenderer::default();
    let mut engine = DrawEngine::new(config);

    let quad = JscadMesh {
        parts: vec![JscadMeshPart::untransformed(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            Vec::new(),
            vec![0, 1, 2, 0, 2, 3],
        )],
        color: Some(vec![0.2, 0.6, 1.0]),
    };
    engine.draw_jscad_meshes(
        &mut renderer,
        &[quad],
        &DrawBasicGeometryOptions::default(),
        None,
    )?;

    let tetra = ManifoldDecomposition::Manifold(ManifoldMesh {
        num_prop: 3,
        vert_properties: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        tri_verts: vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
    });
    engine.draw_manifold_or_cross_section(
        &mut renderer,
        &tetra,
        &DrawManifoldOrCrossSectionOptions::default(),
        None,
    )?;

    let points: Vec<Vec3> = (0..8).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
    let options = DrawPointsOptions::builder()
        .colors(["#ff0000", "#00ff00", "#0000ff"])
        .updatable(true)
        .build();
    let cloud = engine.draw_points(&mut renderer, &points, &options, None)?;

    let lifted: Vec<Vec3> = points.iter().map(|p| *p + Vec3::Y).collect();
    engine.draw_points(&mut renderer, &lifted, &options, Some(&cloud))?;

    engine.dispose(&mut renderer);
    Ok(())
}
