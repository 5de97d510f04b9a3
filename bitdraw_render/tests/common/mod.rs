#![allow(dead_code)]

use bitdraw_asset::{MeshData, SideOrientation};
use bitdraw_render::{DisposeError, MaterialSpec, SceneRenderer, ThickLines};
use bitdraw_utils::Handedness;
use glamx::Vec3;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub vertex_data: Option<MeshData>,
    pub vertex_uploads: usize,
    pub material: Option<MaterialId>,
    pub side: Option<SideOrientation>,
    pub visible: bool,
    pub pickable: bool,
    pub parent: Option<NodeId>,
    pub disposed: bool,
    pub instances: Option<Vec<f32>>,
    pub instance_updates: usize,
    pub lines: Option<Vec<Vec3>>,
    pub line_width: f32,
}

impl Node {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vertex_data: None,
            vertex_uploads: 0,
            material: None,
            side: None,
            visible: true,
            pickable: true,
            parent: None,
            disposed: false,
            instances: None,
            instance_updates: 0,
            lines: None,
            line_width: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub spec: MaterialSpec,
    pub disposed: bool,
}

/// In-memory renderer recording every call the draw engine makes.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub handedness: Handedness,
    pub nodes: Vec<Node>,
    pub materials: Vec<Material>,
    /// Makes every dispose call fail
    pub refuse_dispose: bool,
    /// Makes thick line rewrites hand back a fresh node instead of the one passed in
    pub replace_line_meshes: bool,
}

impl RecordingRenderer {
    pub fn new(handedness: Handedness) -> Self {
        Self {
            handedness,
            ..Self::default()
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent == Some(parent) && !node.disposed)
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    pub fn live_nodes(&self) -> usize {
        self.nodes.iter().filter(|node| !node.disposed).count()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.iter().filter(|m| !m.disposed).count()
    }

    /// Disposes a material without going through a cache.
    pub fn dispose_externally(&mut self, id: MaterialId) {
        self.materials[id.0].disposed = true;
    }

    pub fn node_material(&self, id: NodeId) -> &Material {
        self.material(self.node(id).material.expect("node has no material"))
    }
}

impl SceneRenderer for RecordingRenderer {
    type Mesh = NodeId;
    type Material = MaterialId;

    fn handedness(&self) -> Handedness {
        self.handedness
    }

    fn create_mesh_node(&mut self, name: &str) -> NodeId {
        self.nodes.push(Node::new(name));
        NodeId(self.nodes.len() - 1)
    }

    fn apply_vertex_data(&mut self, mesh: &NodeId, data: &MeshData, _updatable: bool) {
        let node = &mut self.nodes[mesh.0];
        node.vertex_data = Some(data.clone());
        node.vertex_uploads += 1;
    }

    fn create_material(&mut self, spec: &MaterialSpec) -> MaterialId {
        self.materials.push(Material {
            spec: spec.clone(),
            disposed: false,
        });
        MaterialId(self.materials.len() - 1)
    }

    fn is_material_disposed(&self, material: &MaterialId) -> bool {
        self.materials[material.0].disposed
    }

    fn assign_material(&mut self, mesh: &NodeId, material: &MaterialId) {
        self.nodes[mesh.0].material = Some(*material);
    }

    fn set_side_orientation(&mut self, mesh: &NodeId, orientation: SideOrientation) {
        self.nodes[mesh.0].side = Some(orientation);
    }

    fn set_visibility(&mut self, mesh: &NodeId, visible: bool) {
        self.nodes[mesh.0].visible = visible;
    }

    fn set_pickable(&mut self, mesh: &NodeId, pickable: bool) {
        self.nodes[mesh.0].pickable = pickable;
    }

    fn set_parent(&mut self, child: &NodeId, parent: Option<&NodeId>) {
        self.nodes[child.0].parent = parent.copied();
    }

    fn dispose_mesh(&mut self, mesh: &NodeId) -> Result<(), DisposeError> {
        let node = &mut self.nodes[mesh.0];
        if node.disposed {
            return Err(DisposeError::AlreadyDisposed);
        }
        node.disposed = true;
        Ok(())
    }

    fn dispose_material(&mut self, material: &MaterialId) -> Result<(), DisposeError> {
        if self.refuse_dispose {
            return Err(DisposeError::Refused {
                message: "renderer is shutting down".to_string(),
            });
        }
        let material = &mut self.materials[material.0];
        if material.disposed {
            return Err(DisposeError::AlreadyDisposed);
        }
        material.disposed = true;
        Ok(())
    }

    fn create_thin_instances(&mut self, mesh: &NodeId, transforms: &[f32]) {
        self.nodes[mesh.0].instances = Some(transforms.to_vec());
    }

    fn update_thin_instances(&mut self, mesh: &NodeId, transforms: &[f32]) {
        let node = &mut self.nodes[mesh.0];
        node.instances = Some(transforms.to_vec());
        node.instance_updates += 1;
    }

    fn create_thick_lines(
        &mut self,
        name: &str,
        lines: ThickLines<'_>,
        existing: Option<&NodeId>,
    ) -> NodeId {
        let id = match existing {
            Some(old) if self.replace_line_meshes => {
                let mut node = self.nodes[old.0].clone();
                self.nodes[old.0].disposed = true;
                node.name = name.to_string();
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
            Some(id) => *id,
            None => self.create_mesh_node(name),
        };
        let node = &mut self.nodes[id.0];
        node.lines = Some(lines.segments.to_vec());
        node.line_width = lines.width;
        id
    }
}

pub fn triangle() -> MeshData {
    MeshData::builder()
        .positions(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
        .normals(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0])
        .indices(vec![0, 1, 2])
        .build()
        .unwrap()
}
