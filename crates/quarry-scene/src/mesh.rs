//! Source meshes with arbitrary-arity faces

use glam::{Vec2, Vec3, Vec4};

/// Primitive kind of a single face, by index count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Point,
    Line,
    Triangle,
    Polygon,
}

/// One face of a source mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub indices: Vec<u32>,
}

impl Face {
    pub fn new(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    pub fn triangle(a: u32, b: u32, c: u32) -> Self {
        Self {
            indices: vec![a, b, c],
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self.indices.len() {
            0 | 1 => PrimitiveKind::Point,
            2 => PrimitiveKind::Line,
            3 => PrimitiveKind::Triangle,
            _ => PrimitiveKind::Polygon,
        }
    }
}

/// A mesh as delivered by a format reader.
///
/// Attribute arrays are parallel to `positions` when non-empty. `tex_coords`
/// and `colors` hold one array per channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec3>,
    pub tex_coords: Vec<Vec<Vec2>>,
    pub colors: Vec<Vec<Vec4>>,
    /// Number of bones influencing this mesh; bone data itself is not kept
    pub bone_count: usize,
    pub faces: Vec<Face>,
    pub material_index: usize,
}

impl SceneMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_tangents(&self) -> bool {
        !self.tangents.is_empty()
    }

    pub fn has_tex_coords(&self, channel: usize) -> bool {
        self.tex_coords
            .get(channel)
            .is_some_and(|uvs| !uvs.is_empty())
    }

    pub fn uv_channel_count(&self) -> usize {
        self.tex_coords.iter().filter(|uvs| !uvs.is_empty()).count()
    }

    pub fn color_channel_count(&self) -> usize {
        self.colors.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn has_bones(&self) -> bool {
        self.bone_count > 0
    }

    /// Whether any face is of the given kind
    pub fn has_primitive(&self, kind: PrimitiveKind) -> bool {
        self.faces.iter().any(|f| f.kind() == kind)
    }
}
