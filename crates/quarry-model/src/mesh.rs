use glam::{Vec2, Vec3};
use quarry_core::{Bounds, QuarryError, Result};
use serde::Serialize;

/// Vertex attribute streams and the shader slot each one binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttribute {
    Position = 0,
    Normal = 1,
    TexCoord = 2,
}

impl VertexAttribute {
    pub const ALL: [VertexAttribute; 3] = [
        VertexAttribute::Position,
        VertexAttribute::Normal,
        VertexAttribute::TexCoord,
    ];

    pub fn slot(self) -> u32 {
        self as u32
    }

    /// Floats per vertex
    pub fn components(self) -> usize {
        match self {
            VertexAttribute::Position | VertexAttribute::Normal => 3,
            VertexAttribute::TexCoord => 2,
        }
    }
}

/// One flat, indexed triangle list with its own attributes and one material
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vec3>,
    /// Empty when the source part had none
    pub normals: Vec<Vec3>,
    /// Texture coordinate channel 0; empty when absent
    pub uv_coords: Vec<Vec2>,
    /// Three indices per triangle, original winding
    pub elements: Vec<u32>,
    pub material_index: usize,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.elements.len() / 3
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_uv_coords(&self) -> bool {
        !self.uv_coords.is_empty()
    }

    /// Dimensions of this mesh in local coordinates
    pub fn local_extents(&self) -> Option<Bounds> {
        Bounds::from_points(&self.vertices)
    }

    /// Flat float data for one attribute stream, `None` if the mesh lacks it
    pub fn attribute_data(&self, attribute: VertexAttribute) -> Option<&[f32]> {
        let data: &[f32] = match attribute {
            VertexAttribute::Position => bytemuck::cast_slice(&self.vertices),
            VertexAttribute::Normal => bytemuck::cast_slice(&self.normals),
            VertexAttribute::TexCoord => bytemuck::cast_slice(&self.uv_coords),
        };
        (!data.is_empty()).then_some(data)
    }

    pub fn element_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.elements)
    }

    /// Check attribute lengths and element ranges
    pub fn check_invariants(&self) -> Result<()> {
        let count = self.vertices.len();
        if self.has_normals() && self.normals.len() != count {
            return Err(QuarryError::InvariantViolation(format!(
                "mesh '{}' has {} normals for {} vertices",
                self.name,
                self.normals.len(),
                count
            )));
        }
        if self.has_uv_coords() && self.uv_coords.len() != count {
            return Err(QuarryError::InvariantViolation(format!(
                "mesh '{}' has {} uv coordinates for {} vertices",
                self.name,
                self.uv_coords.len(),
                count
            )));
        }
        if self.elements.len() % 3 != 0 {
            return Err(QuarryError::InvariantViolation(format!(
                "mesh '{}' has {} elements, not a whole number of triangles",
                self.name,
                self.elements.len()
            )));
        }
        if let Some(bad) = self.elements.iter().find(|&&e| e as usize >= count) {
            return Err(QuarryError::InvariantViolation(format!(
                "mesh '{}' references vertex {} of {}",
                self.name, bad, count
            )));
        }
        Ok(())
    }
}
