//! Property-bag materials
//!
//! Readers record only what the file actually states; a missing property is
//! absent from the bag rather than defaulted.

use glam::Vec4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKey {
    Name,
    ColorAmbient,
    ColorDiffuse,
    ColorSpecular,
    ColorEmissive,
    Shininess,
    ShininessStrength,
    Opacity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Color(Vec4),
    Float(f32),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialProperty {
    pub key: MaterialKey,
    pub value: PropertyValue,
}

/// Semantic slot a texture is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Ambient,
    Emissive,
    Height,
    Normals,
    Shininess,
    Opacity,
    Displacement,
    Lightmap,
    Reflection,
    BaseColor,
    MetallicRoughness,
    Unknown,
}

/// How a texture is projected onto geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureMapping {
    Uv,
    Sphere,
    Cylinder,
    Plane,
    Box,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureSlot {
    pub kind: TextureKind,
    /// Position among slots of the same kind
    pub index: u32,
    /// Path as written in the file, unresolved
    pub path: String,
    pub mapping: TextureMapping,
    pub uv_channel: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMaterial {
    pub properties: Vec<MaterialProperty>,
    pub textures: Vec<TextureSlot>,
}

impl SceneMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing an earlier value for the same key
    pub fn set(&mut self, key: MaterialKey, value: PropertyValue) {
        match self.properties.iter_mut().find(|p| p.key == key) {
            Some(existing) => existing.value = value,
            None => self.properties.push(MaterialProperty { key, value }),
        }
    }

    pub fn get(&self, key: MaterialKey) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| &p.value)
    }

    pub fn color(&self, key: MaterialKey) -> Option<Vec4> {
        match self.get(key)? {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn float(&self, key: MaterialKey) -> Option<f32> {
        match self.get(key)? {
            PropertyValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self.get(MaterialKey::Name)? {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Append a UV-mapped texture to the next free slot of its kind
    pub fn add_texture(&mut self, kind: TextureKind, path: impl Into<String>) -> &mut TextureSlot {
        let index = self.texture_count(kind) as u32;
        self.textures.push(TextureSlot {
            kind,
            index,
            path: path.into(),
            mapping: TextureMapping::Uv,
            uv_channel: 0,
        });
        let last = self.textures.len() - 1;
        &mut self.textures[last]
    }

    pub fn texture(&self, kind: TextureKind, index: u32) -> Option<&TextureSlot> {
        self.textures
            .iter()
            .find(|t| t.kind == kind && t.index == index)
    }

    pub fn texture_count(&self, kind: TextureKind) -> usize {
        self.textures.iter().filter(|t| t.kind == kind).count()
    }
}
