use glam::Vec4;
use serde::Serialize;

/// Colour, shininess and texture-path bundle shared by meshes through its
/// index in `Model::materials`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Material {
    pub name: String,
    pub ambient_colour: Vec4,
    pub diffuse_colour: Vec4,
    pub specular_colour: Vec4,
    pub emissive_colour: Vec4,
    pub specular_factor: f32,
    /// Unresolved path of the first diffuse texture, empty if none
    pub diffuse_texture_filename: String,
    /// Unresolved path of the first specular texture, empty if none
    pub specular_texture_filename: String,
}

impl Material {
    /// Combine shininess and its strength into one specular factor.
    ///
    /// Strength only applies when shininess itself is present.
    pub fn specular_factor_from(shininess: Option<f32>, strength: Option<f32>) -> f32 {
        match (shininess, strength) {
            (Some(s), Some(k)) => s * k,
            (Some(s), None) => s,
            (None, _) => 0.0,
        }
    }

    pub fn has_diffuse_texture(&self) -> bool {
        !self.diffuse_texture_filename.is_empty()
    }

    pub fn has_specular_texture(&self) -> bool {
        !self.specular_texture_filename.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shininess_times_strength() {
        assert_eq!(Material::specular_factor_from(Some(10.0), Some(5.0)), 50.0);
    }

    #[test]
    fn shininess_alone() {
        assert_eq!(Material::specular_factor_from(Some(10.0), None), 10.0);
    }

    #[test]
    fn neither_is_zero() {
        assert_eq!(Material::specular_factor_from(None, None), 0.0);
        assert_eq!(Material::specular_factor_from(None, Some(5.0)), 0.0);
    }

    #[test]
    fn default_colours_are_zero() {
        let m = Material::default();
        assert_eq!(m.diffuse_colour, Vec4::ZERO);
        assert_eq!(m.emissive_colour, Vec4::ZERO);
        assert!(!m.has_diffuse_texture());
        assert!(!m.has_specular_texture());
    }
}
