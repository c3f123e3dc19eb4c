//! Format readers and format detection

use glam::Vec4;
use quarry_core::Result;
use quarry_scene::{MaterialKey, PropertyValue, Scene, SceneMaterial};
use std::path::Path;

/// Name of the material readers append for geometry that references none
pub const DEFAULT_MATERIAL: &str = "DefaultMaterial";

/// A file format that can be read into a generic [`Scene`]
pub trait SceneReader {
    /// Human-readable format name used in diagnostics
    fn name(&self) -> &'static str;

    /// Lowercase file extensions this reader claims, without the dot
    fn extensions(&self) -> &'static [&'static str];

    /// Whether the leading bytes of a file look like this format
    fn can_read(&self, head: &[u8]) -> bool;

    /// Read a whole file. `path` is used to resolve external resources
    /// (buffers, material libraries) relative to the file.
    fn read(&self, path: &Path, bytes: &[u8]) -> Result<Scene>;
}

/// Lowercased extension of `path`, empty if none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Light grey material used where a file assigns none
pub(crate) fn default_material() -> SceneMaterial {
    let mut mat = SceneMaterial::new();
    mat.set(MaterialKey::Name, PropertyValue::Text(DEFAULT_MATERIAL.to_string()));
    mat.set(
        MaterialKey::ColorDiffuse,
        PropertyValue::Color(Vec4::new(0.6, 0.6, 0.6, 1.0)),
    );
    mat
}

/// Extensions only the Assimp-backed reader understands
pub(crate) const ASSIMP_EXTENSIONS: &[&str] = &[
    "fbx", "dae", "3ds", "blend", "ply", "stl", "x", "lwo", "ase", "ms3d", "md5mesh", "ac", "off",
];

/// Binary (`Kaydara FBX Binary`) or ASCII (`; FBX` comment) FBX header
pub(crate) fn looks_like_fbx(head: &[u8]) -> bool {
    if head.starts_with(b"Kaydara FBX Binary") {
        return true;
    }
    let head = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);
    let start = head.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(head.len());
    head[start..].starts_with(b"; FBX")
}

/// First non-whitespace byte, skipping a UTF-8 byte order mark
pub(crate) fn first_significant_byte(head: &[u8]) -> Option<u8> {
    let head = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);
    head.iter().copied().find(|b| !b.is_ascii_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of(Path::new("models/Crate.GLB")), "glb");
        assert_eq!(extension_of(Path::new("models/readme")), "");
    }

    #[test]
    fn significant_byte_skips_bom_and_space() {
        assert_eq!(first_significant_byte(b"\xEF\xBB\xBF  \n{"), Some(b'{'));
        assert_eq!(first_significant_byte(b"   "), None);
    }

    #[test]
    fn fbx_headers_are_recognised() {
        assert!(looks_like_fbx(b"Kaydara FBX Binary  \x00\x1a\x00"));
        assert!(looks_like_fbx(b"\n; FBX 7.4.0 project file\n"));
        assert!(!looks_like_fbx(b"v 0 0 0\n"));
        assert!(!looks_like_fbx(b"glTF\x02\x00\x00\x00"));
        assert!(ASSIMP_EXTENSIONS.contains(&"fbx"));
    }
}
