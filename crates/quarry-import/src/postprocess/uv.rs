use glam::{Vec2, Vec3};
use log::{debug, warn};
use quarry_core::Bounds;
use quarry_scene::{Scene, TextureMapping};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Spherical projection around the mesh centre, seam along -X
fn sphere(p: Vec3, bounds: &Bounds) -> Vec2 {
    let d = (p - bounds.center()).normalize_or_zero();
    Vec2::new(
        (d.z.atan2(d.x) + PI) / TAU,
        (d.y.clamp(-1.0, 1.0).asin() + FRAC_PI_2) / PI,
    )
}

/// Cylindrical projection around the Y axis through the mesh centre
fn cylinder(p: Vec3, bounds: &Bounds) -> Vec2 {
    let d = p - bounds.center();
    let height = bounds.size().y;
    let v = if height > 0.0 {
        (p.y - bounds.min.y) / height
    } else {
        0.0
    };
    Vec2::new((d.z.atan2(d.x) + PI) / TAU, v)
}

/// Planar projection onto XZ, stretched over the mesh extents
fn plane(p: Vec3, bounds: &Bounds) -> Vec2 {
    let size = bounds.size();
    let u = if size.x > 0.0 { (p.x - bounds.min.x) / size.x } else { 0.0 };
    let v = if size.z > 0.0 { (p.z - bounds.min.z) / size.z } else { 0.0 };
    Vec2::new(u, v)
}

/// Replace projected texture mappings with generated UV channels.
///
/// Each mesh using the material gets one new channel per projected slot and
/// the slot is switched to UV mapping on that channel. Box mapping is left
/// as is.
pub fn gen_uv_coords(scene: &mut Scene) {
    for (material_index, material) in scene.materials.iter_mut().enumerate() {
        for slot in &mut material.textures {
            let project: fn(Vec3, &Bounds) -> Vec2 = match slot.mapping {
                TextureMapping::Uv => continue,
                TextureMapping::Sphere => sphere,
                TextureMapping::Cylinder => cylinder,
                TextureMapping::Plane => plane,
                TextureMapping::Box => {
                    warn!("box texture mapping for '{}' is not supported", slot.path);
                    continue;
                }
            };

            let mut channel = None;
            for mesh in scene
                .meshes
                .iter_mut()
                .filter(|m| m.material_index == material_index)
            {
                let Some(bounds) = Bounds::from_points(&mesh.positions) else {
                    continue;
                };
                let uvs = mesh.positions.iter().map(|&p| project(p, &bounds)).collect();
                mesh.tex_coords.push(uvs);
                // the slot can only name one channel; meshes sharing a material
                // are assumed to carry the same channel layout
                channel.get_or_insert(mesh.tex_coords.len() as u32 - 1);
            }

            debug!("generated {:?} uv coordinates for '{}'", slot.mapping, slot.path);
            slot.mapping = TextureMapping::Uv;
            slot.uv_channel = channel.unwrap_or(0);
        }
    }
}
