//! Layout and rotation conversions between source scenes and models
//!
//! Source scenes store matrices row-major (`rows[r][c]`, translation in the
//! last column of the first three rows). Models store `glam::Mat4`, which is
//! column-major (`cols[c][r]`).

use glam::{Mat4, Quat, Vec3, Vec4};
use std::f64::consts::FRAC_PI_2;

/// A 4x4 matrix stored row by row
pub type RowMajorMatrix = [[f32; 4]; 4];

/// Identity in row-major form
pub const ROW_MAJOR_IDENTITY: RowMajorMatrix = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Remap a row-major source matrix into a column-major `Mat4`, cell by cell.
///
/// Target column `c`, row `r` receives source row `r`, column `c`.
pub fn row_major_to_mat4(from: &RowMajorMatrix) -> Mat4 {
    let mut cols = [[0.0f32; 4]; 4];
    for (c, col) in cols.iter_mut().enumerate() {
        for (r, cell) in col.iter_mut().enumerate() {
            *cell = from[r][c];
        }
    }
    Mat4::from_cols(
        Vec4::from_array(cols[0]),
        Vec4::from_array(cols[1]),
        Vec4::from_array(cols[2]),
        Vec4::from_array(cols[3]),
    )
}

/// Inverse of [`row_major_to_mat4`]
pub fn mat4_to_row_major(m: &Mat4) -> RowMajorMatrix {
    let cols = m.to_cols_array_2d();
    let mut rows = [[0.0f32; 4]; 4];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = cols[c][r];
        }
    }
    rows
}

/// Convert a quaternion to Euler angles in radians.
///
/// `x` is roll (about X), `y` is pitch (about Y), `z` is yaw (about Z).
/// Pitch clamps to +/- pi/2 once the computed sine reaches magnitude 1, so
/// gimbal lock never produces NaN.
pub fn quat_to_euler(q: Quat) -> Vec3 {
    let (x, y, z, w) = (q.x as f64, q.y as f64, q.z as f64, q.w as f64);

    let sinr_cosp = 2.0 * (w * x + y * z);
    let cosr_cosp = 1.0 - 2.0 * (x * x + y * y);
    let roll = sinr_cosp.atan2(cosr_cosp);

    let sinp = 2.0 * (w * y - z * x);
    let pitch = if sinp.abs() >= 1.0 {
        FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    let siny_cosp = 2.0 * (w * z + x * y);
    let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
    let yaw = siny_cosp.atan2(cosy_cosp);

    Vec3::new(roll as f32, pitch as f32, yaw as f32)
}

/// Scale the basis and translation of a row-major transform uniformly,
/// equivalent to pre-multiplying by `diag(s, s, s, 1)`.
pub fn scale_row_major(m: &mut RowMajorMatrix, factor: f32) {
    for row in m.iter_mut().take(3) {
        for cell in row.iter_mut() {
            *cell *= factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2 as HALF_PI};

    fn fixture() -> RowMajorMatrix {
        [
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ]
    }

    #[test]
    fn row_major_cells_land_in_columns() {
        let m = row_major_to_mat4(&fixture());
        assert_eq!(m.x_axis, Vec4::new(1.0, 5.0, 9.0, 13.0));
        assert_eq!(m.y_axis, Vec4::new(2.0, 6.0, 10.0, 14.0));
        assert_eq!(m.z_axis, Vec4::new(3.0, 7.0, 11.0, 15.0));
        assert_eq!(m.w_axis, Vec4::new(4.0, 8.0, 12.0, 16.0));
        assert_eq!(
            m.to_cols_array(),
            [1.0, 5.0, 9.0, 13.0, 2.0, 6.0, 10.0, 14.0, 3.0, 7.0, 11.0, 15.0, 4.0, 8.0, 12.0, 16.0]
        );
    }

    #[test]
    fn translation_ends_up_in_w_axis() {
        let mut rows = ROW_MAJOR_IDENTITY;
        rows[0][3] = 3.0;
        rows[1][3] = -2.0;
        rows[2][3] = 7.5;
        let m = row_major_to_mat4(&rows);
        assert_eq!(m.w_axis.truncate(), Vec3::new(3.0, -2.0, 7.5));
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(3.0, -2.0, 7.5));
    }

    #[test]
    fn layout_conversion_inverts() {
        let rows = fixture();
        assert_eq!(mat4_to_row_major(&row_major_to_mat4(&rows)), rows);
    }

    #[test]
    fn identity_quaternion_is_zero_angles() {
        assert_eq!(quat_to_euler(Quat::IDENTITY), Vec3::ZERO);
    }

    #[test]
    fn quarter_turn_about_y_is_half_pi_pitch() {
        let q = Quat::from_xyzw(0.0, FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2);
        let e = quat_to_euler(q);
        assert!(!e.is_nan());
        assert!((e.y - HALF_PI).abs() < 1e-3, "pitch = {}", e.y);
        assert!(e.x.abs() < 1e-3);
        assert!(e.z.abs() < 1e-3);
    }

    #[test]
    fn gimbal_branch_clamps_out_of_range_sine() {
        // Unnormalized input pushes |sinp| past 1; asin alone would be NaN
        let e = quat_to_euler(Quat::from_xyzw(0.0, 0.8, 0.0, 0.8));
        assert_eq!(e.y, HALF_PI);

        let e = quat_to_euler(Quat::from_xyzw(0.0, -0.8, 0.0, 0.8));
        assert_eq!(e.y, -HALF_PI);
    }

    #[test]
    fn roll_and_yaw_follow_their_axes() {
        let roll = quat_to_euler(Quat::from_rotation_x(0.5));
        assert!((roll.x - 0.5).abs() < 1e-5);
        assert!(roll.y.abs() < 1e-5 && roll.z.abs() < 1e-5);

        let yaw = quat_to_euler(Quat::from_rotation_z(-1.2));
        assert!((yaw.z + 1.2).abs() < 1e-5);
        assert!(yaw.x.abs() < 1e-5 && yaw.y.abs() < 1e-5);
    }

    #[test]
    fn scaling_leaves_bottom_row() {
        let mut rows = fixture();
        scale_row_major(&mut rows, 0.5);
        assert_eq!(rows[0], [0.5, 1.0, 1.5, 2.0]);
        assert_eq!(rows[3], [13.0, 14.0, 15.0, 16.0]);
    }
}
