//! Pose and projection matrices.
//!
//! Both matrices follow the rendering convention the tracking engines emit:
//! column-major storage, camera looking down -Z, y up in clip space.

use nalgebra::{Matrix4, Vector3};

use crate::camera::CameraModel;

/// A 4x4 model-view matrix in column-major convention.
///
/// The translation components live in column 3, rows 0..3
/// (`m[(0,3)], m[(1,3)], m[(2,3)]`), equivalently the fourth row of the
/// row-major transpose. Valid only after a marker was observed and selected
/// in the current or a prior frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseMatrix(pub Matrix4<f32>);

impl PoseMatrix {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    /// The all-zero placeholder pose a session starts with before any
    /// marker was selected. Its translation is zero (distance 0) and the
    /// compositor draws nothing with it.
    pub fn zeros() -> Self {
        Self(Matrix4::zeros())
    }

    /// Build from row-major nested arrays (the replay/session format).
    pub fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        let mut m = Matrix4::zeros();
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                m[(i, j)] = *v;
            }
        }
        Self(m)
    }

    pub fn to_rows(&self) -> [[f32; 4]; 4] {
        let mut rows = [[0.0f32; 4]; 4];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = self.0[(i, j)];
            }
        }
        rows
    }

    /// The translation part of the transform.
    #[inline]
    pub fn translation(&self) -> Vector3<f32> {
        Vector3::new(self.0[(0, 3)], self.0[(1, 3)], self.0[(2, 3)])
    }
}

/// A 4x4 perspective projection matrix, constant for the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionMatrix(pub Matrix4<f32>);

impl ProjectionMatrix {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }
}

/// Derive the session projection matrix from camera intrinsics and clip
/// planes.
///
/// This is the standard pinhole-to-clip-space mapping: a camera-space point
/// (X, Y, Z) with Z < 0 projects to pixel (fx*X/(-Z) + cx, cy + fy*(-Y)/(-Z))
/// once the viewport maps NDC x right and y down. Depth maps [-near, -far]
/// onto [-1, 1].
pub fn projection_from_camera(model: &CameraModel) -> ProjectionMatrix {
    let w = model.intrinsics.width as f32;
    let h = model.intrinsics.height as f32;
    let fx = model.intrinsics.fx as f32;
    let fy = model.intrinsics.fy as f32;
    let cx = model.intrinsics.cx as f32;
    let cy = model.intrinsics.cy as f32;
    let n = model.near;
    let f = model.far;

    let mut m = Matrix4::zeros();
    m[(0, 0)] = 2.0 * fx / w;
    m[(0, 2)] = 1.0 - 2.0 * cx / w;
    m[(1, 1)] = 2.0 * fy / h;
    m[(1, 2)] = 2.0 * cy / h - 1.0;
    m[(2, 2)] = -(f + n) / (f - n);
    m[(2, 3)] = -2.0 * f * n / (f - n);
    m[(3, 2)] = -1.0;

    ProjectionMatrix(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::build_camera_model;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    fn model() -> CameraModel {
        build_camera_model(
            &[[600.0, 0.0, 320.0], [0.0, 600.0, 240.0], [0.0, 0.0, 1.0]],
            &[0.0; 4],
            640,
            480,
        )
        .expect("valid calibration")
    }

    fn project_to_pixel(proj: &ProjectionMatrix, p: Vector4<f32>) -> (f32, f32, f32) {
        let clip = proj.0 * p;
        let ndc = clip / clip.w;
        // Viewport mapping: x right, y down, 640x480.
        (
            (ndc.x * 0.5 + 0.5) * 640.0,
            (0.5 - ndc.y * 0.5) * 480.0,
            ndc.z,
        )
    }

    #[test]
    fn optical_axis_projects_to_principal_point() {
        let proj = projection_from_camera(&model());
        let (px, py, _) = project_to_pixel(&proj, Vector4::new(0.0, 0.0, -5.0, 1.0));
        assert_relative_eq!(px, 320.0, epsilon = 1e-4);
        assert_relative_eq!(py, 240.0, epsilon = 1e-4);
    }

    #[test]
    fn offset_point_projects_through_the_pinhole() {
        let proj = projection_from_camera(&model());
        // X right by 1 at depth 2: u = fx * X / Zc + cx = 600 * 0.5 + 320.
        let (px, py, _) = project_to_pixel(&proj, Vector4::new(1.0, 0.0, -2.0, 1.0));
        assert_relative_eq!(px, 620.0, epsilon = 1e-3);
        assert_relative_eq!(py, 240.0, epsilon = 1e-3);
        // Y up by 1 at depth 2 moves the pixel up: v = cy - fy * Y / Zc.
        let (_, py, _) = project_to_pixel(&proj, Vector4::new(0.0, 1.0, -2.0, 1.0));
        assert_relative_eq!(py, -60.0, epsilon = 1e-3);
    }

    #[test]
    fn clip_planes_map_to_unit_depth_range() {
        let m = model().with_clip_planes(1.0, 1000.0);
        let proj = projection_from_camera(&m);
        let (_, _, z_near) = project_to_pixel(&proj, Vector4::new(0.0, 0.0, -1.0, 1.0));
        let (_, _, z_far) = project_to_pixel(&proj, Vector4::new(0.0, 0.0, -1000.0, 1.0));
        assert_relative_eq!(z_near, -1.0, epsilon = 1e-4);
        assert_relative_eq!(z_far, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn pose_translation_reads_the_last_column() {
        let pose = PoseMatrix::from_rows([
            [1.0, 0.0, 0.0, 0.25],
            [0.0, 1.0, 0.0, -0.5],
            [0.0, 0.0, 1.0, 2.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert_eq!(pose.translation(), Vector3::new(0.25, -0.5, 2.0));
    }

    #[test]
    fn pose_rows_round_trip() {
        let rows = [
            [0.0, -1.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 2.0],
            [0.0, 0.0, 1.0, 3.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        assert_eq!(PoseMatrix::from_rows(rows).to_rows(), rows);
    }
}
