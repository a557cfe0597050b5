//! Overlay geometry.

use nalgebra::Vector3;

/// One triangle with a face normal.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub vertices: [Vector3<f32>; 3],
    pub normal: Vector3<f32>,
}

/// A solid cube centered at the origin.
///
/// The overlay object is a placeholder solid; any recognizable shape works,
/// the cube just keeps the rasterizer honest with six distinct face normals.
pub fn cube(half_extent: f32) -> Vec<Triangle> {
    let h = half_extent;
    let corners = [
        Vector3::new(-h, -h, -h),
        Vector3::new(h, -h, -h),
        Vector3::new(h, h, -h),
        Vector3::new(-h, h, -h),
        Vector3::new(-h, -h, h),
        Vector3::new(h, -h, h),
        Vector3::new(h, h, h),
        Vector3::new(-h, h, h),
    ];
    // Each face as two triangles, counter-clockwise seen from outside.
    let faces: [([usize; 4], Vector3<f32>); 6] = [
        ([4, 5, 6, 7], Vector3::new(0.0, 0.0, 1.0)),
        ([1, 0, 3, 2], Vector3::new(0.0, 0.0, -1.0)),
        ([5, 1, 2, 6], Vector3::new(1.0, 0.0, 0.0)),
        ([0, 4, 7, 3], Vector3::new(-1.0, 0.0, 0.0)),
        ([7, 6, 2, 3], Vector3::new(0.0, 1.0, 0.0)),
        ([0, 1, 5, 4], Vector3::new(0.0, -1.0, 0.0)),
    ];

    let mut triangles = Vec::with_capacity(12);
    for (idx, normal) in faces {
        let [a, b, c, d] = idx.map(|i| corners[i]);
        triangles.push(Triangle {
            vertices: [a, b, c],
            normal,
        });
        triangles.push(Triangle {
            vertices: [a, c, d],
            normal,
        });
    }
    triangles
}
