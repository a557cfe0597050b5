//! Fixed-precision matrix dumps for the interactive diagnostics.
//!
//! All dumps are row-major with four decimals per cell, so printed values
//! re-parse to the original within the printed precision.

use nalgebra::Matrix4;

use crate::camera::CameraModel;

/// Format the 3x4 camera intrinsic matrix, one row per line.
pub fn format_camera_matrix(model: &CameraModel) -> String {
    let mat = model.intrinsic_matrix();
    let mut out = String::new();
    for row in mat {
        for v in row {
            out.push_str(&format!("{v:6.4} "));
        }
        out.push('\n');
    }
    out
}

/// Format a named 4x4 matrix with the dump banner framing.
pub fn format_matrix4(name: &str, m: &Matrix4<f32>) -> String {
    let mut out = format!("==== {name} ====\n");
    for i in 0..4 {
        for j in 0..4 {
            out.push_str(&format!("{:6.4} ", m[(i, j)]));
        }
        out.push('\n');
    }
    out.push_str("====----====\n");
    out
}

/// Parse the numeric cells back out of a dump, skipping banner lines.
/// Intended for round-trip checks of the printed precision.
pub fn parse_dump(text: &str) -> Vec<Vec<f64>> {
    text.lines()
        .filter(|line| !line.starts_with("====") && !line.trim().is_empty())
        .map(|line| {
            line.split_whitespace()
                .filter_map(|tok| tok.parse::<f64>().ok())
                .collect()
        })
        .collect()
}
