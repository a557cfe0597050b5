//! Key-triggered diagnostic dumps.
//!
//! Pure reads of current state, formatted at fixed precision. The
//! projection and model-view dumps read the compositor's *active* transform
//! state rather than the stored session matrix, so transform-stack bugs
//! show up here.

use log::info;

use marker_range_core::{format_camera_matrix, format_matrix4, CameraModel};
use marker_range_render::Compositor;

pub fn dump_camera(model: &CameraModel) {
    info!("camera intrinsic matrix:\n{}", format_camera_matrix(model));
}

pub fn dump_projection(compositor: &Compositor) {
    info!(
        "{}",
        format_matrix4("projection", &compositor.active_projection())
    );
}

pub fn dump_modelview(compositor: &Compositor) {
    info!(
        "{}",
        format_matrix4("modelview", &compositor.active_modelview())
    );
}
