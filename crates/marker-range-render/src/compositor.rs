//! Two-layer frame compositor.

use nalgebra::{Matrix4, Rotation3, Vector3, Vector4};

use marker_range_core::{sample_bilinear_rgb_u8, FrameView, PoseMatrix, ProjectionMatrix};

use crate::framebuffer::{pack_rgb, Framebuffer};
use crate::mesh::{cube, Triangle};
use crate::raster::{fill_triangle, ScreenVertex};

/// Window-title text for the current measurement.
pub fn title_text(distance: f64) -> String {
    format!("Distance: {distance:8.4}")
}

/// Fixed compositor settings.
#[derive(Clone, Copy, Debug)]
pub struct CompositorParams {
    /// Positional light, specified in the overlay's model space.
    pub light_position: Vector3<f32>,
    pub object_color: [f32; 3],
    /// Liveliness rotation increment per frame, degrees.
    pub spin_step_deg: f32,
    pub ambient: f32,
}

impl Default for CompositorParams {
    fn default() -> Self {
        Self {
            light_position: Vector3::new(0.0, 5.0, 0.0),
            object_color: [1.0, 1.0, 1.0],
            spin_step_deg: 1.0,
            ambient: 0.2,
        }
    }
}

// The background substitutes this orthographic projection for the session
// perspective while the video quad is drawn, exactly for the span of layer 1.
fn ortho_unit() -> Matrix4<f32> {
    let mut m = Matrix4::identity();
    m[(2, 2)] = -2.0;
    m[(2, 3)] = -1.0;
    m
}

/// Composites the video background and the lit, pose-aligned overlay into a
/// framebuffer once per tick.
///
/// Keeps the *active* projection and model-view transforms readable so the
/// diagnostics can dump the live rendering state rather than the stored
/// session matrix.
pub struct Compositor {
    params: CompositorParams,
    fb: Framebuffer,
    mesh: Vec<Triangle>,
    session_projection: ProjectionMatrix,
    active_projection: Matrix4<f32>,
    active_modelview: Matrix4<f32>,
    angle_deg: f32,
}

impl Compositor {
    pub fn new(width: usize, height: usize, projection: ProjectionMatrix) -> Self {
        Self::with_params(width, height, projection, CompositorParams::default())
    }

    pub fn with_params(
        width: usize,
        height: usize,
        projection: ProjectionMatrix,
        params: CompositorParams,
    ) -> Self {
        Self {
            params,
            fb: Framebuffer::new(width, height),
            mesh: cube(0.5),
            session_projection: projection,
            active_projection: projection.0,
            active_modelview: Matrix4::identity(),
            angle_deg: 0.0,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn viewport(&self) -> (usize, usize) {
        (self.fb.width(), self.fb.height())
    }

    /// Live projection transform, as the diagnostics read it back.
    pub fn active_projection(&self) -> Matrix4<f32> {
        self.active_projection
    }

    /// Live model-view transform of the last overlay pass.
    pub fn active_modelview(&self) -> Matrix4<f32> {
        self.active_modelview
    }

    pub fn spin_angle(&self) -> f32 {
        self.angle_deg
    }

    /// Recompute the viewport and re-apply the session projection.
    ///
    /// Intrinsics do not change with window size; only the viewport mapping
    /// does. Idempotent for repeated equal sizes.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.fb.resize(width, height);
        self.active_projection = self.session_projection.0;
    }

    /// Compose one frame: background layer, depth clear, overlay layer.
    pub fn compose(&mut self, frame: &FrameView<'_>, pose: &PoseMatrix) {
        self.active_projection = ortho_unit();
        self.active_modelview = Matrix4::identity();
        self.draw_background(frame);

        self.active_projection = self.session_projection.0;
        // Clear depth between layers so the background never occludes the
        // overlay.
        self.fb.clear_depth();
        self.draw_overlay(pose);

        self.angle_deg = (self.angle_deg + self.params.spin_step_deg) % 360.0;
    }

    /// Blit the video frame across the full viewport with linear filtering.
    fn draw_background(&mut self, frame: &FrameView<'_>) {
        self.fb.clear_color(0);
        let (vw, vh) = (self.fb.width(), self.fb.height());
        let sx = frame.width as f32 / vw as f32;
        let sy = frame.height as f32 / vh as f32;
        // Clamp-to-edge so border pixels do not blend with black.
        let max_x = frame.width as f32 - 1.0;
        let max_y = frame.height as f32 - 1.0;
        for y in 0..vh {
            let fy = ((y as f32 + 0.5) * sy - 0.5).clamp(0.0, max_y);
            for x in 0..vw {
                let fx = ((x as f32 + 0.5) * sx - 0.5).clamp(0.0, max_x);
                let [r, g, b] = sample_bilinear_rgb_u8(frame, fx, fy);
                self.fb.put(x, y, pack_rgb(r, g, b));
            }
        }
    }

    /// Draw the lit reference object transformed by the marker pose.
    fn draw_overlay(&mut self, pose: &PoseMatrix) {
        let spin_x = Rotation3::from_axis_angle(&Vector3::x_axis(), 90.0f32.to_radians());
        let spin_y =
            Rotation3::from_axis_angle(&Vector3::y_axis(), self.angle_deg.to_radians());
        let lift = Matrix4::new_translation(&Vector3::new(0.0, 0.5, 0.0));

        let model = pose.0 * spin_x.to_homogeneous() * spin_y.to_homogeneous() * lift;
        self.active_modelview = model;

        // The light position rides the model transform, like a positional
        // light specified while the model-view is current.
        let lp = self.params.light_position;
        let light = (model * Vector4::new(lp.x, lp.y, lp.z, 1.0)).xyz();

        let (vw, vh) = (self.fb.width(), self.fb.height());
        let proj = self.active_projection;

        for tri in &self.mesh {
            let eye: Vec<Vector4<f32>> = tri
                .vertices
                .iter()
                .map(|v| model * Vector4::new(v.x, v.y, v.z, 1.0))
                .collect();

            let clip: Vec<Vector4<f32>> = eye.iter().map(|&e| proj * e).collect();
            // Crude near-plane handling: drop triangles that reach behind
            // the camera.
            if clip.iter().any(|c| c.w <= 1e-6) {
                continue;
            }

            let screen: Vec<ScreenVertex> = clip
                .iter()
                .map(|&c| {
                    let ndc = c / c.w;
                    ScreenVertex {
                        x: (ndc.x * 0.5 + 0.5) * vw as f32,
                        y: (0.5 - ndc.y * 0.5) * vh as f32,
                        depth: ndc.z,
                    }
                })
                .collect();

            let normal = (model
                * Vector4::new(tri.normal.x, tri.normal.y, tri.normal.z, 0.0))
            .xyz()
            .normalize();
            let centroid = (eye[0].xyz() + eye[1].xyz() + eye[2].xyz()) / 3.0;
            let to_light = (light - centroid).normalize();
            let diffuse = normal.dot(&to_light).max(0.0);
            let shade = self.params.ambient + (1.0 - self.params.ambient) * diffuse;

            let [r, g, b] = self.params.object_color;
            let color = pack_rgb(
                (r * shade * 255.0).clamp(0.0, 255.0) as u8,
                (g * shade * 255.0).clamp(0.0, 255.0) as u8,
                (b * shade * 255.0).clamp(0.0, 255.0) as u8,
            );

            fill_triangle(&mut self.fb, [screen[0], screen[1], screen[2]], color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marker_range_core::{build_camera_model, projection_from_camera, Frame};

    fn projection() -> ProjectionMatrix {
        let model = build_camera_model(
            &[[600.0, 0.0, 320.0], [0.0, 600.0, 240.0], [0.0, 0.0, 1.0]],
            &[0.0; 4],
            640,
            480,
        )
        .expect("valid calibration");
        projection_from_camera(&model)
    }

    fn red_frame() -> Frame {
        let mut frame = Frame::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                frame.put_pixel(x, y, [200, 0, 0]);
            }
        }
        frame
    }

    fn marker_pose(z: f32) -> PoseMatrix {
        PoseMatrix::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    #[test]
    fn title_text_is_fixed_width_four_decimals() {
        assert_eq!(title_text(4.0), "Distance:   4.0000");
        assert_eq!(title_text(0.0), "Distance:   0.0000");
        assert_eq!(title_text(123.45678), "Distance: 123.4568");
    }

    #[test]
    fn background_fills_the_whole_viewport() {
        let mut comp = Compositor::new(64, 48, projection());
        let frame = red_frame();
        // The zero placeholder pose draws no overlay.
        comp.compose(&frame.view(), &PoseMatrix::zeros());

        let fb = comp.framebuffer();
        for &(x, y) in &[(0, 0), (63, 0), (0, 47), (63, 47), (32, 24)] {
            assert_eq!(fb.pixel(x, y), pack_rgb(200, 0, 0), "pixel ({x},{y})");
        }
    }

    #[test]
    fn overlay_draws_over_the_background() {
        let mut comp = Compositor::new(640, 480, projection());
        let frame = red_frame();
        comp.compose(&frame.view(), &marker_pose(-5.0));

        // The cube center projects near the principal point; the shaded
        // object must have replaced the background there.
        let fb = comp.framebuffer();
        assert_ne!(fb.pixel(320, 240), pack_rgb(200, 0, 0));
        // Far corners stay background.
        assert_eq!(fb.pixel(2, 2), pack_rgb(200, 0, 0));
    }

    #[test]
    fn compose_restores_the_perspective_projection() {
        let proj = projection();
        let mut comp = Compositor::new(640, 480, proj);
        let frame = red_frame();
        comp.compose(&frame.view(), &marker_pose(-5.0));

        assert_eq!(comp.active_projection(), proj.0);
    }

    #[test]
    fn modelview_readback_follows_the_pose() {
        let mut comp = Compositor::new(640, 480, projection());
        let frame = red_frame();
        comp.compose(&frame.view(), &marker_pose(-5.0));

        let mv = comp.active_modelview();
        // Translation column: pose z plus the 0.5 lift rotated onto -Z...
        // the lift ends up on the z axis after the 90 degree X spin.
        assert!((mv[(0, 3)] - 0.0).abs() < 1e-5);
        assert!((mv[(1, 3)] - 0.0).abs() < 1e-5);
        assert!((mv[(2, 3)] - -4.5).abs() < 1e-5);
    }

    #[test]
    fn spin_advances_one_degree_per_frame_and_wraps() {
        let mut comp = Compositor::new(32, 32, projection());
        let frame = red_frame();
        assert_eq!(comp.spin_angle(), 0.0);

        comp.compose(&frame.view(), &PoseMatrix::zeros());
        assert_eq!(comp.spin_angle(), 1.0);

        for _ in 0..359 {
            comp.compose(&frame.view(), &PoseMatrix::zeros());
        }
        assert_eq!(comp.spin_angle(), 0.0);
    }

    #[test]
    fn resize_is_idempotent() {
        let proj = projection();
        let mut comp = Compositor::new(640, 480, proj);
        comp.resize(800, 600);
        let first = (comp.viewport(), comp.active_projection());
        comp.resize(800, 600);
        assert_eq!((comp.viewport(), comp.active_projection()), first);
        assert_eq!(comp.viewport(), (800, 600));
        assert_eq!(comp.active_projection(), proj.0);
    }
}
