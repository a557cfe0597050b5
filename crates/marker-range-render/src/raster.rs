//! Barycentric triangle fill with depth interpolation.

use crate::framebuffer::Framebuffer;

/// A projected vertex in viewport coordinates with NDC depth.
#[derive(Clone, Copy, Debug)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

#[inline]
fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Fill one triangle into the framebuffer, depth-tested per fragment.
///
/// Degenerate (zero-area) triangles are skipped. Winding does not matter;
/// back-face rejection is the caller's business.
pub fn fill_triangle(fb: &mut Framebuffer, v: [ScreenVertex; 3], color: u32) {
    let area = edge(&v[0], &v[1], v[2].x, v[2].y);
    if area.abs() < 1e-6 {
        return;
    }

    let min_x = v.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor();
    let max_x = v.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil();
    let min_y = v.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor();
    let max_y = v.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil();

    let x0 = min_x.max(0.0) as usize;
    let x1 = (max_x.min(fb.width() as f32 - 1.0)).max(0.0) as usize;
    let y0 = min_y.max(0.0) as usize;
    let y1 = (max_y.min(fb.height() as f32 - 1.0)).max(0.0) as usize;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;

            let w0 = edge(&v[1], &v[2], px, py) / area;
            let w1 = edge(&v[2], &v[0], px, py) / area;
            let w2 = edge(&v[0], &v[1], px, py) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let depth = w0 * v[0].depth + w1 * v[1].depth + w2 * v[2].depth;
            fb.put_depth_tested(x, y, depth, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::pack_rgb;

    fn sv(x: f32, y: f32, depth: f32) -> ScreenVertex {
        ScreenVertex { x, y, depth }
    }

    #[test]
    fn fills_interior_pixels_only() {
        let mut fb = Framebuffer::new(16, 16);
        let red = pack_rgb(255, 0, 0);
        fill_triangle(
            &mut fb,
            [sv(1.0, 1.0, 0.5), sv(14.0, 1.0, 0.5), sv(1.0, 14.0, 0.5)],
            red,
        );

        assert_eq!(fb.pixel(3, 3), red);
        assert_eq!(fb.pixel(15, 15), 0);
    }

    #[test]
    fn nearer_triangle_wins_overlap() {
        let mut fb = Framebuffer::new(8, 8);
        let far = pack_rgb(0, 0, 255);
        let near = pack_rgb(0, 255, 0);
        let cover = [sv(0.0, 0.0, 0.0), sv(8.0, 0.0, 0.0), sv(0.0, 8.0, 0.0)];

        let mut deep = cover;
        for p in &mut deep {
            p.depth = 0.9;
        }
        fill_triangle(&mut fb, deep, far);

        let mut shallow = cover;
        for p in &mut shallow {
            p.depth = 0.2;
        }
        fill_triangle(&mut fb, shallow, near);

        assert_eq!(fb.pixel(2, 2), near);

        // Drawing the far one again must not overwrite.
        fill_triangle(&mut fb, deep, far);
        assert_eq!(fb.pixel(2, 2), near);
    }

    #[test]
    fn degenerate_triangles_are_skipped() {
        let mut fb = Framebuffer::new(8, 8);
        fill_triangle(
            &mut fb,
            [sv(1.0, 1.0, 0.0), sv(5.0, 5.0, 0.0), sv(3.0, 3.0, 0.0)],
            pack_rgb(255, 255, 255),
        );
        assert!(fb.color.iter().all(|&c| c == 0));
    }
}
