//! Marker overlay annotation, drawn into the video frame before it becomes
//! the background layer. A debug aid: corner rings plus the decoded id at
//! the marker center.

use marker_range_core::{Frame, FrameObservationSet};

const CORNER_COLOR: [u8; 3] = [255, 0, 255];
const ID_COLOR: [u8; 3] = [0, 255, 0];
const CORNER_RADIUS: i32 = 6;

/// 3x5 digit glyphs, one row per entry, low three bits used.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];
const GLYPH_SCALE: i32 = 2;

/// Draw all observations of the current frame into the frame buffer.
pub fn draw_markers(frame: &mut Frame, set: &FrameObservationSet) {
    for obs in set.iter() {
        for corner in &obs.corners {
            draw_ring(frame, corner.x, corner.y, CORNER_RADIUS, CORNER_COLOR);
        }
        draw_number(
            frame,
            obs.center.x as i32,
            obs.center.y as i32,
            obs.id,
            ID_COLOR,
        );
    }
}

fn draw_ring(frame: &mut Frame, cx: f32, cy: f32, radius: i32, color: [u8; 3]) {
    let cxi = cx.round() as i32;
    let cyi = cy.round() as i32;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d = ((dx * dx + dy * dy) as f32).sqrt();
            if (d - radius as f32).abs() < 0.75 {
                let (x, y) = (cxi + dx, cyi + dy);
                if x >= 0 && y >= 0 {
                    frame.put_pixel(x as usize, y as usize, color);
                }
            }
        }
    }
}

fn draw_number(frame: &mut Frame, x: i32, y: i32, value: u32, color: [u8; 3]) {
    let digits: Vec<usize> = value
        .to_string()
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect();
    let advance = 4 * GLYPH_SCALE;
    for (slot, digit) in digits.iter().enumerate() {
        draw_glyph(frame, x + slot as i32 * advance, y, &DIGITS[*digit], color);
    }
}

fn draw_glyph(frame: &mut Frame, x: i32, y: i32, glyph: &[u8; 5], color: [u8; 3]) {
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..3 {
            if bits & (0b100 >> col) == 0 {
                continue;
            }
            for sy in 0..GLYPH_SCALE {
                for sx in 0..GLYPH_SCALE {
                    let px = x + col * GLYPH_SCALE + sx;
                    let py = y + row as i32 * GLYPH_SCALE + sy;
                    if px >= 0 && py >= 0 {
                        frame.put_pixel(px as usize, py as usize, color);
                    }
                }
            }
        }
    }
}
