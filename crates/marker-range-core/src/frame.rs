//! RGB video frames.
//!
//! A [`Frame`] is a fixed-size row-major RGB8 pixel buffer produced by the
//! capture source and overwritten every tick; [`FrameView`] is the borrowed
//! form consumed by trackers and the compositor.

#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major RGB8, len = w*h*3
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

/// Errors raised when adopting a raw pixel buffer as a [`Frame`].
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("invalid RGB buffer length (expected {expected} bytes, got {got})")]
    InvalidBufferLength { expected: usize, got: usize },

    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
}

impl Frame {
    /// A black frame of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 3],
        }
    }

    /// Adopt a raw RGB8 buffer, validating its length.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, FrameError> {
        let Some(expected) = width.checked_mul(height).and_then(|n| n.checked_mul(3)) else {
            return Err(FrameError::InvalidDimensions { width, height });
        };
        if expected == 0 {
            return Err(FrameError::InvalidDimensions { width, height });
        }
        if data.len() != expected {
            return Err(FrameError::InvalidBufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * 3;
        self.data[i] = rgb[0];
        self.data[i + 1] = rgb[1];
        self.data[i + 2] = rgb[2];
    }
}

#[inline]
fn get_rgb(src: &FrameView<'_>, x: i32, y: i32) -> [u8; 3] {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return [0, 0, 0];
    }
    let i = (y as usize * src.width + x as usize) * 3;
    [src.data[i], src.data[i + 1], src.data[i + 2]]
}

/// Bilinear ("linear filtering") RGB sample at a fractional pixel position.
#[inline]
pub fn sample_bilinear_rgb(src: &FrameView<'_>, x: f32, y: f32) -> [f32; 3] {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_rgb(src, x0, y0);
    let p10 = get_rgb(src, x0 + 1, y0);
    let p01 = get_rgb(src, x0, y0 + 1);
    let p11 = get_rgb(src, x0 + 1, y0 + 1);

    let mut out = [0.0f32; 3];
    for c in 0..3 {
        let a = p00[c] as f32 + fx * (p10[c] as f32 - p00[c] as f32);
        let b = p01[c] as f32 + fx * (p11[c] as f32 - p01[c] as f32);
        out[c] = a + fy * (b - a);
    }
    out
}

#[inline]
pub fn sample_bilinear_rgb_u8(src: &FrameView<'_>, x: f32, y: f32) -> [u8; 3] {
    let s = sample_bilinear_rgb(src, x, y);
    [
        s[0].clamp(0.0, 255.0) as u8,
        s[1].clamp(0.0, 255.0) as u8,
        s[2].clamp(0.0, 255.0) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_validates_length() {
        let err = Frame::from_raw(4, 4, vec![0; 10]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidBufferLength {
                expected: 48,
                got: 10
            }
        ));

        let frame = Frame::from_raw(2, 2, vec![7; 12]).expect("valid buffer");
        assert_eq!(frame.pixel(1, 1), [7, 7, 7]);
    }

    #[test]
    fn from_raw_rejects_empty_dimensions() {
        assert!(matches!(
            Frame::from_raw(0, 4, Vec::new()),
            Err(FrameError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn bilinear_interpolates_between_pixels() {
        let mut frame = Frame::new(2, 1);
        frame.put_pixel(0, 0, [0, 0, 0]);
        frame.put_pixel(1, 0, [100, 200, 40]);

        let mid = sample_bilinear_rgb(&frame.view(), 0.5, 0.0);
        assert_eq!(mid, [50.0, 100.0, 20.0]);
    }

    #[test]
    fn bilinear_is_black_outside_the_frame() {
        let frame = Frame::new(2, 2);
        assert_eq!(sample_bilinear_rgb_u8(&frame.view(), -5.0, -5.0), [0, 0, 0]);
    }
}
