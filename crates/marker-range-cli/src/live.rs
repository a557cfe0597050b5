//! Live frontend: default system camera capture and window presentation.

use log::debug;

use marker_range_core::{Frame, FrameSource, SourceError};
use marker_range_render::{Framebuffer, KeyInput, Surface, SurfaceError, SurfaceEvent};

/// Blocking capture from the default system camera, scaled to the session
/// capture size.
pub struct CameraSource {
    camera: kamera::Camera,
    width: usize,
    height: usize,
}

impl CameraSource {
    pub fn open(width: u32, height: u32) -> Result<Self, SourceError> {
        let camera = kamera::Camera::new_default_device();
        camera.start();
        Ok(Self {
            camera,
            width: width as usize,
            height: height as usize,
        })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        let Some(captured) = self.camera.wait_for_frame() else {
            return Err(SourceError::Acquire("camera stream ended".into()));
        };
        let (cw, ch) = captured.size_u32();
        if cw == 0 || ch == 0 {
            return Err(SourceError::Acquire("camera produced an empty frame".into()));
        }

        // Device frames arrive as 32-bit BGRA; convert to RGB8 and scale to
        // the session size with nearest sampling.
        let data = captured.data();
        let buf = data.data_u8();
        let mut frame = Frame::new(self.width, self.height);
        for y in 0..self.height {
            let sy = y * ch as usize / self.height;
            for x in 0..self.width {
                let sx = x * cw as usize / self.width;
                let i = (sy * cw as usize + sx) * 4;
                frame.put_pixel(x, y, [buf[i + 2], buf[i + 1], buf[i]]);
            }
        }
        Ok(Some(frame))
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.camera.stop();
    }
}

/// Window presentation through minifb.
pub struct LiveWindow {
    window: minifb::Window,
    size: (usize, usize),
}

impl LiveWindow {
    pub fn open(title: &str, width: usize, height: usize) -> Result<Self, SurfaceError> {
        let window = minifb::Window::new(
            title,
            width,
            height,
            minifb::WindowOptions {
                resize: true,
                ..minifb::WindowOptions::default()
            },
        )
        .map_err(|e| SurfaceError::Open(e.to_string()))?;
        let size = window.get_size();
        Ok(Self { window, size })
    }
}

impl Surface for LiveWindow {
    fn present(&mut self, fb: &Framebuffer) -> Result<(), SurfaceError> {
        self.window
            .update_with_buffer(&fb.color, fb.width(), fb.height())
            .map_err(|e| SurfaceError::Present(e.to_string()))
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        let mut events = Vec::new();

        if !self.window.is_open() {
            events.push(SurfaceEvent::CloseRequested);
        }

        for key in self.window.get_keys_pressed(minifb::KeyRepeat::No) {
            // Unrecognized keys are ignored.
            let input = match key {
                minifb::Key::Escape => KeyInput::Terminate,
                minifb::Key::C => KeyInput::DumpCamera,
                minifb::Key::P => KeyInput::DumpProjection,
                minifb::Key::M => KeyInput::DumpModelView,
                _ => continue,
            };
            events.push(SurfaceEvent::Key(input));
        }

        let size = self.window.get_size();
        if size != self.size {
            debug!("window resized {:?} -> {:?}", self.size, size);
            self.size = size;
            events.push(SurfaceEvent::Resized {
                width: size.0,
                height: size.1,
            });
        }

        events
    }
}
