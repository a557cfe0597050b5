//! Presentation surface contract.
//!
//! The pipeline needs exactly two things from a windowing backend: a way to
//! present the composited framebuffer (with a title), and the key/resize
//! events of the current tick. Everything else about window plumbing stays
//! behind this trait.

use crate::framebuffer::Framebuffer;

/// The discrete inputs the pipeline reacts to. Backends map their raw key
/// codes here and drop everything unrecognized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyInput {
    /// Begin termination (Esc).
    Terminate,
    /// Dump the camera intrinsic matrix (`c`).
    DumpCamera,
    /// Dump the live projection matrix (`p`).
    DumpProjection,
    /// Dump the live model-view matrix (`m`).
    DumpModelView,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    Key(KeyInput),
    Resized { width: usize, height: usize },
    CloseRequested,
}

#[derive(thiserror::Error, Debug)]
pub enum SurfaceError {
    #[error("failed to open surface: {0}")]
    Open(String),

    #[error("failed to present frame: {0}")]
    Present(String),
}

/// One presentation target per session. `present` may block on buffer swap.
pub trait Surface {
    fn present(&mut self, fb: &Framebuffer) -> Result<(), SurfaceError>;

    fn set_title(&mut self, title: &str);

    /// Drain the events that arrived since the last poll.
    fn poll_events(&mut self) -> Vec<SurfaceEvent>;
}
