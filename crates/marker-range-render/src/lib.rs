//! Software render compositor for the marker-range pipeline.
//!
//! Produces one visual frame per tick in two layers: the current video
//! frame blitted across the full viewport (with linear filtering, no
//! mipmaps), then a lit 3-D reference object transformed by the selected
//! marker's pose and perspective-projected by the session projection
//! matrix. The depth buffer is cleared between layers so the background
//! never occludes the overlay.
//!
//! Presentation happens through the narrow [`Surface`] trait; any window
//! backend (or a headless sink) can implement it.

mod compositor;
mod framebuffer;
mod mesh;
mod raster;
mod surface;

pub use compositor::{title_text, Compositor, CompositorParams};
pub use framebuffer::{pack_rgb, Framebuffer};
pub use mesh::{cube, Triangle};
pub use raster::{fill_triangle, ScreenVertex};
pub use surface::{KeyInput, Surface, SurfaceError, SurfaceEvent};
