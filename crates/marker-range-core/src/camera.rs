//! Camera intrinsics, the session camera model, and the calibration adapter.
//!
//! The adapter converts an externally produced intrinsic-matrix + distortion
//! representation (the `calib`/`dist` fields of a calibration file) into the
//! immutable [`CameraModel`] the pose tracker is configured with. Parsing is
//! delegated to `serde_json`; validation and error surfacing live here.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Near clip plane used when the calibration source does not say otherwise.
pub const DEFAULT_NEAR_PLANE: f32 = 1.0;
/// Far clip plane used when the calibration source does not say otherwise.
pub const DEFAULT_FAR_PLANE: f32 = 1000.0;

/// Pinhole camera intrinsics, fixed for the whole session.
///
/// `distortion` holds the radial/tangential coefficients in calibration
/// order; slots 4..6 are reserved for the tangential tail and stay zero when
/// the source provides only four coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub distortion: [f64; 6],
    pub width: u32,
    pub height: u32,
}

/// The session camera model consumed by [`crate::PoseTracker::configure`].
///
/// Owned exclusively by the session: built once at startup by
/// [`build_camera_model`], immutable afterwards. Besides the intrinsics it
/// carries the clip planes the projection matrix is derived from and the 3x4
/// intrinsic matrix in the layout tracking engines expect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraModel {
    pub intrinsics: CameraIntrinsics,
    pub near: f32,
    pub far: f32,
    /// Iterative-undistortion retry count. Fixed to 1: favors frame-rate
    /// over sub-pixel undistortion accuracy.
    pub undistort_iterations: u32,
    mat: [[f64; 4]; 3],
}

impl CameraModel {
    /// The derived 3x4 intrinsic matrix, row-major.
    pub fn intrinsic_matrix(&self) -> &[[f64; 4]; 3] {
        &self.mat
    }

    /// Override the clip planes before the tracker is configured.
    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }
}

/// Errors raised while loading or converting a calibration source.
///
/// All of these are fatal at startup: the pipeline cannot run without a
/// camera model.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error("failed to open calibration file `{path}`: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse calibration file `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid focal lengths (fx={fx}, fy={fy}); expected both > 0")]
    InvalidFocal { fx: f64, fy: f64 },

    #[error("distortion vector too short (got {got} coefficients, need at least 4)")]
    ShortDistortion { got: usize },
}

/// On-disk calibration document.
///
/// The field names follow the calibration tool's convention: `calib` is the
/// 3x3 intrinsic matrix, `dist` the distortion coefficients (at least 4).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibrationFile {
    pub calib: [[f64; 3]; 3],
    pub dist: Vec<f64>,
}

impl CalibrationFile {
    /// Convert into the session camera model for the given capture size.
    pub fn build_model(&self, width: u32, height: u32) -> Result<CameraModel, CalibrationError> {
        build_camera_model(&self.calib, &self.dist, width, height)
    }
}

/// Read and parse a calibration file.
pub fn load_calibration(path: &Path) -> Result<CalibrationFile, CalibrationError> {
    let text = std::fs::read_to_string(path).map_err(|source| CalibrationError::Open {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CalibrationError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Build the session [`CameraModel`] from a 3x3 intrinsic matrix and a
/// distortion vector.
///
/// Copies fx, fy from the matrix diagonal and cx, cy from the offset column
/// exactly (no rounding beyond storage precision); copies the first four
/// distortion coefficients verbatim and zero-pads the remaining slots. Skew
/// is assumed zero. Clip planes start at the defaults and can be overridden
/// with [`CameraModel::with_clip_planes`].
pub fn build_camera_model(
    intrinsic: &[[f64; 3]; 3],
    distortion: &[f64],
    width: u32,
    height: u32,
) -> Result<CameraModel, CalibrationError> {
    let fx = intrinsic[0][0];
    let fy = intrinsic[1][1];
    let cx = intrinsic[0][2];
    let cy = intrinsic[1][2];

    if fx <= 0.0 || fy <= 0.0 {
        return Err(CalibrationError::InvalidFocal { fx, fy });
    }
    if distortion.len() < 4 {
        return Err(CalibrationError::ShortDistortion {
            got: distortion.len(),
        });
    }

    let mut kc = [0.0; 6];
    kc[..4].copy_from_slice(&distortion[..4]);

    let mut mat = [[0.0; 4]; 3];
    mat[0][0] = fx;
    mat[1][1] = fy;
    mat[0][2] = cx;
    mat[1][2] = cy;
    mat[2][2] = 1.0;

    Ok(CameraModel {
        intrinsics: CameraIntrinsics {
            fx,
            fy,
            cx,
            cy,
            distortion: kc,
            width,
            height,
        },
        near: DEFAULT_NEAR_PLANE,
        far: DEFAULT_FAR_PLANE,
        undistort_iterations: 1,
        mat,
    })
}
