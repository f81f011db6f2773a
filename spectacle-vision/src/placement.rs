use serde::{Deserialize, Serialize};

use crate::landmark::PixelPoint;

/// Tunable visual-fit constants for the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    /// Overlay width as a multiple of the outer-eye distance.
    pub fit_multiplier: f32,
    /// Fraction of the eye-midline to nose-tip distance the anchor is pulled down by.
    pub vertical_offset: f32,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            fit_multiplier: 2.2,
            vertical_offset: 0.25,
        }
    }
}

/// Screen transform applied to the overlay for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub rotation_degrees: f32,
    pub visible: bool,
}

impl Placement {
    pub fn hidden() -> Self {
        Self::default()
    }
}

/// Angle of the line from `a` to `b`, in degrees.
pub fn angle_between(a: &PixelPoint, b: &PixelPoint) -> f32 {
    (b.y - a.y).atan2(b.x - a.x).to_degrees()
}

/// Place the overlay from the outer eye corners and the nose tip.
///
/// The overlay is centered between the eyes, nudged toward the nose by
/// `params.vertical_offset`, sized from the eye distance and rolled with the
/// eye line. Coincident eyes give a zero-width, unrotated placement.
pub fn position(
    left_eye: &PixelPoint,
    right_eye: &PixelPoint,
    nose_tip: &PixelPoint,
    params: &FitParams,
) -> Placement {
    let cx = (left_eye.x + right_eye.x) / 2.0;
    let cy = (left_eye.y + right_eye.y) / 2.0;

    let dx = right_eye.x - left_eye.x;
    let dy = right_eye.y - left_eye.y;
    let eye_dist = dx.hypot(dy);

    let v_offset = (nose_tip.y - cy) * params.vertical_offset;

    Placement {
        center_x: cx,
        center_y: cy + v_offset,
        width: eye_dist * params.fit_multiplier,
        rotation_degrees: angle_between(left_eye, right_eye),
        visible: true,
    }
}
