use serde::{Deserialize, Serialize};

use crate::error::{Result, VisionError};

/// Face mesh index of the left eye's outer corner.
pub const LEFT_EYE_OUTER: usize = 33;
/// Face mesh index of the right eye's outer corner.
pub const RIGHT_EYE_OUTER: usize = 263;
/// Face mesh index of the nose tip.
pub const NOSE_TIP: usize = 1;

/// Smallest landmark set that still contains every index we read.
pub const MIN_LANDMARKS: usize = RIGHT_EYE_OUTER + 1;

/// Landmark as reported by the detector, relative to the frame (origin top-left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// Landmark mapped into mirrored pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Native pixel dimensions of a video frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// False until the capture device has reported its dimensions.
    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Map a normalized landmark into pixel space, flipping horizontally so it
/// lines up with the mirrored (selfie) presentation of the frame.
pub fn to_pixel(landmark: &NormalizedLandmark, frame: FrameSize) -> PixelPoint {
    PixelPoint {
        x: (1.0 - landmark.x) * frame.width as f32,
        y: landmark.y * frame.height as f32,
        z: landmark.z,
    }
}

/// The three keypoints the overlay is placed from, already in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceKeypoints {
    pub left_eye: PixelPoint,
    pub right_eye: PixelPoint,
    pub nose_tip: PixelPoint,
}

impl FaceKeypoints {
    pub fn from_landmarks(landmarks: &[NormalizedLandmark], frame: FrameSize) -> Result<Self> {
        if landmarks.len() < MIN_LANDMARKS {
            return Err(VisionError::TooFewLandmarks {
                got: landmarks.len(),
                need: MIN_LANDMARKS,
            });
        }

        Ok(Self {
            left_eye: to_pixel(&landmarks[LEFT_EYE_OUTER], frame),
            right_eye: to_pixel(&landmarks[RIGHT_EYE_OUTER], frame),
            nose_tip: to_pixel(&landmarks[NOSE_TIP], frame),
        })
    }

    pub fn points(&self) -> [PixelPoint; 3] {
        [self.left_eye, self.right_eye, self.nose_tip]
    }
}
