use log::{debug, warn};

use crate::landmark::{FaceKeypoints, FrameSize, NormalizedLandmark, PixelPoint};
use crate::placement::{self, FitParams, Placement};

/// What the rendering surface should show for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameUpdate {
    pub surface: FrameSize,
    pub placement: Placement,
    /// Debug marker positions; empty when debug drawing is off or no face was found.
    pub markers: Vec<PixelPoint>,
}

/// Turns detector results into per-frame overlay updates.
///
/// The only state kept between frames is the surface size; placements are
/// computed from scratch every frame.
#[derive(Debug, Clone)]
pub struct OverlayTracker {
    params: FitParams,
    debug: bool,
    surface: FrameSize,
}

impl OverlayTracker {
    pub fn new(params: FitParams, debug: bool) -> Self {
        Self {
            params,
            debug,
            surface: FrameSize::default(),
        }
    }

    pub fn surface(&self) -> FrameSize {
        self.surface
    }

    /// Handle one detector callback. Returns `None` while the frame size is unknown.
    pub fn on_results(
        &mut self,
        frame: FrameSize,
        faces: &[Vec<NormalizedLandmark>],
    ) -> Option<FrameUpdate> {
        if !frame.is_known() {
            return None;
        }
        self.sync_surface(frame);

        let keypoints = faces.first().and_then(|face| {
            match FaceKeypoints::from_landmarks(face, frame) {
                Ok(kp) => Some(kp),
                Err(e) => {
                    warn!("ignoring face: {}", e);
                    None
                }
            }
        });

        let update = match keypoints {
            Some(kp) => FrameUpdate {
                surface: self.surface,
                placement: placement::position(
                    &kp.left_eye,
                    &kp.right_eye,
                    &kp.nose_tip,
                    &self.params,
                ),
                markers: if self.debug {
                    kp.points().to_vec()
                } else {
                    Vec::new()
                },
            },
            None => FrameUpdate {
                surface: self.surface,
                placement: Placement::hidden(),
                markers: Vec::new(),
            },
        };
        Some(update)
    }

    fn sync_surface(&mut self, frame: FrameSize) {
        if self.surface != frame {
            debug!(
                "surface resized: {}x{} -> {}x{}",
                self.surface.width, self.surface.height, frame.width, frame.height
            );
            self.surface = frame;
        }
    }
}
