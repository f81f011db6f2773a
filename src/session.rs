use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbImage;
use log::{debug, info};
use spectacle_vision::render::{self, MARKER_COLOR};
use spectacle_vision::{
    Compositor, FaceResults, FitParams, FrameSize, FrameSource, FrameUpdate, LandmarkSource,
    OverlayTracker, Placement,
};

use crate::config::Config;

/// Per-frame overlay loop: mirror the frame, place the overlay, paint it.
pub struct Session {
    tracker: OverlayTracker,
    compositor: Compositor,
    marker_radius: u32,
}

impl Session {
    pub fn new(cfg: &Config, compositor: Compositor) -> Self {
        Self {
            tracker: OverlayTracker::new(cfg.fit_params(), cfg.debug),
            compositor,
            marker_radius: cfg.marker_radius,
        }
    }

    /// Render one frame in place. Returns `None` if the frame has no size yet.
    pub fn process(&mut self, frame: &mut RgbImage, results: &FaceResults) -> Option<FrameUpdate> {
        let size = FrameSize::new(frame.width(), frame.height());
        let update = self.tracker.on_results(size, &results.faces)?;

        render::mirror_frame(frame);
        self.compositor.composite(frame, &update.placement);
        render::draw_markers(frame, &update.markers, self.marker_radius, MARKER_COLOR);
        Some(update)
    }
}

/// Placement for a single detector result, without any image work.
pub fn place(results: &FaceResults, frame: FrameSize, params: FitParams) -> Placement {
    OverlayTracker::new(params, false)
        .on_results(frame, &results.faces)
        .map(|u| u.placement)
        .unwrap_or_else(Placement::hidden)
}

fn frame_path(out_dir: &Path, index: usize) -> PathBuf {
    out_dir.join(format!("frame_{:05}.png", index))
}

/// Pair each captured frame with the next detector result until the result
/// stream ends or `max_frames` frames have been written. Returns the number written.
pub fn run<F, S>(
    session: &mut Session,
    camera: &mut F,
    source: &mut S,
    out_dir: &Path,
    max_frames: Option<usize>,
) -> Result<usize>
where
    F: FrameSource,
    S: LandmarkSource,
{
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output dir {}", out_dir.display()))?;

    let size = camera.frame_size();
    info!("capturing {}x{} frames into {}", size.width, size.height, out_dir.display());

    let mut written = 0;
    let mut shown = true;
    while max_frames.map_or(true, |max| written < max) {
        let Some(results) = source.next_result().context("reading detector results")? else {
            info!("detector stream ended");
            break;
        };

        let mut frame = camera.frame().context("Failed to capture frame")?;
        let Some(update) = session.process(&mut frame, &results) else {
            debug!("frame size unknown, skipping");
            continue;
        };

        if update.placement.visible != shown {
            shown = update.placement.visible;
            info!("{}", if shown { "face found" } else { "no face, overlay hidden" });
        }
        debug!("frame {}: {:?}", written, update.placement);

        let path = frame_path(out_dir, written);
        frame
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        written += 1;
    }

    Ok(written)
}
