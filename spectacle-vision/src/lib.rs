pub mod error;
pub mod landmark;
pub mod placement;
pub mod render;
pub mod source;
pub mod tracker;
pub mod video;

// Re-export commonly used types
pub use error::{Result, VisionError};
pub use landmark::{FaceKeypoints, FrameSize, NormalizedLandmark, PixelPoint};
pub use placement::{FitParams, Placement};
pub use render::Compositor;
pub use source::{FaceResults, JsonLinesSource, LandmarkSource};
pub use tracker::{FrameUpdate, OverlayTracker};
pub use video::{Camera, FrameSource};
