pub mod config;
pub mod session;

// Re-export vision types for convenience
pub use spectacle_vision::{
    landmark, placement, render, source, tracker, video, Compositor, FaceResults, FitParams,
    FrameSize, Placement,
};
