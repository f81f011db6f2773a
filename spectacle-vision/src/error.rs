use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Landmark set has {got} points, need at least {need}")]
    TooFewLandmarks { got: usize, need: usize },

    #[error("Malformed detector result on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed detector result: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VisionError>;
