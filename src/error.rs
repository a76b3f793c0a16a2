use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Bitmap mask error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid mask: {0}")]
    InvalidMask(String),

    #[error("Invalid exchange document: {0}")]
    InvalidDocument(String),

    #[error("Invalid ground truth table: {0}")]
    InvalidGroundTruth(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable conditions raised while measuring a single region or individual.
///
/// None of these abort a batch: the affected region, individual or pair is
/// skipped and the rest of the image is still measured.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    #[error("region has zero area, no centroid")]
    DegenerateRegion,

    #[error("{image}: individual {id} has {found} valid eye centroid(s), {required} required")]
    InsufficientEyeData {
        image: String,
        id: u32,
        required: usize,
        found: usize,
    },
}
