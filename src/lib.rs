//! # animal-eye-distance
//!
//! Eye distance measurement for animal photographs.
//!
//! Segmentation models (an instance segmenter for animal bodies and a
//! prompt-guided segmenter for eyes) write their masks into a JSON exchange
//! document. This crate turns those masks into distances:
//!
//! - **PD** (pupillary distance): between one individual's two eye centroids
//! - **RR**: between the right-eye centroids of two distinct individuals in
//!   the same image
//!
//! and checks the results against a ground-truth table. All distances are in
//! pixels.
//!
//! ## Pipeline
//!
//! 1. Load the exchange document and validate it into [`Scene`]s
//! 2. Reduce every eye mask to its centroid via image moments
//! 3. Label eyes left/right by x coordinate (camera frame, not anatomy)
//! 4. Emit PD and RR [`MeasurementRecord`]s
//! 5. Optionally verify against [`GroundTruthEntry`] rows
//!
//! ## Quick Start
//!
//! ```rust
//! use animal_eye_distance::{
//!     measure_scene, BoundingBox, Individual, Participants, Region, Scene,
//! };
//!
//! let eye = |x: u32, y: u32| Region::Pixels(vec![[x, y], [x + 1, y], [x, y + 1], [x + 1, y + 1]]);
//! let bbox = BoundingBox::new(0.0, 0.0, 400.0, 300.0);
//!
//! let dog = Individual::new(0, "dog", bbox, None, vec![eye(100, 80), eye(160, 80)]).unwrap();
//! let cat = Individual::new(1, "cat", bbox, None, vec![eye(300, 90)]).unwrap();
//! let scene = Scene::new("000000018155.jpg", 640, 480, vec![dog, cat]).unwrap();
//!
//! let measured = measure_scene(&scene);
//! // PD for the dog, RR for the dog/cat pair. The cat's single eye counts as its right eye.
//! assert_eq!(measured.records.len(), 2);
//! assert_eq!(measured.records[1].participants, Participants::pair(0, 1));
//! ```

mod centroid;
mod distance;
mod error;
pub mod exchange;
mod laterality;
mod mask;
mod record;
mod report;
mod scene;
mod types;
pub mod verify;

pub use centroid::{centroid, Moments};
pub use distance::{
    lateralize, measure_scene, measure_scenes, pupillary_distance, right_eye_distance,
    IndividualEyes, SceneMeasurement,
};
pub use error::{Error, MeasureError, Result};
pub use exchange::{load_scenes, Document};
pub use laterality::EyeLayout;
pub use mask::{BinaryMask, MaskAccess, Region};
pub use record::{MeasurementKind, MeasurementRecord, Participants};
pub use report::Report;
pub use scene::{EyeRegion, Individual, Scene, MAX_EYES};
pub use types::{BoundingBox, Point};
pub use verify::{
    load_ground_truth, verify, GroundTruthEntry, Outcome, VerificationReport, VerifyOptions,
    DEFAULT_TOLERANCE_PX,
};
