//! Mask exchange format.
//!
//! The JSON document passed from the segmentation stages to measurement.
//! One entry per image file name, each holding the detected individuals:
//!
//! ```json
//! {
//!   "000000018155.jpg": {
//!     "width": 640,
//!     "height": 427,
//!     "animals_found": 2,
//!     "objects": [
//!       {
//!         "object_id": 0,
//!         "class": "dog",
//!         "confidence": 0.91,
//!         "bbox": [12, 40, 220, 310],
//!         "segmentation": "[[12,40],[232,40],[232,350]]",
//!         "eyes": ["[[80,90],[90,90],[90,100]]", {"pixels": [[150, 95]]}]
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! `bbox` is `[x, y, w, h]`: top-left corner, then width and height. Detector
//! output in corner form (`[x1, y1, x2, y2]`, as YOLO `xyxy` boxes are) must be
//! converted before it is written here, otherwise width and height are read
//! as the far corner. `eyes` (also accepted as `eye_masks`) may be
//! missing, `null`, empty or hold up to two masks. Conversion into
//! [`Scene`]s validates each individual and image, dropping what does not
//! validate; the measurement core only ever sees the typed result.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mask::{BinaryMask, Region};
use crate::scene::{Individual, Scene};
use crate::types::{BoundingBox, Point};

/// How one region is written in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaskEncoding {
    /// A contour serialized as a JSON string, `"[[x,y],...]"`.
    Encoded(String),
    /// A contour as a plain array of vertices.
    Contour(Vec<[f64; 2]>),
    /// Explicit foreground pixels.
    Pixels { pixels: Vec<[u32; 2]> },
    /// Path to a grayscale bitmap, non-zero pixels are foreground.
    Bitmap { bitmap: PathBuf },
}

impl MaskEncoding {
    /// Decode into a [`Region`]. Bitmap paths are resolved against `base_dir`.
    pub fn to_region(&self, base_dir: &Path) -> Result<Region> {
        match self {
            MaskEncoding::Encoded(text) => {
                let vertices: Vec<[f64; 2]> = serde_json::from_str(text)?;
                Ok(contour(&vertices))
            }
            MaskEncoding::Contour(vertices) => Ok(contour(vertices)),
            MaskEncoding::Pixels { pixels } => Ok(Region::Pixels(pixels.clone())),
            MaskEncoding::Bitmap { bitmap } => {
                let path = base_dir.join(bitmap);
                let gray = image::open(&path)?.to_luma8();
                Ok(Region::Bitmap(BinaryMask::from_luma(&gray)))
            }
        }
    }
}

fn contour(vertices: &[[f64; 2]]) -> Region {
    Region::Contour(vertices.iter().copied().map(Point::from).collect())
}

/// One detected animal as written by the segmentation stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualEntry {
    pub object_id: u32,
    #[serde(rename = "class")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub bbox: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<MaskEncoding>,
    #[serde(default, alias = "eye_masks")]
    pub eyes: Option<Vec<MaskEncoding>>,
}

impl IndividualEntry {
    /// Whether the eye pass still has to run for this individual.
    pub fn needs_eyes(&self) -> bool {
        self.eyes.as_ref().map_or(true, Vec::is_empty)
    }

    fn to_individual(&self, base_dir: &Path) -> Result<Individual> {
        let body = self
            .segmentation
            .as_ref()
            .map(|m| m.to_region(base_dir))
            .transpose()?;
        let eyes = self
            .eyes
            .iter()
            .flatten()
            .map(|m| m.to_region(base_dir))
            .collect::<Result<Vec<_>>>()?;
        let individual = Individual::new(self.object_id, &self.category, self.bbox, body, eyes)?;
        Ok(match self.confidence {
            Some(c) => individual.with_confidence(c),
            None => individual,
        })
    }
}

/// One image's detections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animals_found: Option<usize>,
    #[serde(default)]
    pub objects: Vec<IndividualEntry>,
}

/// The whole exchange document, keyed by image file name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub images: BTreeMap<String, ImageEntry>,
}

impl Document {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Return a new document with eye masks filled in by `detect`.
    ///
    /// `detect` is called with the image name and the individual only for
    /// individuals whose eye field is missing or empty; everything else is
    /// carried over unchanged.
    pub fn with_eye_masks<F>(&self, mut detect: F) -> Self
    where
        F: FnMut(&str, &IndividualEntry) -> Vec<MaskEncoding>,
    {
        let images = self
            .images
            .iter()
            .map(|(name, entry)| {
                let objects = entry
                    .objects
                    .iter()
                    .map(|obj| {
                        if obj.needs_eyes() {
                            IndividualEntry {
                                eyes: Some(detect(name.as_str(), obj)),
                                ..obj.clone()
                            }
                        } else {
                            log::debug!("{}: object {} already has eyes", name, obj.object_id);
                            obj.clone()
                        }
                    })
                    .collect();
                (
                    name.clone(),
                    ImageEntry {
                        objects,
                        ..entry.clone()
                    },
                )
            })
            .collect();
        Self { images }
    }

    /// Convert every image into a [`Scene`], in image name order.
    ///
    /// Failures stay scoped: an individual that does not validate is dropped
    /// from its image, and an image that does not validate is dropped from the
    /// batch. Both are logged at warn level.
    pub fn scenes(&self, base_dir: &Path) -> Vec<Scene> {
        self.images
            .iter()
            .filter_map(|(name, entry)| {
                let individuals = entry
                    .objects
                    .iter()
                    .filter_map(|obj| match obj.to_individual(base_dir) {
                        Ok(individual) => Some(individual),
                        Err(e) => {
                            log::warn!("{}: skipping individual {}: {}", name, obj.object_id, e);
                            None
                        }
                    })
                    .collect();
                match Scene::new(name.as_str(), entry.width, entry.height, individuals) {
                    Ok(scene) => Some(scene),
                    Err(e) => {
                        log::warn!("{}: skipping image: {}", name, e);
                        None
                    }
                }
            })
            .collect()
    }
}

impl ImageEntry {
    /// Strict conversion of one image: the first invalid individual fails the
    /// whole image.
    pub fn to_scene(&self, name: &str, base_dir: &Path) -> Result<Scene> {
        let individuals = self
            .objects
            .iter()
            .map(|obj| obj.to_individual(base_dir))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| match e {
                Error::InvalidDocument(msg) => Error::InvalidDocument(format!("{}: {}", name, msg)),
                other => other,
            })?;
        Scene::new(name, self.width, self.height, individuals)
    }
}

/// Load a document and convert it to scenes, resolving bitmap paths relative
/// to the document's directory.
pub fn load_scenes<P: AsRef<Path>>(path: P) -> Result<Vec<Scene>> {
    let path = path.as_ref();
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(Document::load(path)?.scenes(base_dir))
}
