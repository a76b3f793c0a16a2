//! Typed, validated view of one image's detections.
//!
//! A [`Scene`] is built from the exchange document at the boundary and is
//! read-only from then on. Eye centroids are computed lazily on first access
//! and cached in the region, so repeated measurement never recomputes them.

use std::sync::OnceLock;

use crate::centroid::centroid;
use crate::error::{Error, MeasureError, Result};
use crate::mask::Region;
use crate::types::{BoundingBox, Point};

/// Most eyes an individual may carry.
pub const MAX_EYES: usize = 2;

/// One eye mask with its lazily computed centroid.
#[derive(Debug, Clone)]
pub struct EyeRegion {
    region: Region,
    centroid: OnceLock<Option<Point>>,
}

impl EyeRegion {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            centroid: OnceLock::new(),
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// The region's centroid, computed on first call.
    ///
    /// Fails with [`MeasureError::DegenerateRegion`] for zero-area masks.
    pub fn centroid(&self) -> std::result::Result<Point, MeasureError> {
        self.resolve(|| log::debug!("degenerate eye mask"))
    }

    /// `on_degenerate` runs only on the call that computes the centroid.
    fn resolve<F: FnOnce()>(&self, on_degenerate: F) -> std::result::Result<Point, MeasureError> {
        let cached = *self.centroid.get_or_init(|| {
            let c = centroid(&self.region).ok();
            if c.is_none() {
                on_degenerate();
            }
            c
        });
        cached.ok_or(MeasureError::DegenerateRegion)
    }
}

impl PartialEq for EyeRegion {
    fn eq(&self, other: &Self) -> bool {
        self.region == other.region
    }
}

/// One detected animal.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub id: u32,
    pub category: String,
    pub confidence: Option<f64>,
    pub bbox: BoundingBox,
    pub body: Option<Region>,
    eyes: Vec<EyeRegion>,
}

impl Individual {
    /// Create an individual, rejecting more than [`MAX_EYES`] eye regions.
    pub fn new(
        id: u32,
        category: impl Into<String>,
        bbox: BoundingBox,
        body: Option<Region>,
        eyes: Vec<Region>,
    ) -> Result<Self> {
        if eyes.len() > MAX_EYES {
            return Err(Error::InvalidDocument(format!(
                "individual {} has {} eye masks, at most {} supported",
                id,
                eyes.len(),
                MAX_EYES
            )));
        }
        Ok(Self {
            id,
            category: category.into(),
            confidence: None,
            bbox,
            body,
            eyes: eyes.into_iter().map(EyeRegion::new).collect(),
        })
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn eyes(&self) -> &[EyeRegion] {
        &self.eyes
    }

    /// Centroids of the eye regions that have one, in document order.
    ///
    /// Degenerate regions are left out, logged once when first resolved.
    pub fn eye_centroids(&self, image: &str) -> Vec<Point> {
        self.eyes
            .iter()
            .enumerate()
            .filter_map(|(i, eye)| {
                eye.resolve(|| {
                    log::warn!(
                        "{}: individual {} eye mask {}: {}",
                        image,
                        self.id,
                        i,
                        MeasureError::DegenerateRegion
                    )
                })
                .ok()
            })
            .collect()
    }
}

/// All individuals detected in one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub image: String,
    pub width: u32,
    pub height: u32,
    individuals: Vec<Individual>,
}

impl Scene {
    /// Build a scene, rejecting duplicate individual ids.
    pub fn new(
        image: impl Into<String>,
        width: u32,
        height: u32,
        individuals: Vec<Individual>,
    ) -> Result<Self> {
        let image = image.into();
        let mut ids: Vec<u32> = individuals.iter().map(|i| i.id).collect();
        ids.sort_unstable();
        if let Some(w) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::InvalidDocument(format!(
                "{}: duplicate object id {}",
                image, w[0]
            )));
        }
        Ok(Self {
            image,
            width,
            height,
            individuals,
        })
    }

    /// Individuals in detection order.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64) -> Region {
        Region::Contour(vec![
            Point::new(x - 2.0, y - 2.0),
            Point::new(x + 2.0, y - 2.0),
            Point::new(x + 2.0, y + 2.0),
            Point::new(x - 2.0, y + 2.0),
        ])
    }

    fn bbox() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn centroid_is_cached() {
        let eye = EyeRegion::new(square(10.0, 20.0));
        assert!(eye.centroid.get().is_none());
        let first = eye.centroid().unwrap();
        assert_eq!(eye.centroid.get(), Some(&Some(first)));
        assert_eq!(eye.centroid().unwrap(), first);
    }

    #[test]
    fn degenerate_centroid_is_cached_as_missing() {
        let eye = EyeRegion::new(Region::Pixels(vec![]));
        assert_eq!(eye.centroid(), Err(MeasureError::DegenerateRegion));
        assert_eq!(eye.centroid.get(), Some(&None));
    }

    #[test]
    fn degenerate_region_reported_once() {
        let eye = EyeRegion::new(Region::Contour(vec![]));
        let mut reports = 0;
        for _ in 0..3 {
            assert!(eye.resolve(|| reports += 1).is_err());
        }
        assert_eq!(reports, 1);

        let ind = Individual::new(0, "dog", bbox(), None, vec![Region::Pixels(vec![])]).unwrap();
        assert!(ind.eye_centroids("a.jpg").is_empty());
        let mut again = 0;
        assert!(ind.eyes()[0].resolve(|| again += 1).is_err());
        assert_eq!(again, 0);
    }

    #[test]
    fn too_many_eyes_rejected() {
        let eyes = vec![square(1.0, 1.0), square(5.0, 5.0), square(9.0, 9.0)];
        assert!(matches!(
            Individual::new(0, "cat", bbox(), None, eyes),
            Err(Error::InvalidDocument(_))
        ));
    }

    #[test]
    fn eye_centroids_skip_degenerate() {
        let ind = Individual::new(
            3,
            "dog",
            bbox(),
            None,
            vec![Region::Contour(vec![]), square(40.0, 50.0)],
        )
        .unwrap();
        assert_eq!(ind.eye_centroids("a.jpg"), vec![Point::new(40.0, 50.0)]);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let a = Individual::new(1, "dog", bbox(), None, vec![]).unwrap();
        let b = Individual::new(1, "dog", bbox(), None, vec![]).unwrap();
        let err = Scene::new("x.jpg", 640, 480, vec![a, b]).unwrap_err();
        assert!(err.to_string().contains("duplicate object id 1"));
    }
}
