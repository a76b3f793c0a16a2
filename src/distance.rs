//! Pupillary (PD) and right-eye-to-right-eye (RR) distances.
//!
//! ## Algorithm Overview
//!
//! 1. Resolve each individual's valid eye centroids and label them by x
//! 2. PD: for every individual with exactly two labelled centroids, the
//!    Euclidean distance between its left and right eye
//! 3. RR: for every unordered pair of individuals that both resolve a right
//!    eye, the Euclidean distance between the two right eyes, enumerated by
//!    ascending id with `id1 < id2`
//!
//! Individuals that do not qualify are skipped and logged. An image with no
//! qualifying individual simply yields no records.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::MeasureError;
use crate::laterality::EyeLayout;
use crate::record::{MeasurementRecord, Participants};
use crate::scene::Scene;

/// Labelled eye centroids of one individual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualEyes {
    pub id: u32,
    pub category: String,
    pub eyes: EyeLayout,
}

/// Everything measured in one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMeasurement {
    pub image: String,
    /// Per individual, ascending id.
    pub individuals: Vec<IndividualEyes>,
    /// Individual records by ascending id, then pair records by `(id1, id2)`.
    pub records: Vec<MeasurementRecord>,
}

impl SceneMeasurement {
    pub fn pupillary(&self) -> impl Iterator<Item = &MeasurementRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.participants, Participants::Individual { .. }))
    }

    pub fn pairs(&self) -> impl Iterator<Item = &MeasurementRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.participants, Participants::Pair { .. }))
    }
}

/// Distance between the left and right eye, if both are present.
pub fn pupillary_distance(eyes: &EyeLayout) -> Option<f64> {
    match eyes {
        EyeLayout::Pair { left, right } => Some(left.distance(right)),
        _ => None,
    }
}

/// Distance between two individuals' right eyes, if both resolve one.
pub fn right_eye_distance(a: &EyeLayout, b: &EyeLayout) -> Option<f64> {
    Some(a.right()?.distance(&b.right()?))
}

/// Label every individual's eyes, ordered by ascending id.
pub fn lateralize(scene: &Scene) -> Vec<IndividualEyes> {
    let mut out: Vec<IndividualEyes> = scene
        .individuals()
        .iter()
        .map(|ind| IndividualEyes {
            id: ind.id,
            category: ind.category.clone(),
            eyes: EyeLayout::from_centroids(&ind.eye_centroids(&scene.image)),
        })
        .collect();
    out.sort_by_key(|i| i.id);
    out
}

/// Measure PD and RR for one image.
pub fn measure_scene(scene: &Scene) -> SceneMeasurement {
    let individuals = lateralize(scene);
    let mut records = Vec::new();

    for ind in &individuals {
        match pupillary_distance(&ind.eyes) {
            Some(distance) => records.push(MeasurementRecord {
                image: scene.image.clone(),
                participants: Participants::Individual { id: ind.id },
                distance,
            }),
            None => log::debug!(
                "skip PD: {}",
                MeasureError::InsufficientEyeData {
                    image: scene.image.clone(),
                    id: ind.id,
                    required: 2,
                    found: ind.eyes.len(),
                }
            ),
        }
    }

    let with_right: Vec<&IndividualEyes> = individuals
        .iter()
        .filter(|ind| {
            if ind.eyes.is_empty() {
                log::debug!(
                    "skip RR: {}",
                    MeasureError::InsufficientEyeData {
                        image: scene.image.clone(),
                        id: ind.id,
                        required: 1,
                        found: 0,
                    }
                );
                false
            } else {
                true
            }
        })
        .collect();

    for (i, a) in with_right.iter().enumerate() {
        for b in &with_right[i + 1..] {
            if let Some(distance) = right_eye_distance(&a.eyes, &b.eyes) {
                records.push(MeasurementRecord {
                    image: scene.image.clone(),
                    participants: Participants::pair(a.id, b.id),
                    distance,
                });
            }
        }
    }

    SceneMeasurement {
        image: scene.image.clone(),
        individuals,
        records,
    }
}

/// Measure many images in parallel. Output order matches input order.
pub fn measure_scenes(scenes: &[Scene]) -> Vec<SceneMeasurement> {
    let measured: Vec<SceneMeasurement> = scenes.par_iter().map(measure_scene).collect();
    log::info!(
        "measured {} image(s): {} record(s)",
        measured.len(),
        measured.iter().map(|m| m.records.len()).sum::<usize>()
    );
    measured
}
