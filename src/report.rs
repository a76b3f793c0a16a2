//! Aggregated output for downstream reporting and rendering.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::distance::{measure_scenes, SceneMeasurement};
use crate::error::Result;
use crate::record::MeasurementRecord;
use crate::scene::Scene;
use crate::verify::{verify, GroundTruthEntry, VerificationReport, VerifyOptions};

/// Measurements for a batch of images, optionally verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub images: Vec<SceneMeasurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationReport>,
}

impl Report {
    pub fn measure(scenes: &[Scene]) -> Self {
        Self {
            images: measure_scenes(scenes),
            verification: None,
        }
    }

    /// Verify every record in the report against `truth`.
    pub fn verified(mut self, truth: &[GroundTruthEntry], options: &VerifyOptions) -> Self {
        let records: Vec<MeasurementRecord> = self.records().cloned().collect();
        self.verification = Some(verify(&records, truth, options));
        self
    }

    /// All records, image by image.
    pub fn records(&self) -> impl Iterator<Item = &MeasurementRecord> {
        self.images.iter().flat_map(|m| m.records.iter())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
