//! Verification of computed distances against a ground-truth table.
//!
//! Every ground-truth row ends up in exactly one of three buckets, which have
//! different root causes and are reported separately:
//!
//! - **pass / mismatch**: a record was computed and compared within the
//!   tolerance. A mismatch points at the measurement itself.
//! - **missing**: no usable record for the row. This points upstream, at
//!   detection or segmentation.
//!
//! Computed records that no row refers to are reported as **unverified**,
//! which is informational only.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::{MeasurementKind, MeasurementRecord, Participants};

/// Default absolute tolerance in pixels.
pub const DEFAULT_TOLERANCE_PX: f64 = 5.0;

/// Mean absolute error below which results are graded precise.
const PRECISE_MAE_PX: f64 = 5.0;
/// Mean absolute error below which results are graded acceptable.
const ACCEPTABLE_MAE_PX: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyOptions {
    /// Absolute pixel tolerance used for rows without their own.
    pub tolerance: f64,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE_PX,
        }
    }
}

/// One expected distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthEntry {
    pub image: String,
    pub participants: Participants,
    pub expected: f64,
    /// Overrides [`VerifyOptions::tolerance`] when set.
    pub tolerance: Option<f64>,
}

/// CSV row layout: `Image_Name,Type,Obj_ID_1,Obj_ID_2,Expected_Dist[,Tolerance]`.
#[derive(Debug, Deserialize)]
struct GroundTruthRow {
    #[serde(rename = "Image_Name")]
    image: String,
    #[serde(rename = "Type")]
    kind: MeasurementKind,
    #[serde(rename = "Obj_ID_1")]
    id1: u32,
    #[serde(rename = "Obj_ID_2", default)]
    id2: Option<u32>,
    #[serde(rename = "Expected_Dist")]
    expected: f64,
    #[serde(rename = "Tolerance", default)]
    tolerance: Option<f64>,
}

impl GroundTruthRow {
    fn into_entry(self, line: usize) -> Result<GroundTruthEntry> {
        let participants = match (self.kind, self.id2) {
            (MeasurementKind::Individual, _) => Participants::Individual { id: self.id1 },
            (MeasurementKind::Pair, Some(id2)) => Participants::pair(self.id1, id2),
            (MeasurementKind::Pair, None) => {
                return Err(Error::InvalidGroundTruth(format!(
                    "row {}: Pair entry for {} has no Obj_ID_2",
                    line, self.image
                )))
            }
        };
        Ok(GroundTruthEntry {
            image: self.image,
            participants,
            expected: self.expected,
            tolerance: self.tolerance,
        })
    }
}

/// Parse a ground-truth CSV table.
pub fn read_ground_truth<R: Read>(reader: R) -> Result<Vec<GroundTruthEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.deserialize::<GroundTruthRow>()
        .enumerate()
        .map(|(i, row)| row?.into_entry(i + 2))
        .collect()
}

pub fn load_ground_truth<P: AsRef<Path>>(path: P) -> Result<Vec<GroundTruthEntry>> {
    let file = File::open(path)?;
    read_ground_truth(BufReader::new(file))
}

/// Why a ground-truth row has no usable measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    /// Nothing was computed for these participants.
    NoRecord,
    /// A zero distance was computed against a non-zero expectation.
    ZeroDistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Pass {
        expected: f64,
        computed: f64,
        /// `computed - expected`.
        error: f64,
    },
    Mismatch {
        expected: f64,
        computed: f64,
        error: f64,
        tolerance: f64,
    },
    Missing {
        expected: f64,
        reason: MissingReason,
    },
    Unverified {
        computed: f64,
    },
}

impl Outcome {
    /// Signed error for rows that were compared.
    pub fn error(&self) -> Option<f64> {
        match self {
            Outcome::Pass { error, .. } | Outcome::Mismatch { error, .. } => Some(*error),
            _ => None,
        }
    }

    /// Mismatches and missing measurements fail; unverified records do not.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Mismatch { .. } | Outcome::Missing { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass { error, .. } => write!(f, "PASS ({:+.2} px)", error),
            Outcome::Mismatch {
                error, tolerance, ..
            } => write!(f, "MISMATCH ({:+.2} px, tolerance {:.2})", error, tolerance),
            Outcome::Missing {
                reason: MissingReason::NoRecord,
                ..
            } => f.write_str("MISSING (no measurement)"),
            Outcome::Missing {
                reason: MissingReason::ZeroDistance,
                ..
            } => f.write_str("MISSING (zero distance)"),
            Outcome::Unverified { .. } => f.write_str("UNVERIFIED"),
        }
    }
}

/// Verification result for one ground-truth row or unmatched record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub image: String,
    #[serde(flatten)]
    pub participants: Participants,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// Mean absolute error under 5 px.
    Precise,
    /// Mean absolute error under 10 px.
    Acceptable,
    HighError,
    /// Nothing could be compared.
    NoData,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Precise => f.write_str("precise (MAE < 5 px)"),
            Grade::Acceptable => f.write_str("acceptable (MAE < 10 px)"),
            Grade::HighError => f.write_str("high error (MAE >= 10 px)"),
            Grade::NoData => f.write_str("no comparable data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub passed: usize,
    pub mismatched: usize,
    pub missing: usize,
    pub unverified: usize,
    /// Mean absolute error over compared rows.
    pub mean_abs_error: Option<f64>,
    pub grade: Grade,
}

impl Summary {
    fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let mut s = Summary {
            passed: 0,
            mismatched: 0,
            missing: 0,
            unverified: 0,
            mean_abs_error: None,
            grade: Grade::NoData,
        };
        let mut abs_sum = 0.0;
        for v in verdicts {
            match v.outcome {
                Outcome::Pass { .. } => s.passed += 1,
                Outcome::Mismatch { .. } => s.mismatched += 1,
                Outcome::Missing { .. } => s.missing += 1,
                Outcome::Unverified { .. } => s.unverified += 1,
            }
            if let Some(e) = v.outcome.error() {
                abs_sum += e.abs();
            }
        }
        let compared = s.passed + s.mismatched;
        if compared > 0 {
            let mae = abs_sum / compared as f64;
            s.mean_abs_error = Some(mae);
            s.grade = if mae < PRECISE_MAE_PX {
                Grade::Precise
            } else if mae < ACCEPTABLE_MAE_PX {
                Grade::Acceptable
            } else {
                Grade::HighError
            };
        }
        s
    }

    /// True when no row mismatched or went missing.
    pub fn all_passed(&self) -> bool {
        self.mismatched == 0 && self.missing == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Ground-truth rows in table order, then unverified records.
    pub verdicts: Vec<Verdict>,
    pub summary: Summary,
}

/// Compare computed records against ground truth.
///
/// Pair rows match regardless of the id order used in the table.
pub fn verify(
    records: &[MeasurementRecord],
    truth: &[GroundTruthEntry],
    options: &VerifyOptions,
) -> VerificationReport {
    let mut index: HashMap<(&str, Participants), usize> = HashMap::with_capacity(records.len());
    for (i, r) in records.iter().enumerate() {
        index.entry((r.image.as_str(), canonical(r.participants))).or_insert(i);
    }

    let mut used = vec![false; records.len()];
    let mut verdicts = Vec::with_capacity(truth.len());

    for entry in truth {
        let participants = canonical(entry.participants);
        let outcome = match index.get(&(entry.image.as_str(), participants)) {
            None => Outcome::Missing {
                expected: entry.expected,
                reason: MissingReason::NoRecord,
            },
            Some(&i) => {
                used[i] = true;
                compare(records[i].distance, entry, options)
            }
        };
        if outcome.is_failure() {
            log::warn!("{} {} {}: {}", entry.image, participants.kind(), participants, outcome);
        }
        verdicts.push(Verdict {
            image: entry.image.clone(),
            participants,
            outcome,
        });
    }

    for (record, _) in records.iter().zip(&used).filter(|(_, &u)| !u) {
        log::debug!(
            "{} {} {}: no ground truth",
            record.image,
            record.kind(),
            record.participants
        );
        verdicts.push(Verdict {
            image: record.image.clone(),
            participants: canonical(record.participants),
            outcome: Outcome::Unverified {
                computed: record.distance,
            },
        });
    }

    let summary = Summary::from_verdicts(&verdicts);
    log::info!(
        "verification: {} passed, {} mismatched, {} missing, {} unverified",
        summary.passed,
        summary.mismatched,
        summary.missing,
        summary.unverified
    );
    VerificationReport { verdicts, summary }
}

fn canonical(p: Participants) -> Participants {
    match p {
        Participants::Pair { id1, id2 } => Participants::pair(id1, id2),
        other => other,
    }
}

fn compare(computed: f64, entry: &GroundTruthEntry, options: &VerifyOptions) -> Outcome {
    let expected = entry.expected;
    if computed == 0.0 && expected != 0.0 {
        return Outcome::Missing {
            expected,
            reason: MissingReason::ZeroDistance,
        };
    }
    let tolerance = entry.tolerance.unwrap_or(options.tolerance);
    let error = computed - expected;
    if error.abs() <= tolerance {
        Outcome::Pass {
            expected,
            computed,
            error,
        }
    } else {
        Outcome::Mismatch {
            expected,
            computed,
            error,
            tolerance,
        }
    }
}
