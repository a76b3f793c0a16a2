use std::fmt;

use serde::{Deserialize, Serialize};

/// The two distance semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MeasurementKind {
    /// Pupillary distance within one individual.
    Individual,
    /// Right-eye-to-right-eye distance between two individuals.
    Pair,
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementKind::Individual => f.write_str("Individual"),
            MeasurementKind::Pair => f.write_str("Pair"),
        }
    }
}

/// Who a measurement is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Participants {
    Individual { id: u32 },
    /// Always stored with `id1 < id2`.
    Pair { id1: u32, id2: u32 },
}

impl Participants {
    /// Pair participants in canonical ascending order.
    pub fn pair(a: u32, b: u32) -> Self {
        Participants::Pair {
            id1: a.min(b),
            id2: a.max(b),
        }
    }

    pub fn kind(&self) -> MeasurementKind {
        match self {
            Participants::Individual { .. } => MeasurementKind::Individual,
            Participants::Pair { .. } => MeasurementKind::Pair,
        }
    }
}

impl fmt::Display for Participants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participants::Individual { id } => write!(f, "{}", id),
            Participants::Pair { id1, id2 } => write!(f, "{}-{}", id1, id2),
        }
    }
}

/// One computed distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub image: String,
    #[serde(flatten)]
    pub participants: Participants,
    /// Distance in pixels.
    pub distance: f64,
}

impl MeasurementRecord {
    pub fn kind(&self) -> MeasurementKind {
        self.participants.kind()
    }
}
