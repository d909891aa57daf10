//! Per-core utilization samples as delivered by the `/api/cpus` stream.

use thiserror::Error;

/// A payload that could not be turned into a [`Sample`].
#[derive(Error, Debug)]
pub enum SampleError {
    /// Not JSON, or JSON that is not an array of numbers
    #[error("malformed sample: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One message worth of CPU usage, one percentage per core.
///
/// Position is core identity. Values are kept exactly as received, so a
/// misbehaving server can send numbers outside `0..=100`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    cores: Vec<f64>,
}

impl Sample {
    pub fn new(cores: Vec<f64>) -> Self {
        Self { cores }
    }

    /// Parse an event payload such as `[12.5, 88.0, 3.2]`.
    pub fn from_json(data: &str) -> Result<Self, SampleError> {
        let cores: Vec<f64> = serde_json::from_str(data)?;
        Ok(Self { cores })
    }

    pub fn cores(&self) -> &[f64] {
        &self.cores
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// Mean usage across all cores, 0 when there are none.
    pub fn average(&self) -> f64 {
        if self.cores.is_empty() {
            0.0
        } else {
            self.cores.iter().sum::<f64>() / self.cores.len() as f64
        }
    }
}
