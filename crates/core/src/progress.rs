//! Progress percent and coarse stage reporting for a generation.

use std::fmt;

use serde::Serialize;

/// Coarse, user-facing phase of a generation derived from its percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    /// Accepted by the service but no progress reported yet (0%).
    Queued,
    /// 1-89%.
    Generating,
    /// 90-99%.
    Finalizing,
    /// Video downloaded (100%).
    Complete,
}

impl GenerationStage {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            0 => Self::Queued,
            1..=89 => Self::Generating,
            90..=99 => Self::Finalizing,
            _ => Self::Complete,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Queued => "Waiting in queue",
            Self::Generating => "Generating video",
            Self::Finalizing => "Finalizing video",
            Self::Complete => "Complete",
        }
    }
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Convert a raw metadata value into a 0-100 percent.
///
/// Non-finite input maps to 0; everything else is rounded and clamped.
pub fn clamp_percent(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// A single progress report emitted while a generation is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub percent: u8,
    pub stage: GenerationStage,
    /// Live preview frame, when the service supplies one.
    pub preview: Option<Vec<u8>>,
}

impl ProgressUpdate {
    pub fn new(percent: u8) -> Self {
        let percent = percent.min(100);
        Self {
            percent,
            stage: GenerationStage::from_percent(percent),
            preview: None,
        }
    }

    pub fn complete() -> Self {
        Self::new(100)
    }

    pub fn with_preview(mut self, preview: Option<Vec<u8>>) -> Self {
        self.preview = preview;
        self
    }
}
