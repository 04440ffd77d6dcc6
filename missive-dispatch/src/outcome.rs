//! Attempt outcome classification.
//!
//! Every candidate touched by a dispatch run yields one [`AttemptRecord`],
//! used for tracing and to build the aggregate exhaustion message. Records
//! are never persisted.

use core::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Classified result of offering a missive to one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The provider accepted the send.
    Succeeded,
    /// The provider ran and declined without raising.
    SoftFailed,
    /// The provider raised during invocation.
    HardFailed,
    /// The geographic policy denied the destination; not a failure.
    SkippedGeo,
    /// The provider identifier could not be resolved or built.
    LoadFailed,
}

impl AttemptOutcome {
    /// Skips are not failures; they never contribute to "last error".
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::SoftFailed | Self::HardFailed | Self::LoadFailed)
    }
}

impl Display for AttemptOutcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let name = match self {
            Self::Succeeded => "succeeded",
            Self::SoftFailed => "soft_failed",
            Self::HardFailed => "hard_failed",
            Self::SkippedGeo => "skipped_geo",
            Self::LoadFailed => "load_failed",
        };
        write!(fmt, "{name}")
    }
}

/// Why the geographic policy skipped a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoDebug {
    pub coverage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
}

/// One candidate's outcome within a dispatch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub provider: String,
    /// 1-based position in the candidate list.
    pub attempt: usize,
    pub outcome: AttemptOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoDebug>,
}

impl AttemptRecord {
    /// Render the record for the aggregate exhaustion message.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.error {
            Some(error) => format!("{}: {} ({error})", self.provider, self.outcome),
            None => format!("{}: {}", self.provider, self.outcome),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{AttemptOutcome, AttemptRecord};

    #[test]
    fn skips_are_not_failures() {
        assert!(!AttemptOutcome::SkippedGeo.is_failure());
        assert!(!AttemptOutcome::Succeeded.is_failure());
        assert!(AttemptOutcome::SoftFailed.is_failure());
        assert!(AttemptOutcome::LoadFailed.is_failure());
    }

    #[test]
    fn summary_includes_error_text_when_present() {
        let record = AttemptRecord {
            provider: "acme".to_string(),
            attempt: 1,
            outcome: AttemptOutcome::HardFailed,
            error: Some("timeout".to_string()),
            geo: None,
        };
        assert_eq!(record.summary(), "acme: hard_failed (timeout)");

        let skip = AttemptRecord {
            provider: "acme".to_string(),
            attempt: 2,
            outcome: AttemptOutcome::SkippedGeo,
            error: None,
            geo: None,
        };
        assert_eq!(skip.summary(), "acme: skipped_geo");
    }
}
