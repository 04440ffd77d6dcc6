//! Confidence normalization.
//!
//! Every geocoding vendor scores matches on its own scale (percentages,
//! 0-10 grades, importance heuristics). The canonical result carries one
//! `[0, 1]` confidence, so each backend declares its raw scale and the
//! engine maps linearly through it.

/// A backend's raw confidence scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfidenceScale {
    /// Already `[0, 1]`.
    Unit,
    /// `[0, 100]` percentages.
    Percent,
    /// `[0, 10]` grades.
    ZeroToTen,
    /// Any other linear scale with a known upper bound.
    BoundedAt(f64),
}

impl ConfidenceScale {
    /// Map a raw score onto `[0, 1]`, clamping out-of-range inputs.
    #[must_use]
    pub fn normalize(self, raw: f64) -> f64 {
        let scaled = match self {
            Self::Unit => raw,
            Self::Percent => raw / 100.0,
            Self::ZeroToTen => raw / 10.0,
            Self::BoundedAt(bound) => {
                if bound > 0.0 {
                    raw / bound
                } else {
                    0.0
                }
            }
        };

        scaled.clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn normalize_opt(self, raw: Option<f64>) -> Option<f64> {
        raw.map(|value| self.normalize(value))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::ConfidenceScale;

    #[test]
    fn every_scale_lands_in_the_unit_interval() {
        assert_eq!(ConfidenceScale::Unit.normalize(0.9), 0.9);
        assert_eq!(ConfidenceScale::Percent.normalize(85.0), 0.85);
        assert_eq!(ConfidenceScale::ZeroToTen.normalize(6.0), 0.6);
        assert_eq!(ConfidenceScale::BoundedAt(5.0).normalize(2.5), 0.5);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        assert_eq!(ConfidenceScale::Unit.normalize(1.7), 1.0);
        assert_eq!(ConfidenceScale::Percent.normalize(-3.0), 0.0);
        assert_eq!(ConfidenceScale::BoundedAt(0.0).normalize(4.0), 0.0);
    }

    #[test]
    fn absent_scores_stay_absent() {
        assert_eq!(ConfidenceScale::Percent.normalize_opt(None), None);
        assert_eq!(ConfidenceScale::Percent.normalize_opt(Some(50.0)), Some(0.5));
    }
}
