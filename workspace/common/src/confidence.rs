use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Model confidence as a fraction in `0.0..=1.0`.
///
/// Storage and every JSON payload carry the fraction. Percentages only
/// exist for human readable text (see the `Display` impl).
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Builds a confidence from a fraction, clamping into range. NaN becomes zero.
    pub fn from_fraction(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Builds a confidence from a percentage such as `87.5`.
    pub fn from_percent(value: f64) -> Self {
        Self::from_fraction(value / 100.0)
    }

    pub fn fraction(self) -> f64 {
        self.0
    }

    /// Percentage rounded to one decimal place.
    pub fn percent(self) -> f64 {
        (self.0 * 1000.0).round() / 10.0
    }
}

impl From<Confidence> for f64 {
    fn from(value: Confidence) -> Self {
        value.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Confidence::from_fraction(1.7).fraction(), 1.0);
        assert_eq!(Confidence::from_fraction(-0.2).fraction(), 0.0);
        assert_eq!(Confidence::from_fraction(f64::NAN).fraction(), 0.0);
    }

    #[test]
    fn converts_percentages() {
        let confidence = Confidence::from_percent(87.5);
        assert!((confidence.fraction() - 0.875).abs() < 1e-9);
        assert_eq!(confidence.percent(), 87.5);
        assert_eq!(confidence.to_string(), "87.5%");
    }

    #[test]
    fn serializes_as_bare_fraction() {
        let json = serde_json::to_string(&Confidence::from_fraction(0.723)).unwrap();
        assert_eq!(json, "0.723");
    }
}
