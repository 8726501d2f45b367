//! Positive finite tempo definition.

use serde::Serialize;
use thiserror::Error;

/// Beats per minute. It holds only a finite value greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Bpm(f64);

impl Eq for Bpm {}
impl PartialOrd for Bpm {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Bpm {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<Bpm> for f64 {
    fn from(value: Bpm) -> Self {
        value.as_f64()
    }
}

/// Error type for `Bpm::try_from`, the tempo was zero, negative or not finite.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("tempo must be a positive finite number: {0}")]
pub struct InvalidBpmError(pub f64);

impl TryFrom<f64> for Bpm {
    type Error = InvalidBpmError;
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        (value.is_finite() && value > 0.0)
            .then_some(Self(value))
            .ok_or(InvalidBpmError(value))
    }
}

impl std::fmt::Display for Bpm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Bpm {
    /// Creates a new `Bpm` if `value` is finite and positive, otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Gets the internal value.
    #[inline]
    #[must_use]
    pub const fn as_f64(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_and_non_finite() {
        assert_eq!(Bpm::try_from(0.0), Err(InvalidBpmError(0.0)));
        assert_eq!(Bpm::try_from(-120.0), Err(InvalidBpmError(-120.0)));
        assert!(Bpm::new(f64::INFINITY).is_none());
        assert!(Bpm::new(f64::NAN).is_none());
        assert_eq!(Bpm::new(150.5).map(Bpm::as_f64), Some(150.5));
    }

    #[test]
    fn displays_like_float() {
        assert_eq!(Bpm::new(120.0).unwrap().to_string(), "120");
        assert_eq!(Bpm::new(97.5).unwrap().to_string(), "97.5");
    }
}
