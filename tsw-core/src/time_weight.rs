//! Time-weight strategies
//!
//! A strategy turns the elapsed-time deltas of the two events being paired,
//! plus the request's time-penalty parameter `T`, into a factor in `[0, 1]`
//! that scales their category similarity.
//!
//! The method name given by the caller is resolved to a [`TimeWeightMethod`]
//! once per request; the matrix fill is generic over [`TimeWeight`] so the
//! per-cell call is statically dispatched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{TswError, TswResult};

/// Floor for the denominator of proportional differences
pub const EPSILON: f64 = 1e-9;

/// Capability shared by all time-weight strategies
pub trait TimeWeight {
    /// Weight for pairing an s1 event with delta `dt1` and an s2 event with
    /// delta `dt2` under time-penalty parameter `t`
    fn weight(&self, dt1: f64, dt2: f64, t: f64) -> f64;

    fn name(&self) -> &'static str;
}

/// `1 - T * |dt1 - dt2| / max(|dt1|, |dt2|)`, clamped to `[0, 1]`
#[derive(Debug, Clone, Copy, Default)]
pub struct PropDiff;

impl TimeWeight for PropDiff {
    #[inline]
    fn weight(&self, dt1: f64, dt2: f64, t: f64) -> f64 {
        let scale = dt1.abs().max(dt2.abs()).max(EPSILON);
        clamp_unit(1.0 - t * (dt1 - dt2).abs() / scale)
    }

    fn name(&self) -> &'static str {
        "PropDiff"
    }
}

/// `1 - T * |dt1 - dt2|`, clamped to `[0, 1]`
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsDiff;

impl TimeWeight for AbsDiff {
    #[inline]
    fn weight(&self, dt1: f64, dt2: f64, t: f64) -> f64 {
        clamp_unit(1.0 - t * (dt1 - dt2).abs())
    }

    fn name(&self) -> &'static str {
        "AbsDiff"
    }
}

/// Ignores timing altogether
#[derive(Debug, Clone, Copy, Default)]
pub struct Uniform;

impl TimeWeight for Uniform {
    #[inline]
    fn weight(&self, _dt1: f64, _dt2: f64, _t: f64) -> f64 {
        1.0
    }

    fn name(&self) -> &'static str {
        "Uniform"
    }
}

/// Closed set of registered strategies, selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeWeightMethod {
    #[default]
    PropDiff,
    AbsDiff,
    Uniform,
}

impl TimeWeightMethod {
    pub const ALL: [TimeWeightMethod; 3] = [
        TimeWeightMethod::PropDiff,
        TimeWeightMethod::AbsDiff,
        TimeWeightMethod::Uniform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWeightMethod::PropDiff => PropDiff.name(),
            TimeWeightMethod::AbsDiff => AbsDiff.name(),
            TimeWeightMethod::Uniform => Uniform.name(),
        }
    }
}

impl FromStr for TimeWeightMethod {
    type Err = TswError;

    fn from_str(s: &str) -> TswResult<Self> {
        let name = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
                TswError::invalid_parameter(format!(
                    "unknown time-weight method '{}' (known: {})",
                    name,
                    known.join(", ")
                ))
            })
    }
}

impl fmt::Display for TimeWeightMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[inline]
fn clamp_unit(w: f64) -> f64 {
    w.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_prop_diff_identical_times() {
        assert!(close(PropDiff.weight(14.0, 14.0, 0.5), 1.0));
        assert!(close(PropDiff.weight(0.0, 0.0, 0.5), 1.0));
    }

    #[test]
    fn test_prop_diff_divergent_times() {
        // |1 - 10| / 10 = 0.9
        assert!(close(PropDiff.weight(1.0, 10.0, 0.5), 0.55));
        // one side zero: full proportional divergence
        assert!(close(PropDiff.weight(1.0, 0.0, 0.5), 0.5));
    }

    #[test]
    fn test_prop_diff_is_clamped() {
        assert_eq!(PropDiff.weight(1.0, 10.0, 5.0), 0.0);
        assert_eq!(PropDiff.weight(3.0, 3.0, -2.0), 1.0);
    }

    #[test]
    fn test_abs_diff() {
        assert!(close(AbsDiff.weight(2.0, 3.0, 0.25), 0.75));
        assert_eq!(AbsDiff.weight(0.0, 30.0, 0.25), 0.0);
    }

    #[test]
    fn test_uniform_ignores_time() {
        assert_eq!(Uniform.weight(0.0, 1000.0, 10.0), 1.0);
    }

    #[test]
    fn test_method_from_name() {
        assert_eq!("PropDiff".parse::<TimeWeightMethod>().unwrap(), TimeWeightMethod::PropDiff);
        assert_eq!("absdiff".parse::<TimeWeightMethod>().unwrap(), TimeWeightMethod::AbsDiff);
        assert!(matches!(
            "Quadratic".parse::<TimeWeightMethod>(),
            Err(TswError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_method_display_roundtrip() {
        for method in TimeWeightMethod::ALL {
            assert_eq!(method.to_string().parse::<TimeWeightMethod>().unwrap(), method);
        }
    }
}
