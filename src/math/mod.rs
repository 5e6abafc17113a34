// Copyright 2016 The Cartographer Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use nalgebra::Vector2;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error of parsing a "lower,upper" range.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseClosedIntervalError(String);

impl std::error::Error for ParseClosedIntervalError {}

impl fmt::Display for ParseClosedIntervalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid interval: {}", self.0)
    }
}

impl From<std::num::ParseFloatError> for ParseClosedIntervalError {
    fn from(error: std::num::ParseFloatError) -> Self {
        ParseClosedIntervalError(error.to_string())
    }
}

/// An interval, intended to be read from a command line argument ("80,120") or a config file
/// and used as the range for randomized camera altitudes and similar parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosedInterval<T> {
    lower_bound: T,
    upper_bound: T,
}

impl<T> ClosedInterval<T>
where
    T: PartialOrd + Copy,
{
    pub fn new(lower_bound: T, upper_bound: T) -> Self {
        assert!(lower_bound <= upper_bound, "empty interval");
        ClosedInterval {
            lower_bound,
            upper_bound,
        }
    }

    pub fn contains(self, value: T) -> bool {
        self.lower_bound <= value && value <= self.upper_bound
    }

    pub fn lower_bound(self) -> T {
        self.lower_bound
    }

    pub fn upper_bound(self) -> T {
        self.upper_bound
    }

    /// Deserialized or parsed intervals bypass `new`, so callers validate with this.
    pub fn is_ordered(self) -> bool {
        self.lower_bound <= self.upper_bound
    }
}

impl<T> FromStr for ClosedInterval<T>
where
    T: std::str::FromStr,
    ParseClosedIntervalError: From<T::Err>,
{
    type Err = ParseClosedIntervalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut bounds = s.split(',').map(str::trim);
        match (bounds.next(), bounds.next(), bounds.next()) {
            (Some(lower), Some(upper), None) => Ok(ClosedInterval {
                lower_bound: lower.parse()?,
                upper_bound: upper.parse()?,
            }),
            _ => Err(ParseClosedIntervalError(format!(
                "expected \"lower,upper\", got \"{}\"",
                s
            ))),
        }
    }
}

/// Limits `value` to `[low, high]`. Expects `low <= high`.
pub fn clamp(value: f64, low: f64, high: f64) -> f64 {
    value.max(low).min(high)
}

/// Unit vector in the xy-plane for the given angle, measured counter-clockwise from +x.
pub fn direction_from_angle(angle: f64) -> Vector2<f64> {
    Vector2::new(angle.cos(), angle.sin())
}

/// Rotates `v` by 90 degrees counter-clockwise.
pub fn perpendicular(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_parse_interval() {
        let interval: ClosedInterval<f64> = "80, 120.5".parse().unwrap();
        assert_eq!(interval.lower_bound(), 80.);
        assert_eq!(interval.upper_bound(), 120.5);
        assert!(interval.contains(100.));
        assert!(!interval.contains(121.));
    }

    #[test]
    fn test_parse_interval_wrong_arity() {
        assert!("1,2,3".parse::<ClosedInterval<f64>>().is_err());
        assert!("abc,2".parse::<ClosedInterval<f64>>().is_err());
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5., 0., 1.), 1.);
        assert_eq!(clamp(-5., 0., 1.), 0.);
        assert_eq!(clamp(0.25, 0., 1.), 0.25);
    }

    #[test]
    fn test_perpendicular_is_orthogonal() {
        let d = direction_from_angle(0.7);
        assert_abs_diff_eq!(d.dot(&perpendicular(&d)), 0., epsilon = 1e-12);
        assert_abs_diff_eq!(perpendicular(&d).norm(), 1., epsilon = 1e-12);
    }
}
