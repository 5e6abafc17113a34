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

use crate::errors::*;
use crate::math::clamp;
use crate::terrain::ElevationField;
use nalgebra::{Point2, Vector2};
use serde_derive::{Deserialize, Serialize};

/// How the gap between two rows of groups reacts to the terrain in front of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingAdaptation {
    /// Half the distance between the samples of the finite difference.
    pub sample_radius: f64,
    /// Rows advancing straight up-slope get `1 + direction_gain` times the spacing, rows
    /// advancing straight down-slope `1 - direction_gain`.
    pub direction_gain: f64,
    /// Extra spacing per radian of inclination, before clamping.
    pub slope_gain: f64,
    pub min_factor: f64,
    pub max_factor: f64,
}

impl Default for SpacingAdaptation {
    fn default() -> Self {
        SpacingAdaptation {
            sample_radius: 2.,
            direction_gain: 0.15,
            slope_gain: 0.2,
            min_factor: 1.,
            max_factor: 1.5,
        }
    }
}

impl SpacingAdaptation {
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_radius > 0. && self.sample_radius.is_finite()) {
            return invalid_config("spacing.sample_radius", "must be finite and positive");
        }
        if !(0. ..1.).contains(&self.direction_gain) {
            return invalid_config("spacing.direction_gain", "must be in [0, 1)");
        }
        if !(self.slope_gain >= 0. && self.slope_gain.is_finite()) {
            return invalid_config("spacing.slope_gain", "must be finite and not negative");
        }
        if !(self.min_factor > 0. && self.min_factor.is_finite()) {
            return invalid_config("spacing.min_factor", "must be finite and positive");
        }
        if !self.max_factor.is_finite() {
            return invalid_config("spacing.max_factor", "must be finite");
        }
        if !(self.min_factor <= self.max_factor) {
            return invalid_config(
                "spacing.max_factor",
                format!("must be at least min_factor ({})", self.min_factor),
            );
        }
        Ok(())
    }

    pub fn direction_factor(&self, uphill: Option<Vector2<f64>>, advance: &Vector2<f64>) -> f64 {
        match uphill {
            Some(uphill) => 1. + self.direction_gain * uphill.dot(advance),
            None => 1.,
        }
    }

    pub fn slope_factor(&self, slope_angle: f64) -> f64 {
        clamp(
            1. + self.slope_gain * slope_angle.abs(),
            self.min_factor,
            self.max_factor,
        )
    }

    /// Gap between the row anchored at `anchor` and the next row in direction `advance`
    /// (a unit vector).
    pub fn row_spacing(
        &self,
        terrain: &ElevationField,
        anchor: &Point2<f64>,
        advance: &Vector2<f64>,
        base_spacing: f64,
    ) -> f64 {
        let slope = terrain.slope(anchor.x, anchor.y, self.sample_radius);
        base_spacing * self.direction_factor(slope.uphill, advance) * self.slope_factor(slope.angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_flat_terrain_keeps_base_spacing() {
        let adaptation = SpacingAdaptation::default();
        let spacing = adaptation.row_spacing(
            &ElevationField::flat(3.),
            &Point2::new(5., 5.),
            &Vector2::new(0., 1.),
            4.,
        );
        assert_abs_diff_eq!(spacing, 4., epsilon = 1e-12);
    }

    #[test]
    fn test_uphill_rows_are_farther_apart() {
        let adaptation = SpacingAdaptation::default();
        let terrain = ElevationField::planar(0., 0., 0.3);
        let anchor = Point2::new(0., 0.);
        let up = adaptation.row_spacing(&terrain, &anchor, &Vector2::new(0., 1.), 4.);
        let down = adaptation.row_spacing(&terrain, &anchor, &Vector2::new(0., -1.), 4.);
        let across = adaptation.row_spacing(&terrain, &anchor, &Vector2::new(1., 0.), 4.);
        assert!(up > across);
        assert!(across > down);
        let slope_factor = 1. + 0.2 * 0.3f64.atan();
        assert_abs_diff_eq!(up, 4. * 1.15 * slope_factor, epsilon = 1e-9);
        assert_abs_diff_eq!(down, 4. * 0.85 * slope_factor, epsilon = 1e-9);
    }

    #[test]
    fn test_slope_factor_is_clamped() {
        let adaptation = SpacingAdaptation {
            slope_gain: 10.,
            ..Default::default()
        };
        assert_eq!(adaptation.slope_factor(1.4), adaptation.max_factor);
        assert_eq!(adaptation.slope_factor(0.), adaptation.min_factor);
    }

    #[test]
    fn test_validate_names_parameter() {
        let adaptation = SpacingAdaptation {
            min_factor: 2.,
            max_factor: 1.,
            ..Default::default()
        };
        match adaptation.validate().unwrap_err().kind() {
            ErrorKind::InvalidConfiguration(parameter, _) => {
                assert_eq!(parameter, "spacing.max_factor")
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    fn rejected_parameter(adaptation: SpacingAdaptation) -> String {
        match adaptation.validate().unwrap_err().kind() {
            ErrorKind::InvalidConfiguration(parameter, _) => parameter.clone(),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_non_finite_values() {
        let inf = std::f64::INFINITY;
        let cases = vec![
            (
                SpacingAdaptation {
                    sample_radius: inf,
                    ..Default::default()
                },
                "spacing.sample_radius",
            ),
            (
                SpacingAdaptation {
                    direction_gain: std::f64::NAN,
                    ..Default::default()
                },
                "spacing.direction_gain",
            ),
            (
                SpacingAdaptation {
                    slope_gain: inf,
                    ..Default::default()
                },
                "spacing.slope_gain",
            ),
            (
                SpacingAdaptation {
                    min_factor: inf,
                    max_factor: inf,
                    ..Default::default()
                },
                "spacing.min_factor",
            ),
            (
                SpacingAdaptation {
                    max_factor: inf,
                    ..Default::default()
                },
                "spacing.max_factor",
            ),
        ];
        for (adaptation, parameter) in cases {
            assert_eq!(rejected_parameter(adaptation), parameter);
        }
    }
}
