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
use nalgebra::Point2;
use serde_derive::{Deserialize, Serialize};

/// How far piles may stick out of the ground, and how level the tops of a group must be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposedHeight {
    pub min_exposed: f64,
    pub max_exposed: f64,
    pub default_exposed: f64,
    pub coplanarity_tolerance: f64,
}

impl Default for ExposedHeight {
    fn default() -> Self {
        ExposedHeight {
            min_exposed: 0.3,
            max_exposed: 1.0,
            default_exposed: 0.65,
            coplanarity_tolerance: 0.04,
        }
    }
}

impl ExposedHeight {
    pub fn validate(&self) -> Result<()> {
        if !self.min_exposed.is_finite() || self.min_exposed < 0. {
            return invalid_config("exposed.min_exposed", "must be finite and not negative");
        }
        if !self.max_exposed.is_finite() {
            return invalid_config("exposed.max_exposed", "must be finite");
        }
        if self.min_exposed > self.max_exposed {
            return invalid_config(
                "exposed.min_exposed",
                format!(
                    "{} is larger than max_exposed ({})",
                    self.min_exposed, self.max_exposed
                ),
            );
        }
        if !(self.min_exposed..=self.max_exposed).contains(&self.default_exposed) {
            return invalid_config(
                "exposed.default_exposed",
                format!(
                    "{} is outside [{}, {}]",
                    self.default_exposed, self.min_exposed, self.max_exposed
                ),
            );
        }
        if !(self.coplanarity_tolerance >= 0.) || !self.coplanarity_tolerance.is_finite() {
            return invalid_config(
                "exposed.coplanarity_tolerance",
                "must be finite and not negative",
            );
        }
        Ok(())
    }

    /// Solves the exposed heights for piles standing at `positions` so that their tops meet
    /// one common plane, as far as the exposed range allows.
    pub fn solve(&self, terrain: &ElevationField, positions: &[Point2<f64>]) -> GroupTops {
        let base_z: Vec<f64> = positions.iter().map(|p| terrain.height_at(p)).collect();
        if base_z.is_empty() {
            return GroupTops {
                target_top_elevation: terrain.height(0., 0.) + self.default_exposed,
                base_z,
                exposed_heights: Vec::new(),
                max_residual: 0.,
                top_spread: 0.,
            };
        }
        let mean = base_z.iter().sum::<f64>() / base_z.len() as f64;
        let target_top_elevation = mean + self.default_exposed;

        let mut exposed_heights = Vec::with_capacity(base_z.len());
        let mut max_residual: f64 = 0.;
        let mut min_top = std::f64::INFINITY;
        let mut max_top = std::f64::NEG_INFINITY;
        for &z in &base_z {
            let unclamped = target_top_elevation - z;
            let exposed = clamp(unclamped, self.min_exposed, self.max_exposed);
            max_residual = max_residual.max((exposed - unclamped).abs());
            min_top = min_top.min(z + exposed);
            max_top = max_top.max(z + exposed);
            exposed_heights.push(exposed);
        }
        GroupTops {
            target_top_elevation,
            base_z,
            exposed_heights,
            max_residual,
            top_spread: max_top - min_top,
        }
    }
}

/// Result of the coplanarity solve for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTops {
    pub target_top_elevation: f64,
    pub base_z: Vec<f64>,
    pub exposed_heights: Vec<f64>,
    /// Largest amount by which clamping moved a top away from the target plane.
    pub max_residual: f64,
    /// Difference between the highest and the lowest top.
    pub top_spread: f64,
}

impl GroupTops {
    pub fn is_degenerate(&self, tolerance: f64) -> bool {
        self.max_residual > tolerance || self.top_spread > tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerraceAxis;
    use approx::assert_abs_diff_eq;

    fn grid(spacing: f64) -> Vec<Point2<f64>> {
        (0..10)
            .map(|i| Point2::new((i % 5) as f64 * spacing, (i / 5) as f64 * spacing))
            .collect()
    }

    #[test]
    fn test_gentle_slope_is_coplanar() {
        let exposed = ExposedHeight::default();
        let tops = exposed.solve(&ElevationField::planar(10., 0.02, 0.01), &grid(3.6));
        assert!(!tops.is_degenerate(exposed.coplanarity_tolerance));
        assert_abs_diff_eq!(tops.max_residual, 0., epsilon = 1e-12);
        for (z, h) in tops.base_z.iter().zip(&tops.exposed_heights) {
            assert_abs_diff_eq!(z + h, tops.target_top_elevation, epsilon = 1e-9);
            assert!(*h >= exposed.min_exposed && *h <= exposed.max_exposed);
        }
    }

    #[test]
    fn test_terrace_step_inside_group_is_degenerate() {
        let exposed = ExposedHeight::default();
        let terrain = ElevationField::terraced(0., 2., 7., TerraceAxis::Along { angle: 0. });
        let tops = exposed.solve(&terrain, &grid(3.6));
        assert!(tops.is_degenerate(exposed.coplanarity_tolerance));
        assert!(tops.max_residual > 0.5);
        for h in &tops.exposed_heights {
            assert!(*h >= exposed.min_exposed && *h <= exposed.max_exposed);
        }
    }

    #[test]
    fn test_validate_default_outside_range() {
        let exposed = ExposedHeight {
            default_exposed: 1.5,
            ..Default::default()
        };
        match exposed.validate().unwrap_err().kind() {
            ErrorKind::InvalidConfiguration(parameter, _) => {
                assert_eq!(parameter, "exposed.default_exposed")
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
