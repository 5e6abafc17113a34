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

//! Keeps a circle of radius r' in the narrower field of view of the image. The distance and the
//! field of view are linked by `r' = d * sin(fov_narrow / 2)`; given one, we solve the other.

use crate::errors::*;
use serde_derive::{Deserialize, Serialize};
use std::f64::consts::PI;

/// What stays fixed for one view. The other quantity is solved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Framing {
    /// Vertical field of view in radians; the distance is solved.
    FixedFov { fov_y: f64 },
    /// Distance between eye and target; the field of view is solved.
    FixedDistance { distance: f64 },
    /// Height of the eye above the target; the field of view is solved.
    FixedAltitude { altitude: f64 },
}

/// Horizontal field of view for a vertical one at the given width / height ratio.
pub fn horizontal_fov(fov_y: f64, aspect: f64) -> f64 {
    2. * ((fov_y / 2.).tan() * aspect).atan()
}

/// The narrower of the horizontal and vertical field of view.
pub fn narrow_fov(fov_y: f64, aspect: f64) -> f64 {
    fov_y.min(horizontal_fov(fov_y, aspect))
}

/// Inverse of `narrow_fov`.
pub fn fov_y_from_narrow(narrow: f64, aspect: f64) -> f64 {
    if aspect >= 1. {
        narrow
    } else {
        2. * ((narrow / 2.).tan() / aspect).atan()
    }
}

/// Distance at which a circle of `radius` exactly fills the narrow field of view.
pub fn distance_for_fov(radius: f64, narrow: f64) -> f64 {
    radius / (narrow / 2.).sin()
}

/// The vertical field of view needed to frame `radius` from `distance`. Fails if no field of
/// view up to `max_fov` suffices.
pub fn fov_for_distance(radius: f64, distance: f64, aspect: f64, max_fov: f64) -> Result<f64> {
    if radius >= distance {
        return Err(ErrorKind::FramingInfeasible(180., max_fov.to_degrees()).into());
    }
    let narrow = 2. * (radius / distance).asin();
    let fov_y = fov_y_from_narrow(narrow, aspect);
    let required = fov_y.max(narrow);
    if required > max_fov {
        return Err(
            ErrorKind::FramingInfeasible(required.to_degrees(), max_fov.to_degrees()).into(),
        );
    }
    Ok(fov_y)
}

pub fn validate_fov(parameter: &str, fov: f64, max_fov: f64) -> Result<()> {
    if !(fov > 0. && fov <= max_fov && fov < PI) {
        return invalid_config(
            parameter,
            format!(
                "{:.1}° is outside (0°, {:.1}°]",
                fov.to_degrees(),
                max_fov.to_degrees()
            ),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_distance_and_fov_are_inverse() {
        let radius = 120.;
        let fov_y = 50f64.to_radians();
        for &aspect in &[0.5, 1., 16. / 9.] {
            let narrow = narrow_fov(fov_y, aspect);
            let distance = distance_for_fov(radius, narrow);
            let solved = fov_for_distance(radius, distance, aspect, PI).unwrap();
            assert_abs_diff_eq!(solved, fov_y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_radius_beyond_distance_is_infeasible() {
        let max_fov = 170f64.to_radians();
        match fov_for_distance(7071.1, 1., 1., max_fov).unwrap_err().kind() {
            ErrorKind::FramingInfeasible(required, max) => {
                assert!(*required > *max);
                assert_abs_diff_eq!(*max, 170., epsilon = 1e-9);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_wide_but_bounded_fov_is_infeasible() {
        // sin(87.5°) ≈ 0.99905, i.e. 175° is needed.
        let max_fov = 170f64.to_radians();
        assert!(fov_for_distance(0.99905, 1., 1., max_fov).is_err());
        assert!(fov_for_distance(0.9, 1., 1., max_fov).is_ok());
    }

    #[test]
    fn test_narrow_fov_is_horizontal_for_portrait_images() {
        let fov_y = 60f64.to_radians();
        assert!(narrow_fov(fov_y, 0.5) < fov_y);
        assert_eq!(narrow_fov(fov_y, 2.), fov_y);
        assert_abs_diff_eq!(
            fov_y_from_narrow(narrow_fov(fov_y, 0.5), 0.5),
            fov_y,
            epsilon = 1e-12
        );
    }
}
