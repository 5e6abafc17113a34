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
use crate::geometry::Aabb;
use crate::math::ClosedInterval;
use crate::scene::Intrinsics;
use crate::tolerance::{Stream, ToleranceSampler};
use nalgebra::{
    Isometry3, Matrix3, Point2, Point3, Rotation3, Translation3, Unit, UnitQuaternion, Vector3,
};
use serde_derive::{Deserialize, Serialize};
use std::f64::consts::PI;

mod framing;
mod look_at;

pub use framing::{
    distance_for_fov, fov_for_distance, fov_y_from_narrow, horizontal_fov, narrow_fov,
    validate_fov, Framing,
};
pub use look_at::{look_at, ViewFrame, PARALLEL_UP_THRESHOLD};

/// A solved camera. `forward` and `up` are orthonormal; the camera sees along `forward`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Point3<f64>,
    pub forward: Vector3<f64>,
    pub up: Vector3<f64>,
    /// Vertical field of view in radians.
    pub fov_y: f64,
    /// Distance from `position` to the framed target.
    pub distance: f64,
}

impl CameraPose {
    pub fn right(&self) -> Vector3<f64> {
        self.forward.cross(&self.up)
    }

    /// Camera frame as seen by the renderer: looking down -z with +y up.
    pub fn world_from_camera(&self) -> Isometry3<f64> {
        let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[
            self.right(),
            self.up,
            -self.forward,
        ]));
        Isometry3::from_parts(
            Translation3::from(self.position.coords),
            UnitQuaternion::from_rotation_matrix(&rotation),
        )
    }

    /// Pixel coordinates of `p` (x to the right, y down, origin in the top left corner), or
    /// `None` for points behind the camera.
    pub fn project(&self, p: &Point3<f64>, intrinsics: &Intrinsics) -> Option<Point2<f64>> {
        let in_camera = self.world_from_camera().inverse_transform_point(p);
        let depth = -in_camera.z;
        if depth <= 0. {
            return None;
        }
        let focal_length = intrinsics.focal_length(self.fov_y);
        Some(Point2::new(
            f64::from(intrinsics.width) / 2. + focal_length * in_camera.x / depth,
            f64::from(intrinsics.height) / 2. - focal_length * in_camera.y / depth,
        ))
    }
}

/// How the views of one scene keep the layout in frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FramingMode {
    Fov { fov_y_deg: f64 },
    Distance { distance: f64 },
    /// Every view draws its altitude above the target from this range.
    Altitude { altitude: ClosedInterval<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub num_views: usize,
    /// Angle of the view direction above the horizon; 90 looks straight down.
    pub elevation_deg: f64,
    pub azimuth_offset_deg: f64,
    pub azimuth_jitter_deg: f64,
    pub framing: FramingMode,
    /// The footprint's bounding circle grows by this fraction before framing.
    pub margin: f64,
    pub max_fov_deg: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            num_views: 4,
            elevation_deg: 60.,
            azimuth_offset_deg: 45.,
            azimuth_jitter_deg: 5.,
            framing: FramingMode::Fov { fov_y_deg: 60. },
            margin: 0.1,
            max_fov_deg: 170.,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.elevation_deg > 0. && self.elevation_deg <= 90.) {
            return invalid_config(
                "camera.elevation_deg",
                format!("{} is outside (0, 90]", self.elevation_deg),
            );
        }
        if !self.azimuth_offset_deg.is_finite() {
            return invalid_config("camera.azimuth_offset_deg", "must be finite");
        }
        if !(self.azimuth_jitter_deg >= 0. && self.azimuth_jitter_deg.is_finite()) {
            return invalid_config("camera.azimuth_jitter_deg", "must be finite and not negative");
        }
        if !(self.margin >= 0. && self.margin.is_finite()) {
            return invalid_config("camera.margin", "must be finite and not negative");
        }
        if !(self.max_fov_deg > 0. && self.max_fov_deg < 180.) {
            return invalid_config(
                "camera.max_fov_deg",
                format!("{} is outside (0, 180)", self.max_fov_deg),
            );
        }
        match &self.framing {
            FramingMode::Fov { fov_y_deg } => validate_fov(
                "camera.framing.fov_y_deg",
                fov_y_deg.to_radians(),
                self.max_fov(),
            ),
            FramingMode::Distance { distance } => {
                if !(*distance > 0. && distance.is_finite()) {
                    return invalid_config("camera.framing.distance", "must be positive");
                }
                Ok(())
            }
            FramingMode::Altitude { altitude } => {
                if !altitude.is_ordered()
                    || !(altitude.lower_bound() > 0.)
                    || !altitude.upper_bound().is_finite()
                {
                    return invalid_config(
                        "camera.framing.altitude",
                        "must be a finite positive range with lower <= upper",
                    );
                }
                Ok(())
            }
        }
    }

    pub fn max_fov(&self) -> f64 {
        self.max_fov_deg.to_radians()
    }

    fn elevation(&self) -> f64 {
        self.elevation_deg.to_radians()
    }
}

/// Unit vector from the target towards the eye.
pub fn eye_direction(azimuth: f64, elevation: f64) -> Unit<Vector3<f64>> {
    let (sin_e, cos_e) = elevation.sin_cos();
    Unit::new_normalize(Vector3::new(
        cos_e * azimuth.cos(),
        cos_e * azimuth.sin(),
        sin_e,
    ))
}

/// Solves one view of the center of `bounds` from `eye_direction`. The bounding sphere of
/// `bounds`, grown by the margin, stays inside the image.
pub fn solve_view(
    bounds: &Aabb,
    eye_direction: &Unit<Vector3<f64>>,
    framing: Framing,
    intrinsics: &Intrinsics,
    config: &CameraConfig,
) -> Result<CameraPose> {
    let aspect = intrinsics.aspect();
    let target = bounds.center();
    let radius = bounds.bounding_radius() * (1. + config.margin);
    let max_fov = config.max_fov();
    let (distance, fov_y) = match framing {
        Framing::FixedFov { fov_y } => {
            validate_fov("camera.framing.fov_y", fov_y, max_fov)?;
            (distance_for_fov(radius, narrow_fov(fov_y, aspect)), fov_y)
        }
        Framing::FixedDistance { distance } => {
            (distance, fov_for_distance(radius, distance, aspect, max_fov)?)
        }
        Framing::FixedAltitude { altitude } => {
            if eye_direction.z <= 0. {
                return invalid_config(
                    "camera.elevation_deg",
                    "a fixed altitude needs a view from above",
                );
            }
            let distance = altitude / eye_direction.z;
            (distance, fov_for_distance(radius, distance, aspect, max_fov)?)
        }
    };
    let position = target + eye_direction.into_inner() * distance;
    let frame = look_at(&position, &target)?;
    Ok(CameraPose {
        position,
        forward: frame.forward,
        up: frame.up,
        fov_y,
        distance,
    })
}

/// Views around the center of `bounds`, evenly spread in azimuth plus a bounded jitter. Camera
/// randomness comes from its own stream of `seed`.
pub fn solve_orbit(
    bounds: &Aabb,
    config: &CameraConfig,
    intrinsics: &Intrinsics,
    seed: u64,
) -> Result<Vec<CameraPose>> {
    config.validate()?;
    intrinsics.validate()?;
    let mut sampler = ToleranceSampler::for_stream(seed, Stream::Camera);
    let elevation = config.elevation();
    let mut poses = Vec::with_capacity(config.num_views);
    for i in 0..config.num_views {
        let azimuth = config.azimuth_offset_deg.to_radians()
            + i as f64 * 2. * PI / config.num_views as f64
            + sampler.symmetric(config.azimuth_jitter_deg.to_radians());
        let framing = match &config.framing {
            FramingMode::Fov { fov_y_deg } => Framing::FixedFov {
                fov_y: fov_y_deg.to_radians(),
            },
            FramingMode::Distance { distance } => Framing::FixedDistance {
                distance: *distance,
            },
            FramingMode::Altitude { altitude } => Framing::FixedAltitude {
                altitude: sampler.in_interval(*altitude),
            },
        };
        poses.push(solve_view(
            bounds,
            &eye_direction(azimuth, elevation),
            framing,
            intrinsics,
            config,
        )?);
    }
    Ok(poses)
}
