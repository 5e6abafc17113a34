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
use nalgebra::{Point3, Vector3};

/// Above this |cos| between the view direction and +Z the world up is too close to parallel to
/// give a stable cross product, and +Y is used instead.
pub const PARALLEL_UP_THRESHOLD: f64 = 0.98;

const COINCIDENT_EPSILON: f64 = 1e-9;

/// Orthonormal view frame: `right = forward × up` with `up` pointing into the upper image half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFrame {
    pub forward: Vector3<f64>,
    pub right: Vector3<f64>,
    pub up: Vector3<f64>,
}

pub fn look_at(eye: &Point3<f64>, target: &Point3<f64>) -> Result<ViewFrame> {
    let direction = target - eye;
    let norm = direction.norm();
    if !(norm > COINCIDENT_EPSILON) {
        return invalid_config("camera.position", "eye and target coincide");
    }
    let forward = direction / norm;
    let reference = if forward.dot(&Vector3::z()).abs() > PARALLEL_UP_THRESHOLD {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let right = forward.cross(&reference).normalize();
    let up = right.cross(&forward);
    Ok(ViewFrame { forward, right, up })
}
