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

use nalgebra::{Point2, Point3, Vector2, Vector3};
use serde_derive::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Aabb {
    mins: Point3<f64>,
    maxs: Point3<f64>,
}

impl Aabb {
    pub fn new(mins: Point3<f64>, maxs: Point3<f64>) -> Self {
        Aabb {
            mins: mins.inf(&maxs),
            maxs: mins.sup(&maxs),
        }
    }

    /// The smallest box containing all `points`, or `None` if there are none.
    pub fn bounding<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |mut bbox, p| {
            bbox.grow(p);
            bbox
        }))
    }

    pub fn min(&self) -> &Point3<f64> {
        &self.mins
    }

    pub fn max(&self) -> &Point3<f64> {
        &self.maxs
    }

    pub fn grow(&mut self, p: Point3<f64>) {
        self.mins = self.mins.inf(&p);
        self.maxs = self.maxs.sup(&p);
    }

    pub fn contains(&self, p: &Point3<f64>) -> bool {
        nalgebra::partial_le(&self.mins, p) && nalgebra::partial_le(p, &self.maxs)
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.mins, &self.maxs)
    }

    pub fn diag(&self) -> Vector3<f64> {
        self.maxs - self.mins
    }

    /// Radius of the sphere around `center` that contains the whole box.
    pub fn bounding_radius(&self) -> f64 {
        self.diag().norm() / 2.
    }

    /// Projection onto the ground plane.
    pub fn footprint(&self) -> Footprint {
        Footprint::new(
            Point2::new(self.mins.x, self.mins.y),
            Point2::new(self.maxs.x, self.maxs.y),
        )
    }
}

/// Axis-aligned rectangle in the xy-plane that a camera has to keep inside its image.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Footprint {
    mins: Point2<f64>,
    maxs: Point2<f64>,
}

impl Footprint {
    pub fn new(mins: Point2<f64>, maxs: Point2<f64>) -> Self {
        Footprint {
            mins: mins.inf(&maxs),
            maxs: mins.sup(&maxs),
        }
    }

    /// A square footprint with side length `extent` around `center`.
    pub fn square(center: Point2<f64>, extent: f64) -> Self {
        let half = Vector2::new(extent / 2., extent / 2.);
        Self::new(center - half, center + half)
    }

    pub fn min(&self) -> &Point2<f64> {
        &self.mins
    }

    pub fn max(&self) -> &Point2<f64> {
        &self.maxs
    }

    pub fn center(&self) -> Point2<f64> {
        nalgebra::center(&self.mins, &self.maxs)
    }

    pub fn extent(&self) -> Vector2<f64> {
        self.maxs - self.mins
    }

    /// Radius of the circle around `center` that contains the whole rectangle.
    pub fn bounding_radius(&self) -> f64 {
        self.extent().norm() / 2.
    }
}
