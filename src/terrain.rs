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

//! Ground elevation as a pure function of the horizontal position.

use crate::errors::*;
use crate::math::direction_from_angle;
use nalgebra::{Point2, Vector2};
use serde_derive::{Deserialize, Serialize};

/// Gradients with a smaller norm are treated as flat ground without a slope direction.
const FLAT_GRADIENT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerraceAxis {
    /// Terraces are concentric rings around the origin.
    Radial,
    /// Terraces climb along the horizontal direction given by `angle` (radians from +x).
    Along { angle: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heightfield {
    pub origin: Point2<f64>,
    pub cell_size: f64,
    pub columns: usize,
    pub rows: usize,
    // Row-major, `rows * columns` samples.
    pub heights: Vec<f64>,
}

impl Heightfield {
    fn sample(&self, column: usize, row: usize) -> f64 {
        self.heights[row * self.columns + column]
    }

    /// Bilinear interpolation, clamped to the border samples outside the grid.
    fn height(&self, x: f64, y: f64) -> f64 {
        let max_column = (self.columns - 1) as f64;
        let max_row = (self.rows - 1) as f64;
        let u = ((x - self.origin.x) / self.cell_size).max(0.).min(max_column);
        let v = ((y - self.origin.y) / self.cell_size).max(0.).min(max_row);
        let c0 = u.floor() as usize;
        let r0 = v.floor() as usize;
        let c1 = (c0 + 1).min(self.columns - 1);
        let r1 = (r0 + 1).min(self.rows - 1);
        let fu = u - c0 as f64;
        let fv = v - r0 as f64;
        let bottom = self.sample(c0, r0) * (1. - fu) + self.sample(c1, r0) * fu;
        let top = self.sample(c0, r1) * (1. - fu) + self.sample(c1, r1) * fu;
        bottom * (1. - fv) + top * fv
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerrainShape {
    Flat,
    /// A constant slope.
    Planar { dz_dx: f64, dz_dy: f64 },
    /// Staircase terrain: `floor(d / step_width) * step_height` on top of the base elevation.
    Terraced {
        step_height: f64,
        step_width: f64,
        axis: TerraceAxis,
    },
    Heightfield(Heightfield),
}

/// Low-amplitude undulation layered on top of any shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    pub amplitude: f64,
    pub frequency: f64,
}

impl Default for Perturbation {
    fn default() -> Self {
        Perturbation {
            amplitude: 0.3,
            frequency: 0.1,
        }
    }
}

impl Perturbation {
    fn offset(&self, x: f64, y: f64) -> f64 {
        let distance = x.hypot(y);
        let half = self.frequency / 2.;
        self.amplitude * (distance * self.frequency).sin() * (x * half).cos() * (y * half).sin()
    }
}

/// Local inclination of the terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slope {
    /// Inclination angle in radians, `atan(|gradient|)`.
    pub angle: f64,
    /// Unit direction of steepest ascent, `None` on flat ground.
    pub uphill: Option<Vector2<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationField {
    pub base: f64,
    pub shape: TerrainShape,
    #[serde(default)]
    pub perturbation: Option<Perturbation>,
}

impl Default for ElevationField {
    fn default() -> Self {
        ElevationField::flat(0.)
    }
}

impl ElevationField {
    pub fn flat(base: f64) -> Self {
        ElevationField {
            base,
            shape: TerrainShape::Flat,
            perturbation: None,
        }
    }

    pub fn planar(base: f64, dz_dx: f64, dz_dy: f64) -> Self {
        ElevationField {
            base,
            shape: TerrainShape::Planar { dz_dx, dz_dy },
            perturbation: None,
        }
    }

    pub fn terraced(base: f64, step_height: f64, step_width: f64, axis: TerraceAxis) -> Self {
        ElevationField {
            base,
            shape: TerrainShape::Terraced {
                step_height,
                step_width,
                axis,
            },
            perturbation: None,
        }
    }

    pub fn heightfield(base: f64, heightfield: Heightfield) -> Self {
        ElevationField {
            base,
            shape: TerrainShape::Heightfield(heightfield),
            perturbation: None,
        }
    }

    pub fn with_perturbation(mut self, perturbation: Perturbation) -> Self {
        self.perturbation = Some(perturbation);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.base.is_finite() {
            return invalid_config("terrain.base", "must be finite");
        }
        match &self.shape {
            TerrainShape::Flat => (),
            TerrainShape::Planar { dz_dx, dz_dy } => {
                if !dz_dx.is_finite() || !dz_dy.is_finite() {
                    return invalid_config("terrain.shape.dz_dx", "gradient must be finite");
                }
            }
            TerrainShape::Terraced {
                step_height,
                step_width,
                ..
            } => {
                if !(*step_width > 0. && step_width.is_finite()) {
                    return invalid_config(
                        "terrain.shape.step_width",
                        "must be finite and positive",
                    );
                }
                if !step_height.is_finite() {
                    return invalid_config("terrain.shape.step_height", "must be finite");
                }
            }
            TerrainShape::Heightfield(field) => {
                if field.columns == 0 || field.rows == 0 {
                    return invalid_config("terrain.shape.heightfield", "needs at least one sample");
                }
                if field.heights.len() != field.columns * field.rows {
                    return invalid_config(
                        "terrain.shape.heightfield",
                        format!(
                            "expected {}x{} samples, got {}",
                            field.columns,
                            field.rows,
                            field.heights.len()
                        ),
                    );
                }
                if !(field.cell_size > 0. && field.cell_size.is_finite()) {
                    return invalid_config(
                        "terrain.shape.cell_size",
                        "must be finite and positive",
                    );
                }
                if !field.origin.x.is_finite() || !field.origin.y.is_finite() {
                    return invalid_config("terrain.shape.origin", "must be finite");
                }
                if field.heights.iter().any(|h| !h.is_finite()) {
                    return invalid_config("terrain.shape.heights", "must all be finite");
                }
            }
        }
        if let Some(perturbation) = &self.perturbation {
            if !perturbation.amplitude.is_finite() || !perturbation.frequency.is_finite() {
                return invalid_config("terrain.perturbation", "must be finite");
            }
        }
        Ok(())
    }

    /// Ground height at (x, y).
    pub fn height(&self, x: f64, y: f64) -> f64 {
        let shape = match &self.shape {
            TerrainShape::Flat => 0.,
            TerrainShape::Planar { dz_dx, dz_dy } => dz_dx * x + dz_dy * y,
            TerrainShape::Terraced {
                step_height,
                step_width,
                axis,
            } => {
                let distance = match axis {
                    TerraceAxis::Radial => x.hypot(y),
                    TerraceAxis::Along { angle } => {
                        direction_from_angle(*angle).dot(&Vector2::new(x, y))
                    }
                };
                (distance / step_width).floor() * step_height
            }
            TerrainShape::Heightfield(field) => field.height(x, y),
        };
        let perturbation = self.perturbation.map_or(0., |p| p.offset(x, y));
        self.base + shape + perturbation
    }

    pub fn height_at(&self, p: &Point2<f64>) -> f64 {
        self.height(p.x, p.y)
    }

    /// Central finite difference over `radius` in x and y.
    pub fn gradient(&self, x: f64, y: f64, radius: f64) -> Vector2<f64> {
        let dz_dx = (self.height(x + radius, y) - self.height(x - radius, y)) / (2. * radius);
        let dz_dy = (self.height(x, y + radius) - self.height(x, y - radius)) / (2. * radius);
        Vector2::new(dz_dx, dz_dy)
    }

    pub fn slope(&self, x: f64, y: f64, radius: f64) -> Slope {
        let gradient = self.gradient(x, y, radius);
        let norm = gradient.norm();
        Slope {
            angle: norm.atan(),
            uphill: if norm > FLAT_GRADIENT_EPSILON {
                Some(gradient / norm)
            } else {
                None
            },
        }
    }
}
