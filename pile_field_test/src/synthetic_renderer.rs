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

use nalgebra::{Point3, Vector3};
use pile_field::annotation::InstanceIdBuffer;
use pile_field::errors::*;
use pile_field::{CameraPose, Intrinsics, RenderedFrame, Renderer, SceneDescription, SceneObject};

/// The exposed part of a pile: a finite cylinder with a top cap, tilted along `axis`.
#[derive(Debug, Clone)]
pub struct Cylinder {
    pub instance_id: u32,
    pub base: Point3<f64>,
    pub axis: Vector3<f64>,
    pub length: f64,
    pub radius: f64,
}

impl Cylinder {
    pub fn from_object(object: &SceneObject) -> Self {
        let axis = object.rotation * Vector3::z();
        Cylinder {
            instance_id: object.instance_id,
            base: object.position,
            axis,
            length: object.exposed_height / axis.z,
            radius: object.diameter / 2.,
        }
    }

    pub fn top(&self) -> Point3<f64> {
        self.base + self.axis * self.length
    }

    /// Corners of a box that contains the whole cylinder.
    fn corners(&self) -> Vec<Point3<f64>> {
        let top = self.top();
        let r = self.radius;
        let min = self.base.inf(&top) - Vector3::new(r, r, r);
        let max = self.base.sup(&top) + Vector3::new(r, r, r);
        (0..8)
            .map(|i| {
                Point3::new(
                    if i & 1 == 0 { min.x } else { max.x },
                    if i & 2 == 0 { min.y } else { max.y },
                    if i & 4 == 0 { min.z } else { max.z },
                )
            })
            .collect()
    }

    /// Ray parameter of the closest hit in front of `origin`.
    pub fn intersect(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> Option<f64> {
        let mut closest: Option<f64> = None;
        let mut consider = |t: f64| {
            if t > 0. && closest.map_or(true, |c| t < c) {
                closest = Some(t);
            }
        };

        let w = *origin - self.base;
        let d_perp = direction - self.axis * direction.dot(&self.axis);
        let w_perp = w - self.axis * w.dot(&self.axis);
        let a = d_perp.norm_squared();
        if a > 1e-12 {
            let b = 2. * w_perp.dot(&d_perp);
            let c = w_perp.norm_squared() - self.radius * self.radius;
            let discriminant = b * b - 4. * a * c;
            if discriminant >= 0. {
                let root = discriminant.sqrt();
                for &t in &[(-b - root) / (2. * a), (-b + root) / (2. * a)] {
                    let s = (w + direction * t).dot(&self.axis);
                    if s >= 0. && s <= self.length {
                        consider(t);
                    }
                }
            }
        }

        let denominator = direction.dot(&self.axis);
        if denominator.abs() > 1e-12 {
            let top = self.top();
            let t = (top - *origin).dot(&self.axis) / denominator;
            if (*origin + direction * t - top).norm() <= self.radius {
                consider(t);
            }
        }
        closest
    }
}

/// Ray casts the piles of a scene into an instance id buffer. Ground and sky are background.
#[derive(Debug, Default)]
pub struct SyntheticRenderer {
    pub num_frames: usize,
}

impl SyntheticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rasterize(
        scene: &SceneDescription,
        camera: &CameraPose,
        intrinsics: &Intrinsics,
    ) -> InstanceIdBuffer {
        let width = intrinsics.width;
        let height = intrinsics.height;
        let focal_length = intrinsics.focal_length(camera.fov_y);
        let world_from_camera = camera.world_from_camera();
        let mut ids = InstanceIdBuffer::filled(width, height, 0);
        let mut depth = vec![std::f64::INFINITY; width as usize * height as usize];

        for object in &scene.objects {
            let cylinder = Cylinder::from_object(object);
            let pixels: Option<Vec<_>> = cylinder
                .corners()
                .iter()
                .map(|p| camera.project(p, intrinsics))
                .collect();
            // Part of the box behind the camera: test every pixel.
            let (columns, rows) = match pixels {
                Some(pixels) => {
                    let min_x = pixels.iter().map(|p| p.x).fold(std::f64::INFINITY, f64::min);
                    let max_x = pixels.iter().map(|p| p.x).fold(std::f64::NEG_INFINITY, f64::max);
                    let min_y = pixels.iter().map(|p| p.y).fold(std::f64::INFINITY, f64::min);
                    let max_y = pixels.iter().map(|p| p.y).fold(std::f64::NEG_INFINITY, f64::max);
                    (
                        clamped_range(min_x, max_x, width),
                        clamped_range(min_y, max_y, height),
                    )
                }
                None => ((0, width), (0, height)),
            };

            for row in rows.0..rows.1 {
                for column in columns.0..columns.1 {
                    let in_camera = Vector3::new(
                        (f64::from(column) + 0.5 - f64::from(width) / 2.) / focal_length,
                        -(f64::from(row) + 0.5 - f64::from(height) / 2.) / focal_length,
                        -1.,
                    );
                    let direction = world_from_camera * in_camera;
                    if let Some(t) = cylinder.intersect(&camera.position, &direction) {
                        let index = row as usize * width as usize + column as usize;
                        if t < depth[index] {
                            depth[index] = t;
                            ids.set(column, row, cylinder.instance_id);
                        }
                    }
                }
            }
        }
        ids
    }
}

fn clamped_range(min: f64, max: f64, size: u32) -> (u32, u32) {
    let size = f64::from(size);
    let begin = min.floor().max(0.).min(size);
    let end = (max.ceil() + 1.).max(0.).min(size);
    (begin as u32, end as u32)
}

impl Renderer for SyntheticRenderer {
    fn render(
        &mut self,
        scene: &SceneDescription,
        camera: &CameraPose,
        intrinsics: &Intrinsics,
    ) -> Result<RenderedFrame> {
        self.num_frames += 1;
        Ok(RenderedFrame {
            instance_ids: Self::rasterize(scene, camera, intrinsics),
            attributes: scene.attribute_table(),
        })
    }
}
