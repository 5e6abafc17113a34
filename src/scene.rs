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

//! What we hand to a renderer, and what we expect back.

use crate::annotation::{AttributeTable, InstanceAttributes, InstanceIdBuffer};
use crate::camera::CameraPose;
use crate::errors::*;
use crate::layout::{Layout, PileKind};
use crate::terrain::ElevationField;
use nalgebra::{Point3, UnitQuaternion};
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub width: u32,
    pub height: u32,
}

impl Default for Intrinsics {
    fn default() -> Self {
        Intrinsics {
            width: 640,
            height: 480,
        }
    }
}

impl Intrinsics {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return invalid_config(
                "intrinsics",
                format!("image size {}x{} is empty", self.width, self.height),
            );
        }
        Ok(())
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Focal length in pixels of a pinhole camera with vertical field of view `fov_y`.
    pub fn focal_length(&self, fov_y: f64) -> f64 {
        f64::from(self.height) / 2. / (fov_y / 2.).tan()
    }
}

/// One placed pile as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Id the renderer writes into the instance id buffer. Never the background id 0.
    pub instance_id: u32,
    pub name: String,
    pub category_id: i32,
    pub group_id: usize,
    pub kind: PileKind,
    /// Center of the pile's base on the ground.
    pub position: Point3<f64>,
    /// Orientation of the pile axis (+z in object space).
    pub rotation: UnitQuaternion<f64>,
    pub exposed_height: f64,
    pub diameter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub seed: u64,
    pub terrain: ElevationField,
    pub objects: Vec<SceneObject>,
    pub cameras: Vec<CameraPose>,
    pub intrinsics: Intrinsics,
}

impl SceneDescription {
    /// Instance ids are assigned in pile order, starting at 1.
    pub fn from_layout(
        seed: u64,
        terrain: &ElevationField,
        layout: &Layout,
        cameras: Vec<CameraPose>,
        intrinsics: Intrinsics,
    ) -> Self {
        let objects = layout
            .piles
            .iter()
            .enumerate()
            .map(|(i, pile)| {
                let instance_id = i as u32 + 1;
                SceneObject {
                    instance_id,
                    name: format!("{}_{}", pile.kind, instance_id),
                    category_id: pile.category_id,
                    group_id: pile.group_id,
                    kind: pile.kind,
                    position: pile.base_point(),
                    rotation: pile.rotation(),
                    exposed_height: pile.exposed_height,
                    diameter: pile.diameter,
                }
            })
            .collect();
        SceneDescription {
            seed,
            terrain: terrain.clone(),
            objects,
            cameras,
            intrinsics,
        }
    }

    /// The attribute table a renderer is expected to report for this scene.
    pub fn attribute_table(&self) -> AttributeTable {
        self.objects
            .iter()
            .map(|o| {
                (
                    o.instance_id,
                    InstanceAttributes {
                        category_id: o.category_id,
                        name: o.name.clone(),
                    },
                )
            })
            .collect()
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

/// Output of rendering one view.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub instance_ids: InstanceIdBuffer,
    pub attributes: AttributeTable,
}

/// The rendering engine. Implementations own their session state; callers never touch it.
pub trait Renderer {
    fn render(
        &mut self,
        scene: &SceneDescription,
        camera: &CameraPose,
        intrinsics: &Intrinsics,
    ) -> Result<RenderedFrame>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{solve_layout, LayoutConfig};
    use approx::assert_abs_diff_eq;
    use tempdir::TempDir;

    fn scene() -> SceneDescription {
        let terrain = ElevationField::planar(1., 0.01, 0.02);
        let config = LayoutConfig {
            group_rows: 1,
            group_columns: 2,
            ..Default::default()
        };
        let layout = solve_layout(&terrain, &config, 4).unwrap();
        SceneDescription::from_layout(4, &terrain, &layout, Vec::new(), Intrinsics::default())
    }

    #[test]
    fn test_instance_ids_skip_background() {
        let scene = scene();
        assert_eq!(scene.objects.len(), 20);
        assert_eq!(scene.objects[0].instance_id, 1);
        assert_eq!(scene.objects[19].instance_id, 20);
        let table = scene.attribute_table();
        assert_eq!(table.len(), 20);
        assert!(table.get(0).is_none());
    }

    #[test]
    fn test_focal_length() {
        let intrinsics = Intrinsics {
            width: 100,
            height: 100,
        };
        assert_abs_diff_eq!(
            intrinsics.focal_length(std::f64::consts::FRAC_PI_2),
            50.,
            epsilon = 1e-9
        );
        assert!(Intrinsics {
            width: 0,
            height: 10
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let scene = scene();
        let dir = TempDir::new("scene").unwrap();
        let path = dir.path().join("scene.json");
        scene.write_json(&path).unwrap();
        let read: SceneDescription =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(read.objects.len(), scene.objects.len());
        assert_eq!(read.objects[3].name, scene.objects[3].name);
        assert_eq!(read.seed, 4);
    }
}
