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

//! Fixtures for end-to-end tests: scene configurations that a small synthetic renderer can
//! turn into instance id buffers.

use pile_field::annotation::AnnotationConfig;
use pile_field::camera::{CameraConfig, FramingMode};
use pile_field::generation::{annotate_frames, solve_scene, FrameAnnotations, SceneSolve};
use pile_field::layout::LayoutConfig;
use pile_field::terrain::{Perturbation, TerraceAxis};
use pile_field::{ElevationField, Intrinsics, SceneConfig};

mod synthetic_renderer;
pub use synthetic_renderer::{Cylinder, SyntheticRenderer};

#[derive(Clone, Debug, PartialEq)]
pub struct Arguments {
    pub group_rows: usize,
    pub group_columns: usize,
    pub piles_per_group: usize,
    pub distractor_fraction: f64,
    // Camera elevation above the horizon in degrees; 90 is a nadir view.
    pub elevation_deg: f64,
    pub num_views: usize,
    // Image size in pixels.
    pub width: u32,
    pub height: u32,
    // Terraces are 25 m wide and this high. 0 gives flat ground.
    pub step_height: f64,
    pub min_box_extent: f64,
    pub seed: u64,
}

impl Default for Arguments {
    fn default() -> Arguments {
        Arguments {
            group_rows: 1,
            group_columns: 1,
            piles_per_group: 10,
            distractor_fraction: 0.,
            elevation_deg: 90.,
            num_views: 2,
            width: 1024,
            height: 768,
            step_height: 0.,
            min_box_extent: 0.,
            seed: 80_293_751_232,
        }
    }
}

pub fn scene_config(args: &Arguments) -> SceneConfig {
    let terrain = if args.step_height > 0. {
        ElevationField::terraced(0., args.step_height, 25., TerraceAxis::Radial)
            .with_perturbation(Perturbation::default())
    } else {
        ElevationField::flat(0.)
    };
    SceneConfig {
        terrain,
        layout: LayoutConfig {
            group_rows: args.group_rows,
            group_columns: args.group_columns,
            piles_per_group: args.piles_per_group,
            distractor_fraction: args.distractor_fraction,
            ..Default::default()
        },
        camera: CameraConfig {
            num_views: args.num_views,
            elevation_deg: args.elevation_deg,
            framing: FramingMode::Fov { fov_y_deg: 60. },
            ..Default::default()
        },
        annotation: AnnotationConfig {
            min_box_extent: args.min_box_extent,
            ..Default::default()
        },
        intrinsics: Intrinsics {
            width: args.width,
            height: args.height,
        },
    }
}

pub fn setup_scene(args: &Arguments) -> (SceneConfig, SceneSolve) {
    let config = scene_config(args);
    let scene = solve_scene(&config, args.seed).unwrap();
    (config, scene)
}

/// Solves, renders and annotates the scene described by `args`.
pub fn render_and_annotate(args: &Arguments) -> (SceneSolve, Vec<FrameAnnotations>) {
    let (config, scene) = setup_scene(args);
    let mut renderer = SyntheticRenderer::new();
    let frames = annotate_frames(&mut renderer, &scene, &config).unwrap();
    assert_eq!(renderer.num_frames, scene.cameras().len());
    (scene, frames)
}
