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

//! One scene is a layout, its camera views and the scene description for the renderer. Scenes
//! only depend on their seed, so many of them can be solved in parallel.

use crate::annotation::{extract_annotations, AnnotationRecord};
use crate::camera::{solve_orbit, CameraPose};
use crate::config::SceneConfig;
use crate::errors::*;
use crate::layout::{solve_layout, Layout};
use crate::scene::{Renderer, SceneDescription};
use log::{debug, info};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SceneSolve {
    pub seed: u64,
    pub layout: Layout,
    pub description: SceneDescription,
}

impl SceneSolve {
    pub fn cameras(&self) -> &[CameraPose] {
        &self.description.cameras
    }

    pub fn file_name(&self) -> String {
        format!("scene_{}.json", self.seed)
    }

    /// Writes the scene description into `directory` and returns the path.
    pub fn write_to(&self, directory: impl AsRef<Path>) -> Result<PathBuf> {
        let path = directory.as_ref().join(self.file_name());
        self.description.write_json(&path)?;
        Ok(path)
    }
}

pub fn solve_scene(config: &SceneConfig, seed: u64) -> Result<SceneSolve> {
    config.validate()?;
    let layout = solve_layout(&config.terrain, &config.layout, seed)?;
    // An empty layout has nothing to frame.
    let cameras = match layout.bounds() {
        Some(bounds) => solve_orbit(&bounds, &config.camera, &config.intrinsics, seed)?,
        None => Vec::new(),
    };
    info!(
        "Scene {}: {} piles in {} groups ({} degenerate), {} views.",
        seed,
        layout.piles.len(),
        layout.groups.len(),
        layout.degenerate_groups.len(),
        cameras.len()
    );
    let description =
        SceneDescription::from_layout(seed, &config.terrain, &layout, cameras, config.intrinsics);
    Ok(SceneSolve {
        seed,
        layout,
        description,
    })
}

/// Solves every seed on the rayon thread pool. Results are in the order of `seeds`.
pub fn solve_scenes(config: &SceneConfig, seeds: &[u64]) -> Vec<Result<SceneSolve>> {
    seeds
        .par_iter()
        .map(|&seed| solve_scene(config, seed))
        .collect()
}

/// Annotations of the frame rendered from `cameras()[camera_index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnnotations {
    pub camera_index: usize,
    pub records: Vec<AnnotationRecord>,
}

/// Renders every view of `scene` and extracts its annotations.
pub fn annotate_frames<R: Renderer>(
    renderer: &mut R,
    scene: &SceneSolve,
    config: &SceneConfig,
) -> Result<Vec<FrameAnnotations>> {
    let intrinsics = &scene.description.intrinsics;
    let mut frames = Vec::with_capacity(scene.cameras().len());
    for (camera_index, camera) in scene.cameras().iter().enumerate() {
        let frame = renderer.render(&scene.description, camera, intrinsics)?;
        let records = extract_annotations(
            &frame.instance_ids,
            &frame.attributes,
            &config.annotation,
            intrinsics.width,
            intrinsics.height,
        )?;
        debug!(
            "Scene {}, view {}: {} boxes.",
            scene.seed,
            camera_index,
            records.len()
        );
        frames.push(FrameAnnotations {
            camera_index,
            records,
        });
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::InstanceIdBuffer;
    use crate::layout::LayoutConfig;
    use crate::scene::{Intrinsics, RenderedFrame};
    use crate::terrain::ElevationField;
    use tempdir::TempDir;

    fn config() -> SceneConfig {
        SceneConfig {
            terrain: ElevationField::planar(0., 0.02, 0.01),
            layout: LayoutConfig {
                group_rows: 2,
                group_columns: 2,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Paints the first object into the top left corner and reports the scene's attributes.
    struct CornerRenderer {
        num_calls: usize,
    }

    impl Renderer for CornerRenderer {
        fn render(
            &mut self,
            scene: &SceneDescription,
            _camera: &CameraPose,
            intrinsics: &Intrinsics,
        ) -> Result<RenderedFrame> {
            self.num_calls += 1;
            let mut instance_ids = InstanceIdBuffer::filled(intrinsics.width, intrinsics.height, 0);
            instance_ids.fill_rect((0, 100), (0, 50), scene.objects[0].instance_id);
            Ok(RenderedFrame {
                instance_ids,
                attributes: scene.attribute_table(),
            })
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = config();
        let seeds = [1, 2, 3, 4];
        let parallel = solve_scenes(&config, &seeds);
        for (seed, result) in seeds.iter().zip(parallel) {
            let scene = result.unwrap();
            let sequential = solve_scene(&config, *seed).unwrap();
            assert_eq!(scene.seed, *seed);
            assert_eq!(scene.layout, sequential.layout);
            assert_eq!(scene.description, sequential.description);
        }
    }

    #[test]
    fn test_empty_layout_has_no_views() {
        let config = SceneConfig {
            layout: LayoutConfig {
                group_columns: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let scene = solve_scene(&config, 0).unwrap();
        assert!(scene.layout.is_empty());
        assert!(scene.cameras().is_empty());
        let mut renderer = CornerRenderer { num_calls: 0 };
        assert!(annotate_frames(&mut renderer, &scene, &config)
            .unwrap()
            .is_empty());
        assert_eq!(renderer.num_calls, 0);
    }

    #[test]
    fn test_annotate_every_view() {
        let config = config();
        let scene = solve_scene(&config, 10).unwrap();
        let mut renderer = CornerRenderer { num_calls: 0 };
        let frames = annotate_frames(&mut renderer, &scene, &config).unwrap();
        assert_eq!(frames.len(), config.camera.num_views);
        assert_eq!(renderer.num_calls, config.camera.num_views);
        let expected = usize::from(scene.description.objects[0].category_id == 0);
        for frame in &frames {
            assert_eq!(frame.records.len(), expected);
        }
    }

    #[test]
    fn test_write_scene() {
        let scene = solve_scene(&config(), 5).unwrap();
        let dir = TempDir::new("generation").unwrap();
        let path = scene.write_to(dir.path()).unwrap();
        assert!(path.ends_with("scene_5.json"));
        assert!(path.exists());
    }
}
