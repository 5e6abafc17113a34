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

use pile_field::annotation::write_labels;
use pile_field::generation::SceneSolve;
use pile_field::{AnnotationRecord, SceneDescription, TARGET_CATEGORY};
use pile_field_test_lib::{render_and_annotate, setup_scene, Arguments, SyntheticRenderer};
use std::fs::{self, File};
use std::io::BufWriter;
use tempdir::TempDir;

fn num_targets(scene: &SceneSolve) -> usize {
    scene.layout.count_category(TARGET_CATEGORY)
}

/// True if the top of some target pile projects into the (slightly grown) box.
fn box_contains_target_top(
    scene: &SceneSolve,
    camera_index: usize,
    record: &AnnotationRecord,
) -> bool {
    let intrinsics = &scene.description.intrinsics;
    let camera = &scene.cameras()[camera_index];
    let width = f64::from(intrinsics.width);
    let height = f64::from(intrinsics.height);
    let min_x = (record.center_x - record.width / 2.) * width - 1.;
    let max_x = (record.center_x + record.width / 2.) * width + 1.;
    let min_y = (record.center_y - record.height / 2.) * height - 1.;
    let max_y = (record.center_y + record.height / 2.) * height + 1.;
    scene
        .layout
        .piles
        .iter()
        .filter(|p| p.category_id == TARGET_CATEGORY)
        .filter_map(|p| camera.project(&p.top_point(), intrinsics))
        .any(|p| p.x >= min_x && p.x <= max_x && p.y >= min_y && p.y <= max_y)
}

#[test]
fn nadir_views_label_every_target() {
    let args = Arguments::default();
    let (scene, frames) = render_and_annotate(&args);
    assert_eq!(num_targets(&scene), 10);
    assert_eq!(frames.len(), args.num_views);
    for frame in &frames {
        assert_eq!(frame.records.len(), 10);
        for record in &frame.records {
            assert_eq!(record.class_id, TARGET_CATEGORY);
            assert!(box_contains_target_top(&scene, frame.camera_index, record));
        }
    }
}

#[test]
fn distractors_are_rendered_but_not_labeled() {
    let args = Arguments {
        distractor_fraction: 0.5,
        ..Default::default()
    };
    let (scene, frames) = render_and_annotate(&args);
    assert_eq!(num_targets(&scene), 5);

    // Distractors are in the image, they are just not annotated.
    let camera = &scene.cameras()[0];
    let ids =
        SyntheticRenderer::rasterize(&scene.description, camera, &scene.description.intrinsics);
    let distractor_ids: Vec<u32> = scene
        .description
        .objects
        .iter()
        .filter(|o| o.category_id != TARGET_CATEGORY)
        .map(|o| o.instance_id)
        .collect();
    assert!(ids.ids().iter().any(|id| distractor_ids.contains(id)));

    for frame in &frames {
        assert_eq!(frame.records.len(), 5);
    }
}

#[test]
fn only_distractors_give_empty_labels() {
    let args = Arguments {
        distractor_fraction: 1.,
        ..Default::default()
    };
    let (scene, frames) = render_and_annotate(&args);
    assert_eq!(num_targets(&scene), 0);
    assert!(frames.iter().all(|f| f.records.is_empty()));
}

#[test]
fn oblique_views_on_terraces_label_only_targets() {
    let args = Arguments {
        group_rows: 2,
        group_columns: 2,
        distractor_fraction: 0.2,
        elevation_deg: 50.,
        num_views: 3,
        step_height: 2.,
        min_box_extent: 0.005,
        ..Default::default()
    };
    let (scene, frames) = render_and_annotate(&args);
    let targets = num_targets(&scene);
    assert_eq!(targets, 32);
    for frame in &frames {
        assert!(frame.records.len() <= targets);
        for record in &frame.records {
            assert_eq!(record.class_id, TARGET_CATEGORY);
            assert!(record.width >= 0.005 && record.height >= 0.005);
            assert!(record.center_x > 0. && record.center_x < 1.);
            assert!(record.center_y > 0. && record.center_y < 1.);
            assert!(box_contains_target_top(&scene, frame.camera_index, record));
        }
    }
}

#[test]
fn pipeline_is_deterministic() {
    let args = Arguments {
        distractor_fraction: 0.3,
        elevation_deg: 70.,
        ..Default::default()
    };
    let (scene_a, frames_a) = render_and_annotate(&args);
    let (scene_b, frames_b) = render_and_annotate(&args);
    assert_eq!(scene_a.description, scene_b.description);
    assert_eq!(frames_a, frames_b);
}

#[test]
fn empty_layout_produces_no_frames() {
    let args = Arguments {
        group_rows: 0,
        ..Default::default()
    };
    let (scene, frames) = render_and_annotate(&args);
    assert!(scene.layout.is_empty());
    assert!(scene.layout.degenerate_groups.is_empty());
    assert!(frames.is_empty());
}

#[test]
fn scene_and_label_files_round_trip() {
    let args = Arguments::default();
    let (scene, frames) = render_and_annotate(&args);
    let dir = TempDir::new("pile_field").unwrap();

    let scene_path = scene.write_to(dir.path()).unwrap();
    let read: SceneDescription =
        serde_json::from_reader(File::open(&scene_path).unwrap()).unwrap();
    assert_eq!(read.objects.len(), scene.description.objects.len());
    assert_eq!(read.cameras.len(), scene.cameras().len());

    let label_path = dir.path().join("labels.txt");
    write_labels(
        BufWriter::new(File::create(&label_path).unwrap()),
        &frames[0].records,
    )
    .unwrap();
    let contents = fs::read_to_string(&label_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), frames[0].records.len());
    for line in lines {
        let fields: Vec<&str> = line.split(' ').collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0], "0");
        for field in &fields[1..] {
            let value: f64 = field.parse().unwrap();
            assert!(value >= 0. && value <= 1.);
        }
    }
}

#[test]
fn setup_scene_uses_the_seed() {
    let args = Arguments::default();
    let (_, a) = setup_scene(&args);
    let (_, b) = setup_scene(&Arguments {
        seed: args.seed + 1,
        ..args.clone()
    });
    assert_ne!(a.layout.piles[0].position, b.layout.piles[0].position);
}
