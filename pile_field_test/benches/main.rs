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

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pile_field::annotation::extract_annotations;
use pile_field::camera::solve_orbit;
use pile_field::layout::solve_layout;
use pile_field_test_lib::{scene_config, setup_scene, Arguments, SyntheticRenderer};

fn bench_layout_default_config(c: &mut Criterion) {
    let config = pile_field::SceneConfig::default();
    c.bench_function("solve_layout 20 groups", |b| {
        b.iter(|| solve_layout(&config.terrain, &config.layout, black_box(17)).unwrap())
    });
}

fn bench_layout_large_field(c: &mut Criterion) {
    let config = scene_config(&Arguments {
        group_rows: 20,
        group_columns: 20,
        step_height: 2.,
        ..Default::default()
    });
    c.bench_function("solve_layout 400 groups", |b| {
        b.iter(|| solve_layout(&config.terrain, &config.layout, black_box(17)).unwrap())
    });
}

fn bench_orbit(c: &mut Criterion) {
    let (config, scene) = setup_scene(&Arguments {
        group_rows: 4,
        group_columns: 5,
        elevation_deg: 60.,
        num_views: 8,
        ..Default::default()
    });
    let bounds = scene.layout.bounds().unwrap();
    c.bench_function("solve_orbit 8 views", |b| {
        b.iter(|| solve_orbit(&bounds, &config.camera, &config.intrinsics, black_box(3)).unwrap())
    });
}

fn bench_rasterize(c: &mut Criterion) {
    let args = Arguments {
        group_rows: 2,
        group_columns: 2,
        elevation_deg: 60.,
        width: 640,
        height: 480,
        ..Default::default()
    };
    let (_, scene) = setup_scene(&args);
    let camera = scene.cameras()[0].clone();
    c.bench_function("rasterize 640x480", |b| {
        b.iter(|| {
            SyntheticRenderer::rasterize(&scene.description, &camera, &scene.description.intrinsics)
        })
    });
}

fn bench_extract_annotations(c: &mut Criterion) {
    let args = Arguments {
        group_rows: 4,
        group_columns: 5,
        distractor_fraction: 0.1,
        elevation_deg: 60.,
        width: 1920,
        height: 1080,
        ..Default::default()
    };
    let (config, scene) = setup_scene(&args);
    let intrinsics = &scene.description.intrinsics;
    let buffer = SyntheticRenderer::rasterize(&scene.description, &scene.cameras()[0], intrinsics);
    let attributes = scene.description.attribute_table();
    c.bench_function("extract_annotations 1920x1080", |b| {
        b.iter(|| {
            extract_annotations(
                black_box(&buffer),
                &attributes,
                &config.annotation,
                intrinsics.width,
                intrinsics.height,
            )
            .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_layout_default_config,
    bench_layout_large_field,
    bench_orbit,
    bench_rasterize,
    bench_extract_annotations,
);
criterion_main!(benches);
