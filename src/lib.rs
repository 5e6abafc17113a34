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

// error-chain still implements the deprecated `Error::description`.
#![allow(renamed_and_removed_lints)]
#![recursion_limit = "1024"]

#[macro_use]
extern crate error_chain;

pub mod annotation;
pub mod camera;
pub mod config;
#[allow(deprecated)]
pub mod errors;
pub mod generation;
pub mod geometry;
pub mod layout;
pub mod math;
pub mod scene;
pub mod terrain;
pub mod tolerance;

pub use annotation::{
    extract_annotations, AnnotationConfig, AnnotationRecord, AttributeTable, InstanceAttributes,
    InstanceIdBuffer,
};
pub use camera::{CameraConfig, CameraPose, Framing};
pub use config::SceneConfig;
pub use layout::{DegenerateGroup, Layout, LayoutConfig, PileInstance, PileKind, PlacementGroup};
pub use scene::{Intrinsics, RenderedFrame, Renderer, SceneDescription, SceneObject};
pub use terrain::ElevationField;
pub use tolerance::ToleranceSampler;

/// Category id of the objects we annotate by default.
pub const TARGET_CATEGORY: i32 = 0;

/// Category id given to distractors, ground and everything else that must never be labeled.
pub const DISTRACTOR_CATEGORY: i32 = -1;
