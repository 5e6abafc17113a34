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

//! Places groups of piles ("tables") on a terrain so that the tops of every group end up in
//! one plane.

use crate::errors::*;
use crate::geometry::{Aabb, Footprint};
use crate::math::{direction_from_angle, perpendicular};
use crate::terrain::ElevationField;
use crate::tolerance::ToleranceSampler;
use crate::{DISTRACTOR_CATEGORY, TARGET_CATEGORY};
use log::warn;
use nalgebra::{Point2, Point3, Unit, UnitQuaternion, Vector2, Vector3};
use serde_derive::{Deserialize, Serialize};

mod coplanarity;
mod pile_kind;
mod spacing;

pub use coplanarity::{ExposedHeight, GroupTops};
pub use pile_kind::{GeologicalPreset, KindDistribution, PileKind};
pub use spacing::SpacingAdaptation;

pub const MIN_PILES_PER_GROUP: usize = 8;
pub const MAX_PILES_PER_GROUP: usize = 100;

/// Bounds of the random deviations from the nominal layout. The jitter bounds are fractions
/// of `pile_spacing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub intra_row_jitter: f64,
    pub alignment_jitter: f64,
    pub max_tilt_ratio: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            intra_row_jitter: 0.003,
            alignment_jitter: 0.05,
            max_tilt_ratio: 0.005,
        }
    }
}

impl Tolerances {
    pub fn validate(&self) -> Result<()> {
        for &(parameter, value) in &[
            ("tolerances.intra_row_jitter", self.intra_row_jitter),
            ("tolerances.alignment_jitter", self.alignment_jitter),
            ("tolerances.max_tilt_ratio", self.max_tilt_ratio),
        ] {
            if !value.is_finite() || value < 0. {
                return invalid_config(parameter, "must be finite and not negative");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub group_rows: usize,
    pub group_columns: usize,
    pub piles_per_group: usize,
    /// Number of pile rows inside one group.
    pub member_rows: usize,
    pub pile_spacing: f64,
    /// Gap between neighboring groups of the same row.
    pub group_gap: f64,
    /// Nominal gap between two rows of groups, before terrain adaptation.
    pub row_spacing: f64,
    /// Direction of the rows, radians from +x. Rows advance to the left of this direction.
    pub row_angle: f64,
    /// Center of the nominal layout.
    pub origin: Point2<f64>,
    /// Every `road_interval` rows an extra `road_width` is left free. 0 disables roads.
    pub road_interval: usize,
    pub road_width: f64,
    pub spacing: SpacingAdaptation,
    pub exposed: ExposedHeight,
    pub tolerances: Tolerances,
    pub distractor_fraction: f64,
    pub target_category: i32,
    pub distractor_category: i32,
    pub preset: GeologicalPreset,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            group_rows: 4,
            group_columns: 5,
            piles_per_group: 10,
            member_rows: 2,
            pile_spacing: 3.6,
            group_gap: 2.,
            row_spacing: 4.15,
            row_angle: 0.,
            origin: Point2::origin(),
            road_interval: 5,
            road_width: 8.,
            spacing: SpacingAdaptation::default(),
            exposed: ExposedHeight::default(),
            tolerances: Tolerances::default(),
            distractor_fraction: 0.1,
            target_category: TARGET_CATEGORY,
            distractor_category: DISTRACTOR_CATEGORY,
            preset: GeologicalPreset::default(),
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_PILES_PER_GROUP..=MAX_PILES_PER_GROUP).contains(&self.piles_per_group) {
            return invalid_config(
                "layout.piles_per_group",
                format!(
                    "{} is outside [{}, {}]",
                    self.piles_per_group, MIN_PILES_PER_GROUP, MAX_PILES_PER_GROUP
                ),
            );
        }
        if self.member_rows == 0 || self.member_rows > self.piles_per_group {
            return invalid_config(
                "layout.member_rows",
                format!("must be in [1, piles_per_group], got {}", self.member_rows),
            );
        }
        for &(parameter, value) in &[
            ("layout.pile_spacing", self.pile_spacing),
            ("layout.row_spacing", self.row_spacing),
        ] {
            if !value.is_finite() || value <= 0. {
                return invalid_config(parameter, format!("must be positive, got {}", value));
            }
        }
        for &(parameter, value) in &[
            ("layout.group_gap", self.group_gap),
            ("layout.road_width", self.road_width),
        ] {
            if !value.is_finite() || value < 0. {
                return invalid_config(parameter, format!("must not be negative, got {}", value));
            }
        }
        if !self.row_angle.is_finite() {
            return invalid_config("layout.row_angle", "must be finite");
        }
        if !self.origin.x.is_finite() || !self.origin.y.is_finite() {
            return invalid_config("layout.origin", "must be finite");
        }
        if !(0. ..=1.).contains(&self.distractor_fraction) {
            return invalid_config(
                "layout.distractor_fraction",
                format!("must be in [0, 1], got {}", self.distractor_fraction),
            );
        }
        if self.target_category == self.distractor_category {
            return invalid_config(
                "layout.distractor_category",
                "must differ from target_category",
            );
        }
        self.spacing.validate()?;
        self.exposed.validate()?;
        self.tolerances.validate()
    }

    pub fn num_groups(&self) -> usize {
        self.group_rows * self.group_columns
    }

    fn member_columns(&self) -> usize {
        (self.piles_per_group + self.member_rows - 1) / self.member_rows
    }

    fn is_road_boundary(&self, row: usize) -> bool {
        self.road_interval > 0 && row > 0 && row % self.road_interval == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileInstance {
    pub position: Point2<f64>,
    pub base_z: f64,
    pub exposed_height: f64,
    /// Horizontal deviation of the pile axis per unit of height.
    pub tilt: Vector2<f64>,
    /// Rotation about the pile's own axis.
    pub spin: f64,
    pub category_id: i32,
    pub group_id: usize,
    pub kind: PileKind,
    pub diameter: f64,
}

impl PileInstance {
    pub fn base_point(&self) -> Point3<f64> {
        Point3::new(self.position.x, self.position.y, self.base_z)
    }

    pub fn top_elevation(&self) -> f64 {
        self.base_z + self.exposed_height
    }

    pub fn axis(&self) -> Unit<Vector3<f64>> {
        Unit::new_normalize(Vector3::new(self.tilt.x, self.tilt.y, 1.))
    }

    /// Center of the top face, `exposed_height` above the base along the tilted axis.
    pub fn top_point(&self) -> Point3<f64> {
        let axis = self.axis();
        self.base_point() + axis.into_inner() * (self.exposed_height / axis.z)
    }

    /// Rotation taking the +z axis onto the pile axis, after spinning about +z.
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        let tilt = UnitQuaternion::rotation_between(&Vector3::z(), &self.axis().into_inner())
            .unwrap_or_else(UnitQuaternion::identity);
        tilt * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.spin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementGroup {
    pub group_id: usize,
    pub row: usize,
    pub column: usize,
    pub anchor: Point2<f64>,
    /// Unit direction of the group's pile rows.
    pub orientation: Vector2<f64>,
    pub target_top_elevation: f64,
    /// Indices into `Layout::piles`.
    pub members: Vec<usize>,
    pub max_residual: f64,
    pub top_spread: f64,
    pub degenerate: bool,
}

/// A group whose tops could not be made coplanar within tolerance. The group stays in the
/// layout with clamped exposed heights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegenerateGroup {
    pub group_id: usize,
    pub max_residual: f64,
    pub top_spread: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub groups: Vec<PlacementGroup>,
    pub piles: Vec<PileInstance>,
    pub degenerate_groups: Vec<DegenerateGroup>,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.piles.is_empty()
    }

    pub fn members<'a>(
        &'a self,
        group: &'a PlacementGroup,
    ) -> impl Iterator<Item = &'a PileInstance> + 'a {
        group.members.iter().map(move |&i| &self.piles[i])
    }

    pub fn count_category(&self, category_id: i32) -> usize {
        self.piles
            .iter()
            .filter(|p| p.category_id == category_id)
            .count()
    }

    /// Box around all pile bodies, `None` for an empty layout.
    pub fn bounds(&self) -> Option<Aabb> {
        let points = self
            .piles
            .iter()
            .flat_map(|p| vec![p.base_point(), p.top_point()]);
        let bbox = Aabb::bounding(points)?;
        let max_radius = self
            .piles
            .iter()
            .map(|p| p.diameter / 2.)
            .fold(0., f64::max);
        let pad = Vector3::new(max_radius, max_radius, 0.);
        Some(Aabb::new(*bbox.min() - pad, *bbox.max() + pad))
    }

    pub fn footprint(&self) -> Option<Footprint> {
        self.bounds().map(|bbox| bbox.footprint())
    }
}

/// Solves the full layout for `seed`. The result only depends on the arguments.
pub fn solve_layout(
    terrain: &ElevationField,
    config: &LayoutConfig,
    seed: u64,
) -> Result<Layout> {
    terrain.validate()?;
    config.validate()?;
    let kinds = config.preset.kind_distribution()?;

    let mut sampler = ToleranceSampler::new(seed);
    let mut layout = Layout::default();
    if config.num_groups() == 0 {
        return Ok(layout);
    }

    let row_axis = direction_from_angle(config.row_angle);
    let advance = perpendicular(&row_axis);
    let member_columns = config.member_columns();
    let group_width = (member_columns - 1) as f64 * config.pile_spacing;
    let group_depth = (config.member_rows - 1) as f64 * config.pile_spacing;
    let column_pitch = group_width + config.group_gap;
    let num_roads = (1..config.group_rows)
        .filter(|&row| config.is_road_boundary(row))
        .count();
    let nominal_depth = config.group_rows as f64 * group_depth
        + (config.group_rows - 1) as f64 * config.row_spacing
        + num_roads as f64 * config.road_width;

    let intra_row_bound = config.tolerances.intra_row_jitter * config.pile_spacing;
    let alignment_bound = config.tolerances.alignment_jitter * config.pile_spacing;
    let tolerance = config.exposed.coplanarity_tolerance;

    // Offset of the current row's center line along `advance`.
    let mut row_offset = (group_depth - nominal_depth) / 2.;
    for row in 0..config.group_rows {
        if row > 0 {
            let previous_center = config.origin + advance * row_offset;
            let gap =
                config
                    .spacing
                    .row_spacing(terrain, &previous_center, &advance, config.row_spacing);
            row_offset += group_depth + gap;
            if config.is_road_boundary(row) {
                row_offset += config.road_width;
            }
        }
        let row_center = config.origin + advance * row_offset;

        for column in 0..config.group_columns {
            let along = (column as f64 - (config.group_columns - 1) as f64 / 2.) * column_pitch;
            let anchor =
                row_center + row_axis * along + sampler.planar_jitter(alignment_bound);

            let positions: Vec<Point2<f64>> = (0..config.piles_per_group)
                .map(|i| {
                    let r = (i / member_columns) as f64 - (config.member_rows - 1) as f64 / 2.;
                    let c = (i % member_columns) as f64 - (member_columns - 1) as f64 / 2.;
                    let local = (row_axis * c + advance * r) * config.pile_spacing;
                    anchor + local + sampler.planar_jitter(intra_row_bound)
                })
                .collect();
            let tops = config.exposed.solve(terrain, &positions);

            let group_id = layout.groups.len();
            let first_member = layout.piles.len();
            for (i, position) in positions.into_iter().enumerate() {
                let tilt = sampler.tilt(config.tolerances.max_tilt_ratio);
                let spin = sampler.angle();
                let kind = kinds.sample(&mut sampler);
                let diameter = kind.sample_diameter(&mut sampler);
                layout.piles.push(PileInstance {
                    position,
                    base_z: tops.base_z[i],
                    exposed_height: tops.exposed_heights[i],
                    tilt,
                    spin,
                    category_id: config.target_category,
                    group_id,
                    kind,
                    diameter,
                });
            }

            let degenerate = tops.is_degenerate(tolerance);
            if degenerate {
                warn!(
                    "Group {} (row {}, column {}) is not coplanar: max residual {:.3}, top \
                     spread {:.3}, tolerance {:.3}.",
                    group_id, row, column, tops.max_residual, tops.top_spread, tolerance
                );
                layout.degenerate_groups.push(DegenerateGroup {
                    group_id,
                    max_residual: tops.max_residual,
                    top_spread: tops.top_spread,
                });
            }
            layout.groups.push(PlacementGroup {
                group_id,
                row,
                column,
                anchor,
                orientation: row_axis,
                target_top_elevation: tops.target_top_elevation,
                members: (first_member..layout.piles.len()).collect(),
                max_residual: tops.max_residual,
                top_spread: tops.top_spread,
                degenerate,
            });
        }
    }

    let total = layout.piles.len();
    let num_distractors =
        ((config.distractor_fraction * total as f64).round() as usize).min(total);
    for i in rand::seq::index::sample(sampler.rng_mut(), total, num_distractors).into_iter() {
        layout.piles[i].category_id = config.distractor_category;
    }
    Ok(layout)
}
