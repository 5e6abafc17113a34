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

use crate::errors::*;
use crate::tolerance::ToleranceSampler;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PileKind {
    /// Prestressed high-strength concrete pipe pile.
    Phc,
    SpiralSteel,
    CastInPlace,
}

const ALL_KINDS: [PileKind; 3] = [PileKind::Phc, PileKind::SpiralSteel, PileKind::CastInPlace];

impl PileKind {
    /// Diameters in metres that are manufactured for this kind.
    pub fn diameters(self) -> &'static [f64] {
        match self {
            PileKind::Phc => &[0.3, 0.4, 0.5],
            PileKind::SpiralSteel => &[0.076, 0.089, 0.114, 0.159],
            PileKind::CastInPlace => &[0.3],
        }
    }

    pub fn sample_diameter(self, sampler: &mut ToleranceSampler) -> f64 {
        let diameters = self.diameters();
        diameters[sampler.rng_mut().gen_range(0, diameters.len())]
    }
}

impl fmt::Display for PileKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PileKind::Phc => "phc",
            PileKind::SpiralSteel => "spiral_steel",
            PileKind::CastInPlace => "cast_in_place",
        };
        write!(f, "{}", name)
    }
}

/// Soil conditions decide which foundation kinds are common on a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeologicalPreset {
    Mixed,
    Loess,
    Hills,
}

impl Default for GeologicalPreset {
    fn default() -> Self {
        GeologicalPreset::Mixed
    }
}

impl GeologicalPreset {
    /// Weights of PHC, spiral steel and cast-in-place piles, in that order.
    pub fn weights(self) -> [f64; 3] {
        match self {
            GeologicalPreset::Mixed => [0.4, 0.3, 0.3],
            GeologicalPreset::Loess => [0.2, 0.7, 0.1],
            GeologicalPreset::Hills => [0.6, 0.1, 0.3],
        }
    }

    pub fn kind_distribution(self) -> Result<KindDistribution> {
        let weights = WeightedIndex::new(&self.weights()[..])
            .map_err(|e| ErrorKind::InvalidConfiguration("layout.preset".into(), e.to_string()))?;
        Ok(KindDistribution { weights })
    }
}

pub struct KindDistribution {
    weights: WeightedIndex<f64>,
}

impl KindDistribution {
    pub fn sample(&self, sampler: &mut ToleranceSampler) -> PileKind {
        ALL_KINDS[self.weights.sample(sampler.rng_mut())]
    }
}
