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

use crate::math::{direction_from_angle, ClosedInterval};
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Streams that need randomness independent of the layout draw from their own sampler, so that
/// e.g. changing the number of camera views never changes the layout for the same seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Layout,
    Camera,
}

impl Stream {
    fn salt(self) -> u64 {
        match self {
            Stream::Layout => 0,
            Stream::Camera => 0x9e37_79b9_7f4a_7c15,
        }
    }
}

/// Seeded source of small bounded perturbations. Draws happen in a fixed order, so a sampler
/// constructed with the same seed replays the same sequence.
#[derive(Clone)]
pub struct ToleranceSampler {
    rng: StdRng,
}

impl ToleranceSampler {
    pub fn new(seed: u64) -> Self {
        Self::for_stream(seed, Stream::Layout)
    }

    pub fn for_stream(seed: u64, stream: Stream) -> Self {
        ToleranceSampler {
            rng: StdRng::seed_from_u64(seed ^ stream.salt()),
        }
    }

    /// Uniform in [0, 1).
    pub fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform in [-bound, bound].
    pub fn symmetric(&mut self, bound: f64) -> f64 {
        if bound <= 0. {
            return 0.;
        }
        self.rng.gen_range(-bound, bound)
    }

    /// Uniform angle in [0, 2π).
    pub fn angle(&mut self) -> f64 {
        self.rng.gen_range(0., 2. * PI)
    }

    pub fn in_interval(&mut self, interval: ClosedInterval<f64>) -> f64 {
        if interval.lower_bound() >= interval.upper_bound() {
            return interval.lower_bound();
        }
        self.rng
            .gen_range(interval.lower_bound(), interval.upper_bound())
    }

    /// Uniformly distributed offset inside the disc of radius `bound`.
    pub fn planar_jitter(&mut self, bound: f64) -> Vector2<f64> {
        if bound <= 0. {
            return Vector2::zeros();
        }
        let radius = bound * self.unit().sqrt();
        direction_from_angle(self.angle()) * radius
    }

    /// Horizontal deviation of a pile axis per unit of height. The direction is uniform on the
    /// unit circle, the magnitude uniform in [0, max_ratio].
    pub fn tilt(&mut self, max_ratio: f64) -> Vector2<f64> {
        if max_ratio <= 0. {
            return Vector2::zeros();
        }
        let magnitude = self.rng.gen_range(0., max_ratio);
        direction_from_angle(self.angle()) * magnitude
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = ToleranceSampler::new(42);
        let mut b = ToleranceSampler::new(42);
        for _ in 0..100 {
            assert_eq!(a.symmetric(1.).to_bits(), b.symmetric(1.).to_bits());
            assert_eq!(a.tilt(0.005), b.tilt(0.005));
        }
    }

    #[test]
    fn test_streams_are_independent() {
        let mut layout = ToleranceSampler::for_stream(7, Stream::Layout);
        let mut camera = ToleranceSampler::for_stream(7, Stream::Camera);
        assert_ne!(layout.unit().to_bits(), camera.unit().to_bits());
    }

    #[test]
    fn test_bounds_hold() {
        let mut sampler = ToleranceSampler::new(3);
        for _ in 0..10_000 {
            assert!(sampler.planar_jitter(0.01).norm() <= 0.01);
            assert!(sampler.tilt(0.005).norm() <= 0.005);
            assert!(sampler.symmetric(0.2).abs() <= 0.2);
        }
        assert_eq!(sampler.planar_jitter(0.), Vector2::zeros());
        assert_eq!(sampler.tilt(0.), Vector2::zeros());
    }
}
