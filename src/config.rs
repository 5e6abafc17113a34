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

use crate::annotation::AnnotationConfig;
use crate::camera::CameraConfig;
use crate::errors::*;
use crate::layout::LayoutConfig;
use crate::scene::Intrinsics;
use crate::terrain::{ElevationField, Perturbation, TerraceAxis};
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub type TerrainConfig = ElevationField;

/// Everything needed to generate one scene besides the seed. Missing sections take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub terrain: TerrainConfig,
    pub layout: LayoutConfig,
    pub camera: CameraConfig,
    pub annotation: AnnotationConfig,
    pub intrinsics: Intrinsics,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            // Radial terraces, 25 m wide and 2 m high, with gentle undulation.
            terrain: ElevationField::terraced(0., 2., 25., TerraceAxis::Radial)
                .with_perturbation(Perturbation::default()),
            layout: LayoutConfig::default(),
            camera: CameraConfig::default(),
            annotation: AnnotationConfig::default(),
            intrinsics: Intrinsics::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(
            File::open(path).chain_err(|| format!("Could not open {}", path.display()))?,
        );
        let config: SceneConfig = serde_json::from_reader(reader)
            .chain_err(|| format!("Could not parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        self.layout.validate()?;
        self.camera.validate()?;
        self.annotation.validate()?;
        self.intrinsics.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FramingMode;
    use crate::terrain::TerrainShape;
    use std::io::Write;
    use tempdir::TempDir;

    #[test]
    fn test_partial_json_takes_defaults() {
        let json = r#"{
            "terrain": {"base": 3.0, "shape": {"type": "planar", "dz_dx": 0.1, "dz_dy": 0.0}},
            "layout": {"group_rows": 2, "tolerances": {"max_tilt_ratio": 0.002}},
            "camera": {"framing": {"type": "altitude",
                                   "altitude": {"lower_bound": 80.0, "upper_bound": 120.0}}}
        }"#;
        let config: SceneConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.layout.group_rows, 2);
        assert_eq!(config.layout.group_columns, 5);
        assert_eq!(config.layout.tolerances.max_tilt_ratio, 0.002);
        assert_eq!(config.layout.tolerances.alignment_jitter, 0.05);
        assert_eq!(
            config.terrain.shape,
            TerrainShape::Planar {
                dz_dx: 0.1,
                dz_dy: 0.
            }
        );
        match &config.camera.framing {
            FramingMode::Altitude { altitude } => assert_eq!(altitude.upper_bound(), 120.),
            other => panic!("unexpected framing {:?}", other),
        }
        assert_eq!(config.intrinsics, Intrinsics::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = TempDir::new("config").unwrap();
        let path = dir.path().join("scene.json");
        let mut file = File::create(&path).unwrap();
        write!(file, r#"{{"layout": {{"piles_per_group": 101}}}}"#).unwrap();
        drop(file);
        assert!(SceneConfig::from_json_file(&path).is_err());
        assert!(SceneConfig::from_json_file(dir.path().join("missing.json")).is_err());
    }
}
