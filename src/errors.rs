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

use std::io;

error_chain! {
    foreign_links {
        Io(io::Error);
        Json(serde_json::Error);
        Image(image::ImageError);
    }

    errors {
        InvalidConfiguration(parameter: String, reason: String) {
            description("invalid configuration")
            display("Invalid configuration for '{}': {}", parameter, reason)
        }
        FramingInfeasible(required_fov_deg: f64, max_fov_deg: f64) {
            description("layout cannot be framed")
            display("Framing the layout needs a field of view of {:.1}°, but at most {:.1}° \
                     is allowed. Increase the distance or altitude.",
                    required_fov_deg, max_fov_deg)
        }
        BufferShape(expected: (u32, u32), actual: (u32, u32), expected_ids: usize,
                    num_ids: usize) {
            description("instance id buffer does not match the image dimensions")
            display("Instance id buffer holds {} ids for {}x{} pixels ({} expected), the image is \
                     declared as {}x{}.",
                    num_ids, actual.0, actual.1, expected_ids, expected.0, expected.1)
        }
    }
}

/// Shorthand for the most common error: a named parameter that failed validation.
pub fn invalid_config<T>(parameter: &str, reason: impl Into<String>) -> Result<T> {
    Err(ErrorKind::InvalidConfiguration(parameter.to_string(), reason.into()).into())
}
