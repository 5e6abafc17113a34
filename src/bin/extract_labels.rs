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

use log::info;
use pile_field::annotation::{extract_from_files, write_labels};
use pile_field::errors::*;
use pile_field::AnnotationConfig;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "extract_labels",
    about = "Turns a rendered instance id image into a bounding box label file."
)]
struct CommandlineArguments {
    /// 8 or 16 bit grayscale PNG holding one instance id per pixel.
    #[structopt(parse(from_os_str))]
    instance_image: PathBuf,

    /// Attribute table: JSON list of {"idx", "category_id", "name"}.
    #[structopt(parse(from_os_str))]
    attributes: PathBuf,

    /// Label file to write, one "class_id cx cy w h" line per box.
    #[structopt(parse(from_os_str))]
    output: PathBuf,

    #[structopt(long, default_value = "0")]
    class_id: i32,

    /// Instance id of pixels that show no object.
    #[structopt(long, default_value = "0")]
    background_id: u32,

    #[structopt(long, default_value = "0.005")]
    min_box_extent: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CommandlineArguments::from_args();
    let config = AnnotationConfig {
        class_id: args.class_id,
        background_id: args.background_id,
        min_box_extent: args.min_box_extent,
    };
    let records = extract_from_files(&args.instance_image, &args.attributes, &config)?;
    let mut writer = BufWriter::new(File::create(&args.output)?);
    write_labels(&mut writer, &records)?;
    writer.flush()?;
    info!(
        "Wrote {} boxes of class {} to {}.",
        records.len(),
        args.class_id,
        args.output.display()
    );
    Ok(())
}
