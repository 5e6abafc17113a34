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

use log::warn;
use pbr::ProgressBar;
use pile_field::camera::FramingMode;
use pile_field::errors::*;
use pile_field::generation::solve_scene;
use pile_field::math::ClosedInterval;
use pile_field::SceneConfig;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use std::fs;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "generate_scenes",
    about = "Solves pile layouts and camera views and writes one scene description per seed."
)]
struct CommandlineArguments {
    /// Directory the scene_<seed>.json files are written to.
    #[structopt(parse(from_os_str))]
    output_directory: PathBuf,

    /// Scene configuration as JSON. Missing values take their defaults.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Seed of the first scene. Scene i uses seed + i.
    #[structopt(long, default_value = "0")]
    seed: u64,

    #[structopt(long, default_value = "1")]
    num_scenes: u64,

    /// Number of worker threads. Defaults to the number of cores.
    #[structopt(long)]
    threads: Option<usize>,

    /// Camera altitude range above the layout center, e.g. "80,120". Overrides the framing
    /// of the configuration.
    #[structopt(long)]
    altitude: Option<ClosedInterval<f64>>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CommandlineArguments::from_args();

    let mut config = match &args.config {
        Some(path) => SceneConfig::from_json_file(path)?,
        None => SceneConfig::default(),
    };
    if let Some(altitude) = args.altitude {
        config.camera.framing = FramingMode::Altitude { altitude };
    }
    config.validate()?;

    // One worker is busy driving the progress bar.
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads.unwrap_or_else(num_cpus::get).max(2))
        .build_global()
        .chain_err(|| "Could not create thread pool.")?;

    fs::create_dir_all(&args.output_directory)?;
    let seeds: Vec<u64> = (args.seed..args.seed + args.num_scenes).collect();
    let config = &config;
    let output_directory = &args.output_directory;

    let mut progress_bar = ProgressBar::new(seeds.len() as u64);
    progress_bar.message("Solving scenes: ");
    let (progress_tx, progress_rx) = crossbeam::channel::unbounded();
    let results = rayon::scope(|scope| {
        scope.spawn(|_| {
            for _ in progress_rx {
                progress_bar.inc();
            }
        });
        let results: Vec<(u64, Result<PathBuf>)> = seeds
            .par_iter()
            .map(|&seed| {
                let result =
                    solve_scene(config, seed).and_then(|scene| scene.write_to(output_directory));
                // The receiver only goes away when the scope ends.
                let _ = progress_tx.send(());
                (seed, result)
            })
            .collect();
        drop(progress_tx);
        results
    });
    progress_bar.finish();

    let mut num_written = 0;
    for (seed, result) in results {
        match result {
            Ok(_) => num_written += 1,
            Err(Error(ErrorKind::FramingInfeasible(required, max), _)) => warn!(
                "Skipping scene {}: framing needs {:.1}° but at most {:.1}° is allowed.",
                seed, required, max
            ),
            Err(e) => return Err(e),
        }
    }
    println!(
        "Wrote {} of {} scenes to {}.",
        num_written,
        seeds.len(),
        output_directory.display()
    );
    Ok(())
}
