use clap::Parser;
use ndarray_stats::QuantileExt;
use pretty_env_logger;
use seisgrid::cache::NpyDirStore;
use seisgrid::grid::{Axis, GridAxes3};
use seisgrid::profile::depth_slice;
use seisgrid::psf::{CacheStatus, PsfSynthesizerBuilder, DEFAULT_CACHE_NAME};
use std::process::ExitCode;
use std::{error::Error, path::PathBuf};

const VERSION: &'static str = env!("SEISGRID_VERSION");

#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
#[command(version = VERSION)]
struct Cli {
    #[clap(help = "Whitespace separated rows of: lon lat depth radius amplitude")]
    source_list: PathBuf,
    #[clap(
        long,
        required = true,
        num_args = 3,
        value_names = ["START", "STOP", "COUNT"],
        allow_negative_numbers = true
    )]
    lon: Vec<f64>,
    #[clap(
        long,
        required = true,
        num_args = 3,
        value_names = ["START", "STOP", "COUNT"],
        allow_negative_numbers = true
    )]
    lat: Vec<f64>,
    #[clap(
        long,
        required = true,
        num_args = 3,
        value_names = ["START", "STOP", "COUNT"],
        allow_negative_numbers = true
    )]
    dep: Vec<f64>,
    #[clap(long, default_value = ".")]
    cache_dir: PathBuf,
    #[clap(long, default_value = DEFAULT_CACHE_NAME)]
    cache_name: String,
    #[clap(long, action, help = "Recompute and overwrite any cached field")]
    force: bool,
    #[clap(long, help = "Print the field range on this depth (km) after synthesis")]
    slice_depth: Option<f64>,
}

fn linspace_axis(flag: &str, args: &[f64]) -> Result<Axis, Box<dyn Error>> {
    let count = args[2];
    if count.fract() != 0. || count < 2. {
        return Err(format!("--{} COUNT must be an integer >= 2, but got {}", flag, count).into());
    }
    Ok(Axis::linspace(args[0], args[1], count as usize)?)
}

fn entrypoint() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let axes = GridAxes3::new(
        linspace_axis("lon", &cli.lon)?,
        linspace_axis("lat", &cli.lat)?,
        linspace_axis("dep", &cli.dep)?,
    );
    let store = NpyDirStore::new(&cli.cache_dir);
    let synthesizer = PsfSynthesizerBuilder::default()
        .store(&store)
        .cache_name(&cli.cache_name)
        .force_recompute(cli.force)
        .build()?;
    let synthesis = synthesizer.synthesize_from_path(&axes, &cli.source_list)?;
    let entry = store.entry_path(&cli.cache_name)?;
    match &synthesis.cache {
        CacheStatus::Hit => println!("Loaded {} from cache", entry.display()),
        CacheStatus::Stored => println!("Stored {}", entry.display()),
        CacheStatus::StoreFailed(e) => eprintln!("Warning: field was not cached: {}", e),
    }
    if let Some(depth) = cli.slice_depth {
        let grid = synthesis.into_grid(axes)?;
        let slice = depth_slice(
            &grid,
            depth,
            grid.longitude().values().view(),
            grid.latitude().values().view(),
        )?;
        println!(
            "Depth {} km: min {:.6e}, max {:.6e}",
            depth,
            slice.min_skipnan(),
            slice.max_skipnan()
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    match entrypoint() {
        Err(e) => {
            eprintln!("Error: {:?}: {}", e, e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}
