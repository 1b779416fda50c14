use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use formats::Dataset;
use foundation::math::Vec2;
use tools::{ImageBaseMaps, RenderJob, inspect_dataset, parse_point, run_render, save_png};
use tracing::info;
use tracing_subscriber::EnvFilter;
use worldview::ViewerConfig;

#[derive(Parser, Debug)]
#[command(name = "worlddata", about = "Headless tools for the data globe")]
struct Cli {
    /// JSON file overriding viewer tunables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Paint a dataset onto a base map and write the globe texture as PNG.
    Render(RenderArgs),
    /// Print a dataset's title, draw path and camera fit as JSON.
    Inspect {
        geojson: PathBuf,
    },
    /// Print the effective viewer configuration.
    Config,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(long)]
    geojson: Option<PathBuf>,
    /// Geographic base map image.
    #[arg(long)]
    base_map: PathBuf,
    /// Land/ocean base map image, needed by `--swap`.
    #[arg(long)]
    land_ocean: Option<PathBuf>,
    #[arg(long, short)]
    out: PathBuf,
    /// Simulated tap at `x,y` viewport pixels (top-left origin); repeatable.
    #[arg(long = "tap", value_parser = parse_point)]
    taps: Vec<Vec2>,
    /// Switch to the other base map before writing.
    #[arg(long)]
    swap: bool,
    #[arg(long, default_value_t = 800)]
    width: u32,
    #[arg(long, default_value_t = 800)]
    height: u32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(cli: Cli) -> Result<(), String> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Render(args) => cmd_render(config, args),
        Command::Inspect { geojson } => {
            let dataset = read_dataset(&geojson)?;
            let report = inspect_dataset(&dataset, &config);
            let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
            println!("{text}");
            Ok(())
        }
        Command::Config => {
            println!("{}", config.to_json_string_pretty().map_err(|e| e.to_string())?);
            Ok(())
        }
    }
}

fn cmd_render(config: ViewerConfig, args: RenderArgs) -> Result<(), String> {
    let mut maps = ImageBaseMaps::new(&args.base_map);
    if let Some(path) = &args.land_ocean {
        maps = maps.with_land_ocean(path);
    }
    let dataset = args.geojson.as_deref().map(read_dataset).transpose()?;

    let job = RenderJob {
        dataset,
        taps: args.taps,
        swap: args.swap,
        viewport: (args.width, args.height),
    };
    let report = run_render(config, maps, job)?;
    for line in &report.host.status {
        println!("{line}");
    }

    let texture = report
        .texture()
        .ok_or_else(|| "no texture was produced".to_string())?;
    save_png(texture, &args.out)?;
    info!(path = %args.out.display(), "texture written");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ViewerConfig, String> {
    let Some(path) = path else {
        return Ok(ViewerConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    ViewerConfig::from_json_str(&text).map_err(|e| format!("parse {path:?}: {e}"))
}

fn read_dataset(path: &Path) -> Result<Dataset, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    Dataset::from_geojson_str(&text).map_err(|e| format!("{path:?}: {e}"))
}
