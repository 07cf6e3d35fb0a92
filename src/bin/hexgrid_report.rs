//! Build hexagon grids headlessly and report what would be drawn.
//!
//! Run with: cargo run --bin hexgrid_report
//!
//! Usage:
//!   hexgrid_report                          One default grid around Beijing
//!   hexgrid_report grids.json               Every enabled record in an exported grid file
//!   hexgrid_report --merge "0,0 1,-1"       Add a merge group (repeatable)
//!   hexgrid_report --span 0.005             Cull against a smaller view
//!
//! Set RUST_LOG=debug for per-pair merge diagnostics.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use hexgrid_geomock::constants::{DEFAULT_AREA_RADIUS_M, DEFAULT_HEX_RADIUS_M, DEFAULT_NEW_GRID_CENTER};
use hexgrid_geomock::grid_config::{load_grid_file, GridConfig};
use hexgrid_geomock::grid_layer::{GridLayer, StaticView};
use hexgrid_geomock::hex_coords::GeoPoint;
use hexgrid_geomock::render::PrimitiveKind;

#[derive(Parser)]
#[command(name = "hexgrid_report")]
#[command(about = "Generate hexagon grids and report merges and culling")]
struct Args {
    /// Exported grid records (JSON array). Without it one grid is built from the flags below.
    grids: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_NEW_GRID_CENTER.0, allow_negative_numbers = true)]
    lat: f64,

    #[arg(long, default_value_t = DEFAULT_NEW_GRID_CENTER.1, allow_negative_numbers = true)]
    lng: f64,

    /// Area radius in metres
    #[arg(long, default_value_t = DEFAULT_AREA_RADIUS_M)]
    area: f64,

    /// Hexagon radius in metres
    #[arg(long, default_value_t = DEFAULT_HEX_RADIUS_M)]
    hex: f64,

    /// Whitespace-separated hexagon ids that share edges
    #[arg(short, long)]
    merge: Vec<String>,

    /// Half-width of the simulated map view in degrees
    #[arg(long, default_value_t = 0.05)]
    span: f64,

    /// Keep every hexagon attached
    #[arg(long)]
    no_cull: bool,

    /// Include disabled records from the grid file
    #[arg(long)]
    all: bool,
}

fn load_configs(args: &Args) -> Result<Vec<GridConfig>, Box<dyn std::error::Error>> {
    let Some(path) = &args.grids else {
        let mut config = GridConfig::new("cli", GeoPoint::new(args.lat, args.lng));
        config.area_radius = args.area;
        config.grid_radius = args.hex;
        config.merge_areas = args
            .merge
            .iter()
            .map(|group| group.split_whitespace().map(str::to_string).collect())
            .collect();
        return Ok(vec![config]);
    };

    let report = load_grid_file(path)?;
    if report.rejected > 0 {
        println!("{}", format!("Skipped {} invalid records", report.rejected).yellow());
    }
    Ok(report
        .accepted
        .into_iter()
        .filter(|config| args.all || config.enabled)
        .collect())
}

fn report_grid(config: &GridConfig, args: &Args) {
    let view = StaticView::around(config.center(), args.span);
    let mut layer = GridLayer::new();
    if args.no_cull {
        layer.set_viewport_rendering(false, &view);
    }

    let start = Instant::now();
    let summary = match layer.apply_config(config, &view) {
        Ok(summary) => summary,
        Err(e) => {
            println!("{} {}: {}", "✗".red(), config.name.bold(), e);
            return;
        }
    };
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let merged = layer.merge_info().len();
    let shared_edges: usize = layer.hexagons().iter().map(|h| h.neighbor_count()).sum();
    let polylines = layer.layer().map_or(0, |l| l.count_kind(PrimitiveKind::Polyline));

    println!("{} {}", "●".green(), config.name.bold());
    println!(
        "  center {:.4}, {:.4}   area {} m   hex {} m",
        summary.center.lat, summary.center.lng, summary.area_radius_m, summary.hex_radius_m
    );
    println!("  hexagons      {}", summary.hexagon_count.to_string().cyan());
    println!(
        "  merge groups  {}   merged hexagons {}   shared edges {}   edge polylines {}",
        layer.merge_config().len(),
        merged,
        shared_edges / 2,
        polylines
    );
    if merged == 0 && !layer.merge_config().is_empty() {
        println!("  {}", "no configured pair was adjacent".yellow());
    }
    println!(
        "  visible       {} of {}{}",
        layer.visible_hexagons().count(),
        summary.hexagon_count,
        if layer.viewport().is_enabled() { "" } else { " (culling off)" }
    );
    println!("  built in      {:.2} ms", elapsed_ms);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let configs = match load_configs(&args) {
        Ok(configs) => configs,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    if configs.is_empty() {
        println!("{}", "No enabled grids to report".yellow());
        return;
    }
    for config in &configs {
        report_grid(config, &args);
    }
}
