//! pvirr CLI - Solar geometry and inclined irradiance for PV surfaces

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pvirr_algorithms::irradiance::{
    GlobalInclinedIrradiance, IrradianceEngine, IrradianceInput, IrradianceParams, IrradianceSummary,
};
use pvirr_algorithms::position::{
    solar_position, PositionAlgorithm, SolarPositionParams, SolarPositionResult, TimingAlgorithm,
};
use pvirr_algorithms::shading::HorizonProfile;
use pvirr_core::{AzimuthOrigin, Location, SurfaceGeometry, TimeSeries, Timestamps};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "pvirr")]
#[command(author, version, about = "Solar geometry and inclined irradiance for PV surfaces", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solar altitude and azimuth for a timestamp sequence
    Position {
        #[command(flatten)]
        site: SiteArgs,
        #[command(flatten)]
        time: TimeArgs,
        #[command(flatten)]
        model: PositionArgs,
    },
    /// Global irradiance on an inclined surface
    Irradiance {
        #[command(flatten)]
        site: SiteArgs,
        #[command(flatten)]
        time: TimeArgs,
        #[command(flatten)]
        model: PositionArgs,
        #[command(flatten)]
        surface: SurfaceArgs,
    },
}

#[derive(Args)]
struct SiteArgs {
    /// Longitude in degrees, east positive
    #[arg(long, allow_hyphen_values = true)]
    longitude: f64,
    /// Latitude in degrees, north positive
    #[arg(long, allow_hyphen_values = true)]
    latitude: f64,
    /// Elevation above sea level in meters
    #[arg(long, default_value = "0.0")]
    elevation: f64,
}

#[derive(Args)]
struct TimeArgs {
    /// First timestamp (RFC 3339, e.g. 2024-06-21T00:00:00Z)
    #[arg(long)]
    start: DateTime<Utc>,
    /// Number of timestamps
    #[arg(short = 'n', long, default_value = "24")]
    count: usize,
    /// Minutes between timestamps
    #[arg(long, default_value = "60")]
    step_minutes: i64,
    /// IANA time zone driving the solar time
    #[arg(long, default_value = "UTC")]
    timezone: String,
}

#[derive(Args)]
struct PositionArgs {
    /// Position model: noaa, hofierka, iqbal
    #[arg(long, default_value = "noaa")]
    position_algorithm: String,
    /// Equation of time: noaa, milne
    #[arg(long, default_value = "noaa")]
    timing_algorithm: String,
    /// Report geometric instead of refracted altitude
    #[arg(long)]
    no_refraction: bool,
}

#[derive(Args)]
struct SurfaceArgs {
    /// Surface orientation in degrees clockwise from North
    #[arg(long, default_value = "180")]
    orientation: f64,
    /// Surface tilt in degrees from horizontal
    #[arg(long, default_value = "30")]
    tilt: f64,
    /// Ground albedo
    #[arg(long, default_value = "0.2")]
    albedo: f64,
    /// Constant Linke turbidity (clear-sky model only)
    #[arg(long)]
    linke: Option<f64>,
    /// Measured global horizontal irradiance, comma separated W/m2
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    global_horizontal: Option<Vec<f64>>,
    /// Measured direct horizontal irradiance, comma separated W/m2
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    direct_horizontal: Option<Vec<f64>>,
    /// Horizon heights in degrees, evenly spaced clockwise from North
    #[arg(long, value_delimiter = ',')]
    horizon: Option<Vec<f64>>,
    /// Skip the angular reflectivity loss
    #[arg(long)]
    no_reflectivity: bool,
    /// Ignore the horizon profile
    #[arg(long)]
    no_shading: bool,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn location(site: &SiteArgs) -> Result<Location> {
    Location::from_degrees(site.longitude, site.latitude, site.elevation).context("Invalid location")
}

fn timestamps(time: &TimeArgs) -> Result<(Timestamps, Tz)> {
    let tz: Tz = time
        .timezone
        .parse()
        .map_err(|e| anyhow!("Unknown time zone {}: {}", time.timezone, e))?;
    let ts = Timestamps::regular(time.start, Duration::minutes(time.step_minutes), time.count)
        .context("Invalid timestamp sequence")?;
    Ok((ts, tz))
}

fn position_params(model: &PositionArgs) -> Result<SolarPositionParams> {
    let position_algorithm: PositionAlgorithm = model.position_algorithm.parse()?;
    let timing_algorithm: TimingAlgorithm = model.timing_algorithm.parse()?;
    Ok(SolarPositionParams {
        position_algorithm,
        timing_algorithm,
        refraction: !model.no_refraction,
        ..Default::default()
    })
}

fn done(name: &str, count: usize, elapsed: std::time::Duration) {
    eprintln!("{} computed for {} timestamps", name, count);
    eprintln!("  Processing time: {:.2?}", elapsed);
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

// ─── Output rows ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PositionRow {
    timestamp: DateTime<Utc>,
    declination: f64,
    hour_angle: f64,
    altitude: f64,
    azimuth: f64,
}

fn position_rows(ts: &Timestamps, r: &SolarPositionResult) -> Result<Vec<PositionRow>> {
    let declination = r.declination.degrees();
    let hour_angle = r.hour_angle.degrees();
    let altitude = r.altitude.degrees();
    let azimuth = r.azimuth.radians_from(AzimuthOrigin::North).to_degrees();
    ts.iter()
        .enumerate()
        .map(|(i, t)| {
            Ok(PositionRow {
                timestamp: *t,
                declination: declination.get(i)?,
                hour_angle: hour_angle.get(i)?,
                altitude: altitude.get(i)?,
                azimuth: azimuth.get(i)?,
            })
        })
        .collect()
}

#[derive(Serialize)]
struct IrradianceRow {
    timestamp: DateTime<Utc>,
    altitude: f64,
    sun_horizon: String,
    shading_state: String,
    direct: f64,
    diffuse: f64,
    ground_reflected: f64,
    global: f64,
}

#[derive(Serialize)]
struct IrradianceReport {
    rows: Vec<IrradianceRow>,
    summary: IrradianceSummary,
}

fn irradiance_rows(r: &GlobalInclinedIrradiance) -> Result<Vec<IrradianceRow>> {
    let altitude = r.position.altitude.degrees();
    r.timestamps
        .iter()
        .enumerate()
        .map(|(i, t)| {
            Ok(IrradianceRow {
                timestamp: *t,
                altitude: altitude.get(i)?,
                sun_horizon: r.sun_horizon.get(i)?.to_string(),
                shading_state: r.shading_states.get(i)?.to_string(),
                direct: r.direct.value.get(i)?,
                diffuse: r.diffuse.value.get(i)?,
                ground_reflected: r.ground_reflected.value.get(i)?,
                global: r.global.value.get(i)?,
            })
        })
        .collect()
}

fn print_summary(s: &IrradianceSummary) {
    println!();
    println!("Totals (W/m2 summed over timestamps):");
    println!("  Global:           {:.1}", s.global.sum);
    println!("  Direct:           {:.1}", s.direct.sum);
    println!("  Diffuse:          {:.1}", s.diffuse.sum);
    println!("  Ground reflected: {:.1}", s.ground_reflected.sum);
    println!(
        "  Reflectivity loss: {:.1} ({:.2}%)",
        s.reflectivity_loss.sum, s.reflectivity_loss_percentage
    );
    println!(
        "Sun: {} below, {} low angle, {} above",
        s.below_horizon, s.low_angle, s.above_horizon
    );
    println!(
        "Surface: {} in shade, {} sunlit, {} potentially sunlit",
        s.in_shade, s.sunlit, s.potentially_sunlit
    );
    if s.out_of_range > 0 {
        println!("  {} values outside physical limits", s.out_of_range);
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Position { site, time, model } => {
            let loc = location(&site)?;
            let (ts, tz) = timestamps(&time)?;
            let params = position_params(&model)?;

            let start = Instant::now();
            let result = solar_position(&loc, &ts, tz, &params).context("Failed to compute solar position")?;
            let elapsed = start.elapsed();
            let rows = position_rows(&ts, &result)?;

            if cli.json {
                print_json(&rows)?;
            } else {
                println!(
                    "{:<26} {:>10} {:>11} {:>9} {:>9}",
                    "timestamp", "decl", "hour angle", "altitude", "azimuth"
                );
                for row in &rows {
                    println!(
                        "{:<26} {:>10.3} {:>11.3} {:>9.3} {:>9.3}",
                        row.timestamp.to_rfc3339(),
                        row.declination,
                        row.hour_angle,
                        row.altitude,
                        row.azimuth
                    );
                }
            }
            done("Solar position", ts.len(), elapsed);
        }

        Commands::Irradiance {
            site,
            time,
            model,
            surface,
        } => {
            let loc = location(&site)?;
            let (ts, tz) = timestamps(&time)?;
            let geometry =
                SurfaceGeometry::from_degrees(surface.orientation, surface.tilt).context("Invalid surface")?;

            let mut input = IrradianceInput::new(loc, geometry, ts, tz);
            if let Some(linke) = surface.linke {
                input = input.with_constant_linke_turbidity(linke);
            }
            input.global_horizontal = surface.global_horizontal.map(TimeSeries::from_vec);
            input.direct_horizontal = surface.direct_horizontal.map(TimeSeries::from_vec);
            if let Some(heights) = surface.horizon {
                let heights = heights.into_iter().map(f64::to_radians).collect();
                input = input.with_horizon(HorizonProfile::uniform(heights).context("Invalid horizon")?);
            }

            let params = IrradianceParams {
                position: position_params(&model)?,
                albedo: surface.albedo,
                apply_reflectivity: !surface.no_reflectivity,
                apply_shading: !surface.no_shading,
                ..Default::default()
            };
            info!(
                tilt = surface.tilt,
                orientation = surface.orientation,
                albedo = surface.albedo,
                "composing inclined irradiance"
            );

            let pb = spinner("Composing irradiance...");
            let start = Instant::now();
            let engine = IrradianceEngine::new(params);
            let result = engine.compute(&input);
            let elapsed = start.elapsed();
            pb.finish_and_clear();
            let result = result.context("Failed to compose irradiance")?;

            let rows = irradiance_rows(&result)?;
            let summary = result.summary().context("Failed to summarize irradiance")?;
            if cli.json {
                print_json(&IrradianceReport { rows, summary })?;
            } else {
                println!(
                    "{:<26} {:>8} {:>10} {:>19} {:>8} {:>8} {:>8} {:>8}",
                    "timestamp", "altitude", "sun", "surface", "direct", "diffuse", "ground", "global"
                );
                for row in &rows {
                    println!(
                        "{:<26} {:>8.2} {:>10} {:>19} {:>8.1} {:>8.1} {:>8.1} {:>8.1}",
                        row.timestamp.to_rfc3339(),
                        row.altitude,
                        row.sun_horizon,
                        row.shading_state,
                        row.direct,
                        row.diffuse,
                        row.ground_reflected,
                        row.global
                    );
                }
                print_summary(&summary);
            }
            done("Inclined irradiance", result.len(), elapsed);
        }
    }

    Ok(())
}
