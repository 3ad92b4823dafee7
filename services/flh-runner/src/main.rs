//! Full-load-hour runner.
//!
//! Prepares weather fields from raw reanalysis arrays, fits the topographic
//! wind correction, builds the wind correction rasters, and computes annual
//! FLH and hourly series per region and technology against a Zarr store.

mod config_loader;
mod output;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flh_engine::{build_wind_correction, fit_gwa_correction, PixelCenterRasterizer, RegionDriver};
use geo_common::{ResourceError, Technology};
use grid_store::weather::prepare_weather;
use grid_store::{RasterLayer, RasterStore, StoreError, WeatherStore, ZarrStore};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config_loader::{load_gwa_countries, load_regions, load_run_config, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "flh-runner")]
#[command(about = "Renewable full-load-hour runner")]
struct Args {
    /// Run file path
    #[arg(short, long, env = "FLH_RUN_CONFIG", default_value = "config/run.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derive clearness, temperature and 50 m wind speed from the raw group
    PrepareWeather,

    /// Fit the onshore topographic correction against Global Wind Atlas samples
    FitTopography,

    /// Build hub-height wind correction rasters over the output grid
    BuildWindCorrection {
        /// Technology (default: wind technologies of the run file)
        #[arg(short, long)]
        technology: Option<String>,
    },

    /// Compute annual FLH and hourly regional series
    ComputeFlh {
        /// Technology (default: all technologies of the run file)
        #[arg(short, long)]
        technology: Option<String>,

        /// Region name (default: every region)
        #[arg(short, long)]
        region: Option<String>,
    },

    /// Compute hourly capacity factors at the points of the run file
    PointSeries {
        /// Technology (default: all technologies of the run file)
        #[arg(short, long)]
        technology: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if let Err(err) = run(&args) {
        error!(kind = error_kind(&err), error = %format!("{:#}", err), "Run failed");
        return Err(err);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = load_run_config(&args.config)
        .with_context(|| format!("Failed to load run file {:?}", args.config))?;
    info!(
        config = %args.config.display(),
        year = config.engine.year,
        nproc = config.engine.nproc,
        technologies = ?config.technologies,
        "Loaded run configuration"
    );

    let store = Arc::new(ZarrStore::open(config.store.clone()).context("Failed to open store")?);
    let started = Instant::now();

    match &args.command {
        Command::PrepareWeather => {
            prepare_weather(&store, config.engine.year).context("Weather preparation failed")?;
        }
        Command::FitTopography => {
            run_topo_fit(&config, &store)?;
        }
        Command::BuildWindCorrection { technology } => {
            let technologies = select(technology.as_deref(), config.wind_technologies())?;
            run_wind_correction(&config, &store, &technologies)?;
        }
        Command::ComputeFlh { technology, region } => {
            let technologies = select(technology.as_deref(), config.technologies.clone())?;
            run_flh(&config, store, &technologies, region.as_deref())?;
        }
        Command::PointSeries { technology } => {
            let technologies = select(technology.as_deref(), config.technologies.clone())?;
            run_point_series(&config, store, &technologies)?;
        }
    }

    info!(elapsed_ms = started.elapsed().as_millis() as u64, "Run complete");
    Ok(())
}

/// Kind of the innermost resource or store error in the chain, for the
/// failure log.
fn error_kind(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ResourceError>() {
            return e.root_cause().kind();
        }
        if let Some(e) = cause.downcast_ref::<StoreError>() {
            return match e {
                StoreError::NotFound(_) => "missing_data",
                StoreError::ConfigError(_) => "config",
                _ => "storage",
            };
        }
    }
    "other"
}

/// Narrow the configured technologies to the one named on the command line.
fn select(requested: Option<&str>, configured: Vec<Technology>) -> Result<Vec<Technology>> {
    match requested {
        None => Ok(configured),
        Some(name) => {
            let tech = Technology::from_str(name)
                .with_context(|| format!("Unknown technology: {}", name))?;
            Ok(vec![tech])
        }
    }
}

fn run_topo_fit(config: &RunConfig, store: &ZarrStore) -> Result<()> {
    let path = config
        .gwa
        .as_ref()
        .context("Run file names no gwa samples file")?;
    let countries = load_gwa_countries(path)?;
    let output_grid = store.raster_grid().context("Land-use raster missing")?;

    let (fit, factor) = fit_gwa_correction(
        store,
        store,
        &PixelCenterRasterizer,
        &countries,
        config.params.wind_on.topo_weight,
    )
    .context("Topographic fit failed")?;
    store
        .write_layer(RasterLayer::TopoCorrection, &factor, &output_grid)
        .context("Failed to write topographic correction")?;
    info!(a = fit.a, b = fit.b, countries = countries.len(), "Stored topographic correction");
    Ok(())
}

fn run_wind_correction(config: &RunConfig, store: &ZarrStore, technologies: &[Technology]) -> Result<()> {
    let weather_grid = store.weather_grid().context("Weather fields not prepared")?;
    let output_grid = store.raster_grid().context("Land-use raster missing")?;

    for &technology in technologies {
        let layer = match technology {
            Technology::WindOn => RasterLayer::WindCorrectionOn,
            Technology::WindOff => RasterLayer::WindCorrectionOff,
            other => {
                warn!(technology = %other, "Skipping non-wind technology");
                continue;
            }
        };
        let correction = build_wind_correction(technology, &weather_grid, store, &config.params)
            .with_context(|| format!("Failed to build {} correction", technology))?;
        store
            .write_layer(layer, &correction, &output_grid)
            .with_context(|| format!("Failed to write {}", layer))?;
        info!(technology = %technology, layer = %layer, "Stored wind correction");
    }
    Ok(())
}

fn driver(config: &RunConfig, store: Arc<ZarrStore>) -> Result<RegionDriver> {
    RegionDriver::new(
        store.clone(),
        store,
        Arc::new(PixelCenterRasterizer),
        config.engine.clone(),
        config.params.clone(),
    )
    .context("Invalid engine configuration")
}

fn run_flh(
    config: &RunConfig,
    store: Arc<ZarrStore>,
    technologies: &[Technology],
    only: Option<&str>,
) -> Result<()> {
    let mut regions = load_regions(&config.regions)?;
    if let Some(name) = only {
        regions.retain(|r| r.name == name);
        anyhow::ensure!(!regions.is_empty(), "Region {} not in {:?}", name, config.regions);
    }

    let driver = driver(config, store.clone())?;
    for &technology in technologies {
        for region in &regions {
            let result = driver.compute_flh(technology, region)?;

            output::write_flh(&store, &result)?;
            let series_path = output::write_region_series(store.root(), &result)?;
            info!(
                technology = %technology,
                region = %region.name,
                mean_flh = ?result.mean_flh(),
                mask_pixels = result.mask_pixels,
                series = %series_path.display(),
                "Stored region results"
            );
        }
    }
    Ok(())
}

fn run_point_series(config: &RunConfig, store: Arc<ZarrStore>, technologies: &[Technology]) -> Result<()> {
    anyhow::ensure!(!config.points.is_empty(), "Run file lists no points");

    let driver = driver(config, store.clone())?;
    for &technology in technologies {
        let series = driver
            .compute_point_series(technology, &config.points)
            .with_context(|| format!("{} point series failed", technology))?;
        let path = output::write_point_series(store.root(), &series)?;
        info!(
            technology = %technology,
            points = config.points.len(),
            path = %path.display(),
            "Stored point series"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flh_engine::{EngineConfig, ModelParams, Polygon, Region};
    use geo_common::GeoPoint;
    use grid_store::{MemoryStore, StoreConfig, WeatherField};
    use test_utils::{resolutions, temp_store_dir, window_ring, windows, ScopeFixture};

    fn populated_store(root: &std::path::Path) -> (Arc<ZarrStore>, ScopeFixture) {
        let scope = ScopeFixture::singapore();
        let memory: MemoryStore = scope.store();
        let store = ZarrStore::open(StoreConfig::at(root)).unwrap();
        for field in WeatherField::ALL {
            store
                .write_field(field, &memory.read_field(field, None).unwrap(), &scope.weather)
                .unwrap();
        }
        for layer in [RasterLayer::Landuse, RasterLayer::Land, RasterLayer::Eez] {
            store
                .write_layer(layer, &memory.read_raster(layer, None).unwrap(), &scope.output)
                .unwrap();
        }
        (Arc::new(store), scope)
    }

    fn run_config(root: &std::path::Path, technologies: Vec<Technology>) -> RunConfig {
        let regions = vec![Region::new("Singapore", vec![Polygon::new(window_ring(&windows::SINGAPORE_ISLAND))])];
        let regions_path = root.join("regions.json");
        std::fs::write(&regions_path, serde_json::to_vec(&regions).unwrap()).unwrap();
        RunConfig {
            engine: EngineConfig {
                nproc: 2,
                cpu_limit: false,
                res_weather: resolutions::WEATHER,
                res_desired: resolutions::COARSE_OUTPUT,
                year: 2015,
            },
            params: ModelParams::default(),
            store: StoreConfig::at(root),
            regions: regions_path,
            technologies,
            points: vec![GeoPoint::new(1.35, 103.8)],
            gwa: None,
        }
    }

    #[test]
    fn test_select_technology() {
        assert_eq!(select(None, vec![Technology::Pv]).unwrap(), vec![Technology::Pv]);
        assert_eq!(select(Some("offshore"), vec![]).unwrap(), vec![Technology::WindOff]);
        assert!(select(Some("tidal"), vec![]).is_err());
    }

    #[test]
    fn test_wind_correction_then_flh() {
        let dir = temp_store_dir();
        let (store, _) = populated_store(dir.path());
        let config = run_config(dir.path(), vec![Technology::WindOn]);

        run_wind_correction(&config, &store, &[Technology::WindOn, Technology::Pv]).unwrap();
        assert!(store.contains(grid_store::store::RASTER_GROUP, "wind_correction_on"));

        run_flh(&config, store.clone(), &config.technologies, None).unwrap();
        assert!(dir.path().join("flh/WindOn/Singapore.zarr/zarr.json").exists());
        assert!(dir.path().join("series/WindOn/Singapore.json").exists());
    }

    #[test]
    fn test_unknown_region_is_an_error() {
        let dir = temp_store_dir();
        let (store, _) = populated_store(dir.path());
        let config = run_config(dir.path(), vec![Technology::Pv]);
        assert!(run_flh(&config, store, &config.technologies, Some("Atlantis")).is_err());
    }

    #[test]
    fn test_error_kind_reports_innermost_cause() {
        let dir = temp_store_dir();
        let (store, _) = populated_store(dir.path());
        let config = run_config(dir.path(), vec![Technology::WindOn]);

        // No correction raster has been built yet.
        let err = run_flh(&config, store, &config.technologies, None).unwrap_err();
        assert_eq!(error_kind(&err), "missing_data");
        assert!(format!("{:#}", err).contains("Singapore"));

        assert_eq!(error_kind(&anyhow::anyhow!("plain")), "other");
        let store_err = anyhow::Error::new(StoreError::NotFound("raw/SWGDN".into())).context("prepare");
        assert_eq!(error_kind(&store_err), "missing_data");
    }

    #[test]
    fn test_topo_fit_requires_samples_file() {
        let dir = temp_store_dir();
        let (store, _) = populated_store(dir.path());
        let config = run_config(dir.path(), vec![Technology::WindOn]);
        let err = run_topo_fit(&config, &store).unwrap_err();
        assert!(err.to_string().contains("gwa"), "{}", err);
    }

    #[test]
    fn test_point_series_output() {
        let dir = temp_store_dir();
        let (store, _) = populated_store(dir.path());
        let config = run_config(dir.path(), vec![Technology::Csp]);

        run_point_series(&config, store, &config.technologies).unwrap();
        let path = dir.path().join("series/CSP/points.json");
        let json: serde_json::Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(json["series"][0].as_array().unwrap().len(), geo_common::HOURS_PER_YEAR);
    }
}
