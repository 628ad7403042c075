use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use rayloop::{resolve_app_paths, AppPaths, ConfigError, LoopConfig, Simulation, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::raycaster::{LevelError, RaycastSimulation};

const LEVEL_ENV_VAR: &str = "RAYLOOP_LEVEL";
const DEFAULT_LEVEL_FILE: &str = "demo.json";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Level(#[from] LevelError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) simulation: Box<dyn Simulation>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "startup");

    let paths = resolve_app_paths()?;
    let config = LoopConfig::load_or_default(&paths.config_path)?.with_env_overrides();
    let level_path = level_path(&paths, env::var_os(LEVEL_ENV_VAR));
    let simulation = RaycastSimulation::load(&level_path)?;

    let (width, height) = simulation.grid_size();
    let (camera_x, camera_y) = simulation.position();
    info!(
        root = %paths.root.display(),
        config = %paths.config_path.display(),
        level = %level_path.display(),
        width,
        height,
        camera_x,
        camera_y,
        heading_degrees = simulation.heading_degrees(),
        "level_loaded"
    );

    Ok(AppWiring {
        config,
        simulation: Box::new(simulation),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Relative overrides are resolved against the project root.
fn level_path(paths: &AppPaths, override_path: Option<OsString>) -> PathBuf {
    match override_path {
        Some(raw) if !raw.is_empty() => {
            let path = PathBuf::from(raw);
            if path.is_relative() {
                paths.root.join(path)
            } else {
                path
            }
        }
        _ => paths.levels_dir.join(DEFAULT_LEVEL_FILE),
    }
}
