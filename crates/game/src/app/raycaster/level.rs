use std::fmt::Display;
use std::io;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum LevelError {
    #[error("failed to read level file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse level json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("validation failed at {path}: expected {expected}, got {actual}")]
    Invalid {
        path: &'static str,
        expected: String,
        actual: String,
    },
}

impl LevelError {
    fn invalid(path: &'static str, expected: impl Display, actual: impl Display) -> Self {
        Self::Invalid {
            path,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelFile {
    scene: SceneFile,
    camera: CameraFile,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    width: u32,
    height: u32,
    walls: Vec<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CameraFile {
    x: f32,
    y: f32,
    angle_degrees: f32,
    move_speed: f32,
    turn_speed_degrees: f32,
}

/// Row-major wall map. `0` is open floor, `n > 0` is a wall painted with
/// palette entry `n - 1`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WallGrid {
    width: u32,
    height: u32,
    cells: Vec<u32>,
}

impl WallGrid {
    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    /// `None` outside the grid.
    pub(crate) fn cell(&self, x: i64, y: i64) -> Option<u32> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.cells.get(index).copied()
    }

    /// Anything outside the grid blocks movement.
    pub(crate) fn is_solid_at(&self, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return true;
        }
        self.cell(x.floor() as i64, y.floor() as i64)
            .map_or(true, |wall| wall != 0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CameraStart {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) angle_degrees: f32,
    pub(crate) move_speed: f32,
    pub(crate) turn_speed_degrees: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Level {
    pub(crate) grid: WallGrid,
    pub(crate) camera: CameraStart,
}

impl Level {
    pub(crate) fn from_json(raw: &str) -> Result<Self, LevelError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let file = serde_path_to_error::deserialize::<_, LevelFile>(&mut deserializer).map_err(
            |error| {
                let path = error.path().to_string();
                LevelError::Parse {
                    path: if path.is_empty() { ".".to_string() } else { path },
                    source: error.into_inner(),
                }
            },
        )?;
        Self::validate(file)
    }

    fn validate(file: LevelFile) -> Result<Self, LevelError> {
        let SceneFile {
            width,
            height,
            walls,
        } = file.scene;
        if width == 0 {
            return Err(LevelError::invalid("scene.width", "positive width", width));
        }
        if height == 0 {
            return Err(LevelError::invalid("scene.height", "positive height", height));
        }
        let expected_cells = width as usize * height as usize;
        if walls.len() != expected_cells {
            return Err(LevelError::invalid(
                "scene.walls",
                format!("{expected_cells} cells ({width}x{height})"),
                walls.len(),
            ));
        }
        let grid = WallGrid {
            width,
            height,
            cells: walls,
        };

        let camera = file.camera;
        if !camera.x.is_finite() || camera.x < 0.0 || camera.x >= width as f32 {
            return Err(LevelError::invalid(
                "camera.x",
                format!("value in [0, {width})"),
                camera.x,
            ));
        }
        if !camera.y.is_finite() || camera.y < 0.0 || camera.y >= height as f32 {
            return Err(LevelError::invalid(
                "camera.y",
                format!("value in [0, {height})"),
                camera.y,
            ));
        }
        if grid.is_solid_at(camera.x, camera.y) {
            return Err(LevelError::invalid(
                "camera",
                "open cell",
                format!("wall at ({}, {})", camera.x.floor(), camera.y.floor()),
            ));
        }
        if !camera.angle_degrees.is_finite() {
            return Err(LevelError::invalid(
                "camera.angle_degrees",
                "finite number",
                camera.angle_degrees,
            ));
        }
        if !(camera.move_speed.is_finite() && camera.move_speed > 0.0) {
            return Err(LevelError::invalid(
                "camera.move_speed",
                "finite positive number",
                camera.move_speed,
            ));
        }
        if !(camera.turn_speed_degrees.is_finite() && camera.turn_speed_degrees > 0.0) {
            return Err(LevelError::invalid(
                "camera.turn_speed_degrees",
                "finite positive number",
                camera.turn_speed_degrees,
            ));
        }

        Ok(Self {
            grid,
            camera: CameraStart {
                x: camera.x,
                y: camera.y,
                angle_degrees: camera.angle_degrees,
                move_speed: camera.move_speed,
                turn_speed_degrees: camera.turn_speed_degrees,
            },
        })
    }
}
