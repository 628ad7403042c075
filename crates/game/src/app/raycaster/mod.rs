use std::f32::consts::{FRAC_PI_2, TAU};
use std::fs;
use std::path::Path;

use rayloop::{Simulation, SimulationError, FRAME_BYTES, FRAME_HEIGHT, FRAME_WIDTH};

mod level;

use level::{Level, WallGrid};

pub(crate) use level::LevelError;

const FIELD_OF_VIEW_DEGREES: f32 = 60.0;
/// Closest the camera may get to a wall face, in cells.
const COLLISION_MARGIN: f32 = 0.2;
const MIN_WALL_DISTANCE: f32 = 1.0e-4;

const CEILING_RGBA: [u8; 4] = [38, 42, 54, 255];
const FLOOR_RGBA: [u8; 4] = [72, 64, 54, 255];
const WALL_PALETTE: [[u8; 4]; 6] = [
    [196, 64, 58, 255],
    [70, 158, 86, 255],
    [72, 104, 198, 255],
    [210, 184, 84, 255],
    [150, 92, 172, 255],
    [188, 188, 188, 255],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    /// Crossed a vertical grid line.
    X,
    /// Crossed a horizontal grid line; drawn darker.
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RayHit {
    wall: u32,
    side: Side,
    distance: f32,
}

/// Grid raycaster. Positions are in cells with `y` growing down the rows;
/// heading 0 faces +x and positive headings turn counter-clockwise, so 90
/// degrees faces row 0.
#[derive(Debug, Clone)]
pub(crate) struct RaycastSimulation {
    grid: WallGrid,
    x: f32,
    y: f32,
    heading_radians: f32,
    move_speed: f32,
    turn_speed_radians: f32,
}

impl RaycastSimulation {
    pub(crate) fn load(path: &Path) -> Result<Self, LevelError> {
        let raw = fs::read_to_string(path).map_err(|source| LevelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_level_json(&raw)
    }

    pub(crate) fn from_level_json(raw: &str) -> Result<Self, LevelError> {
        Level::from_json(raw).map(Self::from_level)
    }

    pub(crate) fn from_level(level: Level) -> Self {
        let camera = level.camera;
        Self {
            grid: level.grid,
            x: camera.x,
            y: camera.y,
            heading_radians: camera.angle_degrees.to_radians().rem_euclid(TAU),
            move_speed: camera.move_speed,
            turn_speed_radians: camera.turn_speed_degrees.to_radians(),
        }
    }

    pub(crate) fn grid_size(&self) -> (u32, u32) {
        (self.grid.width(), self.grid.height())
    }

    pub(crate) fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub(crate) fn heading_degrees(&self) -> f32 {
        self.heading_radians.to_degrees()
    }

    fn translate(&mut self, heading: f32, distance: f32) {
        let dx = heading.cos() * distance;
        let dy = -heading.sin() * distance;

        // Each axis is tested on its own so a blocked axis slides along the wall.
        let next_x = self.x + dx;
        if !self
            .grid
            .is_solid_at(next_x + dx.signum() * COLLISION_MARGIN, self.y)
        {
            self.x = next_x;
        }
        let next_y = self.y + dy;
        if !self
            .grid
            .is_solid_at(self.x, next_y + dy.signum() * COLLISION_MARGIN)
        {
            self.y = next_y;
        }
    }

    fn turn(&mut self, delta_radians: f32) {
        self.heading_radians = (self.heading_radians + delta_radians).rem_euclid(TAU);
    }

    /// DDA walk from the camera along `(ray_x, ray_y)`. The distance is
    /// measured along the view direction, which removes fisheye warping.
    fn cast(&self, ray_x: f32, ray_y: f32) -> Option<RayHit> {
        let mut map_x = self.x.floor() as i64;
        let mut map_y = self.y.floor() as i64;
        let delta_x = if ray_x == 0.0 { f32::INFINITY } else { ray_x.recip().abs() };
        let delta_y = if ray_y == 0.0 { f32::INFINITY } else { ray_y.recip().abs() };

        let (step_x, mut side_x) = if ray_x < 0.0 {
            (-1, (self.x - map_x as f32) * delta_x)
        } else {
            (1, (map_x as f32 + 1.0 - self.x) * delta_x)
        };
        let (step_y, mut side_y) = if ray_y < 0.0 {
            (-1, (self.y - map_y as f32) * delta_y)
        } else {
            (1, (map_y as f32 + 1.0 - self.y) * delta_y)
        };

        let max_steps = (self.grid.width() + self.grid.height()) as usize + 2;
        for _ in 0..max_steps {
            let side = if side_x < side_y {
                side_x += delta_x;
                map_x += step_x;
                Side::X
            } else {
                side_y += delta_y;
                map_y += step_y;
                Side::Y
            };
            match self.grid.cell(map_x, map_y) {
                None => return None,
                Some(0) => continue,
                Some(wall) => {
                    let distance = match side {
                        Side::X => side_x - delta_x,
                        Side::Y => side_y - delta_y,
                    };
                    return Some(RayHit {
                        wall,
                        side,
                        distance,
                    });
                }
            }
        }
        None
    }

    fn draw_column(&self, frame: &mut [u8], column: u32, hit: RayHit) {
        let height = FRAME_HEIGHT as f32;
        let line_height = height / hit.distance.max(MIN_WALL_DISTANCE);
        let top = ((height - line_height) * 0.5).max(0.0) as u32;
        let bottom = ((height + line_height) * 0.5).min(height) as u32;
        let color = wall_color(hit.wall, hit.side);

        for row in top..bottom {
            let offset = ((row * FRAME_WIDTH + column) * 4) as usize;
            frame[offset..offset + 4].copy_from_slice(&color);
        }
    }
}

impl Simulation for RaycastSimulation {
    fn fill_pixels(&mut self, frame: &mut [u8]) -> Result<(), SimulationError> {
        if frame.len() != FRAME_BYTES {
            return Err(SimulationError::FrameSize {
                expected: FRAME_BYTES,
                actual: frame.len(),
            });
        }

        let half = FRAME_BYTES / 2;
        for (index, pixel) in frame.chunks_exact_mut(4).enumerate() {
            let color = if index * 4 < half { CEILING_RGBA } else { FLOOR_RGBA };
            pixel.copy_from_slice(&color);
        }

        let (dir_x, dir_y) = (self.heading_radians.cos(), -self.heading_radians.sin());
        let plane_scale = (FIELD_OF_VIEW_DEGREES.to_radians() * 0.5).tan();
        // Screen-right of the heading.
        let (plane_x, plane_y) = (-dir_y * plane_scale, dir_x * plane_scale);

        for column in 0..FRAME_WIDTH {
            let camera_x = 2.0 * column as f32 / FRAME_WIDTH as f32 - 1.0;
            let ray_x = dir_x + plane_x * camera_x;
            let ray_y = dir_y + plane_y * camera_x;
            if let Some(hit) = self.cast(ray_x, ray_y) {
                self.draw_column(frame, column, hit);
            }
        }
        Ok(())
    }

    fn forward(&mut self) -> Result<(), SimulationError> {
        self.translate(self.heading_radians, self.move_speed);
        Ok(())
    }

    fn back(&mut self) -> Result<(), SimulationError> {
        self.translate(self.heading_radians, -self.move_speed);
        Ok(())
    }

    fn strafe_left(&mut self) -> Result<(), SimulationError> {
        self.translate(self.heading_radians + FRAC_PI_2, self.move_speed);
        Ok(())
    }

    fn strafe_right(&mut self) -> Result<(), SimulationError> {
        self.translate(self.heading_radians - FRAC_PI_2, self.move_speed);
        Ok(())
    }

    fn turn_left(&mut self) -> Result<(), SimulationError> {
        self.turn(self.turn_speed_radians);
        Ok(())
    }

    fn turn_right(&mut self) -> Result<(), SimulationError> {
        self.turn(-self.turn_speed_radians);
        Ok(())
    }
}

fn wall_color(wall: u32, side: Side) -> [u8; 4] {
    let base = WALL_PALETTE[(wall as usize - 1) % WALL_PALETTE.len()];
    match side {
        Side::X => base,
        Side::Y => [base[0] / 2, base[1] / 2, base[2] / 2, base[3]],
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
