use std::f32::consts::PI;
use std::fmt;

pub const DEFAULT_DEAD_ZONE: f32 = 0.2;

const SECTOR_COUNT: i32 = 8;
const SECTOR_RADIANS: f32 = PI / 4.0;

/// Compass classification of a stick position. `Center` is the dead-zone
/// sentinel and also the answer for anything that cannot be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    #[default]
    Center,
}

/// Raw payload of a joystick move event.
#[derive(Debug, Clone, PartialEq)]
pub enum JoystickReading {
    /// Offset from the stick's rest position, y pointing north.
    Vector { x: f32, y: f32 },
    /// Label already classified by the widget that produced the event.
    Label(String),
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
        Direction::Center,
    ];

    pub const NORTHWARD: &'static [Direction] = &[Direction::N, Direction::NW, Direction::NE];
    pub const SOUTHWARD: &'static [Direction] = &[Direction::S, Direction::SW, Direction::SE];
    pub const WESTWARD: &'static [Direction] = &[Direction::W, Direction::SW, Direction::NW];
    pub const EASTWARD: &'static [Direction] = &[Direction::E, Direction::SE, Direction::NE];

    pub const fn label(self) -> &'static str {
        match self {
            Direction::N => "N",
            Direction::NE => "NE",
            Direction::E => "E",
            Direction::SE => "SE",
            Direction::S => "S",
            Direction::SW => "SW",
            Direction::W => "W",
            Direction::NW => "NW",
            Direction::Center => "C",
        }
    }

    /// Unknown labels fall back to `Center`.
    pub fn from_label(label: &str) -> Direction {
        match label.trim().to_ascii_uppercase().as_str() {
            "N" => Direction::N,
            "NE" => Direction::NE,
            "E" => Direction::E,
            "SE" => Direction::SE,
            "S" => Direction::S,
            "SW" => Direction::SW,
            "W" => Direction::W,
            "NW" => Direction::NW,
            _ => Direction::Center,
        }
    }

    pub fn is_any_of(self, set: &[Direction]) -> bool {
        set.contains(&self)
    }

    // Sector 0 is east, counting counter-clockwise.
    const fn from_sector(sector: i32) -> Direction {
        match sector {
            0 => Direction::E,
            1 => Direction::NE,
            2 => Direction::N,
            3 => Direction::NW,
            4 => Direction::W,
            5 => Direction::SW,
            6 => Direction::S,
            _ => Direction::SE,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify(reading: &JoystickReading, dead_zone: f32) -> Direction {
    match reading {
        JoystickReading::Vector { x, y } => classify_vector(*x, *y, dead_zone),
        JoystickReading::Label(label) => Direction::from_label(label),
    }
}

/// Sectors span 45 degrees centred on each compass direction, so boundaries
/// sit at odd multiples of 22.5 degrees. A value exactly on a boundary rounds
/// away from the east axis.
pub fn classify_vector(x: f32, y: f32, dead_zone: f32) -> Direction {
    if !x.is_finite() || !y.is_finite() {
        return Direction::Center;
    }

    let magnitude = x.hypot(y);
    if magnitude < dead_zone || magnitude == 0.0 {
        return Direction::Center;
    }

    let sector = (y.atan2(x) / SECTOR_RADIANS).round() as i32;
    Direction::from_sector(sector.rem_euclid(SECTOR_COUNT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(degrees: f32) -> (f32, f32) {
        let radians = degrees.to_radians();
        (radians.cos(), radians.sin())
    }

    #[test]
    fn compass_axes_classify_to_their_direction() {
        let cases = [
            (0.0, Direction::E),
            (45.0, Direction::NE),
            (90.0, Direction::N),
            (135.0, Direction::NW),
            (180.0, Direction::W),
            (225.0, Direction::SW),
            (270.0, Direction::S),
            (315.0, Direction::SE),
        ];
        for (degrees, expected) in cases {
            let (x, y) = unit(degrees);
            assert_eq!(classify_vector(x, y, DEFAULT_DEAD_ZONE), expected, "{degrees}");
        }
    }

    #[test]
    fn sector_interior_stays_in_sector() {
        let (x, y) = unit(120.0);
        assert_eq!(classify_vector(x, y, DEFAULT_DEAD_ZONE), Direction::NW);
        let (x, y) = unit(-20.0);
        assert_eq!(classify_vector(x, y, DEFAULT_DEAD_ZONE), Direction::E);
        let (x, y) = unit(-25.0);
        assert_eq!(classify_vector(x, y, DEFAULT_DEAD_ZONE), Direction::SE);
    }

    #[test]
    fn vectors_inside_dead_zone_are_center() {
        for degrees in [0.0, 33.0, 90.0, 200.0, 359.0] {
            let (x, y) = unit(degrees);
            assert_eq!(classify_vector(x * 0.19, y * 0.19, 0.2), Direction::Center);
        }
        assert_eq!(classify_vector(0.0, 0.0, 0.0), Direction::Center);
    }

    #[test]
    fn boundary_angles_classify_deterministically() {
        for k in 0..8 {
            let degrees = 22.5 + 45.0 * k as f32;
            let (x, y) = unit(degrees);
            let first = classify_vector(x, y, DEFAULT_DEAD_ZONE);
            assert_ne!(first, Direction::Center);
            for _ in 0..16 {
                assert_eq!(classify_vector(x, y, DEFAULT_DEAD_ZONE), first);
            }
        }
    }

    #[test]
    fn non_finite_components_are_center() {
        assert_eq!(classify_vector(f32::NAN, 1.0, 0.1), Direction::Center);
        assert_eq!(classify_vector(1.0, f32::INFINITY, 0.1), Direction::Center);
        assert_eq!(
            classify(&JoystickReading::Vector { x: f32::NAN, y: f32::NAN }, 0.1),
            Direction::Center
        );
    }

    #[test]
    fn labels_round_trip_and_unknown_is_center() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_label(direction.label()), direction);
        }
        assert_eq!(Direction::from_label(" ne "), Direction::NE);
        assert_eq!(Direction::from_label("CENTER"), Direction::Center);
        assert_eq!(Direction::from_label("up"), Direction::Center);
        assert_eq!(
            classify(&JoystickReading::Label("SW".to_string()), DEFAULT_DEAD_ZONE),
            Direction::SW
        );
    }

    #[test]
    fn diagonals_belong_to_two_named_sets() {
        assert!(Direction::NW.is_any_of(Direction::NORTHWARD));
        assert!(Direction::NW.is_any_of(Direction::WESTWARD));
        assert!(!Direction::NW.is_any_of(Direction::EASTWARD));
        assert!(!Direction::Center.is_any_of(Direction::NORTHWARD));
    }
}
