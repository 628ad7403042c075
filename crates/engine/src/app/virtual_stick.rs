use super::direction::JoystickReading;
use super::input::InputEvent;

/// Stick travel, as a fraction of the smaller side of its zone, that counts
/// as full deflection.
const STICK_RADIUS_FRACTION: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointerId {
    Mouse,
    Touch(u64),
}

#[derive(Debug, Clone, Copy)]
struct HeldStick {
    pointer: PointerId,
    zone: usize,
    anchor_x: f32,
    anchor_y: f32,
}

/// On-screen joysticks laid out as equal-width vertical zones across the
/// window. A pointer pressed inside a zone anchors that zone's stick where it
/// landed; dragging away from the anchor deflects the stick.
#[derive(Debug)]
pub(crate) struct VirtualSticks {
    identifiers: &'static [&'static str],
    window_width: f32,
    window_height: f32,
    dead_zone: f32,
    held: Vec<HeldStick>,
}

impl VirtualSticks {
    pub(crate) fn new(
        identifiers: &'static [&'static str],
        window_width: u32,
        window_height: u32,
        dead_zone: f32,
    ) -> Self {
        Self {
            identifiers,
            window_width: window_width as f32,
            window_height: window_height as f32,
            dead_zone,
            held: Vec::new(),
        }
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width as f32;
        self.window_height = height as f32;
    }

    pub(crate) fn press(&mut self, pointer: PointerId, x: f32, y: f32) -> Option<InputEvent> {
        if self.held.iter().any(|held| held.pointer == pointer) {
            return None;
        }
        let zone = self.zone_at(x)?;
        if self.held.iter().any(|held| held.zone == zone) {
            return None;
        }
        self.held.push(HeldStick {
            pointer,
            zone,
            anchor_x: x,
            anchor_y: y,
        });
        Some(self.event(zone, 0.0, 0.0))
    }

    pub(crate) fn drag(&mut self, pointer: PointerId, x: f32, y: f32) -> Option<InputEvent> {
        let held = *self.held.iter().find(|held| held.pointer == pointer)?;
        let radius = self.radius();
        if radius <= 0.0 {
            return None;
        }
        let dx = (x - held.anchor_x) / radius;
        // screen y grows downward, stick y points north
        let dy = (held.anchor_y - y) / radius;
        Some(self.event(held.zone, dx, dy))
    }

    pub(crate) fn release(&mut self, pointer: PointerId) -> Option<InputEvent> {
        let index = self.held.iter().position(|held| held.pointer == pointer)?;
        let held = self.held.swap_remove(index);
        Some(self.event(held.zone, 0.0, 0.0))
    }

    /// Centres every held stick, e.g. on focus loss.
    pub(crate) fn release_all(&mut self) -> Vec<InputEvent> {
        let zones: Vec<usize> = self.held.drain(..).map(|held| held.zone).collect();
        zones
            .into_iter()
            .map(|zone| self.event(zone, 0.0, 0.0))
            .collect()
    }

    fn zone_at(&self, x: f32) -> Option<usize> {
        let count = self.identifiers.len();
        if count == 0 || self.window_width <= 0.0 || !x.is_finite() {
            return None;
        }
        let fraction = (x / self.window_width).clamp(0.0, 1.0);
        Some(((fraction * count as f32) as usize).min(count - 1))
    }

    fn radius(&self) -> f32 {
        let count = self.identifiers.len().max(1) as f32;
        (self.window_width / count).min(self.window_height) * STICK_RADIUS_FRACTION
    }

    fn event(&self, zone: usize, x: f32, y: f32) -> InputEvent {
        InputEvent::stick(
            self.identifiers[zone],
            &JoystickReading::Vector { x, y },
            self.dead_zone,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::bindings::{LEFT_STICK_ID, RIGHT_STICK_ID};
    use crate::app::direction::Direction;
    use crate::app::input::InputValue;

    const DUAL: &[&str] = &[LEFT_STICK_ID, RIGHT_STICK_ID];

    fn sticks() -> VirtualSticks {
        // zones are 480 px wide, radius = min(480, 600) / 4 = 120 px
        VirtualSticks::new(DUAL, 960, 600, 0.2)
    }

    #[test]
    fn press_selects_zone_and_starts_centered() {
        let mut sticks = sticks();
        let left = sticks.press(PointerId::Mouse, 100.0, 300.0).expect("left press");
        assert_eq!(left.identifier, LEFT_STICK_ID);
        assert_eq!(left.value, InputValue::Stick(Direction::Center));

        let right = sticks
            .press(PointerId::Touch(7), 900.0, 300.0)
            .expect("right press");
        assert_eq!(right.identifier, RIGHT_STICK_ID);
    }

    #[test]
    fn drag_up_and_left_is_north_west() {
        let mut sticks = sticks();
        sticks.press(PointerId::Mouse, 200.0, 300.0);

        let event = sticks.drag(PointerId::Mouse, 120.0, 220.0).expect("drag");

        assert_eq!(event.identifier, LEFT_STICK_ID);
        assert_eq!(event.value, InputValue::Stick(Direction::NW));
    }

    #[test]
    fn small_drag_stays_in_dead_zone() {
        let mut sticks = sticks();
        sticks.press(PointerId::Mouse, 700.0, 300.0);

        let event = sticks.drag(PointerId::Mouse, 715.0, 300.0).expect("drag");

        assert_eq!(event.value, InputValue::Stick(Direction::Center));
    }

    #[test]
    fn drag_without_press_is_ignored() {
        let mut sticks = sticks();
        assert!(sticks.drag(PointerId::Mouse, 10.0, 10.0).is_none());
        assert!(sticks.release(PointerId::Mouse).is_none());
    }

    #[test]
    fn second_pointer_cannot_take_a_held_stick() {
        let mut sticks = sticks();
        sticks.press(PointerId::Touch(1), 100.0, 100.0);
        assert!(sticks.press(PointerId::Touch(2), 200.0, 100.0).is_none());
    }

    #[test]
    fn release_recenters_and_frees_the_stick() {
        let mut sticks = sticks();
        sticks.press(PointerId::Mouse, 800.0, 300.0);
        sticks.drag(PointerId::Mouse, 950.0, 300.0);

        let event = sticks.release(PointerId::Mouse).expect("release");
        assert_eq!(event.identifier, RIGHT_STICK_ID);
        assert_eq!(event.value, InputValue::Stick(Direction::Center));
        assert!(sticks.press(PointerId::Touch(3), 800.0, 300.0).is_some());
    }

    #[test]
    fn release_all_centres_every_held_stick() {
        let mut sticks = sticks();
        sticks.press(PointerId::Touch(1), 100.0, 100.0);
        sticks.press(PointerId::Touch(2), 600.0, 100.0);

        let events = sticks.release_all();

        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|event| event.value == InputValue::Stick(Direction::Center)));
        assert!(sticks.release(PointerId::Touch(1)).is_none());
    }

    #[test]
    fn single_zone_covers_whole_window() {
        let mut sticks = VirtualSticks::new(&["joystick"], 960, 600, 0.2);
        let event = sticks.press(PointerId::Mouse, 959.0, 1.0).expect("press");
        assert_eq!(event.identifier, "joystick");
    }
}
