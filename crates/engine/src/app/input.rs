use std::collections::HashMap;

use super::direction::{classify, Direction, JoystickReading};

/// Current state of one input identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputValue {
    /// Never written, or explicitly cleared.
    #[default]
    Unset,
    Key(bool),
    Stick(Direction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub identifier: String,
    pub value: InputValue,
}

impl InputEvent {
    pub fn key(identifier: impl Into<String>, is_down: bool) -> Self {
        Self {
            identifier: identifier.into(),
            value: InputValue::Key(is_down),
        }
    }

    /// Classifies the reading now; the store only ever sees the label.
    pub fn stick(identifier: impl Into<String>, reading: &JoystickReading, dead_zone: f32) -> Self {
        Self {
            identifier: identifier.into(),
            value: InputValue::Stick(classify(reading, dead_zone)),
        }
    }
}

/// Last-writer-wins map from input identifier to its state.
///
/// Events are written from the host's event callbacks and the frame loop reads
/// the store once per tick. Both run on the event-loop thread and every
/// identifier has exactly one producer, so a tick always observes a consistent
/// snapshot and the store needs no locking.
#[derive(Debug, Clone, Default)]
pub struct InputStateStore {
    values: HashMap<String, InputValue>,
}

impl InputStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active(&mut self, identifier: impl Into<String>, value: InputValue) {
        self.values.insert(identifier.into(), value);
    }

    pub fn apply(&mut self, event: InputEvent) {
        self.set_active(event.identifier, event.value);
    }

    pub fn get(&self, identifier: &str) -> InputValue {
        self.values.get(identifier).copied().unwrap_or_default()
    }

    pub fn is_active(&self, identifier: &str) -> bool {
        matches!(self.get(identifier), InputValue::Key(true))
    }

    pub fn direction(&self, identifier: &str) -> Direction {
        match self.get(identifier) {
            InputValue::Stick(direction) => direction,
            InputValue::Unset | InputValue::Key(_) => Direction::Center,
        }
    }

    /// Drops every held key and stick, e.g. when the window loses focus and
    /// release events would otherwise never arrive.
    pub fn release_all(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
