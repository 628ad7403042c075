use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use super::direction::Direction;
use super::input::InputStateStore;
use super::simulation::{Simulation, SimulationError};

pub const LEFT_STICK_ID: &str = "joystick-left";
pub const RIGHT_STICK_ID: &str = "joystick-right";
pub const SINGLE_STICK_ID: &str = "joystick";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
}

impl Command {
    pub const fn name(self) -> &'static str {
        match self {
            Command::Forward => "forward",
            Command::Back => "back",
            Command::StrafeLeft => "strafe_left",
            Command::StrafeRight => "strafe_right",
            Command::TurnLeft => "turn_left",
            Command::TurnRight => "turn_right",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Key(String),
    Stick {
        identifier: String,
        directions: &'static [Direction],
    },
}

impl Trigger {
    pub fn key(identifier: &str) -> Self {
        Trigger::Key(identifier.to_string())
    }

    pub fn stick(identifier: &str, directions: &'static [Direction]) -> Self {
        Trigger::Stick {
            identifier: identifier.to_string(),
            directions,
        }
    }

    pub fn holds(&self, input: &InputStateStore) -> bool {
        match self {
            Trigger::Key(identifier) => input.is_active(identifier),
            Trigger::Stick {
                identifier,
                directions,
            } => input.direction(identifier).is_any_of(directions),
        }
    }
}

/// Fires `command` when any of its triggers holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBinding {
    pub command: Command,
    pub triggers: Vec<Trigger>,
}

impl CommandBinding {
    pub fn new(command: Command, triggers: Vec<Trigger>) -> Self {
        Self { command, triggers }
    }

    pub fn is_triggered(&self, input: &InputStateStore) -> bool {
        self.triggers.iter().any(|trigger| trigger.holds(input))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingPreset {
    /// Left stick walks and strafes, right stick turns.
    #[default]
    DualStick,
    /// One stick walks and turns; strafing is keyboard only.
    SingleStick,
}

impl BindingPreset {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "dual_stick" | "dual" => Some(BindingPreset::DualStick),
            "single_stick" | "single" => Some(BindingPreset::SingleStick),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BindingPreset::DualStick => "dual_stick",
            BindingPreset::SingleStick => "single_stick",
        }
    }

    /// On-screen sticks the preset reads, left to right.
    pub fn stick_identifiers(self) -> &'static [&'static str] {
        match self {
            BindingPreset::DualStick => &[LEFT_STICK_ID, RIGHT_STICK_ID],
            BindingPreset::SingleStick => &[SINGLE_STICK_ID],
        }
    }

    pub fn bindings(self) -> BindingSet {
        match self {
            BindingPreset::DualStick => BindingSet::dual_stick(),
            BindingPreset::SingleStick => BindingSet::single_stick(),
        }
    }
}

/// Ordered binding table evaluated once per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSet {
    bindings: Vec<CommandBinding>,
}

impl BindingSet {
    pub fn new(bindings: Vec<CommandBinding>) -> Self {
        Self { bindings }
    }

    pub fn dual_stick() -> Self {
        use Command::*;
        Self::new(vec![
            CommandBinding::new(
                Forward,
                vec![
                    Trigger::key("KeyW"),
                    Trigger::stick(LEFT_STICK_ID, Direction::NORTHWARD),
                ],
            ),
            CommandBinding::new(
                Back,
                vec![
                    Trigger::key("KeyS"),
                    Trigger::stick(LEFT_STICK_ID, Direction::SOUTHWARD),
                ],
            ),
            CommandBinding::new(
                StrafeLeft,
                vec![
                    Trigger::key("KeyA"),
                    Trigger::stick(LEFT_STICK_ID, Direction::WESTWARD),
                ],
            ),
            CommandBinding::new(
                StrafeRight,
                vec![
                    Trigger::key("KeyD"),
                    Trigger::stick(LEFT_STICK_ID, Direction::EASTWARD),
                ],
            ),
            CommandBinding::new(
                TurnLeft,
                vec![
                    Trigger::key("ArrowLeft"),
                    Trigger::stick(RIGHT_STICK_ID, Direction::WESTWARD),
                ],
            ),
            CommandBinding::new(
                TurnRight,
                vec![
                    Trigger::key("ArrowRight"),
                    Trigger::stick(RIGHT_STICK_ID, Direction::EASTWARD),
                ],
            ),
        ])
    }

    pub fn single_stick() -> Self {
        use Command::*;
        Self::new(vec![
            CommandBinding::new(
                Forward,
                vec![
                    Trigger::key("KeyW"),
                    Trigger::key("ArrowUp"),
                    Trigger::stick(SINGLE_STICK_ID, Direction::NORTHWARD),
                ],
            ),
            CommandBinding::new(
                Back,
                vec![
                    Trigger::key("KeyS"),
                    Trigger::key("ArrowDown"),
                    Trigger::stick(SINGLE_STICK_ID, Direction::SOUTHWARD),
                ],
            ),
            CommandBinding::new(StrafeLeft, vec![Trigger::key("KeyA")]),
            CommandBinding::new(StrafeRight, vec![Trigger::key("KeyD")]),
            CommandBinding::new(
                TurnLeft,
                vec![
                    Trigger::key("ArrowLeft"),
                    Trigger::stick(SINGLE_STICK_ID, Direction::WESTWARD),
                ],
            ),
            CommandBinding::new(
                TurnRight,
                vec![
                    Trigger::key("ArrowRight"),
                    Trigger::stick(SINGLE_STICK_ID, Direction::EASTWARD),
                ],
            ),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("command {command} failed: {source}")]
pub struct DispatchError {
    pub command: Command,
    #[source]
    pub source: SimulationError,
}

#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    bindings: BindingSet,
}

impl CommandDispatcher {
    pub fn new(bindings: BindingSet) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &BindingSet {
        &self.bindings
    }

    /// Every binding is evaluated, in declaration order, whatever the
    /// outcome of the ones before it.
    pub fn fired_commands(&self, input: &InputStateStore) -> Vec<Command> {
        self.bindings
            .iter()
            .filter(|binding| binding.is_triggered(input))
            .map(|binding| binding.command)
            .collect()
    }

    /// Issues this tick's commands. The first failure ends the tick's
    /// dispatch and is handed back to the caller.
    pub fn evaluate_frame(
        &self,
        input: &InputStateStore,
        simulation: &mut dyn Simulation,
    ) -> Result<Vec<Command>, DispatchError> {
        let fired = self.fired_commands(input);
        for command in fired.iter().copied() {
            simulation
                .execute(command)
                .map_err(|source| DispatchError { command, source })?;
        }
        Ok(fired)
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new(BindingSet::dual_stick())
    }
}
