use std::cell::RefCell;
use std::fmt;
use tracing::info;

/// Interpreter task modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskMode {
    Manual,
    Auto,
    Mdi,
}

/// Continuous jog direction; `Stop` ends a held jog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JogDirection {
    Positive,
    Negative,
    Stop,
}

impl JogDirection {
    pub fn as_i8(self) -> i8 {
        match self {
            JogDirection::Positive => 1,
            JogDirection::Negative => -1,
            JogDirection::Stop => 0,
        }
    }
}

/// Receiver of outgoing machine commands.
///
/// Commands are fire-and-forget: completion shows up later as a status event.
pub trait CommandSink {
    /// `true` engages the emergency stop
    fn set_estop(&self, engaged: bool);
    fn set_power(&self, on: bool);
    /// A joint of -1 homes every joint
    fn start_homing(&self, joint: i32);
    fn unhome(&self, joint: i32);
    fn run(&self);
    fn abort(&self);
    fn pause(&self);
    fn set_axis_origin(&self, axis: char, value: f64);
    fn set_mode(&self, mode: TaskMode);
    /// Switches to `mode` only if the machine is not already in it
    fn ensure_mode(&self, mode: TaskMode);
    fn continuous_jog(&self, joint: i32, direction: JogDirection, distance: f64);
}

/// A command as issued to a [`CommandSink`]
#[derive(Debug, Clone, PartialEq)]
pub enum MachineCommand {
    SetEstop(bool),
    SetPower(bool),
    StartHoming(i32),
    Unhome(i32),
    Run,
    Abort,
    Pause,
    SetAxisOrigin(char, f64),
    SetMode(TaskMode),
    EnsureMode(TaskMode),
    ContinuousJog {
        joint: i32,
        direction: JogDirection,
        distance: f64,
    },
}

impl fmt::Display for MachineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineCommand::SetEstop(engaged) => write!(f, "set estop {}", engaged),
            MachineCommand::SetPower(on) => write!(f, "set power {}", on),
            MachineCommand::StartHoming(joint) => write!(f, "home joint {}", joint),
            MachineCommand::Unhome(joint) => write!(f, "unhome joint {}", joint),
            MachineCommand::Run => f.write_str("run"),
            MachineCommand::Abort => f.write_str("abort"),
            MachineCommand::Pause => f.write_str("pause"),
            MachineCommand::SetAxisOrigin(axis, value) => {
                write!(f, "set {} origin to {}", axis, value)
            }
            MachineCommand::SetMode(mode) => write!(f, "set mode {:?}", mode),
            MachineCommand::EnsureMode(mode) => write!(f, "ensure mode {:?}", mode),
            MachineCommand::ContinuousJog {
                joint,
                direction,
                distance,
            } => write!(
                f,
                "jog joint {} direction {} distance {}",
                joint,
                direction.as_i8(),
                distance
            ),
        }
    }
}

/// Sink that records every command in issue order
#[derive(Debug, Default)]
pub struct CommandLog {
    commands: RefCell<Vec<MachineCommand>>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<MachineCommand> {
        self.commands.borrow().clone()
    }

    /// Drains the recorded commands
    pub fn take(&self) -> Vec<MachineCommand> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }

    fn record(&self, command: MachineCommand) {
        info!("Issuing command: {}", command);
        self.commands.borrow_mut().push(command);
    }
}

impl CommandSink for CommandLog {
    fn set_estop(&self, engaged: bool) {
        self.record(MachineCommand::SetEstop(engaged));
    }

    fn set_power(&self, on: bool) {
        self.record(MachineCommand::SetPower(on));
    }

    fn start_homing(&self, joint: i32) {
        self.record(MachineCommand::StartHoming(joint));
    }

    fn unhome(&self, joint: i32) {
        self.record(MachineCommand::Unhome(joint));
    }

    fn run(&self) {
        self.record(MachineCommand::Run);
    }

    fn abort(&self) {
        self.record(MachineCommand::Abort);
    }

    fn pause(&self) {
        self.record(MachineCommand::Pause);
    }

    fn set_axis_origin(&self, axis: char, value: f64) {
        self.record(MachineCommand::SetAxisOrigin(axis, value));
    }

    fn set_mode(&self, mode: TaskMode) {
        self.record(MachineCommand::SetMode(mode));
    }

    fn ensure_mode(&self, mode: TaskMode) {
        self.record(MachineCommand::EnsureMode(mode));
    }

    fn continuous_jog(&self, joint: i32, direction: JogDirection, distance: f64) {
        self.record(MachineCommand::ContinuousJog {
            joint,
            direction,
            distance,
        });
    }
}
