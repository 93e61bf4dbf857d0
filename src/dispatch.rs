use crate::command::{CommandSink, JogDirection, TaskMode};
use crate::error::ActionError;
use crate::guard::ReentrancyGuard;
use crate::launcher::{AuxLauncher, AuxTarget};
use crate::mode::Mode;
use crate::property::ButtonSettings;
use crate::status::{StatusBus, StatusRequest};
use tracing::debug;

/// Axis letters in joint order
pub const AXIS_LETTERS: &str = "XYZABCUVW";

/// User interaction primitives delivered by the host widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Press,
    Release,
    Click,
}

/// Outcome of a trigger that raised no error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A command, request or launch was issued
    Issued,
    /// The guard was engaged; the trigger came from a programmatic update
    Suppressed,
    /// The mode does not act on this trigger
    Ignored,
}

/// Resolves the axis letter for a joint index
pub fn axis_letter(joint: i32) -> Result<char, ActionError> {
    usize::try_from(joint)
        .ok()
        .and_then(|index| AXIS_LETTERS.chars().nth(index))
        .ok_or(ActionError::InvalidJointIndex { joint })
}

/// Turns user triggers into machine commands
pub struct ActionDispatcher<'a> {
    pub bus: &'a dyn StatusBus,
    pub sink: &'a dyn CommandSink,
    pub launcher: &'a dyn AuxLauncher,
    pub guard: &'a ReentrancyGuard,
}

impl ActionDispatcher<'_> {
    /// Dispatches one trigger. `checked` is the widget's new checked value
    /// for toggle buttons; momentary buttons and toggles without a value act
    /// on the current machine status instead.
    pub fn on_trigger(
        &self,
        settings: &ButtonSettings,
        trigger: Trigger,
        checked: Option<bool>,
    ) -> Result<Dispatch, ActionError> {
        if self.guard.is_engaged() {
            debug!("Trigger {:?} suppressed during programmatic update", trigger);
            return Ok(Dispatch::Suppressed);
        }

        let mode = settings.mode().ok_or(ActionError::UnrecognizedMode)?;
        let joint = settings.joint_index;

        if mode.is_jog() {
            return Ok(self.jog(mode, joint, trigger));
        }
        if trigger != Trigger::Click {
            return Ok(Dispatch::Ignored);
        }

        let toggled = if settings.toggle { checked } else { None };
        match mode {
            Mode::Estop => {
                // Engage when currently clear, reset when currently in estop
                let engaged = toggled.unwrap_or_else(|| self.bus.is_estop_clear());
                self.sink.set_estop(engaged);
            }
            Mode::MachineOn => {
                let on = toggled.unwrap_or_else(|| !self.bus.is_power_on());
                self.sink.set_power(on);
            }
            Mode::Home => {
                let home = toggled.unwrap_or_else(|| !self.bus.all_axes_homed());
                if home {
                    self.sink.start_homing(joint);
                } else {
                    self.sink.unhome(joint);
                }
            }
            Mode::Run => self.sink.run(),
            Mode::Abort => self.sink.abort(),
            Mode::Pause => self.sink.pause(),
            Mode::LoadDialog => self.bus.request(StatusRequest::LoadFile),
            Mode::ZeroAxis => {
                let axis = axis_letter(joint)?;
                self.sink.set_axis_origin(axis, 0.0);
            }
            Mode::LaunchMeter => self.launcher.launch(AuxTarget::Meter),
            Mode::LaunchStatus => self.launcher.launch(AuxTarget::Status),
            Mode::LaunchConfigEditor => self.launcher.launch(AuxTarget::ConfigEditor),
            Mode::Auto => self.sink.set_mode(TaskMode::Auto),
            Mode::Mdi => self.sink.set_mode(TaskMode::Mdi),
            Mode::Manual => self.sink.set_mode(TaskMode::Manual),
            Mode::JogPositive | Mode::JogNegative => return Ok(Dispatch::Ignored),
        }
        Ok(Dispatch::Issued)
    }

    fn jog(&self, mode: Mode, joint: i32, trigger: Trigger) -> Dispatch {
        let distance = self.bus.current_jog_distance();
        match trigger {
            Trigger::Press => {
                let direction = if mode == Mode::JogPositive {
                    JogDirection::Positive
                } else {
                    JogDirection::Negative
                };
                self.sink.ensure_mode(TaskMode::Manual);
                self.sink.continuous_jog(joint, direction, distance);
                Dispatch::Issued
            }
            Trigger::Release => {
                // A pending distance jog stops on its own
                if distance != 0.0 {
                    debug!("Jog release ignored, distance jog of {} pending", distance);
                    return Dispatch::Ignored;
                }
                self.sink.continuous_jog(joint, JogDirection::Stop, distance);
                Dispatch::Issued
            }
            Trigger::Click => Dispatch::Ignored,
        }
    }
}
