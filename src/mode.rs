use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The behavior a button instance is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Estop,
    MachineOn,
    Home,
    Run,
    Abort,
    Pause,
    LoadDialog,
    JogPositive,
    JogNegative,
    ZeroAxis,
    LaunchMeter,
    LaunchStatus,
    LaunchConfigEditor,
    Auto,
    Mdi,
    Manual,
}

impl Mode {
    /// Every mode, in property-editor order
    pub const ALL: [Mode; 16] = [
        Mode::Estop,
        Mode::MachineOn,
        Mode::Home,
        Mode::Run,
        Mode::Abort,
        Mode::Pause,
        Mode::LoadDialog,
        Mode::JogPositive,
        Mode::JogNegative,
        Mode::ZeroAxis,
        Mode::LaunchMeter,
        Mode::LaunchStatus,
        Mode::LaunchConfigEditor,
        Mode::Auto,
        Mode::Mdi,
        Mode::Manual,
    ];

    /// Returns the snake_case name used in panel files
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Estop => "estop",
            Mode::MachineOn => "machine_on",
            Mode::Home => "home",
            Mode::Run => "run",
            Mode::Abort => "abort",
            Mode::Pause => "pause",
            Mode::LoadDialog => "load_dialog",
            Mode::JogPositive => "jog_positive",
            Mode::JogNegative => "jog_negative",
            Mode::ZeroAxis => "zero_axis",
            Mode::LaunchMeter => "launch_meter",
            Mode::LaunchStatus => "launch_status",
            Mode::LaunchConfigEditor => "launch_config_editor",
            Mode::Auto => "auto",
            Mode::Mdi => "mdi",
            Mode::Manual => "manual",
        }
    }

    /// Returns true for modes whose behavior depends on the joint index
    pub fn uses_joint(self) -> bool {
        matches!(
            self,
            Mode::Home | Mode::ZeroAxis | Mode::JogPositive | Mode::JogNegative
        )
    }

    /// Jog modes act on press/release instead of click
    pub fn is_jog(self) -> bool {
        matches!(self, Mode::JogPositive | Mode::JogNegative)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the single active mode of a button.
///
/// Selecting a mode clears whatever was selected before, so two modes can
/// never be active at once. Clearing a mode that is not the active one leaves
/// the selection untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeSelector {
    active: Option<Mode>,
}

impl ModeSelector {
    /// Creates a selector with no mode selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a selector with `mode` already selected
    pub fn with_mode(mode: Mode) -> Self {
        Self { active: Some(mode) }
    }

    /// Sets or clears the flag for `candidate`
    pub fn set_mode(&mut self, candidate: Mode, enabled: bool) {
        let previous = self.active;
        if enabled {
            self.active = Some(candidate);
        } else if self.active == Some(candidate) {
            self.active = None;
        }
        if previous != self.active {
            debug!("Mode selection changed: {:?} -> {:?}", previous, self.active);
        }
    }

    /// Returns the selected mode, if any
    pub fn mode(&self) -> Option<Mode> {
        self.active
    }

    /// Reads the flag for one mode
    pub fn is_set(&self, mode: Mode) -> bool {
        self.active == Some(mode)
    }

    /// Clears whatever mode is selected
    pub fn clear(&mut self) {
        self.active = None;
    }
}
