pub mod binding;
pub mod button;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod guard;
pub mod launcher;
pub mod mode;
pub mod property;
pub mod state;
pub mod status;

#[cfg(test)]
mod test_support;

#[cfg(test)]
pub mod integration_tests;

pub use binding::{plan_for, runnable, Binding, BindingPlan, Effect};
pub use button::{ActionButton, MachineServices};
pub use command::{CommandLog, CommandSink, JogDirection, MachineCommand, TaskMode};
pub use config::{load_config, load_embedded_config, parse_config, ButtonConfig, Config, ConfigSource, MachineConfig};
pub use dispatch::{axis_letter, ActionDispatcher, Dispatch, Trigger};
pub use error::{ActionError, PropertyError, StatusError};
pub use guard::ReentrancyGuard;
pub use launcher::{AuxLauncher, AuxTarget, ProgramLauncher};
pub use mode::{Mode, ModeSelector};
pub use property::{ButtonSettings, PropertyKey, PropertyValue};
pub use state::{ButtonState, ButtonView};
pub use status::{LocalStatusBus, StatusBus, StatusEvent, StatusEventKind, StatusRequest, Subscription};
