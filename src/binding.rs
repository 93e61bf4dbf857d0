//! Status-to-UI binding rules.
//!
//! Each mode maps to a fixed [`BindingPlan`]: effects applied once at
//! initialization plus a list of status subscriptions. Checked effects always
//! run inside the button's re-entrancy guard.

use crate::config::ConfigSource;
use crate::mode::Mode;
use crate::state::ButtonCore;
use crate::status::{status_callback, StatusBus, StatusEventKind, Subscription};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// What a status event does to the button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Enable,
    Disable,
    /// Enabled iff machine power is on
    EnableIfPowerOn,
    /// Enabled iff [`runnable`] holds
    EnableIfRunnable,
    Check,
    Uncheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub event: StatusEventKind,
    pub effect: Effect,
}

const fn on(event: StatusEventKind, effect: Effect) -> Binding {
    Binding { event, effect }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingPlan {
    pub initial: Vec<Effect>,
    pub bindings: Vec<Binding>,
}

/// Interlocks shared by every machine-motion button
const MOTION_INTERLOCK: [Binding; 4] = [
    on(StatusEventKind::PowerOff, Effect::Disable),
    on(StatusEventKind::EstopActive, Effect::Disable),
    on(StatusEventKind::InterpreterIdle, Effect::EnableIfPowerOn),
    on(StatusEventKind::InterpreterRunning, Effect::Disable),
];

/// Interlocks for buttons that start or act on a program
const PROGRAM_INTERLOCK: [Binding; 5] = [
    on(StatusEventKind::PowerOff, Effect::Disable),
    on(StatusEventKind::EstopActive, Effect::Disable),
    on(StatusEventKind::InterpreterIdle, Effect::EnableIfRunnable),
    on(StatusEventKind::InterpreterRunning, Effect::Disable),
    on(StatusEventKind::AllAxesHomed, Effect::Enable),
];

/// Builds the binding plan for a mode
pub fn plan_for(mode: Mode, toggle: bool) -> BindingPlan {
    use StatusEventKind::*;

    let mut plan = BindingPlan::default();
    match mode {
        Mode::Estop => {
            // Starts checked: the machine comes up in estop
            if toggle {
                plan.initial.push(Effect::Check);
            }
            plan.bindings = vec![on(EstopActive, Effect::Check), on(EstopCleared, Effect::Uncheck)];
        }
        Mode::MachineOn => {
            plan.bindings = vec![
                on(EstopActive, Effect::Disable),
                on(EstopCleared, Effect::Enable),
                on(PowerOn, Effect::Check),
                on(PowerOff, Effect::Uncheck),
            ];
        }
        Mode::Home => {
            plan.bindings = MOTION_INTERLOCK.to_vec();
            plan.bindings.push(on(AllAxesHomed, Effect::Check));
            plan.bindings.push(on(NotAllHomed, Effect::Uncheck));
        }
        Mode::LoadDialog => {
            plan.bindings = MOTION_INTERLOCK.to_vec();
            plan.bindings.push(on(AllAxesHomed, Effect::Check));
        }
        Mode::JogPositive | Mode::JogNegative => {
            plan.bindings = MOTION_INTERLOCK.to_vec();
        }
        Mode::Run | Mode::ZeroAxis => {
            plan.bindings = PROGRAM_INTERLOCK.to_vec();
        }
        Mode::Abort | Mode::Pause => {
            // Abort and pause must stay usable while a program runs
            plan.initial.push(Effect::Disable);
            plan.bindings = PROGRAM_INTERLOCK
                .iter()
                .copied()
                .filter(|b| b.event != InterpreterRunning)
                .collect();
        }
        Mode::LaunchMeter | Mode::LaunchStatus | Mode::LaunchConfigEditor => {}
        Mode::Auto => plan.bindings = vec![on(ModeAuto, Effect::Check)],
        Mode::Mdi => plan.bindings = vec![on(ModeMdi, Effect::Check)],
        Mode::Manual => plan.bindings = vec![on(ModeManual, Effect::Check)],
    }
    plan
}

/// True when a program may be started: power on, homed (or homing not
/// required) and a file loaded
pub fn runnable(status: &dyn StatusBus, config: &dyn ConfigSource) -> bool {
    status.is_power_on()
        && (status.all_axes_homed() || config.homing_not_required())
        && status.is_file_loaded()
}

pub(crate) fn apply(core: &ButtonCore, effect: Effect, status: &dyn StatusBus) {
    match effect {
        Effect::Enable => core.set_enabled(true),
        Effect::Disable => core.set_enabled(false),
        Effect::EnableIfPowerOn => core.set_enabled(status.is_power_on()),
        Effect::EnableIfRunnable => core.set_enabled(runnable(status, core.config())),
        Effect::Check => core.sync_checked(true),
        Effect::Uncheck => core.sync_checked(false),
    }
}

/// Applies the initial effects for the button's mode and subscribes its
/// bindings. Callbacks hold only a weak reference to the button.
pub(crate) fn bind(core: &Rc<ButtonCore>, bus: &Rc<dyn StatusBus>) -> Vec<Subscription> {
    let settings = core.settings();
    let Some(mode) = settings.mode() else {
        warn!("Button '{}' initialized without a mode; nothing bound", core.name());
        return Vec::new();
    };

    let plan = plan_for(mode, settings.toggle);
    for effect in &plan.initial {
        apply(core, *effect, bus.as_ref());
    }

    let subscriptions: Vec<Subscription> = plan
        .bindings
        .iter()
        .map(|binding| {
            let weak = Rc::downgrade(core);
            let effect = binding.effect;
            let callback = status_callback(move |event, status| {
                if let Some(core) = weak.upgrade() {
                    debug!("'{}' received {:?} -> {:?}", core.name(), event, effect);
                    apply(&core, effect, status);
                }
            });
            Subscription::new(bus, binding.event, callback)
        })
        .collect();

    info!(
        "Bound button '{}' as {} with {} subscription(s)",
        core.name(),
        mode,
        subscriptions.len()
    );
    subscriptions
}
