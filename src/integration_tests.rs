//! End-to-end tests for action buttons
//!
//! These drive complete buttons over a local status bus: binding rules,
//! dispatch, the re-entrancy guard and subscription lifetime.

use crate::button::{ActionButton, MachineServices};
use crate::command::{CommandLog, JogDirection, MachineCommand, TaskMode};
use crate::config::{parse_config, MachineConfig};
use crate::dispatch::{Dispatch, Trigger};
use crate::error::ActionError;
use crate::launcher::AuxTarget;
use crate::mode::Mode;
use crate::state::ButtonView;
use crate::status::{LocalStatusBus, StatusEvent};
use crate::test_support::RecordingLauncher;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::{Rc, Weak};

    struct Panel {
        bus: Rc<LocalStatusBus>,
        sink: Rc<CommandLog>,
        launcher: Rc<RecordingLauncher>,
        services: MachineServices,
    }

    impl Panel {
        fn new() -> Self {
            Self::with_config(MachineConfig::default())
        }

        fn with_config(config: MachineConfig) -> Self {
            let bus = Rc::new(LocalStatusBus::new());
            let sink = Rc::new(CommandLog::new());
            let launcher = Rc::new(RecordingLauncher::default());
            let services = MachineServices {
                bus: bus.clone(),
                sink: sink.clone(),
                launcher: launcher.clone(),
                config: Rc::new(config),
            };
            Self {
                bus,
                sink,
                launcher,
                services,
            }
        }

        fn button(&self, mode: Mode, toggle: bool, joint: i32) -> ActionButton {
            let mut button = ActionButton::new(mode.as_str(), self.services.clone());
            button.set_mode(mode, true);
            button.set_toggle(toggle);
            button.set_joint_index(joint);
            button.initialize();
            button
        }
    }

    /// View that echoes programmatic checks back as clicks, like a toolkit
    /// toggle signal would
    struct EchoingView {
        button: RefCell<Weak<RefCell<Option<ActionButton>>>>,
        echoes: RefCell<Vec<Result<Dispatch, ActionError>>>,
        enabled_calls: Cell<u32>,
    }

    impl EchoingView {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                button: RefCell::new(Weak::new()),
                echoes: RefCell::new(Vec::new()),
                enabled_calls: Cell::new(0),
            })
        }
    }

    impl ButtonView for EchoingView {
        fn set_checked(&self, checked: bool) {
            if let Some(slot) = self.button.borrow().upgrade() {
                if let Some(button) = slot.borrow().as_ref() {
                    let echo = button.on_trigger(Trigger::Click, Some(checked));
                    self.echoes.borrow_mut().push(echo);
                }
            }
        }

        fn set_enabled(&self, _enabled: bool) {
            self.enabled_calls.set(self.enabled_calls.get() + 1);
        }
    }

    #[test]
    fn test_estop_sync_does_not_echo_command() {
        let panel = Panel::new();
        let button = panel.button(Mode::Estop, true, -1);
        // Toggle estop buttons start checked
        assert!(button.current_checked());

        panel.bus.publish(StatusEvent::EstopCleared);
        assert!(!button.current_checked());
        panel.bus.publish(StatusEvent::EstopActive);
        assert!(button.current_checked());
        assert!(panel.sink.is_empty());

        button.on_trigger(Trigger::Click, Some(true)).unwrap();
        assert_eq!(panel.sink.commands(), vec![MachineCommand::SetEstop(true)]);
    }

    #[test]
    fn test_view_echo_is_suppressed_by_guard() {
        let panel = Panel::new();
        let slot = Rc::new(RefCell::new(Some(panel.button(Mode::MachineOn, true, -1))));
        let view = EchoingView::new();
        *view.button.borrow_mut() = Rc::downgrade(&slot);
        if let Some(button) = slot.borrow().as_ref() {
            button.attach_view(view.clone());
        }

        panel.bus.publish(StatusEvent::PowerOn);
        panel.bus.publish(StatusEvent::PowerOff);
        panel.bus.publish(StatusEvent::EstopCleared);

        assert_eq!(
            *view.echoes.borrow(),
            vec![Ok(Dispatch::Suppressed), Ok(Dispatch::Suppressed)]
        );
        assert_eq!(view.enabled_calls.get(), 1);
        assert!(panel.sink.is_empty());

        // Guard is released once the sync finishes
        let outcome = slot.borrow().as_ref().map(|b| b.on_trigger(Trigger::Click, Some(true)));
        assert_eq!(outcome, Some(Ok(Dispatch::Issued)));
        assert_eq!(panel.sink.commands(), vec![MachineCommand::SetPower(true)]);
    }

    #[test]
    fn test_machine_on_enable_and_checked_rules() {
        let panel = Panel::new();
        let button = panel.button(Mode::MachineOn, true, -1);

        panel.bus.publish(StatusEvent::EstopActive);
        assert!(!button.current_enabled());
        panel.bus.publish(StatusEvent::EstopCleared);
        assert!(button.current_enabled());

        panel.bus.publish(StatusEvent::PowerOn);
        assert!(button.current_checked());
    }

    #[test]
    fn test_repeated_power_off_has_no_side_effects() {
        let panel = Panel::new();
        let button = panel.button(Mode::MachineOn, true, -1);
        panel.bus.publish(StatusEvent::PowerOn);

        for _ in 0..5 {
            panel.bus.publish(StatusEvent::PowerOff);
            assert!(!button.current_checked());
        }
        assert!(panel.sink.is_empty());
    }

    #[test]
    fn test_home_bindings() {
        let panel = Panel::new();
        let button = panel.button(Mode::Home, true, 2);

        panel.bus.publish(StatusEvent::InterpreterIdle);
        assert!(!button.current_enabled(), "power is off");

        panel.bus.publish(StatusEvent::PowerOn);
        panel.bus.publish(StatusEvent::InterpreterIdle);
        assert!(button.current_enabled());

        panel.bus.publish(StatusEvent::InterpreterRunning);
        assert!(!button.current_enabled());

        panel.bus.publish(StatusEvent::AllAxesHomed);
        assert!(button.current_checked());
        panel.bus.publish(StatusEvent::NotAllHomed {
            axes: "Z".to_string(),
        });
        assert!(!button.current_checked());

        button.on_trigger(Trigger::Click, Some(true)).unwrap();
        button.on_trigger(Trigger::Click, Some(false)).unwrap();
        assert_eq!(
            panel.sink.commands(),
            vec![MachineCommand::StartHoming(2), MachineCommand::Unhome(2)]
        );
    }

    #[test]
    fn test_load_dialog_checks_when_homed_and_requests_file() {
        let panel = Panel::new();
        let button = panel.button(Mode::LoadDialog, false, -1);

        panel.bus.publish(StatusEvent::AllAxesHomed);
        assert!(button.current_checked());
        panel.bus.publish(StatusEvent::NotAllHomed {
            axes: "X".to_string(),
        });
        assert!(button.current_checked());

        button.on_trigger(Trigger::Click, None).unwrap();
        assert_eq!(panel.bus.take_requests().len(), 1);
    }

    #[test]
    fn test_run_enabled_only_when_runnable() {
        let panel = Panel::new();
        let button = panel.button(Mode::Run, false, -1);

        panel.bus.publish(StatusEvent::PowerOn);
        panel.bus.publish(StatusEvent::InterpreterIdle);
        assert!(!button.current_enabled(), "not homed, no file");

        panel.bus.set_file_loaded(true);
        panel.bus.publish(StatusEvent::InterpreterIdle);
        assert!(!button.current_enabled(), "not homed");

        panel.bus.publish(StatusEvent::AllAxesHomed);
        assert!(button.current_enabled());

        panel.bus.publish(StatusEvent::InterpreterRunning);
        assert!(!button.current_enabled());
        panel.bus.publish(StatusEvent::InterpreterIdle);
        assert!(button.current_enabled());

        panel.bus.publish(StatusEvent::EstopActive);
        assert!(!button.current_enabled());
    }

    #[test]
    fn test_run_with_homing_not_required() {
        let panel = Panel::with_config(MachineConfig {
            no_home_required: true,
            ..MachineConfig::default()
        });
        let button = panel.button(Mode::Run, false, -1);
        panel.bus.publish(StatusEvent::PowerOn);
        panel.bus.set_file_loaded(true);
        panel.bus.publish(StatusEvent::InterpreterIdle);
        assert!(button.current_enabled());
    }

    #[test]
    fn test_abort_starts_disabled_and_stays_enabled_while_running() {
        let panel = Panel::new();
        let abort = panel.button(Mode::Abort, false, -1);
        let pause = panel.button(Mode::Pause, false, -1);
        assert!(!abort.current_enabled());
        assert!(!pause.current_enabled());

        panel.bus.publish(StatusEvent::AllAxesHomed);
        panel.bus.publish(StatusEvent::InterpreterRunning);
        assert!(abort.current_enabled());
        assert!(pause.current_enabled());

        abort.on_trigger(Trigger::Click, None).unwrap();
        pause.on_trigger(Trigger::Click, None).unwrap();
        assert_eq!(panel.sink.commands(), vec![MachineCommand::Abort, MachineCommand::Pause]);
    }

    #[test]
    fn test_jog_press_release_cycle() {
        let panel = Panel::new();
        let button = panel.button(Mode::JogPositive, false, 0);

        button.on_trigger(Trigger::Press, None).unwrap();
        button.on_trigger(Trigger::Release, None).unwrap();
        assert_eq!(
            panel.sink.take(),
            vec![
                MachineCommand::EnsureMode(TaskMode::Manual),
                MachineCommand::ContinuousJog {
                    joint: 0,
                    direction: JogDirection::Positive,
                    distance: 0.0
                },
                MachineCommand::ContinuousJog {
                    joint: 0,
                    direction: JogDirection::Stop,
                    distance: 0.0
                },
            ]
        );

        panel.bus.set_jog_distance(5.0);
        assert_eq!(button.on_trigger(Trigger::Release, None), Ok(Dispatch::Ignored));
        assert!(panel.sink.is_empty());
    }

    #[test]
    fn test_power_off_disables_interlocked_buttons() {
        let panel = Panel::with_config(MachineConfig {
            no_home_required: true,
            ..MachineConfig::default()
        });
        panel.bus.set_file_loaded(true);
        let buttons = [
            panel.button(Mode::Home, false, 0),
            panel.button(Mode::LoadDialog, false, -1),
            panel.button(Mode::JogPositive, false, 0),
            panel.button(Mode::JogNegative, false, 0),
            panel.button(Mode::Run, false, -1),
            panel.button(Mode::ZeroAxis, false, 0),
        ];

        panel.bus.publish(StatusEvent::PowerOn);
        panel.bus.publish(StatusEvent::InterpreterIdle);
        for button in &buttons {
            assert!(button.current_enabled(), "{} enabled when idle", button.name());
        }

        panel.bus.publish(StatusEvent::PowerOff);
        for button in &buttons {
            assert!(!button.current_enabled(), "{} disabled on power off", button.name());
        }
    }

    #[test]
    fn test_estop_disables_interlocked_buttons() {
        let panel = Panel::new();
        let home = panel.button(Mode::Home, false, 0);
        let run = panel.button(Mode::Run, false, -1);
        panel.bus.publish(StatusEvent::PowerOn);
        panel.bus.publish(StatusEvent::AllAxesHomed);
        assert!(run.current_enabled());

        panel.bus.publish(StatusEvent::EstopActive);
        assert!(!home.current_enabled());
        assert!(!run.current_enabled());
    }

    #[test]
    fn test_zero_axis_enabled_only_when_runnable() {
        let panel = Panel::new();
        let button = panel.button(Mode::ZeroAxis, false, 2);

        panel.bus.publish(StatusEvent::PowerOn);
        panel.bus.publish(StatusEvent::InterpreterIdle);
        assert!(!button.current_enabled(), "not homed, no file");

        panel.bus.set_file_loaded(true);
        panel.bus.publish(StatusEvent::InterpreterIdle);
        assert!(!button.current_enabled(), "not homed");

        panel.bus.publish(StatusEvent::AllAxesHomed);
        assert!(button.current_enabled());

        panel.bus.publish(StatusEvent::InterpreterRunning);
        assert!(!button.current_enabled());
        panel.bus.publish(StatusEvent::InterpreterIdle);
        assert!(button.current_enabled());

        button.on_trigger(Trigger::Click, None).unwrap();
        assert_eq!(panel.sink.commands(), vec![MachineCommand::SetAxisOrigin('Z', 0.0)]);
    }

    #[test]
    fn test_jog_negative_press_release_cycle() {
        let panel = Panel::new();
        let button = panel.button(Mode::JogNegative, false, 1);

        button.on_trigger(Trigger::Press, None).unwrap();
        button.on_trigger(Trigger::Release, None).unwrap();
        assert_eq!(
            panel.sink.take(),
            vec![
                MachineCommand::EnsureMode(TaskMode::Manual),
                MachineCommand::ContinuousJog {
                    joint: 1,
                    direction: JogDirection::Negative,
                    distance: 0.0
                },
                MachineCommand::ContinuousJog {
                    joint: 1,
                    direction: JogDirection::Stop,
                    distance: 0.0
                },
            ]
        );
        assert_eq!(JogDirection::Stop.as_i8(), 0);
    }

    #[test]
    fn test_zero_axis_out_of_range() {
        let panel = Panel::new();
        let bad = panel.button(Mode::ZeroAxis, false, 9);
        assert_eq!(
            bad.on_trigger(Trigger::Click, None),
            Err(ActionError::InvalidJointIndex { joint: 9 })
        );
        assert!(panel.sink.is_empty());

        let good = panel.button(Mode::ZeroAxis, false, 8);
        good.on_trigger(Trigger::Click, None).unwrap();
        assert_eq!(panel.sink.commands(), vec![MachineCommand::SetAxisOrigin('W', 0.0)]);
    }

    #[test]
    fn test_launch_buttons_always_enabled() {
        let panel = Panel::new();
        let meter = panel.button(Mode::LaunchMeter, false, -1);
        panel.bus.publish(StatusEvent::EstopActive);
        panel.bus.publish(StatusEvent::PowerOff);
        assert!(meter.current_enabled());
        assert_eq!(meter.subscription_count(), 0);

        meter.on_trigger(Trigger::Click, None).unwrap();
        assert_eq!(panel.launcher.launched(), vec![AuxTarget::Meter]);
    }

    #[test]
    fn test_task_mode_buttons_check_one_way() {
        let panel = Panel::new();
        let manual = panel.button(Mode::Manual, true, -1);
        let mdi = panel.button(Mode::Mdi, true, -1);

        panel.bus.publish(StatusEvent::ModeManual);
        assert!(manual.current_checked());
        assert!(!mdi.current_checked());

        panel.bus.publish(StatusEvent::ModeMdi);
        assert!(mdi.current_checked());
        // No unchecked transition; the host's exclusive group handles that
        assert!(manual.current_checked());
        assert!(panel.sink.is_empty());
    }

    #[test]
    fn test_dropped_button_is_not_reached_by_events() {
        let panel = Panel::new();
        let button = panel.button(Mode::Home, false, 0);
        assert_eq!(panel.bus.subscriber_count(), 6);
        drop(button);
        assert_eq!(panel.bus.subscriber_count(), 0);
        panel.bus.publish(StatusEvent::AllAxesHomed);
    }

    #[test]
    fn test_panel_from_config() {
        let config = parse_config(
            r#"
buttons:
  - name: "estop"
    mode: estop
    toggle: true
  - name: "zero_y"
    mode: zero_axis
    joint: 1
"#,
        )
        .unwrap();
        let panel = Panel::new();
        let mut buttons: Vec<ActionButton> = config
            .buttons
            .iter()
            .map(|c| ActionButton::from_config(c, panel.services.clone()))
            .collect();
        buttons.iter_mut().for_each(ActionButton::initialize);

        assert!(buttons[0].current_checked());
        buttons[1].on_trigger(Trigger::Click, None).unwrap();
        assert_eq!(panel.sink.commands(), vec![MachineCommand::SetAxisOrigin('Y', 0.0)]);
    }
}
