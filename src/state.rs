use crate::config::ConfigSource;
use crate::guard::ReentrancyGuard;
use crate::property::ButtonSettings;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Rendering hook for the widget hosting a button.
///
/// Implementations may synchronously call back into
/// [`ActionButton::on_trigger`](crate::ActionButton::on_trigger) from
/// `set_checked`, the way toolkit toggle signals do.
pub trait ButtonView {
    fn set_checked(&self, checked: bool);
    fn set_enabled(&self, enabled: bool);
}

/// UI-facing state of one button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    pub settings: ButtonSettings,
    pub checked: bool,
    pub enabled: bool,
}

impl Default for ButtonState {
    fn default() -> Self {
        Self {
            settings: ButtonSettings::default(),
            checked: false,
            enabled: true,
        }
    }
}

/// State shared between a button and its status subscriptions
pub(crate) struct ButtonCore {
    name: String,
    state: RefCell<ButtonState>,
    guard: ReentrancyGuard,
    view: RefCell<Option<Rc<dyn ButtonView>>>,
    config: Rc<dyn ConfigSource>,
}

impl ButtonCore {
    pub(crate) fn new(name: &str, config: Rc<dyn ConfigSource>) -> Self {
        Self {
            name: name.to_string(),
            state: RefCell::new(ButtonState::default()),
            guard: ReentrancyGuard::new(),
            view: RefCell::new(None),
            config,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn guard(&self) -> &ReentrancyGuard {
        &self.guard
    }

    pub(crate) fn config(&self) -> &dyn ConfigSource {
        self.config.as_ref()
    }

    pub(crate) fn state(&self) -> ButtonState {
        *self.state.borrow()
    }

    pub(crate) fn settings(&self) -> ButtonSettings {
        self.state.borrow().settings
    }

    pub(crate) fn update_settings<R>(&self, f: impl FnOnce(&mut ButtonSettings) -> R) -> R {
        f(&mut self.state.borrow_mut().settings)
    }

    pub(crate) fn set_view(&self, view: Option<Rc<dyn ButtonView>>) {
        *self.view.borrow_mut() = view;
    }

    fn view(&self) -> Option<Rc<dyn ButtonView>> {
        self.view.borrow().clone()
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        let previous = std::mem::replace(&mut self.state.borrow_mut().enabled, enabled);
        debug!("Set enabled for '{}': {} -> {}", self.name, previous, enabled);
        if let Some(view) = self.view() {
            view.set_enabled(enabled);
        }
    }

    /// Applies a checked state that came from machine status, not the user
    pub(crate) fn sync_checked(&self, checked: bool) {
        self.guard.with_guard(|| {
            let previous = std::mem::replace(&mut self.state.borrow_mut().checked, checked);
            debug!("Synced checked for '{}': {} -> {}", self.name, previous, checked);
            if let Some(view) = self.view() {
                view.set_checked(checked);
            }
        });
    }

    /// Records a checked state the user produced by clicking a toggle
    pub(crate) fn record_user_checked(&self, checked: bool) {
        self.state.borrow_mut().checked = checked;
    }
}
