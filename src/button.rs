use crate::binding;
use crate::command::CommandSink;
use crate::config::{ButtonConfig, ConfigSource};
use crate::dispatch::{ActionDispatcher, Dispatch, Trigger};
use crate::error::{ActionError, PropertyError};
use crate::launcher::AuxLauncher;
use crate::mode::Mode;
use crate::property::{PropertyKey, PropertyValue};
use crate::state::{ButtonCore, ButtonState, ButtonView};
use crate::status::{StatusBus, Subscription};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Process-wide collaborators shared by every button
#[derive(Clone)]
pub struct MachineServices {
    pub bus: Rc<dyn StatusBus>,
    pub sink: Rc<dyn CommandSink>,
    pub launcher: Rc<dyn AuxLauncher>,
    pub config: Rc<dyn ConfigSource>,
}

/// A push/toggle button bound to machine status and commands.
///
/// Configure it with [`set_mode`](Self::set_mode) and friends, then call
/// [`initialize`](Self::initialize) to bind it to the status bus. The host
/// wires its press/release/click primitives to [`on_trigger`](Self::on_trigger)
/// and renders from [`current_checked`](Self::current_checked) and
/// [`current_enabled`](Self::current_enabled). Dropping the button releases
/// every subscription.
pub struct ActionButton {
    core: Rc<ButtonCore>,
    services: MachineServices,
    subscriptions: Vec<Subscription>,
    initialized: bool,
}

impl ActionButton {
    /// Creates an unconfigured button with no mode selected
    pub fn new(name: &str, services: MachineServices) -> Self {
        Self {
            core: Rc::new(ButtonCore::new(name, Rc::clone(&services.config))),
            services,
            subscriptions: Vec::new(),
            initialized: false,
        }
    }

    /// Creates and configures a button from a panel entry, without binding it
    pub fn from_config(config: &ButtonConfig, services: MachineServices) -> Self {
        let button = Self::new(&config.name, services);
        if let Some(mode) = config.mode {
            button.set_mode(mode, true);
        }
        button.set_joint_index(config.joint);
        button.set_toggle(config.toggle);
        button
    }

    /// Returns the name given at construction
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Selects (`enabled = true`) or clears a mode. Takes effect at the next
    /// [`initialize`](Self::initialize).
    pub fn set_mode(&self, mode: Mode, enabled: bool) {
        self.core.update_settings(|s| s.selector.set_mode(mode, enabled));
        if self.initialized {
            debug!("Mode of bound button '{}' changed; re-initialize to rebind", self.name());
        }
    }

    /// Returns the selected mode, if any
    pub fn mode(&self) -> Option<Mode> {
        self.core.settings().mode()
    }

    /// Reads the flag for one mode
    pub fn is_mode_set(&self, mode: Mode) -> bool {
        self.core.settings().selector.is_set(mode)
    }

    /// Sets the joint used by home, jog and zero modes; `-1` means unset
    pub fn set_joint_index(&self, joint: i32) {
        self.core.update_settings(|s| s.joint_index = joint);
    }

    /// Returns the configured joint, or `-1` if unset
    pub fn joint_index(&self) -> i32 {
        self.core.settings().joint_index
    }

    /// Switches between momentary and toggle behavior
    pub fn set_toggle(&self, toggle: bool) {
        self.core.update_settings(|s| s.toggle = toggle);
    }

    /// Returns true for toggle buttons
    pub fn is_toggle(&self) -> bool {
        self.core.settings().toggle
    }

    /// Attaches the view notified on checked and enabled changes
    pub fn attach_view(&self, view: Rc<dyn ButtonView>) {
        self.core.set_view(Some(view));
    }

    /// Detaches the current view, if any
    pub fn detach_view(&self) {
        self.core.set_view(None);
    }

    /// Binds the button to the status bus for its current mode. Calling it
    /// again drops the previous bindings first.
    pub fn initialize(&mut self) {
        self.release_subscriptions();
        self.subscriptions = binding::bind(&self.core, &self.services.bus);
        self.initialized = true;
    }

    /// Releases every status subscription; the button stays configured
    pub fn teardown(&mut self) {
        if self.initialized {
            info!("Tearing down button '{}'", self.name());
        }
        self.release_subscriptions();
        self.initialized = false;
    }

    /// Returns true between [`initialize`](Self::initialize) and
    /// [`teardown`](Self::teardown), even for modes that bind no events
    pub fn is_bound(&self) -> bool {
        self.initialized
    }

    /// Number of live status subscriptions held by this button
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Handles a user trigger. `checked` carries the widget's new checked
    /// value when a toggle button is clicked.
    pub fn on_trigger(&self, trigger: Trigger, checked: Option<bool>) -> Result<Dispatch, ActionError> {
        let guard = self.core.guard();
        if guard.is_engaged() {
            debug!("Ignoring {:?} on '{}' during status sync", trigger, self.name());
            return Ok(Dispatch::Suppressed);
        }

        let settings = self.core.settings();
        if let (true, Trigger::Click, Some(value)) = (settings.toggle, trigger, checked) {
            self.core.record_user_checked(value);
        }

        let dispatcher = ActionDispatcher {
            bus: self.services.bus.as_ref(),
            sink: self.services.sink.as_ref(),
            launcher: self.services.launcher.as_ref(),
            guard,
        };
        match dispatcher.on_trigger(&settings, trigger, checked) {
            Ok(outcome) => {
                debug!("'{}' {:?} -> {:?}", self.name(), trigger, outcome);
                Ok(outcome)
            }
            Err(e) => {
                warn!("Action button '{}': {}", self.name(), e);
                Err(e)
            }
        }
    }

    /// Latest checked value, as last synced or clicked
    pub fn current_checked(&self) -> bool {
        self.core.state().checked
    }

    /// Latest enabled value, as last synced from status
    pub fn current_enabled(&self) -> bool {
        self.core.state().enabled
    }

    /// Snapshot of settings, checked and enabled
    pub fn state(&self) -> ButtonState {
        self.core.state()
    }

    /// Reads one designer property
    pub fn property(&self, key: PropertyKey) -> PropertyValue {
        self.core.settings().property(key)
    }

    /// Writes one designer property, checking the value type
    pub fn set_property(&self, key: PropertyKey, value: PropertyValue) -> Result<(), PropertyError> {
        self.core.update_settings(|s| s.set_property(key, value))
    }

    /// Restores one designer property to its default
    pub fn reset_property(&self, key: PropertyKey) {
        self.core.update_settings(|s| s.reset_property(key));
    }

    /// Name-based variant of [`set_property`](Self::set_property)
    pub fn set_property_by_name(&self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        let key: PropertyKey = name.parse()?;
        self.set_property(key, value)
    }

    fn release_subscriptions(&mut self) {
        let count = self.subscriptions.len();
        self.subscriptions.clear();
        if count > 0 {
            debug!("Released {} subscription(s) for '{}'", count, self.name());
        }
    }
}

impl Drop for ActionButton {
    fn drop(&mut self) {
        self.release_subscriptions();
    }
}
