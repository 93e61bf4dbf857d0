use crate::error::StatusError;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;
use tracing::{debug, warn};

/// Kinds of machine-state events a button can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusEventKind {
    EstopActive,
    EstopCleared,
    PowerOn,
    PowerOff,
    InterpreterIdle,
    InterpreterRunning,
    AllAxesHomed,
    NotAllHomed,
    ModeAuto,
    ModeMdi,
    ModeManual,
}

impl StatusEventKind {
    pub const ALL: [StatusEventKind; 11] = [
        StatusEventKind::EstopActive,
        StatusEventKind::EstopCleared,
        StatusEventKind::PowerOn,
        StatusEventKind::PowerOff,
        StatusEventKind::InterpreterIdle,
        StatusEventKind::InterpreterRunning,
        StatusEventKind::AllAxesHomed,
        StatusEventKind::NotAllHomed,
        StatusEventKind::ModeAuto,
        StatusEventKind::ModeMdi,
        StatusEventKind::ModeManual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusEventKind::EstopActive => "estop-active",
            StatusEventKind::EstopCleared => "estop-cleared",
            StatusEventKind::PowerOn => "power-on",
            StatusEventKind::PowerOff => "power-off",
            StatusEventKind::InterpreterIdle => "interpreter-idle",
            StatusEventKind::InterpreterRunning => "interpreter-running",
            StatusEventKind::AllAxesHomed => "all-axes-homed",
            StatusEventKind::NotAllHomed => "not-all-homed",
            StatusEventKind::ModeAuto => "mode-auto",
            StatusEventKind::ModeMdi => "mode-mdi",
            StatusEventKind::ModeManual => "mode-manual",
        }
    }
}

impl fmt::Display for StatusEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusEventKind {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatusEventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StatusError::UnknownEvent(s.to_string()))
    }
}

/// A published machine-state event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    EstopActive,
    EstopCleared,
    PowerOn,
    PowerOff,
    InterpreterIdle,
    InterpreterRunning,
    AllAxesHomed,
    /// Carries the letters of the axes still unhomed
    NotAllHomed { axes: String },
    ModeAuto,
    ModeMdi,
    ModeManual,
}

impl StatusEvent {
    pub fn kind(&self) -> StatusEventKind {
        match self {
            StatusEvent::EstopActive => StatusEventKind::EstopActive,
            StatusEvent::EstopCleared => StatusEventKind::EstopCleared,
            StatusEvent::PowerOn => StatusEventKind::PowerOn,
            StatusEvent::PowerOff => StatusEventKind::PowerOff,
            StatusEvent::InterpreterIdle => StatusEventKind::InterpreterIdle,
            StatusEvent::InterpreterRunning => StatusEventKind::InterpreterRunning,
            StatusEvent::AllAxesHomed => StatusEventKind::AllAxesHomed,
            StatusEvent::NotAllHomed { .. } => StatusEventKind::NotAllHomed,
            StatusEvent::ModeAuto => StatusEventKind::ModeAuto,
            StatusEvent::ModeMdi => StatusEventKind::ModeMdi,
            StatusEvent::ModeManual => StatusEventKind::ModeManual,
        }
    }

    /// Builds the event for a kind; `axes` is only used by `not-all-homed`
    pub fn from_kind(kind: StatusEventKind, axes: &str) -> StatusEvent {
        match kind {
            StatusEventKind::EstopActive => StatusEvent::EstopActive,
            StatusEventKind::EstopCleared => StatusEvent::EstopCleared,
            StatusEventKind::PowerOn => StatusEvent::PowerOn,
            StatusEventKind::PowerOff => StatusEvent::PowerOff,
            StatusEventKind::InterpreterIdle => StatusEvent::InterpreterIdle,
            StatusEventKind::InterpreterRunning => StatusEvent::InterpreterRunning,
            StatusEventKind::AllAxesHomed => StatusEvent::AllAxesHomed,
            StatusEventKind::NotAllHomed => StatusEvent::NotAllHomed {
                axes: axes.to_string(),
            },
            StatusEventKind::ModeAuto => StatusEvent::ModeAuto,
            StatusEventKind::ModeMdi => StatusEvent::ModeMdi,
            StatusEventKind::ModeManual => StatusEvent::ModeManual,
        }
    }
}

/// One-off requests a button can fire on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRequest {
    LoadFile,
}

impl fmt::Display for StatusRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusRequest::LoadFile => f.write_str("load-file-request"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Callback invoked for each matching event; receives the bus for status queries
pub type StatusCallback = Rc<dyn Fn(&StatusEvent, &dyn StatusBus)>;

/// Wraps a closure as a [`StatusCallback`]
pub fn status_callback<F>(f: F) -> StatusCallback
where
    F: Fn(&StatusEvent, &dyn StatusBus) + 'static,
{
    Rc::new(f)
}

/// Publisher of machine-state events and answerer of status queries
pub trait StatusBus {
    fn subscribe(&self, kind: StatusEventKind, callback: StatusCallback) -> SubscriptionId;

    /// Returns false if the id was not subscribed
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    fn request(&self, request: StatusRequest);

    fn is_power_on(&self) -> bool;
    fn all_axes_homed(&self) -> bool;
    fn is_estop_clear(&self) -> bool;
    fn is_file_loaded(&self) -> bool;
    /// Zero when no distance jog is pending
    fn current_jog_distance(&self) -> f64;
}

/// Owned subscription handle; unsubscribes when dropped
pub struct Subscription {
    id: SubscriptionId,
    kind: StatusEventKind,
    bus: Weak<dyn StatusBus>,
}

impl Subscription {
    pub fn new(bus: &Rc<dyn StatusBus>, kind: StatusEventKind, callback: StatusCallback) -> Self {
        let id = bus.subscribe(kind, callback);
        Self {
            id,
            kind,
            bus: Rc::downgrade(bus),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn kind(&self) -> StatusEventKind {
        self.kind
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.id);
        }
    }
}

/// Snapshot of the machine as seen by the local bus
#[derive(Debug, Clone, PartialEq)]
pub struct MachineSnapshot {
    pub estop: bool,
    pub power_on: bool,
    pub all_homed: bool,
    pub interpreter_idle: bool,
    pub file_loaded: bool,
    pub jog_distance: f64,
}

impl Default for MachineSnapshot {
    fn default() -> Self {
        Self {
            estop: true,
            power_on: false,
            all_homed: false,
            interpreter_idle: true,
            file_loaded: false,
            jog_distance: 0.0,
        }
    }
}

struct Subscriber {
    id: SubscriptionId,
    kind: StatusEventKind,
    callback: StatusCallback,
}

/// In-process status bus for a single UI thread.
///
/// `publish` updates the snapshot first, then notifies matching subscribers in
/// subscription order. Callbacks may subscribe, unsubscribe or query the bus
/// while being notified.
#[derive(Default)]
pub struct LocalStatusBus {
    snapshot: RefCell<MachineSnapshot>,
    subscribers: RefCell<Vec<Subscriber>>,
    requests: RefCell<Vec<StatusRequest>>,
    next_id: Cell<u64>,
}

impl LocalStatusBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: MachineSnapshot) -> Self {
        Self {
            snapshot: RefCell::new(snapshot),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn publish(&self, event: StatusEvent) {
        self.apply(&event);

        let kind = event.kind();
        let callbacks: Vec<StatusCallback> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| Rc::clone(&s.callback))
            .collect();

        debug!("Publishing '{}' to {} subscriber(s)", kind, callbacks.len());
        for callback in callbacks {
            callback(&event, self);
        }
    }

    pub fn set_file_loaded(&self, loaded: bool) {
        self.snapshot.borrow_mut().file_loaded = loaded;
    }

    pub fn set_jog_distance(&self, distance: f64) {
        self.snapshot.borrow_mut().jog_distance = distance;
    }

    /// Drains the requests fired since the last call
    pub fn take_requests(&self) -> Vec<StatusRequest> {
        std::mem::take(&mut *self.requests.borrow_mut())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn apply(&self, event: &StatusEvent) {
        let mut snapshot = self.snapshot.borrow_mut();
        match event {
            StatusEvent::EstopActive => snapshot.estop = true,
            StatusEvent::EstopCleared => snapshot.estop = false,
            StatusEvent::PowerOn => snapshot.power_on = true,
            StatusEvent::PowerOff => snapshot.power_on = false,
            StatusEvent::InterpreterIdle => snapshot.interpreter_idle = true,
            StatusEvent::InterpreterRunning => snapshot.interpreter_idle = false,
            StatusEvent::AllAxesHomed => snapshot.all_homed = true,
            StatusEvent::NotAllHomed { .. } => snapshot.all_homed = false,
            StatusEvent::ModeAuto | StatusEvent::ModeMdi | StatusEvent::ModeManual => {}
        }
    }
}

impl StatusBus for LocalStatusBus {
    fn subscribe(&self, kind: StatusEventKind, callback: StatusCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push(Subscriber { id, kind, callback });
        debug!("Subscribed {:?} to '{}'", id, kind);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        let removed = subscribers.len() != before;
        if !removed {
            warn!("Unsubscribe for unknown {:?}", id);
        }
        removed
    }

    fn request(&self, request: StatusRequest) {
        debug!("Request fired: {}", request);
        self.requests.borrow_mut().push(request);
    }

    fn is_power_on(&self) -> bool {
        self.snapshot.borrow().power_on
    }

    fn all_axes_homed(&self) -> bool {
        self.snapshot.borrow().all_homed
    }

    fn is_estop_clear(&self) -> bool {
        !self.snapshot.borrow().estop
    }

    fn is_file_loaded(&self) -> bool {
        self.snapshot.borrow().file_loaded
    }

    fn current_jog_distance(&self) -> f64 {
        self.snapshot.borrow().jog_distance
    }
}
