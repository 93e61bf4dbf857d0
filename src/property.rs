//! Typed button settings with a name-based property surface for editors.

use crate::error::PropertyError;
use crate::mode::{Mode, ModeSelector};
use std::fmt;
use std::str::FromStr;

/// Joint index meaning "not set"
pub const UNSET_JOINT: i32 = -1;

/// Host-configured settings of one button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonSettings {
    pub selector: ModeSelector,
    pub joint_index: i32,
    pub toggle: bool,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            selector: ModeSelector::new(),
            joint_index: UNSET_JOINT,
            toggle: false,
        }
    }
}

impl ButtonSettings {
    pub fn mode(&self) -> Option<Mode> {
        self.selector.mode()
    }

    pub fn property(&self, key: PropertyKey) -> PropertyValue {
        match key {
            PropertyKey::Action(mode) => PropertyValue::Bool(self.selector.is_set(mode)),
            PropertyKey::JointNumber => PropertyValue::Int(self.joint_index),
        }
    }

    pub fn set_property(&mut self, key: PropertyKey, value: PropertyValue) -> Result<(), PropertyError> {
        match (key, value) {
            (PropertyKey::Action(mode), PropertyValue::Bool(enabled)) => {
                self.selector.set_mode(mode, enabled);
                Ok(())
            }
            (PropertyKey::JointNumber, PropertyValue::Int(joint)) => {
                self.joint_index = joint;
                Ok(())
            }
            (key, _) => Err(PropertyError::TypeMismatch {
                key: key.to_string(),
                expected: key.value_kind(),
            }),
        }
    }

    pub fn reset_property(&mut self, key: PropertyKey) {
        match key {
            PropertyKey::Action(mode) => self.selector.set_mode(mode, false),
            PropertyKey::JointNumber => self.joint_index = UNSET_JOINT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
}

/// Editor-visible property names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// `<mode>_action` flag
    Action(Mode),
    /// `joint_number`
    JointNumber,
}

impl PropertyKey {
    /// Every key in editor order
    pub fn all() -> impl Iterator<Item = PropertyKey> {
        Mode::ALL
            .into_iter()
            .map(PropertyKey::Action)
            .chain(std::iter::once(PropertyKey::JointNumber))
    }

    fn value_kind(self) -> &'static str {
        match self {
            PropertyKey::Action(_) => "bool",
            PropertyKey::JointNumber => "int",
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Action(mode) => write!(f, "{}_action", mode.as_str()),
            PropertyKey::JointNumber => f.write_str("joint_number"),
        }
    }
}

impl FromStr for PropertyKey {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "joint_number" {
            return Ok(PropertyKey::JointNumber);
        }
        s.strip_suffix("_action")
            .and_then(|name| Mode::ALL.into_iter().find(|m| m.as_str() == name))
            .map(PropertyKey::Action)
            .ok_or_else(|| PropertyError::UnknownKey(s.to_string()))
    }
}
