use crate::mode::Mode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Default panel shipped with the crate
const EMBEDDED_CONFIG: &str = include_str!("../panel.yaml");

/// Static configuration flags consumed by the binding rules
pub trait ConfigSource {
    /// True when the machine may run programs without homing first
    fn homing_not_required(&self) -> bool;
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub machine: MachineConfig,
    #[serde(default)]
    pub buttons: Vec<ButtonConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MachineConfig {
    #[serde(default)]
    pub no_home_required: bool,
    #[serde(default)]
    pub aux: AuxPrograms,
}

impl ConfigSource for MachineConfig {
    fn homing_not_required(&self) -> bool {
        self.no_home_required
    }
}

/// Programs started by the launch modes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuxPrograms {
    #[serde(default = "default_meter")]
    pub meter: AuxProgram,
    #[serde(default = "default_status")]
    pub status: AuxProgram,
    #[serde(default = "default_config_editor")]
    pub config_editor: AuxProgram,
}

impl Default for AuxPrograms {
    fn default() -> Self {
        Self {
            meter: default_meter(),
            status: default_status(),
            config_editor: default_config_editor(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuxProgram {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl AuxProgram {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            args: Vec::new(),
        }
    }
}

fn default_meter() -> AuxProgram {
    AuxProgram::new("halmeter")
}

fn default_status() -> AuxProgram {
    AuxProgram::new("linuxcnctop")
}

fn default_config_editor() -> AuxProgram {
    AuxProgram::new("halshow")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ButtonConfig {
    pub name: String,
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub toggle: bool,
    #[serde(default = "default_joint")]
    pub joint: i32,
}

fn default_joint() -> i32 {
    -1
}

pub fn parse_config(yaml: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(yaml).context("Failed to parse panel configuration")?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    tracing::info!("Loading panel configuration from {}", path.display());
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&yaml)
}

pub fn load_embedded_config() -> Result<Config> {
    tracing::info!("Using embedded panel configuration");
    parse_config(EMBEDDED_CONFIG)
}
