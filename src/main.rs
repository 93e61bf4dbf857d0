use action_button::{
    load_config, load_embedded_config, ActionButton, CommandLog, Config, LocalStatusBus,
    MachineServices, ProgramLauncher, StatusEvent, StatusEventKind, Trigger,
};
use anyhow::{anyhow, bail, Result};
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

struct Panel {
    bus: Rc<LocalStatusBus>,
    sink: Rc<CommandLog>,
    buttons: Vec<ActionButton>,
}

impl Panel {
    fn build(config: &Config) -> Self {
        let bus = Rc::new(LocalStatusBus::new());
        let sink = Rc::new(CommandLog::new());
        let services = MachineServices {
            bus: bus.clone(),
            sink: sink.clone(),
            launcher: Rc::new(ProgramLauncher::new(config.machine.aux.clone())),
            config: Rc::new(config.machine.clone()),
        };

        let mut buttons: Vec<ActionButton> = config
            .buttons
            .iter()
            .map(|b| ActionButton::from_config(b, services.clone()))
            .collect();
        for button in &mut buttons {
            button.initialize();
        }
        Self { bus, sink, buttons }
    }

    fn button(&self, name: &str) -> Result<&ActionButton> {
        self.buttons
            .iter()
            .find(|b| b.name() == name)
            .ok_or_else(|| anyhow!("no button named '{}'", name))
    }

    fn show(&self) {
        for button in &self.buttons {
            let mode = button.mode().map(|m| m.as_str()).unwrap_or("-");
            println!(
                "{:<14} {:<22} enabled={:<5} checked={}",
                button.name(),
                mode,
                button.current_enabled(),
                button.current_checked()
            );
        }
    }

    /// Executes one console line; returns false on quit
    fn execute(&self, line: &str) -> Result<bool> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => return Ok(false),
            ["show"] => self.show(),
            ["publish", event, rest @ ..] => {
                let kind: StatusEventKind = event.parse()?;
                let axes = rest.first().copied().unwrap_or("");
                self.bus.publish(StatusEvent::from_kind(kind, axes));
            }
            ["click", name, rest @ ..] => {
                let checked = match rest.first().copied() {
                    None => None,
                    Some("on") => Some(true),
                    Some("off") => Some(false),
                    Some(other) => bail!("expected 'on' or 'off', got '{}'", other),
                };
                self.trigger(name, Trigger::Click, checked)?;
            }
            ["press", name] => self.trigger(name, Trigger::Press, None)?,
            ["release", name] => self.trigger(name, Trigger::Release, None)?,
            ["file", "loaded"] => self.bus.set_file_loaded(true),
            ["file", "unloaded"] => self.bus.set_file_loaded(false),
            ["jog-distance", value] => self.bus.set_jog_distance(value.parse()?),
            _ => bail!("unrecognised command: {}", line),
        }

        for request in self.bus.take_requests() {
            info!("Host request: {}", request);
        }
        Ok(true)
    }

    fn trigger(&self, name: &str, trigger: Trigger, checked: Option<bool>) -> Result<()> {
        let button = self.button(name)?;
        // A release must always reach the button so a held jog can stop
        if trigger != Trigger::Release && !button.current_enabled() {
            warn!("Button '{}' is disabled", name);
            return Ok(());
        }
        // Errors are already logged by the button
        let _ = button.on_trigger(trigger, checked);
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting action panel");

    let config = match std::env::var("ACTION_PANEL_CONFIG") {
        Ok(path) => load_config(&path)?,
        Err(_) => load_embedded_config()?,
    };
    info!("Number of buttons: {}", config.buttons.len());

    let panel = Panel::build(&config);
    panel.show();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match panel.execute(line.trim()) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => error!("{}", e),
        }
    }

    info!("Shutting down action panel");
    Ok(())
}
