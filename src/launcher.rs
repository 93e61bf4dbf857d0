use crate::config::{AuxProgram, AuxPrograms};
use std::fmt;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Auxiliary diagnostic programs a button can launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxTarget {
    Meter,
    Status,
    ConfigEditor,
}

impl fmt::Display for AuxTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuxTarget::Meter => f.write_str("meter"),
            AuxTarget::Status => f.write_str("status"),
            AuxTarget::ConfigEditor => f.write_str("config editor"),
        }
    }
}

pub trait AuxLauncher {
    /// Starts the program in the background; never blocks the caller
    fn launch(&self, target: AuxTarget);
}

/// Launches the configured program for each target as a child process
#[derive(Debug, Clone, Default)]
pub struct ProgramLauncher {
    programs: AuxPrograms,
}

impl ProgramLauncher {
    pub fn new(programs: AuxPrograms) -> Self {
        Self { programs }
    }

    pub fn program(&self, target: AuxTarget) -> &AuxProgram {
        match target {
            AuxTarget::Meter => &self.programs.meter,
            AuxTarget::Status => &self.programs.status,
            AuxTarget::ConfigEditor => &self.programs.config_editor,
        }
    }
}

impl AuxLauncher for ProgramLauncher {
    fn launch(&self, target: AuxTarget) {
        let program = self.program(target).clone();
        info!("Launching {}: {} {:?}", target, program.command, program.args);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = run_program(&program).await {
                        error!("Failed to launch {}: {} - {}", target, program.command, e);
                    }
                });
            }
            Err(e) => {
                error!("Cannot launch {} without an async runtime: {}", target, e);
            }
        }
    }
}

/// Runs a program to completion, streaming its output to the log
async fn run_program(program: &AuxProgram) -> Result<i32, std::io::Error> {
    let mut child = Command::new(&program.command)
        .args(&program.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let label = format!("{} {:?}", program.command, program.args);

    let stdout_task = child.stdout.take().map(|stdout| {
        let label = label.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("STDOUT [{}]: {}", label, line);
            }
        })
    });

    let stderr_task = child.stderr.take().map(|stderr| {
        let label = label.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("STDERR [{}]: {}", label, line);
            }
        })
    });

    let status = child.wait().await?;
    if let Some(task) = stdout_task {
        let _ = task.await;
    }
    if let Some(task) = stderr_task {
        let _ = task.await;
    }

    let exit_code = status.code().unwrap_or(-1);
    if status.success() {
        info!("Program exited: {} (exit code: {})", label, exit_code);
    } else {
        warn!("Program exited with non-zero status: {} (exit code: {})", label, exit_code);
    }
    Ok(exit_code)
}
