//! Starting shape applications for the lifecycle drivers.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex, PoisonError};

use interop_schema::{split_parameters, Role};
use thiserror::Error;

use crate::expect::{Capture, OutputStream, ProcessSession, ScriptedSession, Step};

/// A started entity, ready to be matched against.
pub type Session = Box<dyn OutputStream>;

/// Errors from starting an entity.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("no script for {role} with parameters '{parameters}'")]
    NoScript { role: Role, parameters: String },
}

/// Trait for starting a publisher or subscriber.
pub trait Launcher: Send + Sync {
    /// Start an entity of `role` with the opaque `parameters`.
    fn launch(&self, role: Role, parameters: &str) -> Result<Session, LaunchError>;
}

/// Launches real shape application executables.
///
/// Publisher and subscriber may be different implementations; that is the
/// point of an interoperability run.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    publisher: PathBuf,
    subscriber: PathBuf,
    prefix: Vec<String>,
    capture: Capture,
}

impl ProcessLauncher {
    /// Create a launcher for the given executables.
    pub fn new(publisher: impl Into<PathBuf>, subscriber: impl Into<PathBuf>) -> Self {
        Self {
            publisher: publisher.into(),
            subscriber: subscriber.into(),
            prefix: Vec::new(),
            capture: Capture::default(),
        }
    }

    /// Builder: run every executable through `prefix`, e.g. `taskset -c 1`.
    pub fn with_prefix(mut self, prefix: Vec<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Builder: how entity output is captured.
    pub fn with_capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    /// Executable used for `role`.
    pub fn executable(&self, role: Role) -> &Path {
        match role {
            Role::Publisher => &self.publisher,
            Role::Subscriber => &self.subscriber,
        }
    }

    /// Full argv for an entity: prefix, executable, role flag, parameters.
    pub fn command_line(&self, role: Role, parameters: &str) -> Vec<String> {
        let mut argv = self.prefix.clone();
        argv.push(self.executable(role).display().to_string());
        argv.push(role.flag().to_string());
        argv.extend(split_parameters(parameters));
        argv
    }

    fn command(&self, role: Role, parameters: &str) -> Command {
        let mut prefix = self.prefix.iter();
        let mut command = match prefix.next() {
            Some(program) => {
                let mut command = Command::new(program);
                command.args(prefix).arg(self.executable(role));
                command
            }
            None => Command::new(self.executable(role)),
        };
        command.arg(role.flag()).args(split_parameters(parameters));
        command
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, role: Role, parameters: &str) -> Result<Session, LaunchError> {
        let command = self.command(role, parameters);
        let session = ProcessSession::spawn_with(command, self.capture).map_err(|source| {
            LaunchError::Spawn {
                program: self.command_line(role, parameters).join(" "),
                source,
            }
        })?;
        Ok(Box::new(session))
    }
}

/// Launcher replaying scripts keyed by role and parameters.
///
/// Cloning creates a new handle to the same launch record.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLauncher {
    scripts: HashMap<(Role, String), Vec<Step>>,
    launches: Arc<Mutex<Vec<(Role, String)>>>,
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register the script for an entity.
    pub fn with_script(mut self, role: Role, parameters: impl Into<String>, steps: Vec<Step>) -> Self {
        self.scripts.insert((role, parameters.into()), steps);
        self
    }

    /// Entities launched so far, in launch order.
    pub fn launches(&self) -> Vec<(Role, String)> {
        self.launches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Launcher for ScriptedLauncher {
    fn launch(&self, role: Role, parameters: &str) -> Result<Session, LaunchError> {
        let steps = self
            .scripts
            .get(&(role, parameters.to_string()))
            .cloned()
            .ok_or_else(|| LaunchError::NoScript {
                role,
                parameters: parameters.to_string(),
            })?;
        self.launches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((role, parameters.to_string()));
        Ok(Box::new(ScriptedSession::new(steps)))
    }
}
