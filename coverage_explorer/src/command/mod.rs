//! Command layer: a generic overload-resolving registry and the explorer
//! command set built on top of it.

pub mod explorer;
pub mod registry;

pub use explorer::{explorer_commands, Explorer};
pub use registry::{Arg, CommandRegistry, DispatchError, FromArg, Param, ParamKind, Signature};

use crate::error::{ExplorerError, Result};
use crate::viewer::TraceViewer;

/// Owns the command table and the state it dispatches into
pub struct CommandExecutor {
    registry: CommandRegistry<Explorer, ExplorerError>,
    explorer: Explorer,
}

impl CommandExecutor {
    /// `on_exit` runs when the `exit` command is executed.
    pub fn new(viewer: TraceViewer, on_exit: impl FnMut() + 'static) -> Self {
        let registry = explorer_commands();
        let help = registry.help();
        Self {
            explorer: Explorer::new(viewer, help, on_exit),
            registry,
        }
    }

    pub fn execute<S: AsRef<str>>(&mut self, name: &str, args: &[S]) -> Result<String> {
        self.registry.execute(&mut self.explorer, name, args)
    }

    /// Split a whitespace-separated line and execute it; `None` for a blank line
    pub fn execute_line(&mut self, line: &str) -> Option<Result<String>> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next()?;
        let args: Vec<&str> = tokens.collect();
        Some(self.execute(name, &args))
    }

    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    pub fn viewer(&self) -> &TraceViewer {
        self.explorer.viewer()
    }
}
