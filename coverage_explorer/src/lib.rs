//! Interactive navigation over recorded coverage traces.
//!
//! A trace is a set of reports, each an ordered list of method enter and
//! leave events. The viewer rebuilds call depth for every event and moves a
//! cursor through it; the search module indexes method occurrences; the
//! command layer exposes both through a name-dispatched command table.

pub mod app;
pub mod command;
pub mod error;
pub mod search;
pub mod trace;
pub mod viewer;

pub use command::{CommandExecutor, CommandRegistry};
pub use error::{ExplorerError, Result};
pub use viewer::{Cursor, TraceViewer, ViewerLocation};
