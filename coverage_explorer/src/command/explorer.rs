//! Explorer commands: the operations reachable from the command line
//!
//! Every handler returns a human-readable string; an empty string means the
//! command succeeded with nothing to report.

use tracing::debug;

use super::registry::CommandRegistry;
use crate::error::{ExplorerError, Result};
use crate::search::{find_methods_by_name, SearchEngine};
use crate::trace::MethodId;
use crate::viewer::TraceViewer;

const DEFAULT_RECENT_LOCATIONS: usize = 10;

/// State the commands operate on
pub struct Explorer {
    viewer: TraceViewer,
    search: SearchEngine,
    help: String,
    on_exit: Box<dyn FnMut()>,
}

impl Explorer {
    pub fn new(viewer: TraceViewer, help: String, on_exit: impl FnMut() + 'static) -> Self {
        Self {
            viewer,
            search: SearchEngine::default(),
            help,
            on_exit: Box::new(on_exit),
        }
    }

    pub fn viewer(&self) -> &TraceViewer {
        &self.viewer
    }

    pub fn search(&self) -> &SearchEngine {
        &self.search
    }

    pub fn get_loc(&mut self, report: i64, position: i64) -> Result<String> {
        let (report, position) = to_indices(report, position)?;
        let location = self.viewer.location_at(report, position)?;
        Ok(self.viewer.describe(location).to_string())
    }

    pub fn get_cur(&mut self) -> Result<String> {
        let location = self.viewer.current_location()?;
        Ok(self.viewer.describe(location).to_string())
    }

    pub fn exit(&mut self) -> Result<String> {
        (self.on_exit)();
        Ok("exiting...".to_string())
    }

    pub fn help(&mut self) -> Result<String> {
        Ok(self.help.clone())
    }

    /// Negative `n` means the whole stack
    pub fn get_stack(&mut self, n: i64) -> Result<String> {
        let limit = usize::try_from(n).ok();
        let names: Vec<_> = self
            .viewer
            .stack_calls(limit)
            .into_iter()
            .map(|location| self.viewer.describe(location).method_name())
            .collect();
        Ok(names.join("\n"))
    }

    pub fn get_loc_n(&mut self, n: i64) -> Result<String> {
        let n = usize::try_from(n).unwrap_or(0);
        let lines: Vec<_> = self
            .viewer
            .recent_locations(n)
            .iter()
            .map(|location| {
                format!(
                    "{}: {}",
                    location.kind,
                    self.viewer.describe(location).method_name()
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }

    pub fn set_pos(&mut self, report: i64, position: i64) -> Result<String> {
        let (report, position) = to_indices(report, position)?;
        self.viewer.set_position(report, position)?;
        Ok(String::new())
    }

    pub fn get_method_name(&mut self, method_id: i64) -> Result<String> {
        MethodId::try_from(method_id)
            .ok()
            .and_then(|id| self.viewer.method_name(id))
            .map(str::to_string)
            .ok_or_else(|| ExplorerError::UnresolvedReference(format!("method id {method_id}")))
    }

    /// Search by partial name; several candidates are reported, never guessed.
    pub fn find(&mut self, partial: String) -> Result<String> {
        let candidates: Vec<(MethodId, String)> = find_methods_by_name(self.viewer.catalog(), &partial)
            .into_iter()
            .map(|(id, name)| (id, name.to_string()))
            .collect();

        if candidates.len() > 1 {
            return Err(ExplorerError::AmbiguousMatch(candidates));
        }
        match candidates.first() {
            Some(&(method_id, _)) => self.index_method(method_id),
            None => Err(ExplorerError::UnresolvedReference(format!(
                "method matching [{partial}]"
            ))),
        }
    }

    pub fn find_id(&mut self, method_id: i64) -> Result<String> {
        let id = MethodId::try_from(method_id)
            .map_err(|_| ExplorerError::UnresolvedReference(format!("method id {method_id}")))?;
        self.index_method(id)
    }

    pub fn find_next(&mut self) -> Result<String> {
        self.search.find_next_match(&mut self.viewer)?;
        Ok(String::new())
    }

    pub fn find_prev(&mut self) -> Result<String> {
        self.search.find_prev_match(&mut self.viewer)?;
        Ok(String::new())
    }

    pub fn show_all(&mut self) -> Result<String> {
        let index = self.search.index().ok_or(ExplorerError::NoSearch)?;
        let lines: Vec<_> = index
            .iter()
            .map(|(report, positions)| format!("{report}: {}", join_positions(positions)))
            .collect();
        Ok(lines.join("\n"))
    }

    pub fn next(&mut self) -> Result<String> {
        self.viewer.step_forward()?;
        Ok(String::new())
    }

    pub fn next_n(&mut self, n: i64) -> Result<String> {
        self.viewer.step_forward_n(usize::try_from(n).unwrap_or(0))?;
        Ok(String::new())
    }

    pub fn step_back(&mut self) -> Result<String> {
        self.viewer.step_backward()?;
        Ok(String::new())
    }

    pub fn step_back_n(&mut self, n: i64) -> Result<String> {
        self.viewer.step_backward_n(usize::try_from(n).unwrap_or(0))?;
        Ok(String::new())
    }

    pub fn step_out(&mut self) -> Result<String> {
        self.viewer.step_out()?;
        Ok(String::new())
    }

    pub fn step_back_out(&mut self) -> Result<String> {
        self.viewer.step_back_out()?;
        Ok(String::new())
    }

    pub fn step_over(&mut self) -> Result<String> {
        self.viewer.step_over()?;
        Ok(String::new())
    }

    fn index_method(&mut self, method_id: MethodId) -> Result<String> {
        let index = self.search.search(&self.viewer, method_id)?;
        debug!(method_id, subject = index.subject_name(), "search index replaced");

        if index.is_empty() {
            return Ok(format!(
                "no occurrences of [{}] in any report",
                index.subject_name()
            ));
        }

        let firsts: Vec<_> = index
            .iter()
            .map(|(report, positions)| format!("({report}, {})", positions[0]))
            .collect();
        Ok(format!(
            "First location matches in each report:\n{}",
            firsts.join("\n")
        ))
    }
}

/// The full command table over an [`Explorer`]
pub fn explorer_commands() -> CommandRegistry<Explorer, ExplorerError> {
    let mut registry = CommandRegistry::new();
    registry
        .register2("get-loc", ["report", "location"], Explorer::get_loc)
        .register0("get-cur", Explorer::get_cur)
        .register0("next", Explorer::next)
        .register1("next", "n", Explorer::next_n)
        .register0("step-back", Explorer::step_back)
        .register1("step-back", "n", Explorer::step_back_n)
        .register0("step-out", Explorer::step_out)
        .register0("step-back-out", Explorer::step_back_out)
        .register0("step-over", Explorer::step_over)
        .register2("set-pos", ["report", "location"], Explorer::set_pos)
        .register1("get-method-name", "id", Explorer::get_method_name)
        .register1("find", "partial-name", Explorer::find)
        .register1("find-id", "method-id", Explorer::find_id)
        .register0("find-next", Explorer::find_next)
        .register0("find-prev", Explorer::find_prev)
        .register0("show-all", Explorer::show_all)
        .register0("get-stack", |explorer: &mut Explorer| explorer.get_stack(-1))
        .register1("get-stack", "n", Explorer::get_stack)
        .register0("get-loc-n", |explorer: &mut Explorer| {
            explorer.get_loc_n(DEFAULT_RECENT_LOCATIONS as i64)
        })
        .register1("get-loc-n", "n", Explorer::get_loc_n)
        .register0("help", Explorer::help)
        .register0("exit", Explorer::exit)
        .alias("get-location", "get-loc")
        .alias("get-current", "get-cur")
        .alias("get-location-n", "get-loc-n");
    registry
}

fn to_indices(report: i64, position: i64) -> Result<(usize, usize)> {
    match (usize::try_from(report), usize::try_from(position)) {
        (Ok(report), Ok(position)) => Ok((report, position)),
        _ => Err(ExplorerError::OutOfRange { report, position }),
    }
}

fn join_positions(positions: &[usize]) -> String {
    positions
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
