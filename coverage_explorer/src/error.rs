//! Recoverable exploration failures.
//!
//! None of these are fatal: the interactive loop prints them and keeps going.

use std::fmt;

use thiserror::Error;

use crate::command::DispatchError;
use crate::trace::MethodId;

/// Which end of a report a step ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Start => f.write_str("start"),
            Boundary::End => f.write_str("end"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplorerError {
    #[error("no location present at ({report}, {position})")]
    OutOfRange { report: i64, position: i64 },

    #[error("reached the {0} of report")]
    NoFurtherMovement(Boundary),

    #[error("{0} not found")]
    UnresolvedReference(String),

    #[error(
        "multiple methods found, choose one with find-id:\n{}",
        format_candidates(.0)
    )]
    AmbiguousMatch(Vec<(MethodId, String)>),

    #[error("no search has been run; use find first")]
    NoSearch,

    #[error("no matches for [{0}] found in the current report")]
    NoActiveSearch(String),

    #[error("reached end for the search of [{0}] in the current report")]
    SearchExhausted(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

impl ExplorerError {
    pub fn out_of_range(report: usize, position: usize) -> Self {
        Self::OutOfRange {
            report: report as i64,
            position: position as i64,
        }
    }
}

fn format_candidates(candidates: &[(MethodId, String)]) -> String {
    candidates
        .iter()
        .map(|(id, name)| format!("{id}: {name}"))
        .collect::<Vec<_>>()
        .join("\n")
}
