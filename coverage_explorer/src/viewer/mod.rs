//! Trace viewer: enriched reports plus the exploration cursor
//!
//! Reports are built once at load time and never change afterwards; the cursor
//! is the only mutable state and every mutation goes through a bounds check.

pub mod catalog;
pub mod location;

use tracing::info;

use crate::error::{Boundary, ExplorerError, Result};
use crate::trace::{CoverageTrace, LoadResult, MethodId, MethodResolver, RawReport};

pub use catalog::MethodCatalog;
pub use location::{format_timestamp, reconstruct_report, LocationView, ViewerLocation};

/// Current `(report, position)` exploration pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub report: usize,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

pub struct TraceViewer {
    catalog: MethodCatalog,
    reports: Vec<Vec<ViewerLocation>>,
    cursor: Cursor,
}

impl TraceViewer {
    /// Resolve methods and reconstruct every report of a decoded trace
    pub fn load<R: MethodResolver + ?Sized>(trace: &CoverageTrace, resolver: &R) -> LoadResult<Self> {
        let catalog = MethodCatalog::build(&trace.methods, resolver)?;
        let viewer = Self::new(catalog, &trace.reports);

        info!(
            reports = viewer.report_count(),
            methods = viewer.catalog.len(),
            ignored = viewer.catalog.ignored().count(),
            "loaded coverage trace"
        );

        Ok(viewer)
    }

    pub fn new(catalog: MethodCatalog, reports: &[RawReport]) -> Self {
        let reports = reports
            .iter()
            .enumerate()
            .map(|(index, report)| reconstruct_report(index, &report.locations, &catalog))
            .collect();

        Self {
            catalog,
            reports,
            cursor: Cursor::default(),
        }
    }

    pub fn catalog(&self) -> &MethodCatalog {
        &self.catalog
    }

    pub fn method_name(&self, method_id: MethodId) -> Option<&str> {
        self.catalog.name(method_id)
    }

    pub fn report_count(&self) -> usize {
        self.reports.len()
    }

    pub fn reports(&self) -> &[Vec<ViewerLocation>] {
        &self.reports
    }

    pub fn report(&self, report: usize) -> Option<&[ViewerLocation]> {
        self.reports.get(report).map(Vec::as_slice)
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Locations of the report under the cursor; empty when there is none
    pub fn current_report(&self) -> &[ViewerLocation] {
        self.report(self.cursor.report).unwrap_or(&[])
    }

    pub fn current_location(&self) -> Result<&ViewerLocation> {
        self.location_at(self.cursor.report, self.cursor.position)
    }

    pub fn location_at(&self, report: usize, position: usize) -> Result<&ViewerLocation> {
        self.report(report)
            .and_then(|locations| locations.get(position))
            .ok_or_else(|| ExplorerError::out_of_range(report, position))
    }

    /// Pair a location with the catalog for display
    pub fn describe<'a>(&'a self, location: &'a ViewerLocation) -> LocationView<'a> {
        LocationView {
            location,
            catalog: &self.catalog,
        }
    }

    pub fn set_position(&mut self, report: usize, position: usize) -> Result<()> {
        self.location_at(report, position)?;
        self.cursor = Cursor { report, position };
        Ok(())
    }

    pub fn step_forward(&mut self) -> Result<()> {
        if self.cursor.position + 1 >= self.current_report().len() {
            return Err(ExplorerError::NoFurtherMovement(Boundary::End));
        }
        self.cursor.position += 1;
        Ok(())
    }

    pub fn step_backward(&mut self) -> Result<()> {
        if self.cursor.position == 0 {
            return Err(ExplorerError::NoFurtherMovement(Boundary::Start));
        }
        self.cursor.position -= 1;
        Ok(())
    }

    /// Best effort: progress made before hitting the boundary is kept.
    pub fn step_forward_n(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.step_forward()?;
        }
        Ok(())
    }

    /// Best effort: progress made before hitting the boundary is kept.
    pub fn step_backward_n(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.step_backward()?;
        }
        Ok(())
    }

    /// Advance until the depth drops below the current frame's depth.
    pub fn step_out(&mut self) -> Result<()> {
        let threshold = self.current_depth(Boundary::End)?;
        self.atomically(|viewer| viewer.walk_until(Direction::Forward, |depth| depth < threshold))
    }

    /// Retreat until the depth drops below the current frame's depth.
    pub fn step_back_out(&mut self) -> Result<()> {
        let threshold = self.current_depth(Boundary::Start)?;
        self.atomically(|viewer| viewer.walk_until(Direction::Backward, |depth| depth < threshold))
    }

    /// Step once, then skip everything deeper than where we started.
    pub fn step_over(&mut self) -> Result<()> {
        let depth_before = self.current_depth(Boundary::End)?;
        self.atomically(|viewer| {
            viewer.step_forward()?;
            while viewer.current_depth(Boundary::End)? > depth_before {
                viewer.step_forward()?;
            }
            Ok(())
        })
    }

    /// Enter events of the live frames at the cursor, outermost first.
    ///
    /// `limit` caps how many innermost frames are returned; `None` returns the
    /// whole stack.
    pub fn stack_calls(&self, limit: Option<usize>) -> Vec<&ViewerLocation> {
        let Ok(current) = self.current_location() else {
            return Vec::new();
        };

        let mut frame_depth = current.stack_depth;
        let mut remaining = limit.unwrap_or_else(|| frame_depth.max(0) as usize);
        let mut frames = Vec::new();

        for location in self.current_report()[..=self.cursor.position].iter().rev() {
            if remaining == 0 {
                break;
            }
            if location.kind.is_enter() && location.stack_depth == frame_depth {
                frames.push(location);
                frame_depth -= 1;
                remaining -= 1;
            }
        }

        frames.reverse();
        frames
    }

    /// The last `n` locations up to and including the cursor, oldest first
    pub fn recent_locations(&self, n: usize) -> &[ViewerLocation] {
        let report = self.current_report();
        if report.is_empty() || n == 0 {
            return &[];
        }
        let end = self.cursor.position + 1;
        &report[end.saturating_sub(n)..end]
    }

    fn current_depth(&self, boundary: Boundary) -> Result<i32> {
        self.current_report()
            .get(self.cursor.position)
            .map(|location| location.stack_depth)
            .ok_or(ExplorerError::NoFurtherMovement(boundary))
    }

    fn step(&mut self, direction: Direction) -> Result<()> {
        match direction {
            Direction::Forward => self.step_forward(),
            Direction::Backward => self.step_backward(),
        }
    }

    fn walk_until(&mut self, direction: Direction, stop: impl Fn(i32) -> bool) -> Result<()> {
        loop {
            self.step(direction)?;
            if stop(self.current_depth(Boundary::End)?) {
                return Ok(());
            }
        }
    }

    // Compound moves either land or leave the cursor where it was.
    fn atomically(&mut self, mut walk: impl FnMut(&mut Self) -> Result<()>) -> Result<()> {
        let start = self.cursor;
        let outcome = walk(self);
        if outcome.is_err() {
            self.cursor = start;
        }
        outcome
    }
}
