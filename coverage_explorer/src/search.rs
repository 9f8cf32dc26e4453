//! Method occurrence search
//!
//! A search remembers, per report, the ascending positions where a method was
//! entered. Match navigation never leaves the report under the cursor.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{ExplorerError, Result};
use crate::trace::MethodId;
use crate::viewer::{Cursor, MethodCatalog, TraceViewer, ViewerLocation};

/// Case-insensitive substring match over the catalog, in id order
pub fn find_methods_by_name<'a>(catalog: &'a MethodCatalog, partial: &str) -> Vec<(MethodId, &'a str)> {
    let needle = partial.to_lowercase();
    catalog
        .iter()
        .filter(|(_, name)| name.to_lowercase().contains(&needle))
        .collect()
}

/// Every enter of `method_id`, ordered by report then position
pub fn find_occurrences(reports: &[Vec<ViewerLocation>], method_id: MethodId) -> Vec<(usize, usize)> {
    reports
        .iter()
        .enumerate()
        .flat_map(|(report, locations)| {
            locations
                .iter()
                .filter(move |location| location.method_id == method_id && location.kind.is_enter())
                .map(move |location| (report, location.position))
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIndex {
    subject_name: String,
    matches: BTreeMap<usize, Vec<usize>>,
}

impl SearchIndex {
    /// Index every enter of `method_id` across all reports
    pub fn build(viewer: &TraceViewer, method_id: MethodId) -> Result<Self> {
        let subject_name = viewer
            .method_name(method_id)
            .ok_or_else(|| ExplorerError::UnresolvedReference(format!("method id {method_id}")))?
            .to_string();

        let mut matches: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (report, position) in find_occurrences(viewer.reports(), method_id) {
            matches.entry(report).or_default().push(position);
        }
        for positions in matches.values_mut() {
            positions.sort_unstable();
        }

        debug!(
            method_id,
            reports = matches.len(),
            total = matches.values().map(Vec::len).sum::<usize>(),
            "built search index"
        );

        Ok(Self {
            subject_name,
            matches,
        })
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn positions(&self, report: usize) -> Option<&[usize]> {
        self.matches.get(&report).map(Vec::as_slice)
    }

    /// `(report, positions)` in ascending report order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.matches
            .iter()
            .map(|(&report, positions)| (report, positions.as_slice()))
    }

    /// Smallest indexed position strictly after the cursor
    pub fn next_after(&self, cursor: Cursor) -> Result<usize> {
        let positions = self.report_matches(cursor.report)?;
        let index = positions.partition_point(|&position| position <= cursor.position);
        positions
            .get(index)
            .copied()
            .ok_or_else(|| ExplorerError::SearchExhausted(self.subject_name.clone()))
    }

    /// Largest indexed position strictly before the cursor
    pub fn prev_before(&self, cursor: Cursor) -> Result<usize> {
        let positions = self.report_matches(cursor.report)?;
        let index = positions.partition_point(|&position| position < cursor.position);
        index
            .checked_sub(1)
            .map(|index| positions[index])
            .ok_or_else(|| ExplorerError::SearchExhausted(self.subject_name.clone()))
    }

    fn report_matches(&self, report: usize) -> Result<&[usize]> {
        self.positions(report)
            .ok_or_else(|| ExplorerError::NoActiveSearch(self.subject_name.clone()))
    }
}

/// The most recent search, if any
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    index: Option<SearchIndex>,
}

impl SearchEngine {
    pub fn index(&self) -> Option<&SearchIndex> {
        self.index.as_ref()
    }

    /// Replace the current index with one for `method_id`
    pub fn search(&mut self, viewer: &TraceViewer, method_id: MethodId) -> Result<&SearchIndex> {
        let index = SearchIndex::build(viewer, method_id)?;
        Ok(self.index.insert(index))
    }

    pub fn find_next_match(&self, viewer: &mut TraceViewer) -> Result<()> {
        let cursor = viewer.cursor();
        let position = self.active()?.next_after(cursor)?;
        viewer.set_position(cursor.report, position)
    }

    pub fn find_prev_match(&self, viewer: &mut TraceViewer) -> Result<()> {
        let cursor = viewer.cursor();
        let position = self.active()?.prev_before(cursor)?;
        viewer.set_position(cursor.report, position)
    }

    fn active(&self) -> Result<&SearchIndex> {
        self.index.as_ref().ok_or(ExplorerError::NoSearch)
    }
}
