#![allow(non_snake_case)]

use coverage_explorer::error::Boundary;
use coverage_explorer::search::SearchEngine;
use coverage_explorer::trace::{EventKind, MethodId, RawLocationRecord, RawReport};
use coverage_explorer::viewer::MethodCatalog;
use coverage_explorer::{ExplorerError, TraceViewer};
use proptest::prelude::*;

const METHODS: MethodId = 4;

fn record(method_id: MethodId, kind: EventKind) -> RawLocationRecord {
    RawLocationRecord {
        thread_id: 1,
        method_id,
        offset: 0,
        kind,
        timestamp_micros: 0,
    }
}

/// Well-nested call sequence driven by (method, descend) choices; any frames
/// still open at the end are closed.
fn balanced_report(choices: &[(MethodId, bool)]) -> RawReport {
    let mut open: Vec<MethodId> = Vec::new();
    let mut locations = Vec::new();
    for &(method_id, descend) in choices {
        if descend || open.is_empty() {
            open.push(method_id);
            locations.push(record(method_id, EventKind::Enter));
        } else if let Some(method_id) = open.pop() {
            locations.push(record(method_id, EventKind::Leave));
        }
    }
    while let Some(method_id) = open.pop() {
        locations.push(record(method_id, EventKind::Leave));
    }
    RawReport { locations }
}

fn viewer(reports: &[RawReport]) -> TraceViewer {
    let catalog = MethodCatalog::from_names(
        (1..=METHODS).map(|id| (id, format!("Void App.M{id}()"))),
    );
    TraceViewer::new(catalog, reports)
}

fn report_strategy() -> impl Strategy<Value = RawReport> {
    prop::collection::vec((1..=METHODS, any::<bool>()), 1..40).prop_map(|c| balanced_report(&c))
}

proptest! {
    /// Property: set_position succeeds exactly for in-range pairs
    #[test]
    fn set_position__any_pair__then_succeeds_iff_in_range(
        reports in prop::collection::vec(report_strategy(), 1..4),
        report in 0usize..6,
        position in 0usize..90,
    ) {
        let mut viewer = viewer(&reports);
        let in_range = viewer.report(report).is_some_and(|r| position < r.len());

        let before = viewer.cursor();
        let outcome = viewer.set_position(report, position);

        prop_assert_eq!(outcome.is_ok(), in_range);
        if !in_range {
            prop_assert_eq!(viewer.cursor(), before);
        }
    }

    /// Property: stepping forward visits every position once, then reports the end
    #[test]
    fn step_forward__until_failure__then_every_position_visited(report in report_strategy()) {
        let mut viewer = viewer(std::slice::from_ref(&report));
        let mut visited = vec![viewer.cursor().position];

        let err = loop {
            match viewer.step_forward() {
                Ok(()) => visited.push(viewer.cursor().position),
                Err(err) => break err,
            }
        };

        prop_assert_eq!(visited, (0..viewer.current_report().len()).collect::<Vec<_>>());
        prop_assert_eq!(err, ExplorerError::NoFurtherMovement(Boundary::End));
    }

    /// Property: enter and matching leave share a depth in well-nested reports
    #[test]
    fn reconstruct__balanced_report__then_ends_at_depth_one(report in report_strategy()) {
        let viewer = viewer(std::slice::from_ref(&report));
        let locations = viewer.current_report();

        prop_assert!(locations.iter().all(|l| l.stack_depth >= 1));
        prop_assert_eq!(locations.first().map(|l| l.stack_depth), Some(1));
        prop_assert_eq!(locations.last().map(|l| l.stack_depth), Some(1));
    }

    /// Property: step_out lands shallower, a following step_back_out lands
    /// before that point, and a failed step_out leaves the cursor in place
    #[test]
    fn step_out__then_step_back_out__then_lands_shallower_then_earlier(
        report in report_strategy(),
        start in 0usize..80,
    ) {
        let mut viewer = viewer(std::slice::from_ref(&report));
        let start = start % viewer.current_report().len();
        viewer.set_position(0, start).unwrap();
        let depth = viewer.current_location().unwrap().stack_depth;

        if viewer.step_out().is_ok() {
            let landed = viewer.cursor();
            prop_assert!(viewer.current_location().unwrap().stack_depth < depth);
            if viewer.step_back_out().is_ok() {
                prop_assert!(viewer.cursor().position < landed.position);
            }
        } else {
            prop_assert_eq!(viewer.cursor().position, start);
        }
    }

    /// Property: step_over never stops deeper than where it started
    #[test]
    fn step_over__any_position__then_lands_no_deeper(
        report in report_strategy(),
        start in 0usize..80,
    ) {
        let mut viewer = viewer(std::slice::from_ref(&report));
        let start = start % viewer.current_report().len();
        viewer.set_position(0, start).unwrap();
        let depth = viewer.current_location().unwrap().stack_depth;

        match viewer.step_over() {
            Ok(()) => {
                prop_assert!(viewer.cursor().position > start);
                prop_assert!(viewer.current_location().unwrap().stack_depth <= depth);
            }
            Err(_) => prop_assert_eq!(viewer.cursor().position, start),
        }
    }

    /// Property: find_next from the start visits exactly the indexed matches of the report
    #[test]
    fn find_next_match__from_start__then_visits_indexed_positions(
        reports in prop::collection::vec(report_strategy(), 1..3),
        method_id in 1..=METHODS,
    ) {
        let mut viewer = viewer(&reports);
        let mut engine = SearchEngine::default();
        let expected: Vec<usize> = engine
            .search(&viewer, method_id)
            .unwrap()
            .positions(0)
            .map(|p| p.iter().copied().filter(|&p| p > 0).collect())
            .unwrap_or_default();

        let mut visited = Vec::new();
        while engine.find_next_match(&mut viewer).is_ok() {
            visited.push(viewer.cursor().position);
        }

        prop_assert_eq!(visited, expected);
        prop_assert_eq!(viewer.cursor().report, 0);
    }
}
