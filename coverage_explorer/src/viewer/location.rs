//! Navigable locations and call-stack depth reconstruction

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use super::catalog::MethodCatalog;
use crate::trace::{EventKind, MethodId, RawLocationRecord};

/// One navigable event, annotated with the call-stack depth at that event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerLocation {
    pub report_index: usize,
    pub position: usize,
    pub thread_id: u64,
    pub method_id: MethodId,
    pub offset: u32,
    pub kind: EventKind,
    pub timestamp_micros: i64,
    pub stack_depth: i32,
}

/// Build the navigable sequence of one report.
///
/// Non call-stack events and events of methods missing from the catalog are
/// dropped. An enter event carries the depth after entering, a leave event the
/// depth before leaving, so both halves of a call share the same value. The
/// counter starts at zero and may go negative when a report opens mid-call.
pub fn reconstruct_report(
    report_index: usize,
    records: &[RawLocationRecord],
    catalog: &MethodCatalog,
) -> Vec<ViewerLocation> {
    let mut depth = 0i32;

    let locations: Vec<ViewerLocation> = records
        .iter()
        .filter(|record| record.kind.is_navigable() && catalog.contains(record.method_id))
        .enumerate()
        .map(|(position, record)| {
            if record.kind.is_enter() {
                depth += 1;
            }
            let location = ViewerLocation {
                report_index,
                position,
                thread_id: record.thread_id,
                method_id: record.method_id,
                offset: record.offset,
                kind: record.kind,
                timestamp_micros: record.timestamp_micros,
                stack_depth: depth,
            };
            if record.kind.is_leave() {
                depth -= 1;
            }
            location
        })
        .collect();

    debug!(
        report_index,
        raw = records.len(),
        kept = locations.len(),
        "reconstructed report"
    );

    locations
}

/// A location paired with the catalog that names its method
#[derive(Clone, Copy)]
pub struct LocationView<'a> {
    pub location: &'a ViewerLocation,
    pub catalog: &'a MethodCatalog,
}

impl<'a> LocationView<'a> {
    pub fn method_name(&self) -> &'a str {
        self.catalog
            .name(self.location.method_id)
            .unwrap_or("<unknown>")
    }
}

impl fmt::Display for LocationView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self.location;
        if location.kind == EventKind::ThrowLeave {
            return f.write_str("### meta: left due to unhandled exception; ###");
        }

        writeln!(f, "{}", self.method_name())?;
        writeln!(
            f,
            "    Offset set on: {} as {}",
            location.offset, location.kind
        )?;
        writeln!(f, "    Stack position: {}", location.stack_depth)?;
        write!(f, "    At: {}", format_timestamp(location.timestamp_micros))
    }
}

/// ISO-8601 UTC rendering of microseconds since the Unix epoch; values
/// outside the representable calendar fall back to the raw count.
pub fn format_timestamp(micros: i64) -> String {
    match DateTime::<Utc>::from_timestamp_micros(micros) {
        Some(at) => at.to_rfc3339_opts(SecondsFormat::Micros, true),
        None => format!("{micros}us since epoch"),
    }
}
