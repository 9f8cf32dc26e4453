//! Decoded coverage trace records
//!
//! These mirror what the profiler hands over after decoding; nothing here is
//! aware of call-stack depth or cursors.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Profiler-assigned method identifier
pub type MethodId = i32;

/// Instrumentation event kinds, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    EnterMain,
    Enter,
    LeaveMain,
    Leave,
    BranchHit,
    Call,
    Tailcall,
    TrackCoverage,
    StsfldHit,
    ThrowLeave,
}

impl EventKind {
    /// All kinds indexed by their wire code
    pub const ALL: [EventKind; 10] = [
        EventKind::EnterMain,
        EventKind::Enter,
        EventKind::LeaveMain,
        EventKind::Leave,
        EventKind::BranchHit,
        EventKind::Call,
        EventKind::Tailcall,
        EventKind::TrackCoverage,
        EventKind::StsfldHit,
        EventKind::ThrowLeave,
    ];

    pub fn is_enter(self) -> bool {
        matches!(self, EventKind::EnterMain | EventKind::Enter)
    }

    pub fn is_leave(self) -> bool {
        matches!(
            self,
            EventKind::Leave | EventKind::LeaveMain | EventKind::ThrowLeave
        )
    }

    /// Only call-stack transitions are steppable
    pub fn is_navigable(self) -> bool {
        self.is_enter() || self.is_leave()
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::EnterMain => "EnterMain",
            EventKind::Enter => "Enter",
            EventKind::LeaveMain => "LeaveMain",
            EventKind::Leave => "Leave",
            EventKind::BranchHit => "BranchHit",
            EventKind::Call => "Call",
            EventKind::Tailcall => "Tailcall",
            EventKind::TrackCoverage => "TrackCoverage",
            EventKind::StsfldHit => "StsfldHit",
            EventKind::ThrowLeave => "ThrowLeave",
        }
    }
}

impl TryFrom<u8> for EventKind {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        EventKind::ALL.get(code as usize).copied().ok_or(code)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The profiler writes the numeric code; hand-written traces use names.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(u8),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Code(code) => EventKind::try_from(code)
                .map_err(|code| D::Error::custom(format!("unknown event kind code {code}"))),
            Repr::Name(name) => EventKind::ALL
                .iter()
                .copied()
                .find(|kind| kind.name().eq_ignore_ascii_case(&name))
                .ok_or_else(|| D::Error::custom(format!("unknown event kind '{name}'"))),
        }
    }
}

/// One recorded instrumentation point, in capture order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLocationRecord {
    pub thread_id: u64,
    pub method_id: MethodId,
    pub offset: u32,
    pub kind: EventKind,
    pub timestamp_micros: i64,
}

/// Where a method's metadata lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMethodInfo {
    pub module_path: String,
    pub method_token: u32,
}

/// One complete recorded execution (e.g. one test run)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReport {
    #[serde(default)]
    pub locations: Vec<RawLocationRecord>,
}

/// Decoded trace: method table plus one or more reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageTrace {
    #[serde(default)]
    pub methods: BTreeMap<MethodId, RawMethodInfo>,
    #[serde(default)]
    pub reports: Vec<RawReport>,
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn event_kind__predicates__then_partition_kinds() {
        let enters: Vec<_> = EventKind::ALL.iter().filter(|k| k.is_enter()).collect();
        let leaves: Vec<_> = EventKind::ALL.iter().filter(|k| k.is_leave()).collect();

        assert_eq!(enters, [&EventKind::EnterMain, &EventKind::Enter]);
        assert_eq!(
            leaves,
            [&EventKind::LeaveMain, &EventKind::Leave, &EventKind::ThrowLeave]
        );
        assert!(!EventKind::BranchHit.is_navigable());
        assert!(!EventKind::Tailcall.is_navigable());
        assert!(EventKind::ThrowLeave.is_navigable());
    }

    #[test]
    fn event_kind__try_from_code__then_wire_order() {
        assert_eq!(EventKind::try_from(0), Ok(EventKind::EnterMain));
        assert_eq!(EventKind::try_from(9), Ok(EventKind::ThrowLeave));
        assert_eq!(EventKind::try_from(10), Err(10));
    }

    #[test]
    fn event_kind__deserialize_code_or_name__then_same_kind() {
        let from_code: EventKind = serde_json::from_str("3").unwrap();
        let from_name: EventKind = serde_json::from_str("\"leave\"").unwrap();
        assert_eq!(from_code, EventKind::Leave);
        assert_eq!(from_name, EventKind::Leave);
    }

    #[test]
    fn event_kind__deserialize_unknown__then_error() {
        let err = serde_json::from_str::<EventKind>("42").unwrap_err();
        assert!(err.to_string().contains("unknown event kind code 42"));

        let err = serde_json::from_str::<EventKind>("\"Jump\"").unwrap_err();
        assert!(err.to_string().contains("unknown event kind 'Jump'"));
    }

    #[test]
    fn coverage_trace__integer_method_keys__then_parsed() {
        let json = r#"{
            "methods": {"7": {"module_path": "/app/Lib.dll", "method_token": 100663297}},
            "reports": [{"locations": [
                {"thread_id": 1, "method_id": 7, "offset": 0, "kind": 1, "timestamp_micros": 10}
            ]}]
        }"#;

        let trace: CoverageTrace = serde_json::from_str(json).unwrap();
        assert_eq!(trace.methods[&7].method_token, 100663297);
        assert_eq!(trace.reports[0].locations[0].kind, EventKind::Enter);
    }
}
