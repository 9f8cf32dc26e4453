//! Trace file reader
//!
//! Reads a decoded coverage trace document:
//!
//! ```json
//! {
//!   "methods": { "<id>": { "module_path": "...", "method_token": 100663297 } },
//!   "reports": [ { "locations": [ { "thread_id": 1, "method_id": 1, "offset": 0,
//!                                   "kind": "Enter", "timestamp_micros": 0 } ] } ],
//!   "symbols": [ { "module_path": "...", "method_token": 100663297,
//!                  "return_type": "Void", "declaring_type": "App.Program",
//!                  "name": "Main", "parameters": ["args"] } ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use serde::Deserialize;
use tracing::debug;

use super::error::{LoadError, LoadResult};
use super::resolver::{SymbolInfo, SymbolTableResolver};
use super::types::{CoverageTrace, MethodId, RawMethodInfo, RawReport};

#[derive(Debug, Deserialize)]
struct TraceDocument {
    #[serde(default)]
    methods: BTreeMap<MethodId, RawMethodInfo>,
    #[serde(default)]
    reports: Vec<RawReport>,
    #[serde(default)]
    symbols: Vec<SymbolInfo>,
}

/// A decoded trace together with the symbols shipped next to it
#[derive(Debug)]
pub struct TraceFile {
    pub trace: CoverageTrace,
    pub resolver: SymbolTableResolver,
}

impl TraceFile {
    /// Open and memory-map a trace file
    pub fn open(path: &Path) -> LoadResult<Self> {
        let file = File::open(path).map_err(|err| LoadError::io(path, err))?;
        let len = file
            .metadata()
            .map_err(|err| LoadError::io(path, err))?
            .len();
        if len == 0 {
            return Err(LoadError::decode(format!(
                "trace file is empty: {}",
                path.display()
            )));
        }

        // SAFETY: the mapping is read-only and dropped before this function returns;
        // the trace file is not expected to be modified while being loaded.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|err| LoadError::io(path, err))?;

        debug!(path = %path.display(), bytes = mmap.len(), "mapped trace file");
        Self::from_slice(&mmap)
    }

    /// Decode a trace document from bytes
    pub fn from_slice(bytes: &[u8]) -> LoadResult<Self> {
        let document: TraceDocument = serde_json::from_slice(bytes)?;

        Ok(TraceFile {
            trace: CoverageTrace {
                methods: document.methods,
                reports: document.reports,
            },
            resolver: SymbolTableResolver::new(document.symbols),
        })
    }
}
