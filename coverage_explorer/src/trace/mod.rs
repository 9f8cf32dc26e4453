pub mod error;
pub mod reader;
pub mod resolver;
pub mod types;

pub use error::{LoadError, LoadResult};
pub use reader::TraceFile;
pub use resolver::{MethodResolver, MethodSignature, ResolveError, SymbolInfo, SymbolTableResolver};
pub use types::{CoverageTrace, EventKind, MethodId, RawLocationRecord, RawMethodInfo, RawReport};
