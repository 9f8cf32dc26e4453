//! Method metadata resolution
//!
//! Turns a `(module, token)` pair into a printable signature. Loading the
//! owning module can fail; callers decide whether that is fatal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::RawMethodInfo;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("module could not be loaded: {0}")]
    ModuleUnavailable(String),
    #[error("token 0x{token:08x} not present in module {module}")]
    UnknownToken { module: String, token: u32 },
}

/// Resolved method signature
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodSignature {
    #[serde(default)]
    pub return_type: String,
    pub declaring_type: String,
    pub name: String,
    /// Parameter names; `None` when the metadata carries no name
    #[serde(default)]
    pub parameters: Vec<Option<String>>,
}

impl MethodSignature {
    /// `"<ret> <Type>.<Name>(<params>)"`, without the return type when it is empty
    pub fn display_name(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| p.as_deref().unwrap_or("???"))
            .collect::<Vec<_>>()
            .join(", ");
        let qualified = format!("{}.{}({})", self.declaring_type, self.name, params);
        if self.return_type.is_empty() {
            qualified
        } else {
            format!("{} {}", self.return_type, qualified)
        }
    }
}

/// Resolves method metadata for the catalog
pub trait MethodResolver {
    fn resolve(&self, info: &RawMethodInfo) -> Result<MethodSignature, ResolveError>;
}

/// Symbol entry as stored alongside a decoded trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub module_path: String,
    pub method_token: u32,
    #[serde(flatten)]
    pub signature: MethodSignature,
}

/// Resolver backed by a pre-extracted symbol table.
///
/// A module with no symbols at all is treated as one that failed to load.
#[derive(Debug, Clone, Default)]
pub struct SymbolTableResolver {
    modules: HashMap<String, HashMap<u32, MethodSignature>>,
}

impl SymbolTableResolver {
    pub fn new(symbols: impl IntoIterator<Item = SymbolInfo>) -> Self {
        let mut modules: HashMap<String, HashMap<u32, MethodSignature>> = HashMap::new();
        for symbol in symbols {
            modules
                .entry(symbol.module_path)
                .or_default()
                .insert(symbol.method_token, symbol.signature);
        }
        Self { modules }
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

impl MethodResolver for SymbolTableResolver {
    fn resolve(&self, info: &RawMethodInfo) -> Result<MethodSignature, ResolveError> {
        let module = self
            .modules
            .get(&info.module_path)
            .ok_or_else(|| ResolveError::ModuleUnavailable(info.module_path.clone()))?;

        module
            .get(&info.method_token)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownToken {
                module: info.module_path.clone(),
                token: info.method_token,
            })
    }
}
