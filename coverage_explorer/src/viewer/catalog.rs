//! Method catalog: method id to display name, built once at load time

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::trace::{
    LoadError, LoadResult, MethodId, MethodResolver, RawMethodInfo, ResolveError,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodCatalog {
    names: BTreeMap<MethodId, String>,
    ignored: BTreeSet<MethodId>,
}

impl MethodCatalog {
    /// Resolve every method of a trace.
    ///
    /// Methods whose module cannot be loaded land in the ignored set; any other
    /// resolution failure means the trace is inconsistent and aborts the load.
    pub fn build<R: MethodResolver + ?Sized>(
        methods: &BTreeMap<MethodId, RawMethodInfo>,
        resolver: &R,
    ) -> LoadResult<Self> {
        let mut catalog = MethodCatalog::default();

        for (&method_id, info) in methods {
            match resolver.resolve(info) {
                Ok(signature) => {
                    catalog.names.insert(method_id, signature.display_name());
                }
                Err(ResolveError::ModuleUnavailable(module)) => {
                    warn!(method_id, module = %module, "method ignored, module could not be loaded");
                    catalog.ignored.insert(method_id);
                }
                Err(source) => return Err(LoadError::Resolve { method_id, source }),
            }
        }

        Ok(catalog)
    }

    /// Catalog from already-resolved names
    pub fn from_names<S: Into<String>>(names: impl IntoIterator<Item = (MethodId, S)>) -> Self {
        Self {
            names: names.into_iter().map(|(id, name)| (id, name.into())).collect(),
            ignored: BTreeSet::new(),
        }
    }

    pub fn name(&self, method_id: MethodId) -> Option<&str> {
        self.names.get(&method_id).map(String::as_str)
    }

    pub fn contains(&self, method_id: MethodId) -> bool {
        self.names.contains_key(&method_id)
    }

    pub fn is_ignored(&self, method_id: MethodId) -> bool {
        self.ignored.contains(&method_id)
    }

    pub fn ignored(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.ignored.iter().copied()
    }

    /// Resolved entries in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (MethodId, &str)> {
        self.names.iter().map(|(&id, name)| (id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
