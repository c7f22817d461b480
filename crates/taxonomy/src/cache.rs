//! Id resolution cache.
//!
//! Maps `(taxonomy code, node kind)` to the tree node it resolved to, so each
//! distinct code is searched for at most once per loaded tree. The cache only
//! grows; it is discarded together with the tree it was filled from.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::{NodeKind, TaxonomyCode, TaxonomyError, TreeNode};

/// Thread-safe `(code, kind)` to [`TreeNode`] map.
#[derive(Debug, Default)]
pub struct IdCache {
    entries: Mutex<HashMap<(TaxonomyCode, NodeKind), TreeNode>>,
}

impl IdCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached node for `code` and `kind`, if any.
    pub fn get(&self, code: TaxonomyCode, kind: NodeKind) -> Option<TreeNode> {
        self.lock().get(&(code, kind)).cloned()
    }

    /// Returns the cached node, or runs `resolve` and caches its result.
    ///
    /// The cache stays locked while `resolve` runs, so concurrent misses for
    /// the same key resolve once. Failures are not cached.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `resolve`.
    pub fn get_or_resolve<F>(
        &self,
        code: TaxonomyCode,
        kind: NodeKind,
        resolve: F,
    ) -> Result<TreeNode, TaxonomyError>
    where
        F: FnOnce() -> Result<TreeNode, TaxonomyError>,
    {
        let mut entries = self.lock();
        if let Some(node) = entries.get(&(code, kind)) {
            tracing::trace!(%code, %kind, id = %node.id, "Id cache hit");
            return Ok(node.clone());
        }
        let node = resolve()?;
        tracing::trace!(%code, %kind, id = %node.id, "Id cache miss resolved");
        entries.insert((code, kind), node.clone());
        Ok(node)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(TaxonomyCode, NodeKind), TreeNode>> {
        // Entries are inserted whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
