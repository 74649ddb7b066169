use crate::hierarchy::{build_hierarchy, HierarchyResult};
use crate::inference::CategoryInference;
use core_types::Record;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Content fingerprint of a record set, in input order.
///
/// Only the fields the hierarchy reads are included. Two inputs that differ
/// elsewhere share a fingerprint.
pub fn fingerprint(records: &[Record]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "{}-{}-{}-{}",
                r.name, r.sub_industry_raw, r.product_service_type_raw, r.total_funding_usd
            )
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Single-slot memo for `build_hierarchy`.
///
/// Only the most recent result is kept. An instance is meant to be used with a
/// single rule table: the fingerprint does not cover the rules.
#[derive(Debug, Default)]
pub struct HierarchyCache {
    slot: Option<(String, Arc<HierarchyResult>)>,
    hits: u64,
    misses: u64,
}

impl HierarchyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        records: &[Record],
        inference: &CategoryInference,
    ) -> Arc<HierarchyResult> {
        let key = fingerprint(records);
        if let Some((cached_key, result)) = &self.slot {
            if *cached_key == key {
                self.hits += 1;
                debug!(records = records.len(), "Hierarchy cache hit");
                return Arc::clone(result);
            }
        }

        self.misses += 1;
        debug!(records = records.len(), "Hierarchy cache miss, rebuilding");
        let result = Arc::new(build_hierarchy(records, inference));
        self.slot = Some((key, Arc::clone(&result)));
        result
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// A `HierarchyCache` that can be shared between threads. The lookup and the
/// replacement happen under one lock.
#[derive(Debug, Default)]
pub struct SharedHierarchyCache {
    inner: Mutex<HierarchyCache>,
}

impl SharedHierarchyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &self,
        records: &[Record],
        inference: &CategoryInference,
    ) -> Arc<HierarchyResult> {
        self.inner.lock().get_or_build(records, inference)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// `(hits, misses)` so far.
    pub fn stats(&self) -> (u64, u64) {
        let cache = self.inner.lock();
        (cache.hits(), cache.misses())
    }
}
