use crate::page::PageInfo;
use rustc_hash::FxHashMap;

/// Counters collected while walking a dump
#[derive(Debug, Default)]
pub struct DumpStats {
    pages: u64,
    redirects: u64,
    revisions: u64,
    pages_without_revisions: u64,
    namespaces: FxHashMap<i32, u64>,
}

impl DumpStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&mut self, info: &PageInfo, revisions: u64) {
        self.pages += 1;
        self.revisions += revisions;
        if info.redirect.is_some() {
            self.redirects += 1;
        }
        if revisions == 0 {
            self.pages_without_revisions += 1;
        }
        if let Some(ns) = info.namespace {
            *self.namespaces.entry(ns).or_insert(0) += 1;
        }
    }

    pub fn pages(&self) -> u64 {
        self.pages
    }

    pub fn redirects(&self) -> u64 {
        self.redirects
    }

    pub fn revisions(&self) -> u64 {
        self.revisions
    }

    pub fn pages_without_revisions(&self) -> u64 {
        self.pages_without_revisions
    }

    /// Page counts per namespace, sorted by namespace id
    pub fn namespaces(&self) -> Vec<(i32, u64)> {
        let mut counts: Vec<_> = self.namespaces.iter().map(|(k, v)| (*k, *v)).collect();
        counts.sort_unstable();
        counts
    }
}
