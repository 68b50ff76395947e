use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Index of a consumer worker, `0..worker_count`
pub type WorkerIndex = usize;

/// Ordered set of tracked tickers
///
/// Tickers are lower-cased on insert; a repeated ticker keeps its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SymbolSet {
    symbols: Vec<String>,
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ticker, returning false if it was already tracked
    pub fn insert(&mut self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_lowercase();
        if symbol.is_empty() || self.symbols.contains(&symbol) {
            return false;
        }
        self.symbols.push(symbol);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.symbols
    }

    pub fn into_vec(self) -> Vec<String> {
        self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SymbolSet::new();
        let mut seen = HashSet::new();
        for symbol in iter {
            let normalized = symbol.as_ref().trim().to_lowercase();
            if !normalized.is_empty() && seen.insert(normalized.clone()) {
                set.symbols.push(normalized);
            }
        }
        set
    }
}

impl From<Vec<String>> for SymbolSet {
    fn from(symbols: Vec<String>) -> Self {
        symbols.into_iter().collect()
    }
}

impl From<SymbolSet> for Vec<String> {
    fn from(set: SymbolSet) -> Self {
        set.symbols
    }
}

/// Symbol placement for one session
///
/// Built once by the partitioner. Every symbol maps to exactly one worker, and the
/// inverse map only has keys for workers that received at least one symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    by_symbol: HashMap<String, WorkerIndex>,
    by_worker: BTreeMap<WorkerIndex, Vec<String>>,
    worker_count: usize,
}

impl Assignment {
    pub(crate) fn with_worker_count(worker_count: usize) -> Self {
        Self { worker_count, ..Default::default() }
    }

    pub(crate) fn place(&mut self, symbol: String, worker: WorkerIndex) {
        self.by_worker.entry(worker).or_default().push(symbol.clone());
        self.by_symbol.insert(symbol, worker);
    }

    pub fn worker_for(&self, symbol: &str) -> Option<WorkerIndex> {
        self.by_symbol.get(symbol).copied()
    }

    /// Symbols owned by `worker`, in placement order
    pub fn symbols_for(&self, worker: WorkerIndex) -> &[String] {
        self.by_worker.get(&worker).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_symbol(&self) -> &HashMap<String, WorkerIndex> {
        &self.by_symbol
    }

    pub fn by_worker(&self) -> &BTreeMap<WorkerIndex, Vec<String>> {
        &self.by_worker
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}
