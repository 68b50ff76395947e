// SymbolCoordinator - consumer pool sizing and symbol placement

mod error;
mod placement;
mod random;
mod sizing;
mod types;

pub use error::CoordError;
pub use placement::{partition, HashBasedPolicy, PlacementPolicy};
pub use random::{OsRandom, RandomSource, ScriptedRandom};
pub use sizing::{consumer_count, HostProbe, LoadAverage, PoolSizing, SystemProbe};
pub use types::{Assignment, SymbolSet, WorkerIndex};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_set_normalizes_and_dedups() {
        let set: SymbolSet = ["AAPL", "msft", "aapl", " Tsla ", "MSFT"].into_iter().collect();
        assert_eq!(set.as_slice(), ["aapl", "msft", "tsla"]);
    }

    #[test]
    fn test_symbol_set_insert() {
        let mut set = SymbolSet::new();
        assert!(set.insert("NVDA"));
        assert!(!set.insert("nvda"));
        assert!(!set.insert("  "));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_deserialized_set_is_normalized() {
        let set: SymbolSet = serde_json::from_str(r#"["AAPL", "aapl", " msft "]"#).unwrap();
        assert_eq!(set.as_slice(), ["aapl", "msft"]);

        let mut rng = ScriptedRandom::new(vec![0, 1]);
        let assignment = partition(&set, 2, &mut rng).unwrap();
        let placed: usize = assignment.by_worker().values().map(Vec::len).sum();
        assert_eq!(placed, assignment.len());
        assert_eq!(assignment.len(), set.len());
    }

    #[test]
    fn test_symbol_set_serializes_as_list() {
        let set: SymbolSet = ["TSLA", "nvda"].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["tsla","nvda"]"#);
    }

    #[test]
    fn test_sized_pool_feeds_partitioner() {
        let sizing = PoolSizing { fixed_consumer_count: 2, load_factor: 1.0 };
        let workers = consumer_count(&sizing, &HostProbe).unwrap();

        let symbols: SymbolSet = ["aapl", "msft", "tsla"].into_iter().collect();
        let assignment = partition(&symbols, workers, &mut OsRandom).unwrap();

        assert_eq!(assignment.len(), 3);
        assert!(assignment.by_symbol().values().all(|worker| *worker < 2));
    }
}
