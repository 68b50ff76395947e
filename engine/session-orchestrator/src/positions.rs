//! Open positions used to seed the tracked symbols

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use symbol_coordinator::SymbolSet;
use tracing::info;

/// A position the account already holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub symbol: String,
}

impl OpenPosition {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into() }
    }
}

/// Source of currently open positions (broker, database, ...)
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn list_open_positions(&self) -> anyhow::Result<Vec<OpenPosition>>;
}

/// Fixed list of positions, loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticPositions {
    positions: Vec<OpenPosition>,
}

impl StaticPositions {
    pub fn new(positions: Vec<OpenPosition>) -> Self {
        Self { positions }
    }

    pub fn from_symbols<S: AsRef<str>>(symbols: impl IntoIterator<Item = S>) -> Self {
        Self::new(symbols.into_iter().map(|s| OpenPosition::new(s.as_ref())).collect())
    }
}

#[async_trait]
impl PositionSource for StaticPositions {
    async fn list_open_positions(&self) -> anyhow::Result<Vec<OpenPosition>> {
        Ok(self.positions.clone())
    }
}

/// Symbols to track from the start of the session
///
/// With `skip_existing` the position source is not consulted at all.
pub async fn seed_symbols(
    source: &dyn PositionSource,
    skip_existing: bool,
) -> anyhow::Result<SymbolSet> {
    if skip_existing {
        info!("Skipping existing positions, session starts with no tracked symbols");
        return Ok(SymbolSet::new());
    }

    let positions = source.list_open_positions().await?;
    let symbols: SymbolSet = positions.iter().map(|p| p.symbol.as_str()).collect();
    info!("Tracking {} symbols from {} open positions", symbols.len(), positions.len());
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    #[async_trait]
    impl PositionSource for Unreachable {
        async fn list_open_positions(&self) -> anyhow::Result<Vec<OpenPosition>> {
            anyhow::bail!("broker connection refused")
        }
    }

    #[tokio::test]
    async fn test_seed_from_positions() {
        let source = StaticPositions::from_symbols(["AAPL", "msft", "aapl"]);
        let symbols = seed_symbols(&source, false).await.unwrap();
        assert_eq!(symbols.as_slice(), ["aapl", "msft"]);
    }

    #[tokio::test]
    async fn test_skip_existing_ignores_source() {
        let symbols = seed_symbols(&Unreachable, true).await.unwrap();
        assert!(symbols.is_empty());
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let err = seed_symbols(&Unreachable, false).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
