//! Run fingerprinting: deterministic identification of inputs.
//!
//! Two runs with the same dataset hash and config hash produce identical
//! analyses; the hashes are what a cache or report keys on.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::domain::Bar;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunFingerprint {
    pub dataset_hash: String,
    pub config_hash: String,
}

impl RunFingerprint {
    pub fn new(bars: &[Bar], config: &AnalysisConfig) -> Self {
        Self {
            dataset_hash: dataset_hash(bars),
            config_hash: config_hash(config),
        }
    }
}

/// BLAKE3 over timestamps and all OHLCV values, in series order.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(&bar.timestamp.and_utc().timestamp().to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// BLAKE3 over the JSON form of the configuration.
///
/// Struct fields serialize in declaration order, so equal configs hash equally.
pub fn config_hash(config: &AnalysisConfig) -> String {
    // Only numbers, a Vec and a unit enum: serialization cannot fail.
    let json = serde_json::to_vec(config).unwrap_or_default();
    blake3::hash(&json).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;
    use crate::signals::ReferencePriceMode;

    #[test]
    fn hashes_are_deterministic() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let config = AnalysisConfig::default();
        assert_eq!(
            RunFingerprint::new(&bars, &config),
            RunFingerprint::new(&bars, &config)
        );
        assert_eq!(dataset_hash(&bars).len(), 64);
        assert_eq!(config_hash(&config).len(), 64);
        assert_eq!(config_hash(&config), config_hash(&config.clone()));
    }

    #[test]
    fn dataset_hash_sees_price_changes() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let mut other = bars.clone();
        other[1].close = 11.5;
        assert_ne!(dataset_hash(&bars), dataset_hash(&other));
    }

    #[test]
    fn config_hash_sees_parameter_changes() {
        let base = AnalysisConfig::default();
        let mut changed = base.clone();
        changed.strategy.reference_price_mode = ReferencePriceMode::Close;
        assert_ne!(config_hash(&base), config_hash(&changed));

        let mut changed = base.clone();
        changed.backtest.initial_capital = 1.0;
        assert_ne!(config_hash(&base), config_hash(&changed));

        let mut changed = base.clone();
        changed.strategy.ma_windows.push(200);
        assert_ne!(config_hash(&base), config_hash(&changed));
    }
}
