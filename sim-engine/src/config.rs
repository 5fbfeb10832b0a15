// src/config.rs
// Run parameters that are not part of the core algorithms but are needed to
// run a reproducible simulation. Deserializable from TOML so a driver can
// load `sim.toml`; `SimConfig::default()` is enough to run the bundled demo
// and every test without any file on disk.

use serde::{Deserialize, Serialize};

use orderbook::{Price, SelfTradePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfTradePolicyConfig {
    Allow,
    CancelOldest,
    CancelNewest,
    DecrementBoth,
}

impl From<SelfTradePolicyConfig> for SelfTradePolicy {
    fn from(value: SelfTradePolicyConfig) -> Self {
        match value {
            SelfTradePolicyConfig::Allow => SelfTradePolicy::Allow,
            SelfTradePolicyConfig::CancelOldest => SelfTradePolicy::CancelOldest,
            SelfTradePolicyConfig::CancelNewest => SelfTradePolicy::CancelNewest,
            SelfTradePolicyConfig::DecrementBoth => SelfTradePolicy::DecrementBoth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolConfig {
    pub symbol: String,
    /// Limit price a market order is modeled at: `+market_price_bound` for a
    /// buy, `-market_price_bound` clamped to 1 for a sell (see
    /// `SimConfig::market_order_price`).
    pub market_price_bound: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    pub self_trade_policy: SelfTradePolicyConfig,
    pub symbols: Vec<SymbolConfig>,
    pub log_filter: String,
}

impl SimConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn market_order_price(&self, symbol: &str, side: orderbook::Side) -> Price {
        let bound = self
            .symbols
            .iter()
            .find(|s| s.symbol == symbol)
            .map(|s| s.market_price_bound)
            .unwrap_or(i64::MAX / 2);
        match side {
            orderbook::Side::Bid => bound,
            orderbook::Side::Ask => 1,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            self_trade_policy: SelfTradePolicyConfig::Allow,
            symbols: vec![SymbolConfig { symbol: "DEMO".to_string(), market_price_bound: 1_000_000 }],
            log_filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let cfg = SimConfig::default();
        let serialized = toml::to_string(&cfg).unwrap();
        let parsed = SimConfig::from_toml_str(&serialized).unwrap();
        assert_eq!(cfg, parsed);
    }

    #[test]
    fn market_order_price_uses_configured_bound() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.market_order_price("DEMO", orderbook::Side::Bid), 1_000_000);
        assert_eq!(cfg.market_order_price("DEMO", orderbook::Side::Ask), 1);
    }
}
