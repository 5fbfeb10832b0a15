// src/scenarios/simple_demo.rs
// One exchange, one oracle, one trader, on a single symbol.

use orderbook::SelfTradePolicy;

use crate::agents::exchange_agent::ExchangeAgent;
use crate::agents::oracle_agent::OracleAgent;
use crate::agents::trader_agent::TraderAgent;
use crate::config::SimConfig;
use crate::kernel::{KernelError, RunSummary};
use crate::sim_engine::SimEngine;

/// Runs a small demo simulation for `until_ms` virtual milliseconds and
/// returns the kernel's run summary.
pub fn run(until_ms: u64) -> Result<RunSummary, KernelError> {
    let symbol = "DEMO".to_string();

    let exchange_id: u32 = 1;
    let oracle_id: u32 = 2;
    let trader_id: u32 = 3;

    let mut engine = SimEngine::new(SimConfig::default());

    engine
        .kernel
        .register_agent(Box::new(ExchangeAgent::with_policy(exchange_id, "exchange", [symbol.clone()], SelfTradePolicy::Allow)))?;
    engine.kernel.register_agent(Box::new(OracleAgent::new(oracle_id, "oracle", symbol.clone(), 10_000, 1_000)))?;
    engine
        .kernel
        .register_agent(Box::new(TraderAgent::new(trader_id, "trader-1", exchange_id, symbol.clone(), 42, 250)))?;

    engine.kernel.run(Some(until_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_to_completion() {
        let summary = run(5_000).expect("demo scenario should run cleanly");
        assert!(summary.events_processed > 0);
        assert!(summary.messages_delivered > 0);
    }
}
