// src/agents/oracle_agent.rs
// Illustrative oracle agent: periodically publishes a market-data tick for a
// symbol. It never touches the order book directly; anyone interested
// (traders, dashboards) subscribes to its topic.

use tracing::trace;

use crate::agent::{Agent, AgentError, Scheduler};
use crate::broker::Topic;
use crate::messages::{AgentId, MarketDataPayload, Message, Payload, Time};

/// Topic an oracle publishes ticks on for `symbol`.
pub fn oracle_topic(symbol: &str) -> Topic {
    Topic::new(format!("oracle.{symbol}"))
}

pub struct OracleAgent {
    id: AgentId,
    name: String,
    symbol: String,
    interval_ms: Time,
    tick: u64,
    base_price: i64,
}

impl OracleAgent {
    pub fn new(id: AgentId, name: impl Into<String>, symbol: impl Into<String>, base_price: i64, interval_ms: Time) -> Self {
        Self { id, name: name.into(), symbol: symbol.into(), interval_ms, tick: 0, base_price }
    }
}

impl Agent for OracleAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn on_start(&mut self, sched: &mut dyn Scheduler) -> Result<(), AgentError> {
        let now = sched.now();
        sched.schedule_wakeup(self.id, now)?;
        Ok(())
    }

    fn wakeup(&mut self, sched: &mut dyn Scheduler, now: Time) -> Result<(), AgentError> {
        self.tick += 1;
        // Deterministic drift: no randomness, the oracle is a reference feed.
        let price = self.base_price + (self.tick as i64) * 10;
        trace!(oracle = %self.name, symbol = %self.symbol, price, now, "tick");

        let payload = Payload::MarketData(MarketDataPayload { symbol: self.symbol.clone(), text: format!("price={price}") });
        let message = Message::new(self.id, payload, now);
        sched.schedule_send(self.id, oracle_topic(&self.symbol), message, now)?;

        sched.schedule_wakeup(self.id, now + self.interval_ms)?;
        Ok(())
    }
}
