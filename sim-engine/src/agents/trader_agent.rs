// src/agents/trader_agent.rs
// Illustrative trader agent: wakes up periodically and submits a random
// limit order around the last known top-of-book. Strategy logic is
// deliberately trivial; this exists to exercise the exchange end to end, not
// to model a realistic trader.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use orderbook::{Price, Qty, Side};

use crate::agent::{Agent, AgentError, Scheduler};
use crate::agents::exchange_agent::book_topic;
use crate::messages::{AgentId, CancelOrderPayload, Message, Payload, SubmitOrderPayload, Time};

pub struct TraderAgent {
    id: AgentId,
    name: String,
    exchange_id: AgentId,
    symbol: String,
    wake_interval_ms: Time,
    rng: ChaCha8Rng,
    client_tag_counter: u64,
    last_mid: Price,
}

impl TraderAgent {
    /// `seed` makes this agent's order flow reproducible across runs: never
    /// seed from `rand::thread_rng()` here, determinism depends on it.
    pub fn new(id: AgentId, name: impl Into<String>, exchange_id: AgentId, symbol: impl Into<String>, seed: u64, wake_interval_ms: Time) -> Self {
        Self {
            id,
            name: name.into(),
            exchange_id,
            symbol: symbol.into(),
            wake_interval_ms,
            rng: ChaCha8Rng::seed_from_u64(seed),
            client_tag_counter: 0,
            last_mid: 100,
        }
    }

    fn next_client_tag(&mut self) -> u64 {
        self.client_tag_counter += 1;
        self.client_tag_counter
    }
}

impl Agent for TraderAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn on_start(&mut self, sched: &mut dyn Scheduler) -> Result<(), AgentError> {
        sched.subscribe(self.id, book_topic(&self.symbol));
        let now = sched.now();
        sched.schedule_wakeup(self.id, now)?;
        Ok(())
    }

    fn wakeup(&mut self, sched: &mut dyn Scheduler, now: Time) -> Result<(), AgentError> {
        let side = if self.rng.gen_bool(0.5) { Side::Bid } else { Side::Ask };
        let offset: i64 = self.rng.gen_range(-5..=5);
        let price: Price = (self.last_mid + offset).max(1);
        let quantity: Qty = self.rng.gen_range(1..=10);

        let payload = SubmitOrderPayload { symbol: self.symbol.clone(), side, price, quantity, client_tag: self.next_client_tag() };
        trace!(trader = %self.name, ?side, price, quantity, now, "submitting order");
        let message = Message::new(self.id, Payload::SubmitOrder(payload), now);
        sched.schedule_deliver(self.id, self.exchange_id, message, now)?;

        sched.schedule_wakeup(self.id, now + self.wake_interval_ms)?;
        Ok(())
    }

    fn receive(&mut self, _sched: &mut dyn Scheduler, message: &Message, now: Time) -> Result<(), AgentError> {
        match &message.payload {
            Payload::BookUpdate(update) => {
                if let (Some((bid, _)), Some((ask, _))) = (update.best_bid, update.best_ask) {
                    self.last_mid = (bid + ask) / 2;
                }
                trace!(trader = %self.name, now, "observed book update");
            }
            Payload::OrderRejected(r) => {
                trace!(trader = %self.name, client_tag = r.client_tag, reason = %r.reason, "order rejected");
            }
            _ => {}
        }
        Ok(())
    }
}

/// Helper for scenarios that want to cancel a resting order deterministically
/// without waiting on a wakeup.
pub fn cancel_message(sender: AgentId, order_id: orderbook::OrderId, now: Time) -> Message {
    Message::new(sender, Payload::CancelOrder(CancelOrderPayload { order_id }), now)
}
