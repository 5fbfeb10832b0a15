// src/latency.rs
// Optional helper for agents that want to compute a delivery time from a
// simulated network + compute delay before calling `schedule_send` /
// `schedule_deliver`. The kernel itself is latency-agnostic: its contract
// takes an explicit `at`, computed however the caller likes.

use crate::messages::{AgentId, Time};

/// Latency model for simulated network + compute delays, in virtual-time
/// milliseconds.
pub trait LatencyModel {
    /// Network delay for a message travelling from `from` to `to`.
    fn delay_ms(&self, from: AgentId, to: AgentId) -> Time;

    /// Optional compute time on the receiver side.
    fn compute_ms(&self, _agent_id: AgentId) -> Time {
        0
    }
}

/// Fixed network and compute delay for every message, regardless of sender
/// or recipient.
pub struct FixedLatency {
    network_delay_ms: Time,
    compute_delay_ms: Time,
}

impl FixedLatency {
    pub fn new(network_delay_ms: Time, compute_delay_ms: Time) -> Self {
        Self { network_delay_ms, compute_delay_ms }
    }
}

impl LatencyModel for FixedLatency {
    fn delay_ms(&self, _from: AgentId, _to: AgentId) -> Time {
        self.network_delay_ms
    }

    fn compute_ms(&self, _agent_id: AgentId) -> Time {
        self.compute_delay_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_latency_ignores_endpoints() {
        let model = FixedLatency::new(5, 2);
        assert_eq!(model.delay_ms(1, 2), 5);
        assert_eq!(model.delay_ms(7, 9), 5);
        assert_eq!(model.compute_ms(1), 2);
    }
}
