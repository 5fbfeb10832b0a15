//! Publish/subscribe routing table. The broker answers "who subscribes to
//! this topic?"; it never stores messages itself, and never touches virtual
//! time — that is the kernel's job.

use std::collections::BTreeMap;

use crate::messages::AgentId;

/// An opaque routing label, e.g. `md.ETH-USD.trades`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(String);

impl Topic {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Topic::new(s)
    }
}

impl From<String> for Topic {
    fn from(s: String) -> Self {
        Topic::new(s)
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pure routing table: `Topic -> subscribers, in subscription-registration
/// order`. That order is part of the contract: it determines the `seq`
/// assigned to each synthesized `Deliver` event in the kernel's publish
/// fan-out, hence delivery order within a timestamp.
#[derive(Default)]
pub struct Broker {
    subscribers: BTreeMap<Topic, Vec<AgentId>>,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: subscribing the same agent to the same topic twice is a
    /// no-op, it does not duplicate the agent in the subscriber list.
    pub fn subscribe(&mut self, agent: AgentId, topic: Topic) {
        let subs = self.subscribers.entry(topic).or_default();
        if !subs.contains(&agent) {
            subs.push(agent);
        }
    }

    /// No-op if the pairing is absent.
    pub fn unsubscribe(&mut self, agent: AgentId, topic: &Topic) {
        if let Some(subs) = self.subscribers.get_mut(topic) {
            subs.retain(|&a| a != agent);
        }
    }

    /// Subscribers of `topic` in subscription-registration (insertion) order.
    pub fn subscribers(&self, topic: &Topic) -> &[AgentId] {
        self.subscribers.get(topic).map(|v| v.as_slice()).unwrap_or(&[])
    }
}
