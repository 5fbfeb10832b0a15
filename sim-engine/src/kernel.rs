// src/kernel.rs
// Deterministic event-scheduling kernel: virtual time, a priority queue of
// scheduled deliveries keyed by (time, seq), and dispatch into agents.
//
// Agents and the kernel hold each other cyclically in spirit but not in
// code: the kernel owns agents outright, and agents only ever see a
// `&mut dyn Scheduler` for the lifetime of one callback (see agent.rs).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::agent::{Agent, AgentError, Scheduler};
use crate::broker::{Broker, Topic};
use crate::messages::{AgentId, Message, Time};

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("cannot schedule at time {requested} when current time is already {current}")]
    InvalidTime { requested: Time, current: Time },

    #[error("agent {0} is not registered")]
    UnknownAgent(AgentId),

    #[error("register_agent called after run() has started")]
    KernelAlreadyRunning,

    #[error("agent {agent} failed at t={time} seq={seq}: {source}")]
    AgentFailure {
        agent: AgentId,
        time: Time,
        seq: u64,
        #[source]
        source: AgentError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub events_processed: u64,
    pub messages_delivered: u64,
    pub final_time: Time,
}

enum EventKind {
    Wakeup(AgentId),
    Deliver(AgentId, Message),
    Publish(Topic, Message),
}

struct ScheduledEvent {
    time: Time,
    seq: u64,
    kind: EventKind,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}
impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    /// `BinaryHeap` is a max-heap; reverse `(time, seq)` so the smallest key
    /// (earliest time, then smallest seq) is popped first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.time, other.seq).cmp(&(self.time, self.seq))
    }
}

/// Owns virtual time, the event queue, the broker, and every registered
/// agent. The sole source of dispatch order is the `(time, seq)` key: no
/// other ordering heuristic is permitted anywhere in this type.
pub struct Kernel {
    time: Time,
    next_seq: u64,
    queue: BinaryHeap<ScheduledEvent>,
    agents: Vec<Box<dyn Agent>>,
    broker: Broker,
    started: bool,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    pub fn new() -> Self {
        Self {
            time: 0,
            next_seq: 0,
            queue: BinaryHeap::new(),
            agents: Vec::new(),
            broker: Broker::new(),
            started: false,
        }
    }

    fn fresh_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn check_at(&self, at: Time) -> Result<(), KernelError> {
        if at < self.time {
            return Err(KernelError::InvalidTime { requested: at, current: self.time });
        }
        Ok(())
    }

    /// Attach a new agent, running its `on_start` hook immediately. May only
    /// be called before `run`.
    pub fn register_agent(&mut self, mut agent: Box<dyn Agent>) -> Result<AgentId, KernelError> {
        if self.started {
            return Err(KernelError::KernelAlreadyRunning);
        }
        let id = agent.id();
        info!(agent = id, name = agent.name(), "registering agent");
        agent
            .on_start(self)
            .map_err(|source| KernelError::AgentFailure { agent: id, time: self.time, seq: 0, source })?;
        self.agents.push(agent);
        Ok(id)
    }

    /// Advance time until the queue drains or the next event's time exceeds
    /// `until`. A subsequent call resumes correctly from wherever this one
    /// stopped. Calls every registered agent's `on_stop` once the dispatch
    /// loop exits, whether that is because the queue drained or `until` was
    /// reached.
    pub fn run(&mut self, until: Option<Time>) -> Result<RunSummary, KernelError> {
        self.started = true;
        let mut summary = RunSummary { final_time: self.time, ..Default::default() };

        info!(until = ?until, "kernel run starting");

        loop {
            let head_time = match self.queue.peek() {
                Some(e) => e.time,
                None => break,
            };
            if let Some(deadline) = until {
                if head_time > deadline {
                    break;
                }
            }

            let event = self.queue.pop().expect("queue was non-empty at peek");
            self.time = event.time;
            summary.events_processed += 1;
            summary.final_time = self.time;

            match event.kind {
                EventKind::Wakeup(agent) => {
                    trace!(time = event.time, seq = event.seq, agent, "dispatch wakeup");
                    self.dispatch_wakeup(agent, event.seq)?;
                }
                EventKind::Deliver(agent, message) => {
                    trace!(time = event.time, seq = event.seq, agent, "dispatch deliver");
                    self.dispatch_deliver(agent, message, event.seq)?;
                    summary.messages_delivered += 1;
                }
                EventKind::Publish(topic, message) => {
                    debug!(time = event.time, seq = event.seq, topic = %topic, "dispatch publish");
                    self.fan_out(topic, message);
                }
            }
        }

        self.dispatch_stop()?;

        info!(events = summary.events_processed, messages = summary.messages_delivered, final_time = summary.final_time, "kernel run finished");
        Ok(summary)
    }

    fn agent_index(&self, id: AgentId) -> Option<usize> {
        self.agents.iter().position(|a| a.id() == id)
    }

    /// Calls `on_stop` on every registered agent, in registration order,
    /// once the dispatch loop in `run` exits (queue drained or `until`
    /// reached).
    fn dispatch_stop(&mut self) -> Result<(), KernelError> {
        let now = self.time;
        for idx in 0..self.agents.len() {
            let id = self.agents[idx].id();
            let mut agent = self.agents.remove(idx);
            let result = agent.on_stop(self);
            self.agents.insert(idx, agent);
            result.map_err(|source| KernelError::AgentFailure { agent: id, time: now, seq: 0, source })?;
        }
        Ok(())
    }

    /// Detaches the target agent from `self.agents`, invokes the callback
    /// with `self` reborrowed as `&mut dyn Scheduler`, then reinserts it at
    /// the same position. This sidesteps aliasing `&mut self` (the
    /// scheduler) and `&mut agent` at once.
    fn dispatch_wakeup(&mut self, agent_id: AgentId, seq: u64) -> Result<(), KernelError> {
        let Some(idx) = self.agent_index(agent_id) else {
            return Err(KernelError::UnknownAgent(agent_id));
        };
        let mut agent = self.agents.remove(idx);
        let now = self.time;
        let result = agent.wakeup(self, now);
        self.agents.insert(idx, agent);
        result.map_err(|source| KernelError::AgentFailure { agent: agent_id, time: now, seq, source })
    }

    fn dispatch_deliver(&mut self, agent_id: AgentId, message: Message, seq: u64) -> Result<(), KernelError> {
        let Some(idx) = self.agent_index(agent_id) else {
            return Err(KernelError::UnknownAgent(agent_id));
        };
        let mut agent = self.agents.remove(idx);
        let now = self.time;
        let result = agent.receive(self, &message, now);
        self.agents.insert(idx, agent);
        result.map_err(|source| KernelError::AgentFailure { agent: agent_id, time: now, seq, source })
    }

    /// Synthesizes one `Deliver` event per subscriber, at the publish
    /// timestamp, with fresh (strictly increasing) `seq`s assigned in
    /// subscription-registration order. This is what makes "all subscribers
    /// see the message at the publish timestamp, in registration order"
    /// hold.
    fn fan_out(&mut self, topic: Topic, message: Message) {
        let subscribers = self.broker.subscribers(&topic).to_vec();
        for subscriber in subscribers {
            let seq = self.fresh_seq();
            self.queue.push(ScheduledEvent {
                time: self.time,
                seq,
                kind: EventKind::Deliver(subscriber, message.clone()),
            });
        }
    }
}

impl Scheduler for Kernel {
    fn now(&self) -> Time {
        self.time
    }

    fn schedule_wakeup(&mut self, agent: AgentId, at: Time) -> Result<(), KernelError> {
        self.check_at(at)?;
        let seq = self.fresh_seq();
        self.queue.push(ScheduledEvent { time: at, seq, kind: EventKind::Wakeup(agent) });
        Ok(())
    }

    fn schedule_send(&mut self, _sender: AgentId, topic: Topic, message: Message, at: Time) -> Result<(), KernelError> {
        self.check_at(at)?;
        let seq = self.fresh_seq();
        self.queue.push(ScheduledEvent { time: at, seq, kind: EventKind::Publish(topic, message) });
        Ok(())
    }

    fn schedule_deliver(&mut self, _sender: AgentId, recipient: AgentId, message: Message, at: Time) -> Result<(), KernelError> {
        self.check_at(at)?;
        let seq = self.fresh_seq();
        self.queue.push(ScheduledEvent { time: at, seq, kind: EventKind::Deliver(recipient, message) });
        Ok(())
    }

    fn subscribe(&mut self, agent: AgentId, topic: Topic) {
        self.broker.subscribe(agent, topic);
    }

    fn unsubscribe(&mut self, agent: AgentId, topic: &Topic) {
        self.broker.unsubscribe(agent, topic);
    }
}
