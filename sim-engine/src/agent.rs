// src/agent.rs
// The Agent trait and the narrow scheduling capability the kernel hands to
// agents. Agents never own the kernel: they get a `&mut dyn Scheduler` for
// the duration of one callback and reconstruct everything else from their
// own fields on the next entry.

use crate::broker::Topic;
use crate::kernel::KernelError;
use crate::messages::{AgentId, Message, Time};

/// Error type returned by agent callbacks. Boxed so agents can report
/// whatever error type fits them without the kernel needing to know it.
pub type AgentError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Minimal interface the kernel exposes to agents during a callback. Agents
/// never see the kernel itself, only this capability, which keeps ownership
/// one-way: the kernel owns agents, agents only get a handle to schedule
/// through.
pub trait Scheduler {
    /// Current virtual time, milliseconds.
    fn now(&self) -> Time;

    /// Schedule a wakeup for `agent` at `at`. `at` must be `>= now()`.
    fn schedule_wakeup(&mut self, agent: AgentId, at: Time) -> Result<(), KernelError>;

    /// Publish `message` on `topic` at `at`; the broker's subscribers each
    /// receive their own `Deliver` event at the same timestamp. `at` must be
    /// `>= now()`.
    fn schedule_send(&mut self, sender: AgentId, topic: Topic, message: Message, at: Time) -> Result<(), KernelError>;

    /// Deliver `message` directly to `recipient` at `at`, bypassing the
    /// broker. Used for one-to-one replies (e.g. order acknowledgements)
    /// that do not need a topic round-trip. `at` must be `>= now()`.
    fn schedule_deliver(
        &mut self,
        sender: AgentId,
        recipient: AgentId,
        message: Message,
        at: Time,
    ) -> Result<(), KernelError>;

    fn subscribe(&mut self, agent: AgentId, topic: Topic);
    fn unsubscribe(&mut self, agent: AgentId, topic: &Topic);
}

/// Core trait for all agents in the simulation. Agents are state machines
/// whose state lives entirely in their own fields; the kernel is their
/// trampoline.
pub trait Agent {
    fn id(&self) -> AgentId;

    fn name(&self) -> &str {
        "agent"
    }

    /// Called once, at registration, before `run` starts dispatching events.
    fn on_start(&mut self, _sched: &mut dyn Scheduler) -> Result<(), AgentError> {
        Ok(())
    }

    /// Called once the run ends (queue drained or `until` reached).
    fn on_stop(&mut self, _sched: &mut dyn Scheduler) -> Result<(), AgentError> {
        Ok(())
    }

    /// Called for a `Wakeup` event scheduled for this agent.
    fn wakeup(&mut self, _sched: &mut dyn Scheduler, _now: Time) -> Result<(), AgentError> {
        Ok(())
    }

    /// Called for a `Deliver` event addressed to this agent, whether
    /// synthesized from a publish fan-out or sent directly.
    fn receive(&mut self, _sched: &mut dyn Scheduler, _message: &Message, _now: Time) -> Result<(), AgentError> {
        Ok(())
    }
}
