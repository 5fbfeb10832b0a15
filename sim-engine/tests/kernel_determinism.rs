//! Determinism guarantees that do not depend on the exchange at all: publish
//! fan-out order, self-scheduled wakeup chains, and the kernel's own error
//! kinds.

use std::cell::RefCell;
use std::rc::Rc;

use sim_engine::agent::{Agent, AgentError, Scheduler};
use sim_engine::broker::Topic;
use sim_engine::kernel::{Kernel, KernelError};
use sim_engine::messages::{AgentId, Message, MarketDataPayload, Payload, Time};

type Log = Rc<RefCell<Vec<String>>>;

struct Subscriber {
    id: AgentId,
    topic: Topic,
    log: Log,
}

impl Agent for Subscriber {
    fn id(&self) -> AgentId {
        self.id
    }

    fn on_start(&mut self, sched: &mut dyn Scheduler) -> Result<(), AgentError> {
        sched.subscribe(self.id, self.topic.clone());
        Ok(())
    }

    fn receive(&mut self, _sched: &mut dyn Scheduler, _message: &Message, now: Time) -> Result<(), AgentError> {
        self.log.borrow_mut().push(format!("agent{} t={}", self.id, now));
        Ok(())
    }
}

struct Publisher {
    id: AgentId,
    topic: Topic,
    at: Time,
}

impl Agent for Publisher {
    fn id(&self) -> AgentId {
        self.id
    }

    fn wakeup(&mut self, sched: &mut dyn Scheduler, now: Time) -> Result<(), AgentError> {
        let message = Message::new(self.id, Payload::MarketData(MarketDataPayload { symbol: "X".into(), text: "tick".into() }), now);
        sched.schedule_send(self.id, self.topic.clone(), message, now)?;
        Ok(())
    }

    fn on_start(&mut self, sched: &mut dyn Scheduler) -> Result<(), AgentError> {
        sched.schedule_wakeup(self.id, self.at)
    }
}

fn run_fan_out_once() -> Vec<String> {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let topic = Topic::new("fanout");
    let mut kernel = Kernel::new();

    // Registration order intentionally scrambled relative to agent ids, to
    // show that subscriber *registration* order (not agent id, not any
    // hashing) is what decides fan-out order.
    kernel.register_agent(Box::new(Subscriber { id: 30, topic: topic.clone(), log: log.clone() })).unwrap();
    kernel.register_agent(Box::new(Subscriber { id: 10, topic: topic.clone(), log: log.clone() })).unwrap();
    kernel.register_agent(Box::new(Subscriber { id: 20, topic: topic.clone(), log: log.clone() })).unwrap();
    kernel.register_agent(Box::new(Publisher { id: 1, topic: topic.clone(), at: 5 })).unwrap();

    kernel.run(None).unwrap();
    log.borrow().clone()
}

#[test]
fn publish_fan_out_follows_subscription_order_not_agent_id() {
    let log = run_fan_out_once();
    assert_eq!(log, vec!["agent30 t=5", "agent10 t=5", "agent20 t=5"]);
}

#[test]
fn publish_fan_out_is_repeatable_across_runs() {
    assert_eq!(run_fan_out_once(), run_fan_out_once());
}

struct Chainer {
    id: AgentId,
    remaining: u32,
    step_ms: Time,
    log: Rc<RefCell<Vec<Time>>>,
}

impl Agent for Chainer {
    fn id(&self) -> AgentId {
        self.id
    }

    fn on_start(&mut self, sched: &mut dyn Scheduler) -> Result<(), AgentError> {
        sched.schedule_wakeup(self.id, 0)
    }

    fn wakeup(&mut self, sched: &mut dyn Scheduler, now: Time) -> Result<(), AgentError> {
        self.log.borrow_mut().push(now);
        if self.remaining > 0 {
            self.remaining -= 1;
            sched.schedule_wakeup(self.id, now + self.step_ms)?;
        }
        Ok(())
    }
}

#[test]
fn wakeup_chain_advances_by_fixed_step_each_time() {
    let log: Rc<RefCell<Vec<Time>>> = Rc::new(RefCell::new(Vec::new()));
    let mut kernel = Kernel::new();
    kernel.register_agent(Box::new(Chainer { id: 1, remaining: 4, step_ms: 10, log: log.clone() })).unwrap();
    kernel.run(None).unwrap();

    let observed = log.borrow().clone();
    assert_eq!(observed, vec![0, 10, 20, 30, 40]);
}

#[test]
fn run_until_stops_before_later_wakeups() {
    let log: Rc<RefCell<Vec<Time>>> = Rc::new(RefCell::new(Vec::new()));
    let mut kernel = Kernel::new();
    kernel.register_agent(Box::new(Chainer { id: 1, remaining: 10, step_ms: 10, log: log.clone() })).unwrap();
    let summary = kernel.run(Some(25)).unwrap();

    assert_eq!(*log.borrow(), vec![0, 10, 20]);
    assert_eq!(summary.final_time, 20);
}

/// Agent that, on its very first wakeup, schedules a second wakeup at the
/// *same* timestamp, then logs nothing further.
struct SameTimeRescheduler {
    id: AgentId,
    at: Time,
    log: Rc<RefCell<Vec<String>>>,
    rescheduled: bool,
}

impl Agent for SameTimeRescheduler {
    fn id(&self) -> AgentId {
        self.id
    }

    fn on_start(&mut self, sched: &mut dyn Scheduler) -> Result<(), AgentError> {
        sched.schedule_wakeup(self.id, self.at)
    }

    fn wakeup(&mut self, sched: &mut dyn Scheduler, now: Time) -> Result<(), AgentError> {
        if !self.rescheduled {
            self.rescheduled = true;
            self.log.borrow_mut().push(format!("reschedule t={now}"));
            sched.schedule_wakeup(self.id, now)?;
        } else {
            self.log.borrow_mut().push(format!("reenter t={now}"));
        }
        Ok(())
    }
}

struct Sibling {
    id: AgentId,
    at: Time,
    log: Rc<RefCell<Vec<String>>>,
}

impl Agent for Sibling {
    fn id(&self) -> AgentId {
        self.id
    }

    fn on_start(&mut self, sched: &mut dyn Scheduler) -> Result<(), AgentError> {
        sched.schedule_wakeup(self.id, self.at)
    }

    fn wakeup(&mut self, _sched: &mut dyn Scheduler, now: Time) -> Result<(), AgentError> {
        self.log.borrow_mut().push(format!("sibling t={now}"));
        Ok(())
    }
}

/// Scenario F: an agent schedules a same-timestamp wakeup from inside a
/// wakeup callback. A sibling's wakeup, already queued for the same
/// timestamp before the reschedule happens, must still be dispatched first:
/// the self-scheduled event gets a fresh (larger) `seq`, so it lands after
/// whatever else was already queued at that instant, not immediately after
/// the callback that scheduled it.
#[test]
fn same_timestamp_reschedule_is_dispatched_after_already_queued_work() {
    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let mut kernel = Kernel::new();

    // Registered (hence scheduled) first, so its initial wakeup has the
    // smaller seq and is dispatched first at t=5.
    kernel.register_agent(Box::new(SameTimeRescheduler { id: 1, at: 5, log: log.clone(), rescheduled: false })).unwrap();
    kernel.register_agent(Box::new(Sibling { id: 2, at: 5, log: log.clone() })).unwrap();

    kernel.run(None).unwrap();

    assert_eq!(*log.borrow(), vec!["reschedule t=5".to_string(), "sibling t=5".to_string(), "reenter t=5".to_string()]);
}

struct NoOp {
    id: AgentId,
}

impl Agent for NoOp {
    fn id(&self) -> AgentId {
        self.id
    }
}

#[test]
fn scheduling_into_the_past_is_invalid_time() {
    let mut kernel = Kernel::new();
    kernel.register_agent(Box::new(NoOp { id: 1 })).unwrap();
    kernel.schedule_wakeup(1, 5).unwrap();
    let summary = kernel.run(None).unwrap();
    assert_eq!(summary.final_time, 5);

    let err = kernel.schedule_wakeup(1, 0).unwrap_err();
    assert!(matches!(err, KernelError::InvalidTime { requested: 0, current: 5 }));
}

#[test]
fn dispatching_to_an_unregistered_agent_is_unknown_agent() {
    let mut kernel = Kernel::new();
    kernel.schedule_wakeup(42, 0).unwrap();
    let err = kernel.run(None).unwrap_err();
    assert!(matches!(err, KernelError::UnknownAgent(42)));
}

#[test]
fn registering_after_run_has_started_is_kernel_already_running() {
    let mut kernel = Kernel::new();
    kernel.register_agent(Box::new(NoOp { id: 1 })).unwrap();
    kernel.run(None).unwrap();

    let err = kernel.register_agent(Box::new(NoOp { id: 2 })).unwrap_err();
    assert!(matches!(err, KernelError::KernelAlreadyRunning));
}
