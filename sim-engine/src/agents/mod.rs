// src/agents/mod.rs
// Concrete Agent implementations. The Agent trait itself lives in
// crate::agent, alongside the Scheduler capability agents are given.

pub mod exchange_agent;
pub mod oracle_agent;
pub mod trader_agent;
