//! A single resting or in-flight order and its lifecycle state.

use crate::types::{AgentId, OrderId, Price, Qty, Side, Symbol};

/// `Pending -> Accepted -> (Resting <-> PartiallyFilled)* -> (Filled | Cancelled | Rejected)`.
/// The book never constructs `Pending` or `Rejected` orders directly; those
/// are the caller-visible states before `submit` returns and on its error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Resting,
    PartiallyFilled,
    Filled,
    Cancelled,
}

/// A limit order, live or resting in the book.
#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: OrderId,
    pub agent_id: AgentId,
    pub symbol: Symbol,
    pub side: Side,
    pub price: Price,
    pub quantity: Qty,
    pub remaining: Qty,
    /// Virtual-time milliseconds at which the order arrived at the book.
    pub arrival_time: u64,
    /// Per-book monotonic counter breaking ties among same-price,
    /// same-timestamp orders. Never changes after acceptance, even across
    /// partial fills: priority is earned once, at arrival.
    pub arrival_seq: u64,
    pub status: OrderStatus,
}

impl Order {
    pub fn is_live(&self) -> bool {
        matches!(self.status, OrderStatus::Resting | OrderStatus::PartiallyFilled)
    }
}
