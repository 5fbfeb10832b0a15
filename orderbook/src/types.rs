//! Primitive types shared across the book: integer prices and quantities,
//! order identity, and the buy/sell side tag.

use serde::{Deserialize, Serialize};

/// Fixed-point price in ticks. No floating point anywhere in the book:
/// determinism and bit-identical replay depend on it.
pub type Price = i64;

/// Quantity, always positive for a live order.
pub type Qty = u64;

/// Exchange-assigned identifier, unique for the run.
pub type OrderId = u64;

/// Opaque per-agent identity, matches `sim-engine`'s `AgentId` but the book
/// crate does not depend on `sim-engine` so it is redeclared here.
pub type AgentId = u32;

/// Traded instrument name.
pub type Symbol = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}
