//! Price-time priority limit order book and matching engine.
//!
//! One [`OrderBook`] holds the bid/ask ladders for a single symbol. It has no
//! notion of agents, messages, or virtual time beyond the `arrival_time` it
//! is handed on `submit`; everything else in this crate is plumbing around
//! that one algorithm. `OrderId` assignment is the caller's (the exchange's)
//! job, since ids must stay unique across every book the exchange owns.

pub mod book;
pub mod error;
pub mod level;
pub mod order;
pub mod types;

pub use book::{CancelResult, NewOrder, OrderBook, SelfTradePolicy, SubmitResult, Trade, TopOfBook};
pub use error::{CancelError, SubmitError};
pub use order::{Order, OrderStatus};
pub use types::{AgentId, OrderId, Price, Qty, Side, Symbol};
