//! Error kinds surfaced by the order book. Rejects and cancel errors are
//! domain outcomes the caller turns into reply messages, not panics.

use thiserror::Error;

use crate::types::OrderId;

/// Failure reasons for [`crate::book::OrderBook::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("quantity must be positive")]
    NonPositiveQuantity,
    #[error("price must be positive")]
    NonPositivePrice,
    #[error("order symbol does not match this book's symbol")]
    SymbolMismatch,
}

/// Failure reasons for [`crate::book::OrderBook::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancelError {
    #[error("order {0} is unknown (never existed, already filled, or already cancelled)")]
    UnknownOrder(OrderId),
    #[error("agent is not the owner of order {0}")]
    NotOwner(OrderId),
}
