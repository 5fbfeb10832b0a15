// src/messages.rs
// Message envelope and the exchange's payload vocabulary. Kernel and broker
// never interpret `Payload`; only agents (chiefly the exchange) do.

use orderbook::{CancelError, OrderId, Price, Qty, Side, SubmitError, Symbol, Trade as BookTrade};

/// Opaque per-agent identity, stable for the run.
pub type AgentId = u32;

/// Virtual time, milliseconds.
pub type Time = u64;

#[derive(Debug, Clone)]
pub struct SubmitOrderPayload {
    pub symbol: Symbol,
    pub side: Side,
    pub price: Price,
    pub quantity: Qty,
    pub client_tag: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct CancelOrderPayload {
    pub order_id: OrderId,
}

#[derive(Debug, Clone, Copy)]
pub struct OrderAcceptedPayload {
    pub order_id: OrderId,
    pub client_tag: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct OrderRejectedPayload {
    pub client_tag: u64,
    pub reason: SubmitError,
}

#[derive(Debug, Clone, Copy)]
pub struct OrderCancelledPayload {
    pub order_id: OrderId,
    pub released_qty: Qty,
}

#[derive(Debug, Clone, Copy)]
pub struct CancelRejectedPayload {
    pub order_id: OrderId,
    pub reason: CancelError,
}

#[derive(Debug, Clone)]
pub struct TradePayload {
    pub symbol: Symbol,
    pub trade: BookTrade,
}

#[derive(Debug, Clone)]
pub struct BookUpdatePayload {
    pub symbol: Symbol,
    pub best_bid: Option<(Price, Qty)>,
    pub best_ask: Option<(Price, Qty)>,
}

#[derive(Debug, Clone)]
pub struct MarketDataPayload {
    pub symbol: Symbol,
    pub text: String,
}

/// Tagged payload carried by every [`Message`]. Opaque to the kernel and
/// broker; only the exchange agent (and whoever it addresses) interprets it.
#[derive(Debug, Clone)]
pub enum Payload {
    SubmitOrder(SubmitOrderPayload),
    CancelOrder(CancelOrderPayload),
    OrderAccepted(OrderAcceptedPayload),
    OrderRejected(OrderRejectedPayload),
    OrderCancelled(OrderCancelledPayload),
    CancelRejected(CancelRejectedPayload),
    Trade(TradePayload),
    BookUpdate(BookUpdatePayload),
    MarketData(MarketDataPayload),
}

/// `{ sender, payload, send_time }`: the unit of information the kernel
/// moves between agents. `send_time` is when the sender created it, which
/// may be earlier than the virtual time at which a subscriber's `Deliver`
/// event actually fires.
#[derive(Debug, Clone)]
pub struct Message {
    pub sender: AgentId,
    pub payload: Payload,
    pub send_time: Time,
}

impl Message {
    pub fn new(sender: AgentId, payload: Payload, send_time: Time) -> Self {
        Self { sender, payload, send_time }
    }
}
