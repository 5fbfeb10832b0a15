// src/agents/exchange_agent.rs
// The exchange: owns one order book per symbol and bridges SubmitOrder /
// CancelOrder messages to orderbook::OrderBook operations, replying to the
// submitter directly and publishing market data to the rest of the system.

use std::collections::HashMap;

use tracing::{info, warn};

use orderbook::{CancelError, NewOrder, OrderBook, OrderId, SelfTradePolicy, Symbol};

use crate::agent::{Agent, AgentError, Scheduler};
use crate::broker::Topic;
use crate::messages::{
    AgentId, BookUpdatePayload, CancelOrderPayload, CancelRejectedPayload, Message, OrderAcceptedPayload,
    OrderCancelledPayload, OrderRejectedPayload, Payload, SubmitOrderPayload, Time, TradePayload,
};

/// Public trades topic for a symbol: every fill is published here.
pub fn trades_topic(symbol: &str) -> Topic {
    Topic::new(format!("md.{symbol}.trades"))
}

/// Public top-of-book topic for a symbol: published when it changes.
pub fn book_topic(symbol: &str) -> Topic {
    Topic::new(format!("md.{symbol}.book"))
}

pub struct ExchangeAgent {
    id: AgentId,
    name: String,
    books: HashMap<Symbol, OrderBook>,
    /// Routes a cancel's `order_id` to the book that owns it. Stale entries
    /// (an order fully filled by someone else's match) are harmless: the
    /// lookup still reaches the right book, whose own index no longer has
    /// the order, and `cancel` comes back `UnknownOrder`.
    order_symbol: HashMap<OrderId, Symbol>,
    next_order_id: OrderId,
}

impl ExchangeAgent {
    pub fn new(id: AgentId, name: impl Into<String>, symbols: impl IntoIterator<Item = Symbol>) -> Self {
        Self::with_policy(id, name, symbols, SelfTradePolicy::default())
    }

    pub fn with_policy(
        id: AgentId,
        name: impl Into<String>,
        symbols: impl IntoIterator<Item = Symbol>,
        policy: SelfTradePolicy,
    ) -> Self {
        let books = symbols.into_iter().map(|s| (s.clone(), OrderBook::with_policy(s, policy))).collect();
        Self { id, name: name.into(), books, order_symbol: HashMap::new(), next_order_id: 1 }
    }

    fn next_order_id(&mut self) -> OrderId {
        let id = self.next_order_id;
        self.next_order_id += 1;
        id
    }

    fn handle_submit(&mut self, sched: &mut dyn Scheduler, sender: AgentId, p: &SubmitOrderPayload, now: Time) {
        let Some(book) = self.books.get_mut(&p.symbol) else {
            warn!(exchange = %self.name, symbol = %p.symbol, "submit for unknown symbol");
            let reply = Message::new(
                self.id,
                Payload::OrderRejected(OrderRejectedPayload { client_tag: p.client_tag, reason: orderbook::SubmitError::SymbolMismatch }),
                now,
            );
            let _ = sched.schedule_deliver(self.id, sender, reply, now);
            return;
        };

        let order_id = self.next_order_id();
        let new_order = NewOrder {
            order_id,
            agent_id: sender,
            symbol: p.symbol.clone(),
            side: p.side,
            price: p.price,
            quantity: p.quantity,
        };

        match book.submit(new_order, now) {
            Ok(result) => {
                self.order_symbol.insert(order_id, p.symbol.clone());
                info!(exchange = %self.name, order_id, fills = result.fills.len(), "order accepted");

                let accepted = Message::new(self.id, Payload::OrderAccepted(OrderAcceptedPayload { order_id, client_tag: p.client_tag }), now);
                let _ = sched.schedule_deliver(self.id, sender, accepted, now);

                for trade in &result.fills {
                    let trade_msg = Message::new(self.id, Payload::Trade(TradePayload { symbol: p.symbol.clone(), trade: *trade }), now);
                    let _ = sched.schedule_send(self.id, trades_topic(&p.symbol), trade_msg, now);
                }

                if result.top_of_book_changed {
                    let update = Message::new(
                        self.id,
                        Payload::BookUpdate(BookUpdatePayload { symbol: p.symbol.clone(), best_bid: book.best_bid(), best_ask: book.best_ask() }),
                        now,
                    );
                    let _ = sched.schedule_send(self.id, book_topic(&p.symbol), update, now);
                }
            }
            Err(reason) => {
                let reply = Message::new(self.id, Payload::OrderRejected(OrderRejectedPayload { client_tag: p.client_tag, reason }), now);
                let _ = sched.schedule_deliver(self.id, sender, reply, now);
            }
        }
    }

    fn handle_cancel(&mut self, sched: &mut dyn Scheduler, sender: AgentId, p: &CancelOrderPayload, now: Time) {
        let Some(symbol) = self.order_symbol.get(&p.order_id).cloned() else {
            let reply = Message::new(
                self.id,
                Payload::CancelRejected(CancelRejectedPayload { order_id: p.order_id, reason: CancelError::UnknownOrder(p.order_id) }),
                now,
            );
            let _ = sched.schedule_deliver(self.id, sender, reply, now);
            return;
        };

        let book = self.books.get_mut(&symbol).expect("order_symbol only ever points at owned books");
        match book.cancel(p.order_id, sender) {
            Ok(result) => {
                self.order_symbol.remove(&p.order_id);
                let reply = Message::new(
                    self.id,
                    Payload::OrderCancelled(OrderCancelledPayload { order_id: p.order_id, released_qty: result.released_qty }),
                    now,
                );
                let _ = sched.schedule_deliver(self.id, sender, reply, now);

                if result.top_of_book_changed {
                    let update = Message::new(
                        self.id,
                        Payload::BookUpdate(BookUpdatePayload { symbol: symbol.clone(), best_bid: book.best_bid(), best_ask: book.best_ask() }),
                        now,
                    );
                    let _ = sched.schedule_send(self.id, book_topic(&symbol), update, now);
                }
            }
            Err(reason) => {
                let reply = Message::new(self.id, Payload::CancelRejected(CancelRejectedPayload { order_id: p.order_id, reason }), now);
                let _ = sched.schedule_deliver(self.id, sender, reply, now);
            }
        }
    }
}

impl Agent for ExchangeAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn on_start(&mut self, _sched: &mut dyn Scheduler) -> Result<(), AgentError> {
        info!(exchange = %self.name, symbols = ?self.books.keys().collect::<Vec<_>>(), "exchange starting");
        Ok(())
    }

    fn receive(&mut self, sched: &mut dyn Scheduler, message: &Message, now: Time) -> Result<(), AgentError> {
        match &message.payload {
            Payload::SubmitOrder(p) => self.handle_submit(sched, message.sender, p, now),
            Payload::CancelOrder(p) => self.handle_cancel(sched, message.sender, p, now),
            other => {
                warn!(exchange = %self.name, payload = ?other, "exchange ignoring non-request payload");
            }
        }
        Ok(())
    }
}
