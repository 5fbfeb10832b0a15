//! Price-time priority matching engine for a single symbol.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::error::{CancelError, SubmitError};
use crate::level::PriceLevel;
use crate::order::{Order, OrderStatus};
use crate::types::{AgentId, OrderId, Price, Qty, Side, Symbol};

/// How a new order is treated when it would match against a resting order
/// from the same agent. `Allow` (the default) matches as with any other
/// counterparty; the others are provided as a selectable policy because the
/// "correct" behavior here is a venue decision, not a matching-engine one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfTradePolicy {
    #[default]
    Allow,
    CancelOldest,
    CancelNewest,
    DecrementBoth,
}

/// A single match produced by `submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    pub price: Price,
    pub qty: Qty,
    pub maker_order_id: OrderId,
    pub maker_agent_id: AgentId,
    pub taker_order_id: OrderId,
    pub taker_agent_id: AgentId,
}

/// A new order request. `order_id` is assigned by the exchange (unique
/// across every book it owns) before the request reaches the book; the book
/// only assigns `arrival_seq`, which is purely a per-book tie-breaker and
/// need not be globally unique.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub agent_id: AgentId,
    pub symbol: Symbol,
    pub side: Side,
    pub price: Price,
    pub quantity: Qty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub accepted_id: OrderId,
    pub fills: Vec<Trade>,
    pub resting: Option<(Price, Qty)>,
    pub top_of_book_changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelResult {
    pub order_id: OrderId,
    pub released_qty: Qty,
    pub top_of_book_changed: bool,
}

/// Best-bid/best-ask snapshot, emitted as a `BookUpdate` whenever it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopOfBook {
    pub best_bid: Option<(Price, Qty)>,
    pub best_ask: Option<(Price, Qty)>,
}

pub struct OrderBook {
    symbol: Symbol,
    bids: BTreeMap<Reverse<Price>, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
    index: HashMap<OrderId, (Side, Price)>,
    self_trade_policy: SelfTradePolicy,
    next_arrival_seq: u64,
    last_top: TopOfBook,
}

impl OrderBook {
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self::with_policy(symbol, SelfTradePolicy::default())
    }

    pub fn with_policy(symbol: impl Into<Symbol>, self_trade_policy: SelfTradePolicy) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
            self_trade_policy,
            next_arrival_seq: 0,
            last_top: TopOfBook::default(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn best_bid(&self) -> Option<(Price, Qty)> {
        self.bids.iter().next().map(|(Reverse(p), lvl)| (*p, lvl.total_qty()))
    }

    pub fn best_ask(&self) -> Option<(Price, Qty)> {
        self.asks.iter().next().map(|(p, lvl)| (*p, lvl.total_qty()))
    }

    pub fn depth(&self, side: Side, n_levels: usize) -> Vec<(Price, Qty)> {
        match side {
            Side::Bid => self
                .bids
                .iter()
                .take(n_levels)
                .map(|(Reverse(p), lvl)| (*p, lvl.total_qty()))
                .collect(),
            Side::Ask => self
                .asks
                .iter()
                .take(n_levels)
                .map(|(p, lvl)| (*p, lvl.total_qty()))
                .collect(),
        }
    }

    fn current_top(&self) -> TopOfBook {
        TopOfBook {
            best_bid: self.best_bid(),
            best_ask: self.best_ask(),
        }
    }

    /// Accept and match a new order against this book, arriving at
    /// `arrival_time` (virtual-time milliseconds).
    pub fn submit(&mut self, new_order: NewOrder, arrival_time: u64) -> Result<SubmitResult, SubmitError> {
        if new_order.quantity == 0 {
            return Err(SubmitError::NonPositiveQuantity);
        }
        if new_order.price <= 0 {
            return Err(SubmitError::NonPositivePrice);
        }
        if new_order.symbol != self.symbol {
            return Err(SubmitError::SymbolMismatch);
        }

        let order_id = new_order.order_id;
        let arrival_seq = self.next_arrival_seq;
        self.next_arrival_seq += 1;

        let mut incoming = Order {
            order_id,
            agent_id: new_order.agent_id,
            symbol: new_order.symbol,
            side: new_order.side,
            price: new_order.price,
            quantity: new_order.quantity,
            remaining: new_order.quantity,
            arrival_time,
            arrival_seq,
            status: OrderStatus::Resting,
        };

        debug!(symbol = %self.symbol, order_id, side = ?incoming.side, price = incoming.price, qty = incoming.quantity, "submit");

        let fills = match incoming.side {
            Side::Bid => self.match_bid(&mut incoming),
            Side::Ask => self.match_ask(&mut incoming),
        };

        let resting = if incoming.remaining > 0 {
            incoming.status = if fills.is_empty() {
                OrderStatus::Resting
            } else {
                OrderStatus::PartiallyFilled
            };
            let price = incoming.price;
            let side = incoming.side;
            let remaining = incoming.remaining;
            self.index.insert(order_id, (side, price));
            self.level_mut(side, price).push_back(incoming);
            Some((price, remaining))
        } else {
            None
        };

        let new_top = self.current_top();
        let top_of_book_changed = new_top != self.last_top;
        self.last_top = new_top;

        Ok(SubmitResult {
            accepted_id: order_id,
            fills,
            resting,
            top_of_book_changed,
        })
    }

    pub fn cancel(&mut self, order_id: OrderId, agent_id: AgentId) -> Result<CancelResult, CancelError> {
        let (side, price) = self
            .index
            .get(&order_id)
            .copied()
            .ok_or(CancelError::UnknownOrder(order_id))?;

        let owner_ok = self
            .level(side, price)
            .and_then(|lvl| lvl.iter().find(|o| o.order_id == order_id))
            .map(|o| o.agent_id == agent_id)
            .unwrap_or(false);
        if !owner_ok {
            return Err(CancelError::NotOwner(order_id));
        }

        let removed = self
            .level_mut(side, price)
            .remove(order_id)
            .expect("index and level are out of sync");
        self.index.remove(&order_id);
        self.prune_if_empty(side, price);

        let new_top = self.current_top();
        let top_of_book_changed = new_top != self.last_top;
        self.last_top = new_top;

        trace!(symbol = %self.symbol, order_id, "cancel");

        Ok(CancelResult {
            order_id,
            released_qty: removed.remaining,
            top_of_book_changed,
        })
    }

    fn level(&self, side: Side, price: Price) -> Option<&PriceLevel> {
        match side {
            Side::Bid => self.bids.get(&Reverse(price)),
            Side::Ask => self.asks.get(&price),
        }
    }

    fn level_mut(&mut self, side: Side, price: Price) -> &mut PriceLevel {
        match side {
            Side::Bid => self.bids.entry(Reverse(price)).or_insert_with(|| PriceLevel::new(price, side)),
            Side::Ask => self.asks.entry(price).or_insert_with(|| PriceLevel::new(price, side)),
        }
    }

    fn prune_if_empty(&mut self, side: Side, price: Price) {
        let empty = self.level(side, price).map(|l| l.is_empty()).unwrap_or(false);
        if empty {
            match side {
                Side::Bid => {
                    self.bids.remove(&Reverse(price));
                }
                Side::Ask => {
                    self.asks.remove(&price);
                }
            }
        }
    }

    fn match_bid(&mut self, incoming: &mut Order) -> Vec<Trade> {
        let mut fills = Vec::new();
        while incoming.remaining > 0 {
            let Some((ask_price, _)) = self.best_ask() else { break };
            if ask_price > incoming.price {
                break;
            }
            match self.cross_one(Side::Ask, ask_price, incoming) {
                CrossOutcome::Traded(trade) => fills.push(trade),
                CrossOutcome::MakerRemoved => continue,
                CrossOutcome::IncomingCancelled => break,
            }
        }
        fills
    }

    fn match_ask(&mut self, incoming: &mut Order) -> Vec<Trade> {
        let mut fills = Vec::new();
        while incoming.remaining > 0 {
            let Some((bid_price, _)) = self.best_bid() else { break };
            if bid_price < incoming.price {
                break;
            }
            match self.cross_one(Side::Bid, bid_price, incoming) {
                CrossOutcome::Traded(trade) => fills.push(trade),
                CrossOutcome::MakerRemoved => continue,
                CrossOutcome::IncomingCancelled => break,
            }
        }
        fills
    }

    /// Matches the incoming order against the head of the resting level on
    /// `maker_side` at `maker_price`. When maker and taker share an
    /// `agent_id` and the policy is not `Allow`, applies that policy instead
    /// of recording a trade.
    fn cross_one(&mut self, maker_side: Side, maker_price: Price, incoming: &mut Order) -> CrossOutcome {
        let level = self.level_mut(maker_side, maker_price);
        let maker_agent = level.front().expect("best price level must be non-empty").agent_id;
        let maker_id = level.front().expect("best price level must be non-empty").order_id;

        if maker_agent == incoming.agent_id && self.self_trade_policy != SelfTradePolicy::Allow {
            return self.resolve_self_trade(maker_side, maker_price, maker_id, incoming);
        }

        let level = self.level_mut(maker_side, maker_price);
        let maker_remaining = level.front().expect("level non-empty").remaining;
        let q = incoming.remaining.min(maker_remaining);

        level.fill_front(q);
        incoming.remaining -= q;

        let maker_now_empty = level.front().expect("level non-empty").remaining == 0;
        if maker_now_empty {
            let filled = level.pop_front_filled();
            self.index.remove(&filled.order_id);
        }
        self.prune_if_empty(maker_side, maker_price);

        trace!(
            symbol = %self.symbol,
            price = maker_price,
            qty = q,
            maker_order_id = maker_id,
            taker_order_id = incoming.order_id,
            "trade"
        );

        CrossOutcome::Traded(Trade {
            price: maker_price,
            qty: q,
            maker_order_id: maker_id,
            maker_agent_id: maker_agent,
            taker_order_id: incoming.order_id,
            taker_agent_id: incoming.agent_id,
        })
    }

    /// `CancelOldest` drops the resting maker and lets matching retry against
    /// whatever is now at the head of the level (or the next level).
    /// `CancelNewest` drops the incoming taker instead, ending the match.
    /// `DecrementBoth` burns quantity from both sides without a trade, which
    /// is itself a `MakerRemoved`-shaped step when it empties the maker.
    fn resolve_self_trade(
        &mut self,
        maker_side: Side,
        maker_price: Price,
        maker_id: OrderId,
        incoming: &mut Order,
    ) -> CrossOutcome {
        match self.self_trade_policy {
            SelfTradePolicy::Allow => unreachable!("resolve_self_trade only called under a non-Allow policy"),
            SelfTradePolicy::CancelOldest => {
                self.remove_maker(maker_side, maker_price, maker_id);
                CrossOutcome::MakerRemoved
            }
            SelfTradePolicy::CancelNewest => {
                incoming.remaining = 0;
                CrossOutcome::IncomingCancelled
            }
            SelfTradePolicy::DecrementBoth => {
                let level = self.level_mut(maker_side, maker_price);
                let maker_remaining = level.front().expect("level non-empty").remaining;
                let q = incoming.remaining.min(maker_remaining);
                level.fill_front(q);
                incoming.remaining -= q;
                let maker_now_empty = level.front().expect("level non-empty").remaining == 0;
                if maker_now_empty {
                    let filled = level.pop_front_filled();
                    self.index.remove(&filled.order_id);
                }
                self.prune_if_empty(maker_side, maker_price);
                CrossOutcome::MakerRemoved
            }
        }
    }

    fn remove_maker(&mut self, maker_side: Side, maker_price: Price, maker_id: OrderId) {
        let level = self.level_mut(maker_side, maker_price);
        if let Some(removed) = level.remove(maker_id) {
            self.index.remove(&removed.order_id);
        }
        self.prune_if_empty(maker_side, maker_price);
    }
}

enum CrossOutcome {
    Traded(Trade),
    /// The maker was removed without trading (self-trade policy); the
    /// matching loop should retry the same side/price or fall through.
    MakerRemoved,
    /// The incoming order was cancelled by self-trade policy; stop matching.
    IncomingCancelled,
}
