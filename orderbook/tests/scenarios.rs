//! Concrete matching scenarios from the design spec.

use std::sync::atomic::{AtomicU64, Ordering};

use orderbook::{NewOrder, OrderBook, Side};

static NEXT_ORDER_ID: AtomicU64 = AtomicU64::new(1);

fn order(agent_id: u32, side: Side, price: i64, qty: u64) -> NewOrder {
    NewOrder {
        order_id: NEXT_ORDER_ID.fetch_add(1, Ordering::Relaxed),
        agent_id,
        symbol: "X".to_string(),
        side,
        price,
        quantity: qty,
    }
}

#[test]
fn scenario_a_simple_cross() {
    let mut book = OrderBook::new("X");

    let bid = book.submit(order(1, Side::Bid, 100, 10), 1).unwrap();
    assert!(bid.fills.is_empty());
    assert_eq!(bid.resting, Some((100, 10)));

    let ask = book.submit(order(2, Side::Ask, 100, 4), 2).unwrap();
    assert_eq!(ask.fills.len(), 1);
    assert_eq!(ask.fills[0].price, 100);
    assert_eq!(ask.fills[0].qty, 4);
    assert!(ask.resting.is_none());

    assert_eq!(book.best_bid(), Some((100, 6)));
    assert_eq!(book.best_ask(), None);
}

#[test]
fn scenario_b_price_time_priority() {
    let mut book = OrderBook::new("X");
    book.submit(order(1, Side::Bid, 100, 5), 1).unwrap();
    book.submit(order(2, Side::Bid, 100, 7), 2).unwrap();

    let ask = book.submit(order(3, Side::Ask, 100, 8), 3).unwrap();
    assert_eq!(ask.fills.len(), 2);
    assert_eq!((ask.fills[0].qty, ask.fills[0].maker_agent_id), (5, 1));
    assert_eq!((ask.fills[1].qty, ask.fills[1].maker_agent_id), (3, 2));

    assert_eq!(book.best_bid(), Some((100, 4)));
    assert_eq!(book.best_ask(), None);
}

#[test]
fn scenario_c_price_priority_overrides_time() {
    let mut book = OrderBook::new("X");
    book.submit(order(1, Side::Bid, 99, 10), 1).unwrap();
    book.submit(order(2, Side::Bid, 100, 10), 2).unwrap();

    let ask = book.submit(order(3, Side::Ask, 99, 5), 3).unwrap();
    assert_eq!(ask.fills.len(), 1);
    assert_eq!(ask.fills[0].price, 100);
    assert_eq!(ask.fills[0].qty, 5);
    assert_eq!(ask.fills[0].maker_agent_id, 2);

    assert_eq!(book.best_bid(), Some((100, 5)));
    assert_eq!(book.depth(Side::Bid, 2), vec![(100, 5), (99, 10)]);
}

#[test]
fn scenario_d_maker_price_rule() {
    let mut book = OrderBook::new("X");
    book.submit(order(1, Side::Ask, 101, 3), 1).unwrap();

    let bid = book.submit(order(2, Side::Bid, 105, 3), 2).unwrap();
    assert_eq!(bid.fills.len(), 1);
    assert_eq!(bid.fills[0].price, 101);
}

#[test]
fn submit_then_cancel_round_trip() {
    let mut book = OrderBook::new("X");
    let accepted = book.submit(order(1, Side::Bid, 100, 10), 1).unwrap();
    assert_eq!(book.best_bid(), Some((100, 10)));

    let cancelled = book.cancel(accepted.accepted_id, 1).unwrap();
    assert_eq!(cancelled.released_qty, 10);
    assert_eq!(book.best_bid(), None);
}

#[test]
fn cancel_unknown_order_errors() {
    let mut book = OrderBook::new("X");
    let err = book.cancel(999, 1).unwrap_err();
    assert_eq!(err, orderbook::CancelError::UnknownOrder(999));
}

#[test]
fn cancel_by_non_owner_errors() {
    let mut book = OrderBook::new("X");
    let accepted = book.submit(order(1, Side::Bid, 100, 10), 1).unwrap();
    let err = book.cancel(accepted.accepted_id, 2).unwrap_err();
    assert_eq!(err, orderbook::CancelError::NotOwner(accepted.accepted_id));
}

#[test]
fn submit_rejects_non_positive_quantity_and_price() {
    let mut book = OrderBook::new("X");
    assert_eq!(
        book.submit(order(1, Side::Bid, 100, 0), 1).unwrap_err(),
        orderbook::SubmitError::NonPositiveQuantity
    );
    assert_eq!(
        book.submit(order(1, Side::Bid, 0, 10), 1).unwrap_err(),
        orderbook::SubmitError::NonPositivePrice
    );
}

#[test]
fn submit_rejects_symbol_mismatch() {
    let mut book = OrderBook::new("X");
    let mut bad = order(1, Side::Bid, 100, 10);
    bad.symbol = "Y".to_string();
    assert_eq!(book.submit(bad, 1).unwrap_err(), orderbook::SubmitError::SymbolMismatch);
}

#[test]
fn partial_fill_keeps_original_arrival_priority() {
    let mut book = OrderBook::new("X");
    book.submit(order(1, Side::Bid, 100, 10), 1).unwrap();
    // Partially fill it.
    book.submit(order(2, Side::Ask, 100, 3), 2).unwrap();
    // A second, later bid at the same price must still queue behind the
    // partially filled original, not jump ahead of it.
    book.submit(order(3, Side::Bid, 100, 1), 3).unwrap();

    let ask = book.submit(order(4, Side::Ask, 100, 100), 4).unwrap();
    assert_eq!(ask.fills[0].maker_agent_id, 1);
    assert_eq!(ask.fills[0].qty, 7);
    assert_eq!(ask.fills[1].maker_agent_id, 3);
    assert_eq!(ask.fills[1].qty, 1);
}
