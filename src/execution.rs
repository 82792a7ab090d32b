//! Match records and the sink they are delivered to.
//!
//! [`OrderMatch`] is the value produced by each execution event, in strict
//! execution order. [`MatchSink`] is the injection point for trade reporting:
//! the book invokes it at most once per emitted match, fire-and-forget.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::types::{now_ns, OrderId, Price, Quantity, Timestamp};

/// One execution between a resting (maker) and an incoming (taker) order.
///
/// The match price is always the maker's resting price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderMatch {
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub match_price: Price,
    pub match_quantity: Quantity,
    pub timestamp: Timestamp,
}

impl OrderMatch {
    /// Builds a match record stamped with the current time.
    pub fn new(maker: OrderId, taker: OrderId, price: Price, quantity: Quantity) -> Self {
        Self {
            maker_order_id: maker,
            taker_order_id: taker,
            match_price: price,
            match_quantity: quantity,
            timestamp: now_ns(),
        }
    }
}

impl fmt::Display for OrderMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Match[maker={}, taker={}, price={}, qty={}, time={}]",
            self.maker_order_id,
            self.taker_order_id,
            self.match_price,
            self.match_quantity,
            self.timestamp,
        )
    }
}

/// Sink for emitted match records. Implementations must be thread-safe and
/// non-blocking from the book's perspective; a sink that drops records on the
/// floor is acceptable.
pub trait MatchSink: Send + Sync {
    fn on_match(&self, m: &OrderMatch);
}

/// Discards every match. The default sink.
pub struct NoopMatchSink;

impl MatchSink for NoopMatchSink {
    fn on_match(&self, _m: &OrderMatch) {}
}

/// Writes one JSON object per match to stdout.
pub struct JsonLinesMatchSink;

impl MatchSink for JsonLinesMatchSink {
    fn on_match(&self, m: &OrderMatch) {
        if let Ok(line) = serde_json::to_string(m) {
            println!("{}", line);
        }
    }
}

/// Stores matches in memory for tests. Clone shares the same backing buffer.
#[derive(Clone, Default)]
pub struct InMemoryMatchSink {
    matches: Arc<Mutex<Vec<OrderMatch>>>,
}

impl InMemoryMatchSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matches(&self) -> Vec<OrderMatch> {
        self.matches.lock().expect("lock").clone()
    }

    pub fn clear(&self) {
        self.matches.lock().expect("lock").clear();
    }
}

impl MatchSink for InMemoryMatchSink {
    fn on_match(&self, m: &OrderMatch) {
        self.matches.lock().expect("lock").push(*m);
    }
}
