//! # CLOB Engine
//!
//! Single-symbol central limit order book: price-time priority matching with
//! deterministic fixed-point arithmetic.
//!
//! ## Entry point
//!
//! Use [`OrderBook`] as the single entry point: create with [`OrderBook::new`]
//! (or [`OrderBook::with_sink`] to receive match records), then
//! [`OrderBook::add_order`], [`OrderBook::cancel_order`], and
//! [`OrderBook::modify_order`]. One book instance owns exactly one symbol;
//! callers serialize access.
//!
//! ## Example
//!
//! ```rust
//! use clob_engine::{Order, OrderBook, OrderId, OrderType, Price, Quantity, Side};
//!
//! let mut book = OrderBook::new("AAPL");
//! let mut sell = Order::new(
//!     OrderId(1),
//!     "AAPL",
//!     Side::Sell,
//!     OrderType::Limit,
//!     Quantity::from_f64(8.0),
//!     Price::from_f64(102.0),
//! );
//! assert!(book.add_order(&mut sell).is_empty());
//!
//! let mut buy = Order::new(
//!     OrderId(2),
//!     "AAPL",
//!     Side::Buy,
//!     OrderType::Limit,
//!     Quantity::from_f64(5.0),
//!     Price::from_f64(103.0),
//! );
//! let matches = book.add_order(&mut buy);
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].match_price, Price::from_f64(102.0));
//! ```
//!
//! Prices and quantities are `i64`-backed decimals with a fixed scale of
//! 10000, so matching is exact and replays are bit-identical.

pub mod execution;
pub mod order;
pub mod order_book;
pub mod order_gen;
pub mod price_level;
pub mod types;

pub use execution::{InMemoryMatchSink, JsonLinesMatchSink, MatchSink, NoopMatchSink, OrderMatch};
pub use order::Order;
pub use order_book::OrderBook;
pub use price_level::{Fill, PriceLevel};
pub use types::{
    now_ns, OrderId, OrderStatus, OrderType, Price, Quantity, Side, Symbol, TimeInForce,
    Timestamp, INVALID_ORDER_ID, SCALE_FACTOR,
};
