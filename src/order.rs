//! A single order: immutable descriptor fields plus mutable execution state.
//!
//! Status moves `New → Accepted → PartiallyFilled → Filled`, with `Cancelled`,
//! `Replaced`, and `Rejected` as the side exits. Execution state is only
//! advanced through [`Order::execute`]; the raw mutators exist for the book
//! and price level.

use std::fmt;

use crate::types::{
    now_ns, OrderId, OrderStatus, OrderType, Price, Quantity, Side, Symbol, TimeInForce,
    Timestamp, INVALID_ORDER_ID,
};

/// One order. Created by the caller, then handed to the book.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Order {
    id: OrderId,
    symbol: Symbol,
    side: Side,
    order_type: OrderType,
    quantity: Quantity,
    executed_quantity: Quantity,
    price: Price,
    time_in_force: TimeInForce,
    status: OrderStatus,
    created_at: Timestamp,
    last_update: Timestamp,
}

impl Order {
    /// Creates a GTC order. Status starts at `New` with nothing executed.
    pub fn new(
        id: OrderId,
        symbol: impl Into<Symbol>,
        side: Side,
        order_type: OrderType,
        quantity: Quantity,
        price: Price,
    ) -> Self {
        Self::with_time_in_force(id, symbol, side, order_type, quantity, price, TimeInForce::Gtc)
    }

    /// Creates an order with an explicit time-in-force.
    pub fn with_time_in_force(
        id: OrderId,
        symbol: impl Into<Symbol>,
        side: Side,
        order_type: OrderType,
        quantity: Quantity,
        price: Price,
        time_in_force: TimeInForce,
    ) -> Self {
        let now = now_ns();
        Self {
            id,
            symbol: symbol.into(),
            side,
            order_type,
            quantity,
            executed_quantity: Quantity::ZERO,
            price,
            time_in_force,
            status: OrderStatus::New,
            created_at: now,
            last_update: now,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn executed_quantity(&self) -> Quantity {
        self.executed_quantity
    }

    /// Unfilled part of the order: `quantity - executed_quantity`.
    pub fn remaining_quantity(&self) -> Quantity {
        self.quantity - self.executed_quantity
    }

    /// Limit price. Stored verbatim for market orders but ignored by matching.
    pub fn price(&self) -> Price {
        self.price
    }

    pub fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_update(&self) -> Timestamp {
        self.last_update
    }

    /// Raw price mutator; does not touch status or the order's book position.
    pub fn set_price(&mut self, price: Price) {
        self.price = price;
    }

    /// Raw size mutator. Only the price level calls this, after checking the
    /// executed floor; it does not touch `executed_quantity` or status.
    pub fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.last_update = now_ns();
    }

    /// Executes up to `exec_qty` of the order, clamped to the remaining
    /// quantity, and advances the status.
    pub fn execute(&mut self, exec_qty: Quantity) {
        let delta = exec_qty.min(self.remaining_quantity());
        self.executed_quantity = self.executed_quantity + delta;
        if self.executed_quantity == self.quantity {
            self.status = OrderStatus::Filled;
        } else if self.executed_quantity > Quantity::ZERO {
            self.status = OrderStatus::PartiallyFilled;
        }
        self.last_update = now_ns();
    }

    /// Cancels the order if it is still active; a no-op otherwise.
    pub fn cancel(&mut self) {
        if self.is_active() {
            self.set_status(OrderStatus::Cancelled);
        }
    }

    /// Whether the order can still trade.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::New
                | OrderStatus::Accepted
                | OrderStatus::PartiallyFilled
                | OrderStatus::Replaced
        )
    }

    pub fn is_filled(&self) -> bool {
        self.executed_quantity == self.quantity || self.status == OrderStatus::Filled
    }

    /// Structural validity at entry: a real id and a non-negative size.
    pub fn is_valid(&self) -> bool {
        self.id != INVALID_ORDER_ID && self.quantity.raw() >= 0
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order[id={}, symbol={}, side={}, type={}, qty={}, exec_qty={}, price={}, tif={}, status={}, time={}, last_update={}]",
            self.id,
            self.symbol,
            self.side,
            self.order_type,
            self.quantity,
            self.executed_quantity,
            self.price,
            self.time_in_force,
            self.status,
            self.created_at,
            self.last_update,
        )
    }
}
