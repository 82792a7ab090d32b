//! Single-symbol order book: bids and asks with price-time priority.
//!
//! The book owns every resting order through an id-indexed registry; price
//! levels hold id handles into it. Bids are keyed by `Reverse<Price>` and asks
//! by `Price`, so the first entry of either index is the best price. All entry
//! points are synchronous and must be serialized by the caller; one book
//! instance owns exactly one symbol.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::execution::{MatchSink, NoopMatchSink, OrderMatch};
use crate::order::Order;
use crate::price_level::PriceLevel;
use crate::types::{OrderId, OrderStatus, OrderType, Price, Quantity, Side, Symbol, TimeInForce};

/// Two-sided limit order book for one symbol.
pub struct OrderBook {
    symbol: Symbol,
    /// Best (highest) bid first.
    bid_levels: BTreeMap<Reverse<Price>, PriceLevel>,
    /// Best (lowest) ask first.
    ask_levels: BTreeMap<Price, PriceLevel>,
    /// Every order currently resting on either side, by id.
    orders: HashMap<OrderId, Order>,
    total_bid_quantity: Quantity,
    total_ask_quantity: Quantity,
    match_sink: Box<dyn MatchSink>,
}

impl OrderBook {
    /// Creates an empty book with a no-op match sink.
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self::with_sink(symbol, Box::new(NoopMatchSink))
    }

    /// Creates an empty book that reports each emitted match to `match_sink`.
    pub fn with_sink(symbol: impl Into<Symbol>, match_sink: Box<dyn MatchSink>) -> Self {
        Self {
            symbol: symbol.into(),
            bid_levels: BTreeMap::new(),
            ask_levels: BTreeMap::new(),
            orders: HashMap::new(),
            total_bid_quantity: Quantity::ZERO,
            total_ask_quantity: Quantity::ZERO,
            match_sink,
        }
    }

    /// Submits an order and returns the emitted matches in execution order.
    ///
    /// The order is mutated in place so the caller observes its final status
    /// and executed quantity. A limit residual with a resting-eligible
    /// time-in-force is copied into the book; market orders never rest.
    /// Structurally invalid orders (invalid id, negative quantity, an id that
    /// is already resting) are rejected with an empty result and no book
    /// mutation.
    pub fn add_order(&mut self, order: &mut Order) -> Vec<OrderMatch> {
        if !order.is_valid() || self.orders.contains_key(&order.id()) {
            return Vec::new();
        }
        order.set_status(OrderStatus::Accepted);

        match order.order_type() {
            OrderType::Market => self.match_market_order(order),
            OrderType::Limit => {
                let matches = self.match_limit_order(order);
                if !order.is_filled()
                    && order.time_in_force() != TimeInForce::Ioc
                    && order.status() != OrderStatus::Cancelled
                {
                    self.add_limit_order_to_book(order);
                }
                matches
            }
            // Request kinds, not resting orders: use cancel_order / modify_order.
            OrderType::Cancel | OrderType::Modify => Vec::new(),
        }
    }

    /// Cancels a resting order. Returns false if the id is unknown.
    pub fn cancel_order(&mut self, order_id: OrderId) -> bool {
        let Some(order) = self.orders.get(&order_id) else {
            return false;
        };
        let price = order.price();
        let side = order.side();

        let removed = match side {
            Side::Buy => {
                if let Some(level) = self.bid_levels.get_mut(&Reverse(price)) {
                    if level.remove_order(order) {
                        self.total_bid_quantity =
                            self.total_bid_quantity - order.remaining_quantity();
                        true
                    } else {
                        false
                    }
                } else {
                    false
                }
            }
            Side::Sell => {
                if let Some(level) = self.ask_levels.get_mut(&price) {
                    if level.remove_order(order) {
                        self.total_ask_quantity =
                            self.total_ask_quantity - order.remaining_quantity();
                        true
                    } else {
                        false
                    }
                } else {
                    false
                }
            }
        };
        if !removed {
            return false;
        }

        self.remove_price_level_if_empty(price, side);
        if let Some(mut order) = self.orders.remove(&order_id) {
            order.cancel();
        }
        true
    }

    /// Modifies a resting order's price and/or quantity.
    ///
    /// A pure quantity change that does not exceed the current size is
    /// applied in place and keeps the order's FIFO position; the order is
    /// marked `Replaced`. A decrease below the already-executed quantity is
    /// rejected and leaves the order unchanged. Every other change is a
    /// cancel-and-replace through [`OrderBook::add_order`] (same id, side,
    /// type, and time-in-force), which forfeits time priority and may match.
    pub fn modify_order(
        &mut self,
        order_id: OrderId,
        new_price: Option<Price>,
        new_quantity: Option<Quantity>,
    ) -> Vec<OrderMatch> {
        if new_price.is_none() && new_quantity.is_none() {
            return Vec::new();
        }
        let Some(order) = self.orders.get(&order_id) else {
            return Vec::new();
        };

        if new_price.is_none() {
            if let Some(quantity) = new_quantity {
                if quantity <= order.quantity() {
                    return self.modify_quantity_in_place(order_id, quantity);
                }
            }
        }

        let symbol = order.symbol().to_string();
        let side = order.side();
        let order_type = order.order_type();
        let time_in_force = order.time_in_force();
        let price = new_price.unwrap_or(order.price());
        let quantity = new_quantity.unwrap_or(order.quantity());

        if !self.cancel_order(order_id) {
            return Vec::new();
        }
        let mut replacement = Order::with_time_in_force(
            order_id,
            symbol,
            side,
            order_type,
            quantity,
            price,
            time_in_force,
        );
        self.add_order(&mut replacement)
    }

    /// Snapshot of a resting order, or `None` once it has left the book.
    pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// Highest resting buy price.
    pub fn best_bid(&self) -> Option<Price> {
        self.bid_levels.keys().next().map(|k| k.0)
    }

    /// Lowest resting sell price.
    pub fn best_ask(&self) -> Option<Price> {
        self.ask_levels.keys().next().copied()
    }

    /// `best_ask - best_bid` when both sides exist.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Midpoint of the best bid and ask.
    ///
    /// Computed as `(bid.raw + ask.raw) / 2` in raw fixed-point units; the
    /// integer division truncates toward zero, so an odd raw sum loses its
    /// half-tick (toward zero for negative sums).
    pub fn midpoint(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(Price::from_raw((bid.raw() + ask.raw()) / 2)),
            _ => None,
        }
    }

    /// Resting orders at one price level in FIFO order.
    pub fn get_orders_at_level(&self, price: Price, side: Side) -> Vec<&Order> {
        let ids = match side {
            Side::Buy => self.bid_levels.get(&Reverse(price)).map(|l| l.order_ids()),
            Side::Sell => self.ask_levels.get(&price).map(|l| l.order_ids()),
        };
        ids.unwrap_or_default()
            .iter()
            .filter_map(|id| self.orders.get(id))
            .collect()
    }

    /// Aggregate remaining quantity at one price level.
    pub fn get_quantity_at_level(&self, price: Price, side: Side) -> Quantity {
        match side {
            Side::Buy => self
                .bid_levels
                .get(&Reverse(price))
                .map_or(Quantity::ZERO, |l| l.total_quantity()),
            Side::Sell => self
                .ask_levels
                .get(&price)
                .map_or(Quantity::ZERO, |l| l.total_quantity()),
        }
    }

    /// Bid prices, best (highest) first.
    pub fn get_bid_prices(&self) -> Vec<Price> {
        self.bid_levels.keys().map(|k| k.0).collect()
    }

    /// Ask prices, best (lowest) first.
    pub fn get_ask_prices(&self) -> Vec<Price> {
        self.ask_levels.keys().copied().collect()
    }

    /// Bid depth snapshot as `(price, aggregate quantity)`, best first.
    pub fn get_bids(&self) -> Vec<(Price, Quantity)> {
        self.bid_levels
            .iter()
            .map(|(k, level)| (k.0, level.total_quantity()))
            .collect()
    }

    /// Ask depth snapshot as `(price, aggregate quantity)`, best first.
    pub fn get_asks(&self) -> Vec<(Price, Quantity)> {
        self.ask_levels
            .iter()
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    /// Aggregate remaining quantity across all bid levels.
    pub fn get_total_bid_quantity(&self) -> Quantity {
        self.total_bid_quantity
    }

    /// Aggregate remaining quantity across all ask levels.
    pub fn get_total_ask_quantity(&self) -> Quantity {
        self.total_ask_quantity
    }

    pub fn bid_level_count(&self) -> usize {
        self.bid_levels.len()
    }

    pub fn ask_level_count(&self) -> usize {
        self.ask_levels.len()
    }

    /// Number of orders resting in the book.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Drops all levels and registry entries and zeroes the aggregates.
    /// Released orders keep whatever status they had.
    pub fn clear(&mut self) {
        self.bid_levels.clear();
        self.ask_levels.clear();
        self.orders.clear();
        self.total_bid_quantity = Quantity::ZERO;
        self.total_ask_quantity = Quantity::ZERO;
    }

    fn match_market_order(&mut self, order: &mut Order) -> Vec<OrderMatch> {
        let mut matches = Vec::new();
        if order.order_type() != OrderType::Market {
            return matches;
        }
        let initial = order.remaining_quantity();
        let mut remaining = initial;

        // FOK fills entirely or not at all; with the up-front depth check a
        // shortfall touches nothing.
        if order.time_in_force() == TimeInForce::Fok {
            let fillable = match order.side() {
                Side::Buy => self.fillable_ask_quantity(None),
                Side::Sell => self.fillable_bid_quantity(None),
            };
            if fillable < remaining {
                order.set_status(OrderStatus::Cancelled);
                return matches;
            }
        }

        match order.side() {
            Side::Buy => {
                while remaining > Quantity::ZERO {
                    let Some(mut entry) = self.ask_levels.first_entry() else {
                        break;
                    };
                    let level_price = *entry.key();
                    let fills = entry.get_mut().execute_quantity(remaining, &mut self.orders);
                    for fill in &fills {
                        matches.push(Self::emit_match(
                            self.match_sink.as_ref(),
                            fill.order_id,
                            order.id(),
                            level_price,
                            fill.quantity,
                        ));
                        remaining = remaining - fill.quantity;
                        self.total_ask_quantity = self.total_ask_quantity - fill.quantity;
                    }
                    if entry.get().is_empty() {
                        entry.remove();
                    }
                    for fill in fills {
                        if fill.fully_filled {
                            self.orders.remove(&fill.order_id);
                        }
                    }
                }
            }
            Side::Sell => {
                while remaining > Quantity::ZERO {
                    let Some(mut entry) = self.bid_levels.first_entry() else {
                        break;
                    };
                    let level_price = entry.key().0;
                    let fills = entry.get_mut().execute_quantity(remaining, &mut self.orders);
                    for fill in &fills {
                        matches.push(Self::emit_match(
                            self.match_sink.as_ref(),
                            fill.order_id,
                            order.id(),
                            level_price,
                            fill.quantity,
                        ));
                        remaining = remaining - fill.quantity;
                        self.total_bid_quantity = self.total_bid_quantity - fill.quantity;
                    }
                    if entry.get().is_empty() {
                        entry.remove();
                    }
                    for fill in fills {
                        if fill.fully_filled {
                            self.orders.remove(&fill.order_id);
                        }
                    }
                }
            }
        }

        order.execute(initial - remaining);
        matches
    }

    fn match_limit_order(&mut self, order: &mut Order) -> Vec<OrderMatch> {
        let mut matches = Vec::new();
        if order.order_type() != OrderType::Limit {
            return matches;
        }
        let limit_price = order.price();
        let initial = order.remaining_quantity();
        let mut remaining = initial;

        if order.time_in_force() == TimeInForce::Fok {
            let fillable = match order.side() {
                Side::Buy => self.fillable_ask_quantity(Some(limit_price)),
                Side::Sell => self.fillable_bid_quantity(Some(limit_price)),
            };
            if fillable < remaining {
                order.set_status(OrderStatus::Cancelled);
                return matches;
            }
        }

        match order.side() {
            Side::Buy => {
                while remaining > Quantity::ZERO {
                    let Some(mut entry) = self.ask_levels.first_entry() else {
                        break;
                    };
                    let level_price = *entry.key();
                    if level_price > limit_price {
                        break;
                    }
                    let fills = entry.get_mut().execute_quantity(remaining, &mut self.orders);
                    for fill in &fills {
                        matches.push(Self::emit_match(
                            self.match_sink.as_ref(),
                            fill.order_id,
                            order.id(),
                            level_price,
                            fill.quantity,
                        ));
                        remaining = remaining - fill.quantity;
                        self.total_ask_quantity = self.total_ask_quantity - fill.quantity;
                    }
                    if entry.get().is_empty() {
                        entry.remove();
                    }
                    for fill in fills {
                        if fill.fully_filled {
                            self.orders.remove(&fill.order_id);
                        }
                    }
                }
            }
            Side::Sell => {
                while remaining > Quantity::ZERO {
                    let Some(mut entry) = self.bid_levels.first_entry() else {
                        break;
                    };
                    let level_price = entry.key().0;
                    if level_price < limit_price {
                        break;
                    }
                    let fills = entry.get_mut().execute_quantity(remaining, &mut self.orders);
                    for fill in &fills {
                        matches.push(Self::emit_match(
                            self.match_sink.as_ref(),
                            fill.order_id,
                            order.id(),
                            level_price,
                            fill.quantity,
                        ));
                        remaining = remaining - fill.quantity;
                        self.total_bid_quantity = self.total_bid_quantity - fill.quantity;
                    }
                    if entry.get().is_empty() {
                        entry.remove();
                    }
                    for fill in fills {
                        if fill.fully_filled {
                            self.orders.remove(&fill.order_id);
                        }
                    }
                }
            }
        }

        order.execute(initial - remaining);
        matches
    }

    /// Copies a limit residual into the book: find or create the level,
    /// append, bump the side aggregate, register the id.
    fn add_limit_order_to_book(&mut self, order: &Order) {
        if order.order_type() != OrderType::Limit || order.is_filled() {
            return;
        }
        let price = order.price();
        match order.side() {
            Side::Buy => {
                self.bid_levels
                    .entry(Reverse(price))
                    .or_insert_with(|| PriceLevel::new(price))
                    .add_order(order);
                self.total_bid_quantity = self.total_bid_quantity + order.remaining_quantity();
            }
            Side::Sell => {
                self.ask_levels
                    .entry(price)
                    .or_insert_with(|| PriceLevel::new(price))
                    .add_order(order);
                self.total_ask_quantity = self.total_ask_quantity + order.remaining_quantity();
            }
        }
        self.orders.insert(order.id(), order.clone());
    }

    fn modify_quantity_in_place(
        &mut self,
        order_id: OrderId,
        new_quantity: Quantity,
    ) -> Vec<OrderMatch> {
        let Some(order) = self.orders.get_mut(&order_id) else {
            return Vec::new();
        };
        let price = order.price();
        let side = order.side();
        let old_remaining = order.remaining_quantity();

        let modified = match side {
            Side::Buy => match self.bid_levels.get_mut(&Reverse(price)) {
                Some(level) => level.modify_order_quantity(order, new_quantity),
                None => false,
            },
            Side::Sell => match self.ask_levels.get_mut(&price) {
                Some(level) => level.modify_order_quantity(order, new_quantity),
                None => false,
            },
        };
        if modified {
            let new_remaining = order.remaining_quantity();
            match side {
                Side::Buy => {
                    self.total_bid_quantity =
                        self.total_bid_quantity - old_remaining + new_remaining;
                }
                Side::Sell => {
                    self.total_ask_quantity =
                        self.total_ask_quantity - old_remaining + new_remaining;
                }
            }
            order.set_status(OrderStatus::Replaced);
        }
        Vec::new()
    }

    /// Ask depth at or below `limit` (all depth when `None`). FOK pre-check.
    fn fillable_ask_quantity(&self, limit: Option<Price>) -> Quantity {
        let mut total = Quantity::ZERO;
        for (price, level) in &self.ask_levels {
            if let Some(limit) = limit {
                if *price > limit {
                    break;
                }
            }
            total = total + level.total_quantity();
        }
        total
    }

    /// Bid depth at or above `limit` (all depth when `None`). FOK pre-check.
    fn fillable_bid_quantity(&self, limit: Option<Price>) -> Quantity {
        let mut total = Quantity::ZERO;
        for (key, level) in &self.bid_levels {
            if let Some(limit) = limit {
                if key.0 < limit {
                    break;
                }
            }
            total = total + level.total_quantity();
        }
        total
    }

    fn remove_price_level_if_empty(&mut self, price: Price, side: Side) {
        match side {
            Side::Buy => {
                if self
                    .bid_levels
                    .get(&Reverse(price))
                    .map_or(false, |l| l.is_empty())
                {
                    self.bid_levels.remove(&Reverse(price));
                }
            }
            Side::Sell => {
                if self.ask_levels.get(&price).map_or(false, |l| l.is_empty()) {
                    self.ask_levels.remove(&price);
                }
            }
        }
    }

    fn emit_match(
        sink: &dyn MatchSink,
        maker: OrderId,
        taker: OrderId,
        price: Price,
        quantity: Quantity,
    ) -> OrderMatch {
        let m = OrderMatch::new(maker, taker, price, quantity);
        log::debug!("{}", m);
        sink.on_match(&m);
        m
    }
}

impl fmt::Display for OrderBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OrderBook[symbol={}, bids={}, asks={}, orders={}, bid_qty={}, ask_qty={}",
            self.symbol,
            self.bid_level_count(),
            self.ask_level_count(),
            self.order_count(),
            self.total_bid_quantity,
            self.total_ask_quantity,
        )?;
        match self.best_bid() {
            Some(p) => write!(f, ", best_bid={}", p)?,
            None => write!(f, ", best_bid=none")?,
        }
        match self.best_ask() {
            Some(p) => write!(f, ", best_ask={}", p)?,
            None => write!(f, ", best_ask=none")?,
        }
        match self.spread() {
            Some(p) => write!(f, ", spread={}", p)?,
            None => write!(f, ", spread=none")?,
        }
        write!(f, "]")
    }
}
