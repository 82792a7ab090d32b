//! Deterministic synthetic order flow.
//!
//! Generates a configurable stream of plausible orders for one symbol, for
//! replay tests, demos, and benchmarks. Same config (including seed) produces
//! the same sequence of orders.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::execution::OrderMatch;
use crate::order::Order;
use crate::order_book::OrderBook;
use crate::types::{OrderId, OrderType, Price, Quantity, Side, Symbol, TimeInForce, SCALE_FACTOR};

/// Configuration for the synthetic order generator. All ranges are inclusive.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// RNG seed. Same seed produces the same order stream.
    pub seed: u64,
    /// Symbol stamped on every generated order.
    pub symbol: Symbol,
    /// Number of orders produced by [`Generator::all_orders`].
    pub num_orders: usize,
    /// Probability of Buy (0.0..=1.0). Sell otherwise.
    pub buy_ratio: f64,
    /// Probability of a limit order (0.0..=1.0). Market otherwise.
    pub limit_ratio: f64,
    /// Limit price range in whole ticks. Ignored for market orders.
    pub price_min: i64,
    pub price_max: i64,
    /// Quantity range in whole units.
    pub quantity_min: i64,
    pub quantity_max: i64,
    /// Time-in-force mix: probability of GTC, then IOC; FOK takes the rest.
    pub tif_gtc_ratio: f64,
    pub tif_ioc_ratio: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            symbol: "AAPL".to_string(),
            num_orders: 1000,
            buy_ratio: 0.5,
            limit_ratio: 0.9,
            price_min: 95,
            price_max: 105,
            quantity_min: 1,
            quantity_max: 100,
            tif_gtc_ratio: 0.8,
            tif_ioc_ratio: 0.1,
        }
    }
}

/// Deterministic order stream. Create with [`Generator::new`], then pull
/// orders with [`Generator::next_order`] or [`Generator::all_orders`].
pub struct Generator {
    rng: StdRng,
    config: GeneratorConfig,
    next_order_id: u64,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            rng,
            config,
            next_order_id: 1,
        }
    }

    /// Generates the next order, advancing the id counter and RNG state.
    pub fn next_order(&mut self) -> Order {
        let order_id = OrderId(self.next_order_id);
        self.next_order_id += 1;

        let side = if self.rng.gen::<f64>() < self.config.buy_ratio {
            Side::Buy
        } else {
            Side::Sell
        };
        let is_limit = self.rng.gen::<f64>() < self.config.limit_ratio;
        let order_type = if is_limit {
            OrderType::Limit
        } else {
            OrderType::Market
        };
        let quantity = Quantity::from_raw(
            self.rng
                .gen_range(self.config.quantity_min..=self.config.quantity_max)
                * SCALE_FACTOR,
        );
        let price = if is_limit {
            Price::from_raw(
                self.rng
                    .gen_range(self.config.price_min..=self.config.price_max)
                    * SCALE_FACTOR,
            )
        } else {
            Price::ZERO
        };
        let r = self.rng.gen::<f64>();
        let time_in_force = if r < self.config.tif_gtc_ratio {
            TimeInForce::Gtc
        } else if r < self.config.tif_gtc_ratio + self.config.tif_ioc_ratio {
            TimeInForce::Ioc
        } else {
            TimeInForce::Fok
        };

        Order::with_time_in_force(
            order_id,
            self.config.symbol.clone(),
            side,
            order_type,
            quantity,
            price,
            time_in_force,
        )
    }

    /// Returns exactly `n` orders, advancing the generator state.
    pub fn take_orders(&mut self, n: usize) -> Vec<Order> {
        (0..n).map(|_| self.next_order()).collect()
    }

    /// Returns the full stream of `config.num_orders` orders.
    pub fn all_orders(&mut self) -> Vec<Order> {
        self.take_orders(self.config.num_orders)
    }
}

/// Replays orders into the book and collects every emitted match in order.
pub fn replay_into_book(
    book: &mut OrderBook,
    orders: impl IntoIterator<Item = Order>,
) -> Vec<OrderMatch> {
    let mut all_matches = Vec::new();
    for mut order in orders {
        all_matches.extend(book.add_order(&mut order));
    }
    all_matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let config = GeneratorConfig {
            seed: 42,
            num_orders: 10,
            ..Default::default()
        };
        let orders1 = Generator::new(config.clone()).all_orders();
        let orders2 = Generator::new(config).all_orders();
        assert_eq!(orders1.len(), 10);
        for (a, b) in orders1.iter().zip(orders2.iter()) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.side(), b.side());
            assert_eq!(a.order_type(), b.order_type());
            assert_eq!(a.quantity(), b.quantity());
            assert_eq!(a.price(), b.price());
            assert_eq!(a.time_in_force(), b.time_in_force());
        }
    }

    #[test]
    fn different_seed_different_stream() {
        let o1 = Generator::new(GeneratorConfig {
            seed: 1,
            num_orders: 5,
            ..Default::default()
        })
        .all_orders();
        let o2 = Generator::new(GeneratorConfig {
            seed: 2,
            num_orders: 5,
            ..Default::default()
        })
        .all_orders();
        let identical = o1.iter().zip(o2.iter()).all(|(a, b)| {
            a.side() == b.side()
                && a.price() == b.price()
                && a.quantity() == b.quantity()
                && a.order_type() == b.order_type()
        });
        assert!(!identical, "different seeds should diverge somewhere");
    }

    #[test]
    fn generated_orders_are_valid_and_in_range() {
        let config = GeneratorConfig {
            seed: 7,
            num_orders: 50,
            ..Default::default()
        };
        let lo = Price::from_raw(config.price_min * SCALE_FACTOR);
        let hi = Price::from_raw(config.price_max * SCALE_FACTOR);
        for order in Generator::new(config).all_orders() {
            assert!(order.is_valid());
            assert!(order.quantity() >= Quantity::from_raw(SCALE_FACTOR));
            if order.order_type() == OrderType::Limit {
                assert!(order.price() >= lo && order.price() <= hi);
            }
        }
    }

    #[test]
    fn replay_into_book_collects_matches() {
        let mut book = OrderBook::new("AAPL");
        let orders = Generator::new(GeneratorConfig {
            seed: 123,
            num_orders: 50,
            ..Default::default()
        })
        .all_orders();
        let matches = replay_into_book(&mut book, orders);
        for m in &matches {
            assert!(m.match_quantity > Quantity::ZERO);
        }
    }
}
