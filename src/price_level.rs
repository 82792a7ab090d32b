//! A single price level: FIFO queue of resting orders at one price.
//!
//! The level holds order ids, not orders; order state lives in the book's
//! registry and is passed in by the book. The FIFO is a doubly-linked list
//! threaded through an id-keyed node map, giving O(1) append, O(1)
//! remove-by-id, and O(1) head access while preserving arrival order.

use std::collections::HashMap;
use std::fmt;

use crate::order::Order;
use crate::types::{OrderId, Price, Quantity};

/// One execution against a resting order, produced by
/// [`PriceLevel::execute_quantity`].
#[derive(Clone, Copy, Debug)]
pub struct Fill {
    pub order_id: OrderId,
    pub quantity: Quantity,
    /// True if the resting order was fully filled and left the level.
    pub fully_filled: bool,
}

#[derive(Clone, Copy, Debug)]
struct LevelNode {
    prev: Option<OrderId>,
    next: Option<OrderId>,
}

/// FIFO queue of resting orders at a single price, with an incrementally
/// maintained total of their remaining quantities.
#[derive(Clone, Debug)]
pub struct PriceLevel {
    price: Price,
    total_quantity: Quantity,
    head: Option<OrderId>,
    tail: Option<OrderId>,
    nodes: HashMap<OrderId, LevelNode>,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            total_quantity: Quantity::ZERO,
            head: None,
            tail: None,
            nodes: HashMap::new(),
        }
    }

    /// Appends an order at the FIFO tail.
    ///
    /// Preconditions: the order's price matches the level and it has
    /// remaining quantity; violations (and duplicate ids) are silently
    /// dropped. The book never constructs such a call.
    pub fn add_order(&mut self, order: &Order) {
        if order.price() != self.price
            || order.remaining_quantity() <= Quantity::ZERO
            || self.nodes.contains_key(&order.id())
        {
            return;
        }
        self.push_back(order.id());
        self.total_quantity = self.total_quantity + order.remaining_quantity();
    }

    /// Removes an order by id. Returns false if it is not at this level.
    pub fn remove_order(&mut self, order: &Order) -> bool {
        if !self.unlink(order.id()) {
            return false;
        }
        self.total_quantity = self.total_quantity - order.remaining_quantity();
        true
    }

    /// Changes an order's size in place without touching its FIFO position.
    ///
    /// Rejects sizes below what is already executed. The order must be the
    /// registry entry for an id resting at this level.
    pub fn modify_order_quantity(&mut self, order: &mut Order, new_quantity: Quantity) -> bool {
        if !self.nodes.contains_key(&order.id()) {
            return false;
        }
        if new_quantity < order.executed_quantity() {
            return false;
        }
        let old_remaining = order.remaining_quantity();
        order.set_quantity(new_quantity);
        let new_remaining = order.remaining_quantity();
        self.total_quantity = self.total_quantity - old_remaining + new_remaining;
        true
    }

    /// Executes up to `quantity` against the FIFO, oldest order first.
    ///
    /// Each head order is executed for `min(remaining, left)`; fully filled
    /// orders are unlinked. Zero-delta fills are never emitted. `orders` is
    /// the book's registry; executed orders are mutated through it but stay
    /// registered (the book deregisters filled makers).
    pub fn execute_quantity(
        &mut self,
        quantity: Quantity,
        orders: &mut HashMap<OrderId, Order>,
    ) -> Vec<Fill> {
        let mut fills = Vec::new();
        if quantity <= Quantity::ZERO {
            return fills;
        }
        let mut left = quantity;
        while left > Quantity::ZERO {
            let Some(id) = self.head else {
                break;
            };
            let Some(order) = orders.get_mut(&id) else {
                // Stale handle with no registry entry: drop it and move on.
                self.unlink(id);
                continue;
            };
            let delta = left.min(order.remaining_quantity());
            if delta <= Quantity::ZERO {
                self.unlink(id);
                continue;
            }
            order.execute(delta);
            let fully_filled = order.is_filled();
            self.total_quantity = self.total_quantity - delta;
            left = left - delta;
            fills.push(Fill {
                order_id: id,
                quantity: delta,
                fully_filled,
            });
            if fully_filled {
                self.unlink(id);
            }
        }
        fills
    }

    /// Oldest resting order at this level, if any.
    pub fn first_order_id(&self) -> Option<OrderId> {
        self.head
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.nodes.contains_key(&order_id)
    }

    /// All resting order ids in FIFO order.
    pub fn order_ids(&self) -> Vec<OrderId> {
        let mut ids = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while let Some(id) = cursor {
            ids.push(id);
            cursor = self.nodes.get(&id).and_then(|n| n.next);
        }
        ids
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    pub fn order_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push_back(&mut self, id: OrderId) {
        let node = LevelNode {
            prev: self.tail,
            next: None,
        };
        if let Some(tail) = self.tail {
            if let Some(t) = self.nodes.get_mut(&tail) {
                t.next = Some(id);
            }
        }
        self.nodes.insert(id, node);
        self.tail = Some(id);
        if self.head.is_none() {
            self.head = Some(id);
        }
    }

    fn unlink(&mut self, id: OrderId) -> bool {
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };
        match node.prev {
            Some(prev) => {
                if let Some(p) = self.nodes.get_mut(&prev) {
                    p.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => {
                if let Some(n) = self.nodes.get_mut(&next) {
                    n.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }
        true
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PriceLevel[price={}, orders={}, quantity={}]",
            self.price,
            self.order_count(),
            self.total_quantity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderType, Side};

    fn order(id: u64, qty: f64, px: f64) -> Order {
        Order::new(
            OrderId(id),
            "AAPL",
            Side::Sell,
            OrderType::Limit,
            Quantity::from_f64(qty),
            Price::from_f64(px),
        )
    }

    fn registry(orders: Vec<Order>) -> HashMap<OrderId, Order> {
        orders.into_iter().map(|o| (o.id(), o)).collect()
    }

    #[test]
    fn add_preserves_fifo_and_total() {
        let mut level = PriceLevel::new(Price::from_f64(100.0));
        let (a, b, c) = (order(1, 1.0, 100.0), order(2, 2.0, 100.0), order(3, 3.0, 100.0));
        level.add_order(&a);
        level.add_order(&b);
        level.add_order(&c);

        assert_eq!(level.order_count(), 3);
        assert_eq!(level.total_quantity(), Quantity::from_f64(6.0));
        assert_eq!(level.first_order_id(), Some(OrderId(1)));
        assert_eq!(
            level.order_ids(),
            vec![OrderId(1), OrderId(2), OrderId(3)]
        );
    }

    #[test]
    fn add_rejects_price_mismatch_and_spent_orders() {
        let mut level = PriceLevel::new(Price::from_f64(100.0));
        level.add_order(&order(1, 1.0, 101.0));
        assert!(level.is_empty());

        let mut spent = order(2, 1.0, 100.0);
        spent.execute(Quantity::from_f64(1.0));
        level.add_order(&spent);
        assert!(level.is_empty());
    }

    #[test]
    fn remove_from_middle_keeps_order() {
        let mut level = PriceLevel::new(Price::from_f64(100.0));
        let (a, b, c) = (order(1, 1.0, 100.0), order(2, 2.0, 100.0), order(3, 3.0, 100.0));
        level.add_order(&a);
        level.add_order(&b);
        level.add_order(&c);

        assert!(level.remove_order(&b));
        assert_eq!(level.order_ids(), vec![OrderId(1), OrderId(3)]);
        assert_eq!(level.total_quantity(), Quantity::from_f64(4.0));
        assert!(!level.remove_order(&b));
        assert!(!level.contains(OrderId(2)));
    }

    #[test]
    fn remove_head_and_tail_relink() {
        let mut level = PriceLevel::new(Price::from_f64(100.0));
        let (a, b) = (order(1, 1.0, 100.0), order(2, 2.0, 100.0));
        level.add_order(&a);
        level.add_order(&b);

        assert!(level.remove_order(&a));
        assert_eq!(level.first_order_id(), Some(OrderId(2)));
        assert!(level.remove_order(&b));
        assert!(level.is_empty());
        assert_eq!(level.first_order_id(), None);
        assert_eq!(level.total_quantity(), Quantity::ZERO);
    }

    #[test]
    fn modify_quantity_in_place() {
        let mut level = PriceLevel::new(Price::from_f64(100.0));
        let mut reg = registry(vec![order(1, 10.0, 100.0)]);
        level.add_order(&reg[&OrderId(1)]);

        let o = reg.get_mut(&OrderId(1)).unwrap();
        assert!(level.modify_order_quantity(o, Quantity::from_f64(4.0)));
        assert_eq!(level.total_quantity(), Quantity::from_f64(4.0));
        assert_eq!(o.quantity(), Quantity::from_f64(4.0));
    }

    #[test]
    fn modify_rejects_below_executed_floor() {
        let mut level = PriceLevel::new(Price::from_f64(100.0));
        let mut reg = registry(vec![order(1, 10.0, 100.0)]);
        level.add_order(&reg[&OrderId(1)]);

        let o = reg.get_mut(&OrderId(1)).unwrap();
        o.execute(Quantity::from_f64(6.0));
        assert!(!level.modify_order_quantity(o, Quantity::from_f64(5.0)));
        assert_eq!(o.quantity(), Quantity::from_f64(10.0));
    }

    #[test]
    fn modify_unknown_id_rejected() {
        let mut level = PriceLevel::new(Price::from_f64(100.0));
        let mut reg = registry(vec![order(9, 10.0, 100.0)]);
        let o = reg.get_mut(&OrderId(9)).unwrap();
        assert!(!level.modify_order_quantity(o, Quantity::from_f64(5.0)));
    }

    #[test]
    fn execute_partial_leaves_head_in_place() {
        let mut level = PriceLevel::new(Price::from_f64(100.0));
        let mut reg = registry(vec![order(1, 10.0, 100.0)]);
        level.add_order(&reg[&OrderId(1)]);

        let fills = level.execute_quantity(Quantity::from_f64(4.0), &mut reg);
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].order_id, OrderId(1));
        assert_eq!(fills[0].quantity, Quantity::from_f64(4.0));
        assert!(!fills[0].fully_filled);

        assert_eq!(level.first_order_id(), Some(OrderId(1)));
        assert_eq!(level.total_quantity(), Quantity::from_f64(6.0));
        assert_eq!(
            reg[&OrderId(1)].remaining_quantity(),
            Quantity::from_f64(6.0)
        );
    }

    #[test]
    fn execute_drains_fifo_across_orders() {
        let mut level = PriceLevel::new(Price::from_f64(100.0));
        let mut reg = registry(vec![
            order(1, 3.0, 100.0),
            order(2, 3.0, 100.0),
            order(3, 3.0, 100.0),
        ]);
        for id in 1..=3 {
            level.add_order(&reg[&OrderId(id)]);
        }

        let fills = level.execute_quantity(Quantity::from_f64(7.0), &mut reg);
        assert_eq!(fills.len(), 3);
        assert_eq!(fills[0].order_id, OrderId(1));
        assert!(fills[0].fully_filled);
        assert_eq!(fills[1].order_id, OrderId(2));
        assert!(fills[1].fully_filled);
        assert_eq!(fills[2].order_id, OrderId(3));
        assert_eq!(fills[2].quantity, Quantity::from_f64(1.0));
        assert!(!fills[2].fully_filled);

        assert_eq!(level.order_count(), 1);
        assert_eq!(level.total_quantity(), Quantity::from_f64(2.0));
    }

    #[test]
    fn execute_more_than_available_stops_at_empty() {
        let mut level = PriceLevel::new(Price::from_f64(100.0));
        let mut reg = registry(vec![order(1, 2.0, 100.0)]);
        level.add_order(&reg[&OrderId(1)]);

        let fills = level.execute_quantity(Quantity::from_f64(10.0), &mut reg);
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].quantity, Quantity::from_f64(2.0));
        assert!(level.is_empty());
        assert_eq!(level.total_quantity(), Quantity::ZERO);
    }

    #[test]
    fn execute_zero_request_emits_nothing() {
        let mut level = PriceLevel::new(Price::from_f64(100.0));
        let mut reg = registry(vec![order(1, 2.0, 100.0)]);
        level.add_order(&reg[&OrderId(1)]);

        assert!(level.execute_quantity(Quantity::ZERO, &mut reg).is_empty());
        assert_eq!(level.total_quantity(), Quantity::from_f64(2.0));
    }

    #[test]
    fn display_text_form() {
        let mut level = PriceLevel::new(Price::from_f64(100.0));
        level.add_order(&order(1, 10.0, 100.0));
        assert_eq!(
            level.to_string(),
            "PriceLevel[price=100.0000, orders=1, quantity=10.0000]"
        );
    }
}
