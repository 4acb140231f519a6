//! One side of the book
//!
//! Resting orders grouped by price. The bid ladder treats the highest price
//! as best, the ask ladder the lowest. Levels are kept in a BTreeMap keyed by
//! the canonical price so iteration order is deterministic and `1.0` and
//! `1.00` share a level.

use std::collections::{btree_map, BTreeMap, HashMap};

use lob_types::errors::{BookError, OrderError};
use lob_types::ids::OrderId;
use lob_types::numeric::{FixedPrice, Quantity};
use lob_types::order::{Order, Side};
use slab::Slab;

use super::price_level::{Handle, OrderNode, PriceLevel};

/// Price-ordered resting orders for one side
#[derive(Debug, Clone)]
pub struct PriceLadder {
    side: Side,
    /// Price levels keyed by canonical price (ascending)
    levels: BTreeMap<FixedPrice, PriceLevel>,
    /// Arena holding every resting order of this side
    nodes: Slab<OrderNode>,
    /// Order id -> arena slot
    locator: HashMap<OrderId, Handle>,
}

impl PriceLadder {
    /// Create an empty ladder for `side`
    pub fn new(side: Side) -> Self {
        Self::with_capacity(side, 0)
    }

    /// Create an empty ladder with room for `capacity` orders
    pub fn with_capacity(side: Side, capacity: usize) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            nodes: Slab::with_capacity(capacity),
            locator: HashMap::with_capacity(capacity),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Best price on this side, if any
    pub fn best(&self) -> Option<FixedPrice> {
        self.levels_from_best().next().map(|(price, _)| *price)
    }

    /// Oldest order at the best price
    pub fn best_order(&self) -> Option<&Order> {
        let (_, level) = self.levels_from_best().next()?;
        level.front().map(|handle| &self.nodes[handle].order)
    }

    /// Whether `quantity` more can rest at `price` without the level total
    /// overflowing
    pub fn can_rest(&self, price: FixedPrice, quantity: Quantity) -> bool {
        self.levels
            .get(&price.normalized())
            .map_or(Some(quantity), |level| level.total_quantity().checked_add(quantity))
            .is_some()
    }

    /// Append an order at the back of its price level
    ///
    /// The order is marked as resting. Fails without touching the ladder if
    /// the order has nothing left to rest, its id is already here, or its
    /// level cannot hold the extra quantity.
    pub fn insert(&mut self, mut order: Order) -> Result<(), BookError> {
        debug_assert_eq!(order.side, self.side, "order inserted on the wrong ladder");

        if !order.remaining_quantity.is_positive() {
            return Err(OrderError::InvalidQuantity(format!(
                "order {} has no remaining quantity to rest",
                order.order_id
            ))
            .into());
        }
        if self.locator.contains_key(&order.order_id) {
            return Err(BookError::DuplicateOrderId {
                order_id: order.order_id,
            });
        }
        if !self.can_rest(order.price, order.remaining_quantity) {
            return Err(OrderError::InvalidQuantity(format!(
                "order {} overflows the quantity at {}",
                order.order_id, order.price
            ))
            .into());
        }

        order.rest();
        let order_id = order.order_id;
        let level = self
            .levels
            .entry(order.price.normalized())
            .or_insert_with(PriceLevel::new);
        let handle = level.push_back(&mut self.nodes, order);
        self.locator.insert(order_id, handle);
        Ok(())
    }

    /// Lazy walk in matching priority: best level first, FIFO within a level
    ///
    /// Each call starts over from the current state.
    pub fn iter_from_best(&self) -> impl Iterator<Item = (FixedPrice, &Order)> + '_ {
        let nodes = &self.nodes;
        self.levels_from_best()
            .flat_map(move |(price, level)| level.iter(nodes).map(move |order| (*price, order)))
    }

    /// Remove an order from wherever it rests
    pub fn remove(&mut self, order_id: OrderId) -> Result<Order, BookError> {
        let handle = *self
            .locator
            .get(&order_id)
            .ok_or(BookError::OrderNotFound { order_id })?;
        let order = self.unlink(handle);
        self.locator.remove(&order_id);
        Ok(order)
    }

    /// Fill a resting order in place
    ///
    /// A partially filled order keeps its queue position. An order filled
    /// completely is taken out of the ladder and returned.
    pub fn fill(&mut self, order_id: OrderId, quantity: Quantity) -> Result<Option<Order>, BookError> {
        let handle = *self
            .locator
            .get(&order_id)
            .ok_or(BookError::OrderNotFound { order_id })?;

        let node = &mut self.nodes[handle];
        if quantity > node.order.remaining_quantity {
            return Err(OrderError::InvalidQuantity(format!(
                "fill of {quantity} exceeds remaining {} on order {order_id}",
                node.order.remaining_quantity
            ))
            .into());
        }

        if quantity == node.order.remaining_quantity {
            let mut order = self.unlink(handle);
            self.locator.remove(&order_id);
            order.fill(quantity);
            return Ok(Some(order));
        }

        node.order.fill(quantity);
        let key = node.order.price.normalized();
        if let Some(level) = self.levels.get_mut(&key) {
            level.reduce(quantity);
        }
        Ok(None)
    }

    /// `(price, total remaining)` per level, best first
    pub fn aggregate_levels(&self) -> Vec<(FixedPrice, Quantity)> {
        self.depth(usize::MAX)
    }

    /// Top `levels` levels, best first
    pub fn depth(&self, levels: usize) -> Vec<(FixedPrice, Quantity)> {
        self.levels_from_best()
            .take(levels)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.locator
            .get(&order_id)
            .map(|handle| &self.nodes[*handle].order)
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.locator.contains_key(&order_id)
    }

    /// Number of resting orders
    pub fn len(&self) -> usize {
        self.locator.len()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locator.is_empty()
    }

    /// Structural consistency check used by tests
    ///
    /// Every level is non-empty and agrees with its orders, every order sits
    /// at its own price, and the locator covers exactly the arena.
    pub fn check_invariants(&self) -> bool {
        let mut seen = 0usize;
        for (price, level) in &self.levels {
            if level.is_empty() {
                return false;
            }
            let orders: Vec<&Order> = level.iter(&self.nodes).collect();
            if orders.len() != level.order_count() {
                return false;
            }
            let total: Quantity = orders.iter().map(|o| o.remaining_quantity).sum();
            if total != level.total_quantity() {
                return false;
            }
            for order in orders {
                if order.price != *price
                    || order.side != self.side
                    || !order.remaining_quantity.is_positive()
                    || self.get(order.order_id).map(|o| o.sequence) != Some(order.sequence)
                {
                    return false;
                }
            }
            seen += level.order_count();
        }
        seen == self.locator.len() && seen == self.nodes.len()
    }

    fn unlink(&mut self, handle: Handle) -> Order {
        let key = self.nodes[handle].order.price.normalized();
        let level = self
            .levels
            .get_mut(&key)
            .expect("resting order without a price level");
        let order = level.unlink(&mut self.nodes, handle);
        if level.is_empty() {
            self.levels.remove(&key);
        }
        order
    }

    fn levels_from_best(&self) -> LevelsFromBest<'_> {
        LevelsFromBest {
            inner: self.levels.iter(),
            descending: self.side == Side::BUY,
        }
    }
}

/// Level iterator in priority order for either side
struct LevelsFromBest<'a> {
    inner: btree_map::Iter<'a, FixedPrice, PriceLevel>,
    descending: bool,
}

impl<'a> Iterator for LevelsFromBest<'a> {
    type Item = (&'a FixedPrice, &'a PriceLevel);

    fn next(&mut self) -> Option<Self::Item> {
        if self.descending {
            self.inner.next_back()
        } else {
            self.inner.next()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lob_types::order::OrderStatus;
    use lob_types::sequence::Stamp;

    fn order(id: u64, side: Side, price: &str, qty: &str) -> Order {
        Order::new(
            OrderId::new(id),
            side,
            price.parse().unwrap(),
            qty.parse().unwrap(),
            Stamp { sequence: id, arrival_time: id as i64 },
        )
        .unwrap()
    }

    fn walk(ladder: &PriceLadder) -> Vec<u64> {
        ladder.iter_from_best().map(|(_, o)| o.order_id.as_u64()).collect()
    }

    #[test]
    fn test_ask_ladder_best_is_lowest() {
        let mut asks = PriceLadder::new(Side::SELL);
        asks.insert(order(1, Side::SELL, "10.02", "1")).unwrap();
        asks.insert(order(2, Side::SELL, "10.01", "1")).unwrap();
        asks.insert(order(3, Side::SELL, "10.03", "1")).unwrap();

        assert_eq!(asks.best(), Some("10.01".parse().unwrap()));
        assert_eq!(walk(&asks), vec![2, 1, 3]);
    }

    #[test]
    fn test_bid_ladder_best_is_highest() {
        let mut bids = PriceLadder::new(Side::BUY);
        bids.insert(order(1, Side::BUY, "9.90", "1")).unwrap();
        bids.insert(order(2, Side::BUY, "9.95", "1")).unwrap();
        bids.insert(order(3, Side::BUY, "9.80", "1")).unwrap();

        assert_eq!(bids.best(), Some("9.95".parse().unwrap()));
        assert_eq!(walk(&bids), vec![2, 1, 3]);
    }

    #[test]
    fn test_fifo_within_level_and_equal_values_share_level() {
        let mut asks = PriceLadder::new(Side::SELL);
        asks.insert(order(1, Side::SELL, "10.0", "1")).unwrap();
        asks.insert(order(2, Side::SELL, "10.00", "2")).unwrap();
        asks.insert(order(3, Side::SELL, "10", "3")).unwrap();

        assert_eq!(asks.level_count(), 1);
        assert_eq!(walk(&asks), vec![1, 2, 3]);
        assert_eq!(
            asks.aggregate_levels(),
            vec![(FixedPrice::from_u64(10), Quantity::from_u64(6))]
        );
        assert_eq!(asks.best_order().unwrap().order_id, OrderId::new(1));
    }

    #[test]
    fn test_insert_marks_resting_and_rejects_duplicates() {
        let mut bids = PriceLadder::new(Side::BUY);
        bids.insert(order(7, Side::BUY, "5", "1")).unwrap();
        assert_eq!(bids.get(OrderId::new(7)).unwrap().status, OrderStatus::Resting);

        let err = bids.insert(order(7, Side::BUY, "6", "1")).unwrap_err();
        assert_eq!(err, BookError::DuplicateOrderId { order_id: OrderId::new(7) });
        assert_eq!(bids.len(), 1);
        assert_eq!(bids.level_count(), 1);
    }

    #[test]
    fn test_insert_rejects_exhausted_order() {
        let mut bids = PriceLadder::new(Side::BUY);
        let mut spent = order(1, Side::BUY, "5", "1");
        spent.fill(Quantity::from_u64(1));

        let err = bids.insert(spent).unwrap_err();
        assert!(err.is_invalid_quantity());
        assert!(bids.is_empty());
    }

    #[test]
    fn test_remove_deletes_empty_level() {
        let mut asks = PriceLadder::new(Side::SELL);
        asks.insert(order(1, Side::SELL, "10.01", "1")).unwrap();
        asks.insert(order(2, Side::SELL, "10.02", "1")).unwrap();

        let removed = asks.remove(OrderId::new(1)).unwrap();
        assert_eq!(removed.order_id, OrderId::new(1));
        assert_eq!(asks.level_count(), 1);
        assert_eq!(asks.best(), Some("10.02".parse().unwrap()));
        assert!(asks.check_invariants());

        let err = asks.remove(OrderId::new(1)).unwrap_err();
        assert_eq!(err, BookError::OrderNotFound { order_id: OrderId::new(1) });
    }

    #[test]
    fn test_level_total_overflow_rejected_without_change() {
        let max = rust_decimal::Decimal::MAX.to_string();
        let mut asks = PriceLadder::new(Side::SELL);
        asks.insert(order(1, Side::SELL, "10", &max)).unwrap();
        assert!(!asks.can_rest("10.0".parse().unwrap(), Quantity::from_u64(1)));
        assert!(asks.can_rest("11".parse().unwrap(), Quantity::from_u64(1)));

        let err = asks.insert(order(2, Side::SELL, "10", &max)).unwrap_err();
        assert!(err.is_invalid_quantity());
        assert!(!asks.contains(OrderId::new(2)));
        assert_eq!(asks.len(), 1);
        let level_total: Quantity = max.parse().unwrap();
        assert_eq!(asks.depth(1), vec![(FixedPrice::from_u64(10), level_total)]);
        assert!(asks.check_invariants());

        // Another price level is unaffected
        asks.insert(order(3, Side::SELL, "11", &max)).unwrap();
        assert_eq!(walk(&asks), vec![1, 3]);
        assert!(asks.check_invariants());
    }

    #[test]
    fn test_remove_from_middle_keeps_priority() {
        let mut asks = PriceLadder::new(Side::SELL);
        for id in 1..=4 {
            asks.insert(order(id, Side::SELL, "10", "1")).unwrap();
        }
        asks.remove(OrderId::new(2)).unwrap();
        asks.remove(OrderId::new(4)).unwrap();
        asks.insert(order(5, Side::SELL, "10", "1")).unwrap();

        assert_eq!(walk(&asks), vec![1, 3, 5]);
        assert!(asks.check_invariants());
    }

    #[test]
    fn test_partial_fill_keeps_queue_position() {
        let mut asks = PriceLadder::new(Side::SELL);
        asks.insert(order(1, Side::SELL, "10", "5")).unwrap();
        asks.insert(order(2, Side::SELL, "10", "5")).unwrap();

        let done = asks.fill(OrderId::new(1), "2".parse().unwrap()).unwrap();
        assert!(done.is_none());

        let front = asks.best_order().unwrap();
        assert_eq!(front.order_id, OrderId::new(1));
        assert_eq!(front.remaining_quantity, "3".parse().unwrap());
        assert_eq!(front.status, OrderStatus::PartiallyFilled);
        assert_eq!(asks.depth(1), vec![(FixedPrice::from_u64(10), Quantity::from_u64(8))]);
        assert!(asks.check_invariants());
    }

    #[test]
    fn test_complete_fill_removes_order() {
        let mut asks = PriceLadder::new(Side::SELL);
        asks.insert(order(1, Side::SELL, "10", "5")).unwrap();

        let filled = asks.fill(OrderId::new(1), Quantity::from_u64(5)).unwrap().unwrap();
        assert_eq!(filled.status, OrderStatus::Filled);
        assert!(asks.is_empty());
        assert_eq!(asks.level_count(), 0);
        assert_eq!(asks.best(), None);
    }

    #[test]
    fn test_overfill_rejected_without_change() {
        let mut asks = PriceLadder::new(Side::SELL);
        asks.insert(order(1, Side::SELL, "10", "1")).unwrap();

        let err = asks.fill(OrderId::new(1), Quantity::from_u64(2)).unwrap_err();
        assert!(err.is_invalid_quantity());
        assert_eq!(asks.get(OrderId::new(1)).unwrap().remaining_quantity, Quantity::from_u64(1));
    }

    #[test]
    fn test_depth_limits_levels() {
        let mut bids = PriceLadder::new(Side::BUY);
        for (id, price) in [(1, "1"), (2, "2"), (3, "3")] {
            bids.insert(order(id, Side::BUY, price, "1")).unwrap();
        }
        let top = bids.depth(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, FixedPrice::from_u64(3));
        assert_eq!(top[1].0, FixedPrice::from_u64(2));
    }

    #[test]
    fn test_iter_restarts_from_current_state() {
        let mut asks = PriceLadder::new(Side::SELL);
        asks.insert(order(1, Side::SELL, "1", "1")).unwrap();
        asks.insert(order(2, Side::SELL, "2", "1")).unwrap();
        assert_eq!(walk(&asks), vec![1, 2]);

        asks.remove(OrderId::new(1)).unwrap();
        assert_eq!(walk(&asks), vec![2]);
    }
}
