//! Two-sided book for a single instrument

use std::collections::HashMap;

use lob_types::errors::BookError;
use lob_types::ids::OrderId;
use lob_types::numeric::{FixedPrice, Quantity};
use lob_types::order::{Order, Side};

use super::ladder::PriceLadder;
use crate::view::{BookSnapshot, BookView};

/// Bid and ask ladders plus the id index
///
/// An id is in the index iff its order rests in exactly one ladder.
#[derive(Debug, Clone)]
pub struct OrderBook {
    bids: PriceLadder,
    asks: PriceLadder,
    /// Live order id -> side it rests on
    index: HashMap<OrderId, Side>,
    /// Bumped on every mutation
    version: u64,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Preallocate room for `capacity` resting orders per side
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bids: PriceLadder::with_capacity(Side::BUY, capacity),
            asks: PriceLadder::with_capacity(Side::SELL, capacity),
            index: HashMap::with_capacity(capacity),
            version: 0,
        }
    }

    pub fn ladder(&self, side: Side) -> &PriceLadder {
        match side {
            Side::BUY => &self.bids,
            Side::SELL => &self.asks,
        }
    }

    fn ladder_mut(&mut self, side: Side) -> &mut PriceLadder {
        match side {
            Side::BUY => &mut self.bids,
            Side::SELL => &mut self.asks,
        }
    }

    pub fn bids(&self) -> &PriceLadder {
        &self.bids
    }

    pub fn asks(&self) -> &PriceLadder {
        &self.asks
    }

    /// True while the id rests on either side
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.index.contains_key(&order_id)
    }

    pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
        let side = self.index.get(&order_id)?;
        self.ladder(*side).get(order_id)
    }

    /// Number of mutations applied so far
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Place an order on its own side
    pub(crate) fn rest(&mut self, order: Order) -> Result<(), BookError> {
        let order_id = order.order_id;
        if self.contains(order_id) {
            return Err(BookError::DuplicateOrderId { order_id });
        }
        let side = order.side;
        self.ladder_mut(side).insert(order)?;
        self.index.insert(order_id, side);
        self.version += 1;
        Ok(())
    }

    /// Take a resting order out of the book
    pub(crate) fn remove(&mut self, order_id: OrderId) -> Result<Order, BookError> {
        let side = *self
            .index
            .get(&order_id)
            .ok_or(BookError::OrderNotFound { order_id })?;
        let order = self.ladder_mut(side).remove(order_id)?;
        self.index.remove(&order_id);
        self.version += 1;
        Ok(order)
    }

    /// Fill a resting order; returns it if the fill used it up
    pub(crate) fn fill_resting(
        &mut self,
        side: Side,
        order_id: OrderId,
        quantity: Quantity,
    ) -> Result<Option<Order>, BookError> {
        let done = self.ladder_mut(side).fill(order_id, quantity)?;
        if done.is_some() {
            self.index.remove(&order_id);
        }
        self.version += 1;
        Ok(done)
    }

    /// Immutable copy of the top `depth` levels per side (0 = all)
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        let depth = if depth == 0 { usize::MAX } else { depth };
        BookSnapshot {
            sequence: self.version,
            bids: self.bids.depth(depth),
            asks: self.asks.depth(depth),
            order_count: self.order_count(),
        }
    }

    /// Index and ladders agree, and the book is not crossed
    pub fn check_invariants(&self) -> bool {
        if !self.bids.check_invariants() || !self.asks.check_invariants() {
            return false;
        }
        if self.index.len() != self.bids.len() + self.asks.len() {
            return false;
        }
        let indexed = self
            .index
            .iter()
            .all(|(order_id, side)| self.ladder(*side).contains(*order_id));
        let uncrossed = match (self.bids.best(), self.asks.best()) {
            (Some(bid), Some(ask)) => bid < ask,
            _ => true,
        };
        indexed && uncrossed
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl BookView for OrderBook {
    fn best_bid(&self) -> Option<FixedPrice> {
        self.bids.best()
    }

    fn best_ask(&self) -> Option<FixedPrice> {
        self.asks.best()
    }

    fn bid_levels(&self) -> Vec<(FixedPrice, Quantity)> {
        self.bids.aggregate_levels()
    }

    fn ask_levels(&self) -> Vec<(FixedPrice, Quantity)> {
        self.asks.aggregate_levels()
    }

    fn order_count(&self) -> usize {
        self.index.len()
    }
}
