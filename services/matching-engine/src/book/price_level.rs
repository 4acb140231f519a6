//! Price level implementation with FIFO queue
//!
//! A price level contains all orders resting at one price. Orders live in
//! the ladder's slab arena; the level threads them into a doubly-linked
//! list so any order can be unlinked in O(1) while the rest keep their
//! time priority.

use lob_types::numeric::Quantity;
use lob_types::order::Order;
use slab::Slab;

/// Arena slot of a resting order
pub(crate) type Handle = usize;

/// Resting order plus its queue links
#[derive(Debug, Clone)]
pub(crate) struct OrderNode {
    pub(crate) order: Order,
    prev: Option<Handle>,
    next: Option<Handle>,
}

/// A price level containing orders at a specific price
///
/// Maintains strict FIFO ordering for time-priority matching.
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    head: Option<Handle>,
    tail: Option<Handle>,
    order_count: usize,
    /// Total remaining quantity available at this level
    total_quantity: Quantity,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an order at the back of the queue (time priority)
    ///
    /// The caller ensures the new total fits, see `PriceLadder::can_rest`.
    pub(crate) fn push_back(&mut self, nodes: &mut Slab<OrderNode>, order: Order) -> Handle {
        let quantity = order.remaining_quantity;
        let handle = nodes.insert(OrderNode {
            order,
            prev: self.tail,
            next: None,
        });

        match self.tail {
            Some(tail) => nodes[tail].next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        self.order_count += 1;
        self.total_quantity = self.total_quantity + quantity;
        handle
    }

    /// Unlink an order from anywhere in the queue and free its slot
    pub(crate) fn unlink(&mut self, nodes: &mut Slab<OrderNode>, handle: Handle) -> Order {
        let node = nodes.remove(handle);

        match node.prev {
            Some(prev) => nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }

        self.order_count -= 1;
        self.total_quantity = self.total_quantity - node.order.remaining_quantity;
        node.order
    }

    /// Account for a partial fill of one of this level's orders
    pub(crate) fn reduce(&mut self, quantity: Quantity) {
        self.total_quantity = self.total_quantity - quantity;
    }

    /// Handle of the oldest order
    pub(crate) fn front(&self) -> Option<Handle> {
        self.head
    }

    /// Orders from oldest to newest
    pub(crate) fn iter<'a>(&self, nodes: &'a Slab<OrderNode>) -> LevelIter<'a> {
        LevelIter {
            nodes,
            cursor: self.head,
        }
    }

    /// Check if the price level is empty
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Get the total quantity at this price level
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Get the number of orders at this level
    pub fn order_count(&self) -> usize {
        self.order_count
    }
}

/// FIFO walk over one level
pub(crate) struct LevelIter<'a> {
    nodes: &'a Slab<OrderNode>,
    cursor: Option<Handle>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.nodes[self.cursor?];
        self.cursor = node.next;
        Some(&node.order)
    }
}
