//! Matching engine core
//!
//! Main coordinator for order book and matching logic

use tracing::{debug, info, warn};

use lob_types::errors::{BookError, OrderError};
use lob_types::ids::OrderId;
use lob_types::numeric::{FixedPrice, Quantity};
use lob_types::order::Order;
use lob_types::trade::Trade;

use crate::book::OrderBook;
use crate::config::EngineConfig;
use crate::matching::{crossing, executor};
use crate::view::{BookSnapshot, BookView};

/// Running totals kept by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub orders_accepted: u64,
    pub orders_rejected: u64,
    /// Crossings executed (each produces two trade reports)
    pub crossings: u64,
    pub orders_canceled: u64,
}

/// Price-time priority matching engine for one instrument
///
/// Takes `&mut self` for every mutation, so a single owner serialises
/// commands. Every operation validates before it mutates: an error leaves
/// the book unchanged.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    book: OrderBook,
    config: EngineConfig,
    /// Highest intake sequence accepted so far
    last_sequence: Option<u64>,
    stats: EngineStats,
}

impl MatchingEngine {
    /// Create an engine with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        info!(
            order_capacity = config.order_capacity,
            snapshot_depth = config.snapshot_depth,
            "MatchingEngine initialized"
        );
        Self {
            book: OrderBook::with_capacity(config.order_capacity),
            config,
            last_sequence: None,
            stats: EngineStats::default(),
        }
    }

    /// Submit an order to the matching engine
    ///
    /// The order crosses the opposite ladder from best price outward until
    /// it is filled or the next resting order no longer crosses. Any
    /// remainder rests on the order's own side. Returns the trade reports in
    /// emission order: for each crossing, the incoming order's report then
    /// the resting order's.
    pub fn submit(&mut self, mut order: Order) -> Result<Vec<Trade>, BookError> {
        if let Err(err) = self.validate(&order) {
            self.stats.orders_rejected += 1;
            warn!(order_id = %order.order_id, error = %err, "Rejecting order");
            return Err(err);
        }

        if let Some(last) = self.last_sequence {
            if order.sequence <= last {
                warn!(
                    order_id = %order.order_id,
                    last_sequence = last,
                    received_sequence = order.sequence,
                    "Non-monotonic intake sequence"
                );
            }
        }
        self.last_sequence = Some(self.last_sequence.map_or(order.sequence, |s| s.max(order.sequence)));
        self.stats.orders_accepted += 1;

        info!(
            order_id = %order.order_id,
            side = ?order.side,
            price = %order.price,
            quantity = %order.remaining_quantity,
            sequence = order.sequence,
            "Order accepted"
        );

        let trades = self.match_order(&mut order)?;

        if order.is_filled() {
            debug!(order_id = %order.order_id, trades = trades.len(), "Order fully filled");
        } else {
            debug!(
                order_id = %order.order_id,
                price = %order.price,
                remaining = %order.remaining_quantity,
                "Resting remainder"
            );
            self.book.rest(order)?;
        }

        Ok(trades)
    }

    /// Walk the opposite ladder, re-deriving its best order after each fill
    fn match_order(&mut self, order: &mut Order) -> Result<Vec<Trade>, BookError> {
        let opposite = order.side.opposite();
        let mut trades = Vec::new();

        while let Some(resting) = self.book.ladder(opposite).best_order() {
            if !crossing::incoming_can_match(order.side, order.price, resting.price) {
                break;
            }

            let execution = executor::execute(order, resting);
            let resting_id = resting.order_id;

            debug!(
                incoming = %order.order_id,
                resting = %resting_id,
                price = %execution.resting_trade.price,
                quantity = %execution.quantity,
                outcome = ?execution.outcome,
                "Crossing executed"
            );

            order.fill(execution.quantity);
            self.book.fill_resting(opposite, resting_id, execution.quantity)?;
            self.stats.crossings += 1;

            let incoming_done = execution.incoming_done();
            trades.push(execution.incoming_trade);
            trades.push(execution.resting_trade);

            if incoming_done {
                break;
            }
        }

        Ok(trades)
    }

    fn validate(&self, order: &Order) -> Result<(), BookError> {
        if !order.remaining_quantity.is_positive() {
            return Err(OrderError::InvalidQuantity(format!(
                "order {} has no remaining quantity",
                order.order_id
            ))
            .into());
        }
        if order.remaining_quantity > order.quantity {
            return Err(OrderError::InvalidQuantity(format!(
                "order {} remaining {} exceeds quantity {}",
                order.order_id, order.remaining_quantity, order.quantity
            ))
            .into());
        }
        if self.book.contains(order.order_id) {
            return Err(BookError::DuplicateOrderId {
                order_id: order.order_id,
            });
        }
        // An own-side level at this price means the order cannot cross, so
        // the full quantity is what would rest
        if !self.book.ladder(order.side).can_rest(order.price, order.remaining_quantity) {
            return Err(OrderError::InvalidQuantity(format!(
                "order {} overflows the quantity resting at {}",
                order.order_id, order.price
            ))
            .into());
        }
        Ok(())
    }

    /// Cancel a resting order
    ///
    /// Removes the whole remainder and returns the order with status
    /// `Cancelled`. Fails with `OrderNotFound` if the id is not resting.
    pub fn cancel(&mut self, order_id: OrderId) -> Result<Order, BookError> {
        let mut order = match self.book.remove(order_id) {
            Ok(order) => order,
            Err(err) => {
                warn!(order_id = %order_id, error = %err, "Cancel rejected");
                return Err(err);
            }
        };
        order.cancel();
        self.stats.orders_canceled += 1;

        info!(
            order_id = %order_id,
            side = ?order.side,
            price = %order.price,
            unfilled = %order.remaining_quantity,
            "Order canceled"
        );
        Ok(order)
    }

    /// Look up a resting order
    pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
        self.book.get_order(order_id)
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Snapshot at the configured depth
    pub fn snapshot(&self) -> BookSnapshot {
        self.book.snapshot(self.config.snapshot_depth)
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BookView for MatchingEngine {
    fn best_bid(&self) -> Option<FixedPrice> {
        self.book.best_bid()
    }

    fn best_ask(&self) -> Option<FixedPrice> {
        self.book.best_ask()
    }

    fn bid_levels(&self) -> Vec<(FixedPrice, Quantity)> {
        self.book.bid_levels()
    }

    fn ask_levels(&self) -> Vec<(FixedPrice, Quantity)> {
        self.book.ask_levels()
    }

    fn order_count(&self) -> usize {
        self.book.order_count()
    }
}
