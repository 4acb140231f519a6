//! Order lifecycle types
//!
//! ```text
//! Pending ──► Filled
//!    │
//!    └──► Resting ◄──► PartiallyFilled
//!            │               │
//!            ├──► Filled ◄───┤
//!            └──► Cancelled ◄┘
//! ```

use crate::errors::OrderError;
use crate::ids::OrderId;
use crate::numeric::{FixedPrice, Quantity};
use crate::sequence::Stamp;
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Accepted at intake, not yet matched
    Pending,
    /// In a ladder with its full quantity
    Resting,
    /// In a ladder after at least one fill
    PartiallyFilled,
    /// Completely matched (terminal)
    Filled,
    /// Removed by cancel (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A limit order, incoming or resting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub side: Side,
    pub price: FixedPrice,
    /// Quantity at intake
    pub quantity: Quantity,
    pub remaining_quantity: Quantity,
    /// Intake sequence; time priority within a price level
    pub sequence: u64,
    /// Unix nanos
    pub arrival_time: i64,
    pub status: OrderStatus,
}

impl Order {
    /// Create a new pending order
    pub fn new(
        order_id: OrderId,
        side: Side,
        price: FixedPrice,
        quantity: Quantity,
        stamp: Stamp,
    ) -> Result<Self, OrderError> {
        if !quantity.is_positive() {
            return Err(OrderError::InvalidQuantity(format!(
                "order {order_id} quantity must be positive, got {quantity}"
            )));
        }
        Ok(Self {
            order_id,
            side,
            price,
            quantity,
            remaining_quantity: quantity,
            sequence: stamp.sequence,
            arrival_time: stamp.arrival_time,
            status: OrderStatus::Pending,
        })
    }

    /// Quantity matched so far
    pub fn filled_quantity(&self) -> Quantity {
        self.quantity - self.remaining_quantity
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    /// Apply a fill of `fill_quantity`
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity; the matcher
    /// always fills `min(incoming, resting)`.
    pub fn fill(&mut self, fill_quantity: Quantity) {
        self.remaining_quantity = self
            .remaining_quantity
            .checked_sub(fill_quantity)
            .expect("Fill would exceed remaining quantity");

        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else if self.status == OrderStatus::Pending {
            OrderStatus::Pending
        } else {
            OrderStatus::PartiallyFilled
        };
    }

    /// Mark the order as placed in a ladder
    pub fn rest(&mut self) {
        self.status = if self.filled_quantity().is_zero() {
            OrderStatus::Resting
        } else {
            OrderStatus::PartiallyFilled
        };
    }

    /// Cancel the order
    ///
    /// # Panics
    /// Panics if order is already in terminal state
    pub fn cancel(&mut self) {
        assert!(!self.status.is_terminal(), "Cannot cancel terminal order");
        self.status = OrderStatus::Cancelled;
    }
}
