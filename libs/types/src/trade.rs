//! Trade reports
//!
//! A crossing produces a pair of reports: one for the incoming order, then
//! one for the resting order it hit. Reports are handed to the caller and
//! not stored by the book.

use crate::ids::OrderId;
use crate::numeric::{FixedPrice, Quantity};
use crate::order::Side;
use serde::{Deserialize, Serialize};

/// Fill report for one side of a crossing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub order_id: OrderId,
    /// Side of the order this report concerns
    pub side: Side,
    /// Execution price (the resting order's level)
    pub price: FixedPrice,
    pub filled_qty: Quantity,
    /// True when this fill leaves the order with nothing remaining
    pub fully_filled: bool,
}

impl Trade {
    pub fn new(
        order_id: OrderId,
        side: Side,
        price: FixedPrice,
        filled_qty: Quantity,
        fully_filled: bool,
    ) -> Self {
        Self {
            order_id,
            side,
            price,
            filled_qty,
            fully_filled,
        }
    }
}
