//! Error types for the order book
//!
//! Every error is local and synchronous. Operations validate before they
//! mutate, so a returned error always means the book is unchanged.

use thiserror::Error;

use crate::ids::OrderId;

/// Top-level book error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: OrderId },

    #[error("Duplicate order id: {order_id}")]
    DuplicateOrderId { order_id: OrderId },

    #[error("Book service is no longer running")]
    ServiceClosed,
}

/// Order construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
}

impl BookError {
    /// True for the malformed-price case, wherever it was raised
    pub fn is_invalid_price(&self) -> bool {
        matches!(self, BookError::Order(OrderError::InvalidPrice(_)))
    }

    /// True for the non-positive-quantity case
    pub fn is_invalid_quantity(&self) -> bool {
        matches!(self, BookError::Order(OrderError::InvalidQuantity(_)))
    }
}
