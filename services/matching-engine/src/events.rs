//! Event structures for the book
//!
//! Published by the owner task for reporting sinks after each command.

use serde::{Deserialize, Serialize};

use lob_types::ids::OrderId;
use lob_types::numeric::{FixedPrice, Quantity};
use lob_types::order::{Order, Side};
use lob_types::trade::Trade;

/// Order accepted for matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAcceptedEvent {
    pub order_id: OrderId,
    pub side: Side,
    pub price: FixedPrice,
    pub quantity: Quantity,
    pub sequence: u64,
}

/// Remainder of an order placed in its ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRestedEvent {
    pub order_id: OrderId,
    pub side: Side,
    pub price: FixedPrice,
    pub remaining_quantity: Quantity,
}

/// Resting order removed by cancel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCanceledEvent {
    pub order_id: OrderId,
    pub filled_quantity: Quantity,
    pub unfilled_quantity: Quantity,
}

/// Everything a reporting sink receives, in book order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookEvent {
    OrderAccepted(OrderAcceptedEvent),
    Trade(Trade),
    OrderRested(OrderRestedEvent),
    OrderCanceled(OrderCanceledEvent),
}

impl BookEvent {
    /// Events for one accepted submission
    ///
    /// `resting` is the order as it now rests in the book, if any remainder
    /// was placed.
    pub fn for_submit(order: &Order, trades: &[Trade], resting: Option<&Order>) -> Vec<BookEvent> {
        let mut events = Vec::with_capacity(trades.len() + 2);
        events.push(BookEvent::OrderAccepted(OrderAcceptedEvent {
            order_id: order.order_id,
            side: order.side,
            price: order.price,
            quantity: order.remaining_quantity,
            sequence: order.sequence,
        }));
        events.extend(trades.iter().cloned().map(BookEvent::Trade));
        if let Some(rested) = resting {
            events.push(BookEvent::OrderRested(OrderRestedEvent {
                order_id: rested.order_id,
                side: rested.side,
                price: rested.price,
                remaining_quantity: rested.remaining_quantity,
            }));
        }
        events
    }

    /// Event for a completed cancel
    pub fn for_cancel(order: &Order) -> BookEvent {
        BookEvent::OrderCanceled(OrderCanceledEvent {
            order_id: order.order_id,
            filled_quantity: order.filled_quantity(),
            unfilled_quantity: order.remaining_quantity,
        })
    }

    pub fn order_id(&self) -> OrderId {
        match self {
            BookEvent::OrderAccepted(e) => e.order_id,
            BookEvent::Trade(t) => t.order_id,
            BookEvent::OrderRested(e) => e.order_id,
            BookEvent::OrderCanceled(e) => e.order_id,
        }
    }
}
