//! Fill execution for a single crossing
//!
//! Decides how much of the incoming and resting orders one crossing consumes
//! and produces the pair of trade reports, incoming first.

use lob_types::numeric::Quantity;
use lob_types::order::Order;
use lob_types::trade::Trade;

/// How a crossing left the two orders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// Resting order used up; incoming keeps walking
    IncomingRemains,
    /// Both orders used up exactly
    BothFilled,
    /// Incoming order used up; resting keeps the rest in place
    RestingRemains,
}

/// Result of crossing an incoming order with one resting order
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub quantity: Quantity,
    pub outcome: FillOutcome,
    pub incoming_trade: Trade,
    pub resting_trade: Trade,
}

impl Execution {
    /// True when the incoming order has nothing left after this crossing
    pub fn incoming_done(&self) -> bool {
        self.outcome != FillOutcome::IncomingRemains
    }
}

/// Cross `incoming` with `resting` at the resting order's price
///
/// Neither order is modified; the caller applies `quantity` to both. The
/// caller has already checked that the prices cross.
pub fn execute(incoming: &Order, resting: &Order) -> Execution {
    let wanted = incoming.remaining_quantity;
    let available = resting.remaining_quantity;

    let (quantity, outcome) = if wanted > available {
        (available, FillOutcome::IncomingRemains)
    } else if wanted == available {
        (wanted, FillOutcome::BothFilled)
    } else {
        (wanted, FillOutcome::RestingRemains)
    };

    let price = resting.price;
    let incoming_trade = Trade::new(
        incoming.order_id,
        incoming.side,
        price,
        quantity,
        outcome != FillOutcome::IncomingRemains,
    );
    let resting_trade = Trade::new(
        resting.order_id,
        resting.side,
        price,
        quantity,
        outcome != FillOutcome::RestingRemains,
    );

    Execution {
        quantity,
        outcome,
        incoming_trade,
        resting_trade,
    }
}
