//! Intake sequencing
//!
//! The book never invents ids, sequence numbers or timestamps. A sequencer
//! sitting in front of it stamps each accepted order with a strictly
//! increasing sequence number and a non-decreasing arrival time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::OrderError;
use crate::ids::OrderId;
use crate::numeric::{FixedPrice, Quantity};
use crate::order::{Order, Side};

/// Intake stamp carried by every order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    /// Strictly increasing per book
    pub sequence: u64,
    /// Unix nanos
    pub arrival_time: i64,
}

/// Source of intake stamps
pub trait Sequencer {
    fn next_stamp(&mut self) -> Stamp;

    /// Validate and stamp a new limit order
    ///
    /// A stamp is consumed only when the order is valid, so rejected input
    /// leaves no gap in the sequence.
    fn admit(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: FixedPrice,
        quantity: Quantity,
    ) -> Result<Order, OrderError> {
        if !quantity.is_positive() {
            return Err(OrderError::InvalidQuantity(format!(
                "order {order_id} quantity must be positive, got {quantity}"
            )));
        }
        Order::new(order_id, side, price, quantity, self.next_stamp())
    }
}

/// Deterministic sequencer: arrival time mirrors the sequence number
#[derive(Debug, Clone, Default)]
pub struct CountingSequencer {
    last: u64,
}

impl CountingSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume after `last` (the next stamp is `last + 1`)
    pub fn starting_after(last: u64) -> Self {
        Self { last }
    }
}

impl Sequencer for CountingSequencer {
    fn next_stamp(&mut self) -> Stamp {
        self.last += 1;
        Stamp {
            sequence: self.last,
            arrival_time: self.last as i64,
        }
    }
}

/// Wall-clock sequencer
///
/// Arrival times come from the injected clock but never move backwards,
/// even if the clock is stepped.
pub struct ClockSequencer {
    last_sequence: u64,
    last_time: i64,
    clock: Box<dyn FnMut() -> DateTime<Utc> + Send>,
}

impl ClockSequencer {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    pub fn with_clock(clock: impl FnMut() -> DateTime<Utc> + Send + 'static) -> Self {
        Self {
            last_sequence: 0,
            last_time: i64::MIN,
            clock: Box::new(clock),
        }
    }
}

impl Default for ClockSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer for ClockSequencer {
    fn next_stamp(&mut self) -> Stamp {
        let now = (self.clock)();
        // Out-of-range dates saturate rather than wrap
        let nanos = now.timestamp_nanos_opt().unwrap_or(i64::MAX);
        self.last_time = self.last_time.max(nanos);
        self.last_sequence += 1;
        Stamp {
            sequence: self.last_sequence,
            arrival_time: self.last_time,
        }
    }
}
