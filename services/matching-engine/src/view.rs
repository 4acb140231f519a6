//! Read-only queries over a book
//!
//! Implemented by the live [`OrderBook`](crate::book::OrderBook) and by the
//! published [`BookSnapshot`], so readers work with either.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lob_types::numeric::{FixedPrice, Quantity};

/// Top-of-book and depth queries
pub trait BookView {
    fn best_bid(&self) -> Option<FixedPrice>;

    fn best_ask(&self) -> Option<FixedPrice>;

    /// `(price, total remaining)` per bid level, highest first
    fn bid_levels(&self) -> Vec<(FixedPrice, Quantity)>;

    /// `(price, total remaining)` per ask level, lowest first
    fn ask_levels(&self) -> Vec<(FixedPrice, Quantity)>;

    /// Resting orders only
    fn order_count(&self) -> usize;

    /// `best_ask - best_bid` in exact decimal arithmetic, when both exist
    fn spread(&self) -> Option<Decimal> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        ask.difference(&bid)
    }
}

/// Immutable copy of the book, as published to readers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    /// Book version the snapshot was taken at
    pub sequence: u64,
    pub bids: Vec<(FixedPrice, Quantity)>,
    pub asks: Vec<(FixedPrice, Quantity)>,
    pub order_count: usize,
}

impl BookView for BookSnapshot {
    fn best_bid(&self) -> Option<FixedPrice> {
        self.bids.first().map(|(price, _)| *price)
    }

    fn best_ask(&self) -> Option<FixedPrice> {
        self.asks.first().map(|(price, _)| *price)
    }

    fn bid_levels(&self) -> Vec<(FixedPrice, Quantity)> {
        self.bids.clone()
    }

    fn ask_levels(&self) -> Vec<(FixedPrice, Quantity)> {
        self.asks.clone()
    }

    fn order_count(&self) -> usize {
        self.order_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(side: &[(&str, u64)]) -> Vec<(FixedPrice, Quantity)> {
        side.iter()
            .map(|(p, q)| (p.parse().unwrap(), Quantity::from_u64(*q)))
            .collect()
    }

    fn snapshot(bids: &[(&str, u64)], asks: &[(&str, u64)]) -> BookSnapshot {
        BookSnapshot {
            sequence: 1,
            bids: levels(bids),
            asks: levels(asks),
            order_count: bids.len() + asks.len(),
        }
    }

    #[test]
    fn test_spread_is_exact() {
        let snap = snapshot(&[("9.90", 1)], &[("10.02", 1)]);
        assert_eq!(snap.spread(), Some(Decimal::new(12, 2)));
    }

    #[test]
    fn test_spread_needs_both_sides() {
        assert_eq!(snapshot(&[("9.90", 1)], &[]).spread(), None);
        assert_eq!(snapshot(&[], &[("10", 1)]).spread(), None);
        assert_eq!(BookSnapshot::default().spread(), None);
    }

    #[test]
    fn test_spread_mixed_scales() {
        let snap = snapshot(&[("100", 1)], &[("100.5", 1)]);
        assert_eq!(snap.spread(), Some(Decimal::new(5, 1)));
    }

    #[test]
    fn test_spread_exact_at_extremes() {
        let bid = FixedPrice::new(1, lob_types::numeric::MAX_SCALE).unwrap();
        let ask = FixedPrice::from_u64(u64::MAX);
        let snap = BookSnapshot {
            sequence: 2,
            bids: vec![(bid, Quantity::from_u64(1))],
            asks: vec![(ask, Quantity::from_u64(1))],
            order_count: 2,
        };

        let spread = snap.spread().unwrap();
        assert_eq!(spread.to_string(), "18446744073709551614.999999999");
        assert_eq!(spread + bid.as_decimal(), ask.as_decimal());
    }

    #[test]
    fn test_snapshot_serialization() {
        let snap = snapshot(&[("9.90", 3)], &[("10.01", 2)]);
        let json = serde_json::to_string(&snap).unwrap();
        let back: BookSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
        assert!(json.contains("\"9.90\""));
    }
}
