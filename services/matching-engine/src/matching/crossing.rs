//! Crossing detection logic
//!
//! Determines when a bid and ask can match based on price compatibility

use lob_types::numeric::FixedPrice;
use lob_types::order::Side;

/// Check if a bid and ask can match at given prices
///
/// Buy price must be >= sell price.
pub fn can_match(bid_price: FixedPrice, ask_price: FixedPrice) -> bool {
    bid_price >= ask_price
}

/// Check if an incoming order crosses a resting order of the opposite side
pub fn incoming_can_match(incoming_side: Side, incoming_price: FixedPrice, resting_price: FixedPrice) -> bool {
    match incoming_side {
        Side::BUY => can_match(incoming_price, resting_price),
        Side::SELL => can_match(resting_price, incoming_price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(s: &str) -> FixedPrice {
        s.parse().unwrap()
    }

    #[test]
    fn test_can_match_crossing() {
        assert!(can_match(price("11.00"), price("10.00")), "Bid >= ask should match");
    }

    #[test]
    fn test_can_match_exact_across_scales() {
        assert!(can_match(price("10.0"), price("10.000")), "Equal values should match");
    }

    #[test]
    fn test_can_match_no_cross() {
        assert!(!can_match(price("9.99"), price("10")), "Bid < ask should not match");
    }

    #[test]
    fn test_incoming_buy_can_match() {
        assert!(incoming_can_match(Side::BUY, price("11.00"), price("10.01")));
        assert!(!incoming_can_match(Side::BUY, price("10.00"), price("10.01")));
    }

    #[test]
    fn test_incoming_sell_can_match() {
        assert!(incoming_can_match(Side::SELL, price("9.90"), price("9.95")));
        assert!(incoming_can_match(Side::SELL, price("9.95"), price("9.95")));
        assert!(!incoming_can_match(Side::SELL, price("9.96"), price("9.95")));
    }
}
