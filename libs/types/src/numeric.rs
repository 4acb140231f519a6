//! Fixed-point decimal types for prices and quantities
//!
//! `FixedPrice` keeps the `(mantissa, scale)` pair a caller supplied but
//! compares, hashes and orders on the represented value only, so `1.00` and
//! `1.000` land on the same price level. Quantities use `rust_decimal` so
//! the exact-fill branch of the matcher is decided by exact equality.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::OrderError;

/// Largest supported number of fractional digits.
///
/// Keeps `u64::MAX * 10^MAX_SCALE` inside the 96-bit `Decimal` mantissa, so
/// the difference of any two prices is an exact `Decimal`.
pub const MAX_SCALE: u32 = 9;

const POW10: [u128; (MAX_SCALE + 1) as usize] = {
    let mut table = [1u128; (MAX_SCALE + 1) as usize];
    let mut i = 1;
    while i < table.len() {
        table[i] = table[i - 1] * 10;
        i += 1;
    }
    table
};

/// Canonical form of a price: trailing fractional zeros stripped.
///
/// Two prices have the same key iff they represent the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceKey {
    pub mantissa: u64,
    pub scale: u32,
}

/// Exact fixed-point price: `mantissa / 10^scale`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FixedPrice {
    mantissa: u64,
    scale: u32,
}

impl FixedPrice {
    /// Create a price from a signed mantissa and a scale
    ///
    /// Fails with `InvalidPrice` for a negative mantissa or a scale beyond
    /// [`MAX_SCALE`].
    pub fn new(mantissa: i64, scale: u32) -> Result<Self, OrderError> {
        if mantissa < 0 {
            return Err(OrderError::InvalidPrice(format!(
                "negative mantissa {mantissa}"
            )));
        }
        if scale > MAX_SCALE {
            return Err(OrderError::InvalidPrice(format!(
                "scale {scale} exceeds maximum {MAX_SCALE}"
            )));
        }
        Ok(Self {
            mantissa: mantissa as u64,
            scale,
        })
    }

    /// Whole-unit price (scale 0)
    pub fn from_u64(units: u64) -> Self {
        Self {
            mantissa: units,
            scale: 0,
        }
    }

    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Exact three-way comparison by cross-multiplication.
    pub fn compare(&self, other: &Self) -> Ordering {
        let (lhs, rhs) = match self.scale.cmp(&other.scale) {
            Ordering::Equal => (self.mantissa as u128, other.mantissa as u128),
            Ordering::Less => (
                self.mantissa as u128 * POW10[(other.scale - self.scale) as usize],
                other.mantissa as u128,
            ),
            Ordering::Greater => (
                self.mantissa as u128,
                other.mantissa as u128 * POW10[(self.scale - other.scale) as usize],
            ),
        };
        lhs.cmp(&rhs)
    }

    /// Normalised key consistent with [`FixedPrice::compare`].
    pub fn canonical_key(&self) -> PriceKey {
        let mut mantissa = self.mantissa;
        let mut scale = self.scale;
        if mantissa == 0 {
            return PriceKey { mantissa: 0, scale: 0 };
        }
        while scale > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        PriceKey { mantissa, scale }
    }

    /// The same value in canonical representation
    pub fn normalized(&self) -> Self {
        let key = self.canonical_key();
        Self {
            mantissa: key.mantissa,
            scale: key.scale,
        }
    }

    /// Exact decimal value
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.mantissa as i128, self.scale)
    }

    /// Exact `self - other`, computed on integers at the common scale
    ///
    /// `None` if the result does not fit a `Decimal`, which cannot happen
    /// for prices within [`MAX_SCALE`].
    pub fn difference(&self, other: &Self) -> Option<Decimal> {
        let scale = self.scale.max(other.scale);
        let lhs = self.mantissa as i128 * POW10[(scale - self.scale) as usize] as i128;
        let rhs = other.mantissa as i128 * POW10[(scale - other.scale) as usize] as i128;
        Decimal::try_from_i128_with_scale(lhs - rhs, scale).ok()
    }
}

impl PartialEq for FixedPrice {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for FixedPrice {}

impl PartialOrd for FixedPrice {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixedPrice {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for FixedPrice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_key().hash(state);
    }
}

impl fmt::Display for FixedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

impl FromStr for FixedPrice {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut value = Decimal::from_str_exact(s.trim())
            .map_err(|e| OrderError::InvalidPrice(format!("{s:?}: {e}")))?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(OrderError::InvalidPrice(format!("negative price {s:?}")));
        }
        // Trailing zeros past MAX_SCALE do not change the value
        if value.scale() > MAX_SCALE {
            value = value.normalize();
        }
        let mantissa = u64::try_from(value.mantissa().unsigned_abs())
            .map_err(|_| OrderError::InvalidPrice(format!("{s:?} out of range")))?;
        let scale = value.scale();
        if scale > MAX_SCALE {
            return Err(OrderError::InvalidPrice(format!(
                "{s:?} has more than {MAX_SCALE} decimals"
            )));
        }
        Ok(Self { mantissa, scale })
    }
}

impl TryFrom<String> for FixedPrice {
    type Error = OrderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FixedPrice> for String {
    fn from(price: FixedPrice) -> Self {
        price.to_string()
    }
}

/// Non-negative exact quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Wrap a decimal, rejecting negative values
    pub fn try_new(value: Decimal) -> Result<Self, OrderError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(OrderError::InvalidQuantity(format!("negative quantity {value}")));
        }
        Ok(Self(value))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn from_u64(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Addition that fails instead of overflowing
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Subtraction that fails instead of going negative
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        let value = self.0.checked_sub(rhs.0)?;
        if value.is_sign_negative() && !value.is_zero() {
            None
        } else {
            Some(Self(value))
        }
    }
}

impl FromStr for Quantity {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str_exact(s.trim())
            .map_err(|e| OrderError::InvalidQuantity(format!("{s:?}: {e}")))?;
        Self::try_new(value)
    }
}

impl Add for Quantity {
    type Output = Self;

    /// Panics past `Decimal::MAX`; fallible callers use `checked_add`.
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Self;

    /// Saturates at zero; callers that need to detect underflow use `checked_sub`.
    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs).unwrap_or_default()
    }
}

impl std::iter::Sum for Quantity {
    /// Saturates at `Decimal::MAX`; use `checked_add` to detect overflow.
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, q| {
            acc.checked_add(q).unwrap_or(Self(Decimal::MAX))
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
