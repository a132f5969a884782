//! # Quantity Module
//!
//! Provides the `Quantity` type for stock levels and line item quantities.
//!
//! ## Why Fixed-Point Quantities?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  STOCK IS DECIMAL, LEDGERS MUST BE EXACT                                │
//! │                                                                         │
//! │  Stock is sold by weight and volume: 2.5 kg, 0.75 L, 12 pcs.           │
//! │  Every mutation is a signed delta, and every edit/delete must           │
//! │  reverse prior deltas EXACTLY:                                          │
//! │                                                                         │
//! │    stock + 2.5 - 2.5 == stock     must hold bit-for-bit                │
//! │                                                                         │
//! │  Floats cannot promise that. Integers can.                              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Milliunits (3 fixed decimal places)              │
//! │    2.5 units  = 2500 milli                                              │
//! │    0.001 unit =    1 milli (smallest representable quantity)            │
//! │                                                                         │
//! │  The database stores milliunits and increments them atomically:         │
//! │    UPDATE products SET stock_milli = stock_milli + ?                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::quantity::Quantity;
//!
//! let qty = Quantity::from_milli(2500); // 2.500 units
//! assert_eq!(qty.to_string(), "2.500");
//!
//! // Reversal is exact
//! let stock = Quantity::from_units(10);
//! assert_eq!(stock + qty - qty, stock);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Milliunits per whole unit (3 fixed decimal places).
pub const MILLI_PER_UNIT: i64 = 1000;

// =============================================================================
// Quantity Type
// =============================================================================

/// Represents a stock quantity in milliunits (thousandths of a unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Ledger deltas are signed; stock itself may go
///   negative (the engine never floors at zero)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Quantity Flows
/// ```text
/// AdjustmentItem.quantity ──► ledger delta (±) ──► Product.stock
/// PurchaseItem.quantity ────► ledger delta (+/−, status-gated) ──► Product.stock
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a Quantity from milliunits (the smallest stock unit).
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::quantity::Quantity;
    ///
    /// let qty = Quantity::from_milli(2500); // 2.500 units
    /// assert_eq!(qty.milli(), 2500);
    /// ```
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Creates a Quantity from whole units.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::quantity::Quantity;
    ///
    /// let qty = Quantity::from_units(3);
    /// assert_eq!(qty.milli(), 3000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * MILLI_PER_UNIT)
    }

    /// Returns the value in milliunits.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated towards zero).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / MILLI_PER_UNIT
    }

    /// Returns the fractional part in milliunits (always 0-999).
    #[inline]
    pub const fn milli_part(&self) -> i64 {
        (self.0 % MILLI_PER_UNIT).abs()
    }

    /// Returns zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    ///
    /// Negative stock is representable by design; callers that care
    /// (low-stock alerts, audits) check this on the read side.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Quantity(self.0.abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows quantities with all three decimal places.
///
/// ## Note
/// This is for debugging and logs; `2500` milli renders as `2.500`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:03}", sign, self.units().abs(), self.milli_part())
    }
}

/// Default quantity is zero.
impl Default for Quantity {
    fn default() -> Self {
        Quantity::zero()
    }
}

/// Addition of two Quantity values.
impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Quantity values.
impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Negation - the reversal primitive of the ledger.
///
/// `reverseDelta(q)` is exactly `applyDelta(-q)`.
impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_milli_and_units() {
        let qty = Quantity::from_milli(2500);
        assert_eq!(qty.milli(), 2500);
        assert_eq!(qty.units(), 2);
        assert_eq!(qty.milli_part(), 500);

        assert_eq!(Quantity::from_units(3).milli(), 3000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Quantity::from_milli(2500)), "2.500");
        assert_eq!(format!("{}", Quantity::from_milli(10)), "0.010");
        assert_eq!(format!("{}", Quantity::from_milli(-1250)), "-1.250");
        assert_eq!(format!("{}", Quantity::zero()), "0.000");
    }

    #[test]
    fn test_arithmetic() {
        let a = Quantity::from_milli(1000);
        let b = Quantity::from_milli(250);

        assert_eq!((a + b).milli(), 1250);
        assert_eq!((a - b).milli(), 750);

        let mut acc = Quantity::zero();
        acc += a;
        acc -= b;
        assert_eq!(acc.milli(), 750);
    }

    #[test]
    fn test_negation_reverses_exactly() {
        let stock = Quantity::from_units(10);
        let delta = Quantity::from_milli(2500);

        // apply then reverse restores the original value bit-for-bit
        assert_eq!(stock + delta + (-delta), stock);
    }

    #[test]
    fn test_negative_stock_representable() {
        let stock = Quantity::from_units(2);
        let delta = -Quantity::from_units(5);
        let after = stock + delta;

        assert_eq!(after.milli(), -3000);
        assert!(after.is_negative());
        assert_eq!(after.abs().units(), 3);
    }
}
