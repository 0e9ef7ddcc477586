//! # Money Module
//!
//! Provides the `Money` and `Percent` types for monetary values and rates.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats:                                                           │
//! │    10 × 2 × 1.10 = 22.000000000000004  ❌                               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    2000 cents + round(2000 × 1000 bps / 10000) = 2200 cents  ✅         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Floats only appear at the spreadsheet boundary, where number cells are
//! rounded to the nearest cent or basis point on the way in.
//!
//! ## Usage
//! ```rust
//! use tally_core::money::{Money, Percent};
//!
//! let price: Money = "10.99".parse().unwrap();
//! assert_eq!(price.cents(), 1099);
//!
//! let total = price.multiply_quantity(2).apply_tax(Percent::from_bps(1000));
//! assert_eq!(total.to_string(), "24.18");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Signed so that a discount above 100 % still produces a representable
/// (negative) total instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Converts a spreadsheet number cell to money, rounding to the nearest cent.
    ///
    /// Returns `None` for NaN, infinities and values outside the i64 cent range.
    pub fn from_f64_rounded(value: f64) -> Option<Self> {
        let cents = (value * 100.0).round();
        if !cents.is_finite() || cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Converts to a spreadsheet number cell.
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    ///
    /// Saturates at the ends of the cent range; see
    /// [`checked_multiply_quantity`](Self::checked_multiply_quantity).
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// `None` when the product does not fit in i64 cents.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as i64) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds tax at `rate` on top of this amount.
    ///
    /// The tax part is rounded half away from zero to the nearest cent.
    /// Saturates at the ends of the cent range.
    pub fn apply_tax(&self, rate: Percent) -> Money {
        Money::saturating(i128::from(self.0) + rate.portion_of(self.0))
    }

    /// [`apply_tax`](Self::apply_tax), or `None` when the result does not fit.
    pub fn checked_apply_tax(&self, rate: Percent) -> Option<Money> {
        Money::checked(i128::from(self.0) + rate.portion_of(self.0))
    }

    /// Takes `rate` off this amount.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::{Money, Percent};
    ///
    /// let subtotal = Money::from_cents(10000);
    /// let discounted = subtotal.apply_discount(Percent::from_bps(1000));
    /// assert_eq!(discounted.cents(), 9000);
    /// ```
    pub fn apply_discount(&self, rate: Percent) -> Money {
        Money::saturating(i128::from(self.0) - rate.portion_of(self.0))
    }

    /// [`apply_discount`](Self::apply_discount), or `None` when the result
    /// does not fit.
    pub fn checked_apply_discount(&self, rate: Percent) -> Option<Money> {
        Money::checked(i128::from(self.0) - rate.portion_of(self.0))
    }

    fn checked(cents: i128) -> Option<Money> {
        i64::try_from(cents).ok().map(Money)
    }

    fn saturating(cents: i128) -> Money {
        Money::checked(cents).unwrap_or(if cents < 0 { Money(i64::MIN) } else { Money(i64::MAX) })
    }
}

/// Plain decimal display (`12.34`, `-0.50`). No currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Parses decimal text with at most two fractional digits.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s, "amount").map(Money)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

/// Saturating, like `+`.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Percent Type
// =============================================================================

/// A percentage in basis points (1 bps = 0.01 %).
///
/// Used for both the sale discount and the sale tax rate. Values above
/// 100 % are representable; negative rates are not.
///
/// ```text
///   825 bps  =  8.25 %
///  1000 bps  = 10 %
/// 10000 bps  = 100 %
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Percent(u32);

impl Percent {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Converts a spreadsheet number cell (a percentage such as `8.25`).
    ///
    /// Returns `None` for negative or non-finite values.
    pub fn from_f64_rounded(value: f64) -> Option<Self> {
        let bps = (value * 100.0).round();
        if !bps.is_finite() || bps < 0.0 || bps > u32::MAX as f64 {
            return None;
        }
        Some(Percent(bps as u32))
    }

    /// Converts to a spreadsheet number cell.
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `amount × rate`, rounded half away from zero. Kept in i128: a rate
    /// above 100 % can push the portion past i64.
    fn portion_of(&self, cents: i64) -> i128 {
        let product = i128::from(cents) * i128::from(self.0);
        if product >= 0 {
            (product + 5000) / 10000
        } else {
            (product - 5000) / 10000
        }
    }
}

/// Displays as a decimal percentage without trailing zeros (`8.25`, `12.5`, `10`).
impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}", whole, frac)
        }
    }
}

impl FromStr for Percent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hundredths = parse_hundredths(s, "percent")?;
        if hundredths < 0 {
            return Err(ValidationError::invalid_format("percent", "must not be negative"));
        }
        u32::try_from(hundredths)
            .map(Percent)
            .map_err(|_| ValidationError::invalid_format("percent", "value too large"))
    }
}

// =============================================================================
// Decimal Parsing
// =============================================================================

/// Parses `[-]digits[.d[d]]` into hundredths without going through floats.
fn parse_hundredths(input: &str, field: &str) -> Result<i64, ValidationError> {
    let s = input.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() && frac.is_empty() {
        return Err(ValidationError::invalid_format(field, "not a number"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(field, "not a number"));
    }
    if frac.len() > 2 {
        return Err(ValidationError::invalid_format(
            field,
            "at most two decimal places",
        ));
    }

    let overflow = || ValidationError::invalid_format(field, "value too large");
    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let frac_value: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| overflow())? * 10,
        _ => frac.parse().map_err(|_| overflow())?,
    };

    let value = whole_value
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(overflow)?;

    Ok(if negative { -value } else { value })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-50).to_string(), "-0.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_parse_money() {
        assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!(" 10.99 ".parse::<Money>().unwrap().cents(), 1099);
        assert_eq!(".5".parse::<Money>().unwrap().cents(), 50);
        assert_eq!("-2.25".parse::<Money>().unwrap().cents(), -225);

        assert!("".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.999".parse::<Money>().is_err());
        assert!("1,5".parse::<Money>().is_err());
    }

    #[test]
    fn test_f64_boundary() {
        assert_eq!(Money::from_f64_rounded(10.99).unwrap().cents(), 1099);
        assert_eq!(Money::from_f64_rounded(0.1 + 0.2).unwrap().cents(), 30);
        assert!(Money::from_f64_rounded(f64::NAN).is_none());
        assert_eq!(Money::from_cents(1050).to_f64(), 10.5);
    }

    #[test]
    fn test_tax_then_discount() {
        // 10 × 2 at 10 % tax, no discount = 22.00 exactly
        let subtotal = Money::from_cents(1000).multiply_quantity(2);
        let total = subtotal
            .apply_tax(Percent::from_bps(1000))
            .apply_discount(Percent::zero());
        assert_eq!(total.cents(), 2200);
    }

    #[test]
    fn test_order_of_tax_and_discount_matters_for_rounding() {
        // 0.05 + 50 % tax = 0.08 (0.025 rounds to 0.03), then 50 % off = 0.04
        let amount = Money::from_cents(5);
        let half = Percent::from_bps(5000);
        assert_eq!(amount.apply_tax(half).apply_discount(half).cents(), 4);
        // Discount first: 0.05 - 0.03 = 0.02, then + 0.01 tax = 0.03
        assert_eq!(amount.apply_discount(half).apply_tax(half).cents(), 3);
    }

    #[test]
    fn test_discount_above_hundred_percent_goes_negative() {
        let total = Money::from_cents(1000).apply_discount(Percent::from_bps(15000));
        assert_eq!(total.cents(), -500);
        assert!(total.is_negative());
    }

    #[test]
    fn test_cent_range_boundary() {
        let huge = Money::from_cents(i64::MAX - 10);

        assert_eq!(huge.checked_multiply_quantity(2), None);
        assert_eq!(huge.multiply_quantity(2), Money::from_cents(i64::MAX));
        assert_eq!(huge.checked_multiply_quantity(1), Some(huge));

        assert_eq!(huge.checked_add(Money::from_cents(10)), Some(Money::from_cents(i64::MAX)));
        assert_eq!(huge.checked_add(Money::from_cents(11)), None);
        assert_eq!(huge + huge, Money::from_cents(i64::MAX));
        assert_eq!(Money::from_cents(i64::MIN) - Money::from_cents(1), Money::from_cents(i64::MIN));

        let ten = Percent::from_bps(1000);
        assert_eq!(huge.checked_apply_tax(ten), None);
        assert_eq!(huge.apply_tax(ten), Money::from_cents(i64::MAX));
        assert_eq!(huge.checked_apply_discount(ten).unwrap().cents(), 8_301_034_833_169_298_217);

        // 400 % off a large amount goes below i64::MIN
        let off = Percent::from_bps(40_000);
        assert_eq!(Money::from_cents(i64::MAX / 2).checked_apply_discount(off), None);
        assert_eq!(Money::from_cents(i64::MAX / 2).apply_discount(off), Money::from_cents(i64::MIN));

        let total: Money = [huge, huge].iter().sum();
        assert_eq!(total, Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 5].iter().map(|c| Money::from_cents(*c)).sum();
        assert_eq!(total.cents(), 355);
    }

    #[test]
    fn test_percent_parse_and_display() {
        assert_eq!("8.25".parse::<Percent>().unwrap().bps(), 825);
        assert_eq!("10".parse::<Percent>().unwrap().bps(), 1000);
        assert_eq!("0".parse::<Percent>().unwrap(), Percent::zero());
        assert!("-5".parse::<Percent>().is_err());
        assert!("x".parse::<Percent>().is_err());

        assert_eq!(Percent::from_bps(825).to_string(), "8.25");
        assert_eq!(Percent::from_bps(1250).to_string(), "12.5");
        assert_eq!(Percent::from_bps(1000).to_string(), "10");
    }

    #[test]
    fn test_percent_f64_boundary() {
        assert_eq!(Percent::from_f64_rounded(8.25).unwrap().bps(), 825);
        assert!(Percent::from_f64_rounded(-1.0).is_none());
        assert_eq!(Percent::from_bps(1250).to_f64(), 12.5);
    }
}
