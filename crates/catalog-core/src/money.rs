//! # Money Module
//!
//! Provides the `Money` type and the conversions between the stored
//! integer price and the strings shown in the UI.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    The price column stores 1099, never 10.99                            │
//! │    Only the UI converts to dollars for display                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Entering Prices
//! ```text
//! UI text "10.50" ──► f64 10.5 ──► Money::from_display ──► 1050 cents
//!                                   (× 100, truncated toward zero)
//! ```
//! Truncation, not rounding, is the encoding policy. An input whose binary
//! value lands just under a whole cent (e.g. `0.29 * 100 = 28.999…`) loses
//! that cent. This is kept as-is.
//!
//! ## Usage
//! ```rust
//! use catalog_core::money::Money;
//!
//! let price = Money::from_cents(123456);
//! assert_eq!(price.to_plain_string(), "1234.56");
//! assert_eq!(price.to_currency_string(), "$1,234.56");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::contract::columns;
use crate::value::{FieldSet, Row};

// =============================================================================
// Money Type
// =============================================================================

/// A price in the smallest currency unit (cents for USD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Encodes a display value (dollars) as cents: multiply by 100 and
    /// truncate toward zero.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::money::Money;
    ///
    /// assert_eq!(Money::from_display(10.5).cents(), 1050);
    /// assert_eq!(Money::from_display(3.999).cents(), 399);
    /// assert_eq!(Money::from_display(-1.555).cents(), -155);
    /// ```
    #[inline]
    pub fn from_display(display: f64) -> Self {
        Money((display * 100.0) as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dollar portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Formats as `0.00`: no symbol, no grouping.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(5).to_plain_string(), "0.05");
    /// assert_eq!(Money::from_cents(1000).to_plain_string(), "10.00");
    /// ```
    pub fn to_plain_string(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }

    /// Formats as US currency: `$1,234.56`, `-$0.50`.
    pub fn to_currency_string(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!(
            "{}${}.{:02}",
            sign,
            group_thousands(self.dollars().unsigned_abs()),
            self.cents_part()
        )
    }
}

/// `1234567` → `1,234,567`.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_currency_string())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Field Set / Row Helpers
// =============================================================================

/// Encodes a display price and puts it into `fields` under the price column.
pub fn put_price(fields: &mut FieldSet, display: f64) {
    fields.put(columns::PRICE, Money::from_display(display).cents());
}

/// Reads the price column of a result row.
///
/// `None` when the row carries no price column (e.g. a narrow projection),
/// which is distinct from a stored price of zero.
pub fn row_price(row: &Row) -> Option<Money> {
    row.get_i64(columns::PRICE).map(Money::from_cents)
}

/// Price of a result row in `0.00` form, or `None` if the row has no price.
pub fn plain_price(row: &Row) -> Option<String> {
    row_price(row).map(|m| m.to_plain_string())
}

/// Price of a result row in currency form, or `None` if the row has no price.
pub fn currency_price(row: &Row) -> Option<String> {
    row_price(row).map(|m| m.to_currency_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
