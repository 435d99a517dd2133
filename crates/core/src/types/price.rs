//! Type-safe price representation using decimal arithmetic.
//!
//! The commerce API sends prices as plain JSON numbers in Egyptian pounds.
//! [`Price`] keeps them as [`Decimal`] so that line totals and subtotals
//! computed locally (for the guest cart) do not accumulate float error.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (pounds, not piastres).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the default currency.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(Decimal::ZERO, CurrencyCode::EGP)
    }

    /// Convert a number from the API into a price in the default currency.
    ///
    /// Non-finite input (which the API never sends) becomes zero.
    #[must_use]
    pub fn from_api(amount: f64) -> Self {
        let amount = Decimal::from_f64_retain(amount)
            .unwrap_or(Decimal::ZERO)
            .round_dp(2)
            .normalize();
        Self::new(amount, CurrencyCode::EGP)
    }

    /// Multiply by a quantity (line total).
    #[must_use]
    pub fn times(self, count: u32) -> Self {
        Self::new(self.amount * Decimal::from(count), self.currency_code)
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.amount + rhs.amount, self.currency_code)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl fmt::Display for Price {
    /// Formats as `EGP 1,299` or `EGP 12.50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.amount.round_dp(2);
        let whole = rounded.trunc();
        let cents = ((rounded - whole).abs() * Decimal::ONE_HUNDRED).trunc();

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = whole.abs().to_string();
        let grouped = group_thousands(&digits);

        write!(f, "{} {sign}{grouped}", self.currency_code.code())?;
        if !cents.is_zero() {
            write!(f, ".{cents:0>2}")?;
        }
        Ok(())
    }
}

/// Insert commas every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// ISO 4217 currency codes used by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EGP,
    USD,
}

impl CurrencyCode {
    /// The three-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EGP => "EGP",
            Self::USD => "USD",
        }
    }
}
