//! [`Money`]-related definitions.

use std::{fmt, iter::Sum, num::NonZeroU16, ops, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{Decimal, RoundingStrategy};

/// Amount of money, kept with a cent precision.
///
/// All the amounts handled by the system share the same currency, so it's not
/// carried along.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(from = "Decimal", into = "Decimal")
)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Number of decimal places an amount is rounded to.
    pub const SCALE: u32 = 2;

    /// Largest amount accepted from the outside, fitting a `NUMERIC(12, 2)`
    /// column.
    pub const MAX: Self =
        Self(Decimal::from_parts(3_567_587_327, 232, 0, false, Self::SCALE));

    /// Creates a new [`Money`] out of the provided `amount`, rounding it to
    /// whole cents (half away from zero).
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(
            amount.round_dp_with_strategy(
                Self::SCALE,
                RoundingStrategy::MidpointAwayFromZero,
            ),
        )
    }

    /// Returns the decimal amount of this [`Money`].
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Money`] is exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Indicates whether this [`Money`] is below zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Splits this [`Money`] into the provided number of equal `parts`,
    /// returning the (rounded) amount of a single part.
    #[must_use]
    pub fn split(self, parts: NonZeroU16) -> Self {
        Self::new(self.0 / Decimal::from(parts.get()))
    }

    /// Multiplies this [`Money`] by the provided `quantity`.
    ///
    /// Saturates at the [`Decimal`] bounds instead of overflowing.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| "invalid amount")?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err("negative amount");
        }
        let money = Self::new(amount);
        if money > Self::MAX {
            return Err("amount exceeds 9999999999.99");
        }
        Ok(money)
    }
}

impl ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl ops::Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, ops::Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Non-negative amount of money in `{units}.{cents}` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::{num::NonZeroU16, str::FromStr as _};

    use super::Money;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(Money::from_str("123.45").unwrap().to_string(), "123.45");
        assert_eq!(Money::from_str(" 10 ").unwrap().to_string(), "10.00");
        assert_eq!(Money::from_str("0.005").unwrap().to_string(), "0.01");
        assert_eq!(Money::from_str("0.004").unwrap().to_string(), "0.00");

        assert!(Money::from_str("-1").is_err());
        assert!(Money::from_str("10000000000").is_err());
        assert!(Money::from_str("12,50").is_err());
        assert!(Money::from_str("").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(money("100").to_string(), "100.00");
        assert_eq!(money("99.9").to_string(), "99.90");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn splits_into_parts() {
        let three = NonZeroU16::new(3).unwrap();

        assert_eq!(money("300.00").split(three), money("100.00"));
        assert_eq!(money("100.00").split(three), money("33.33"));
        assert_eq!(money("0.02").split(three), money("0.01"));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(money("33.33").times(3), money("99.99"));
        assert_eq!(money("10.10") + money("0.90"), money("11.00"));
        assert_eq!(money("10.00") - money("2.50"), money("7.50"));
        assert!((money("1.00") - money("2.00")).is_negative());
        assert!(!Money::ZERO.is_negative());

        let total: Money =
            [money("1.10"), money("2.20"), money("3.30")].iter().sum();
        assert_eq!(total, money("6.60"));
    }

    #[test]
    fn rejects_amounts_beyond_column_range() {
        assert_eq!(Money::MAX.to_string(), "9999999999.99");
        assert_eq!(money("9999999999.99"), Money::MAX);
        assert!(Money::from_str("79228162514264337593543950335").is_err());
    }

    #[test]
    fn arithmetic_saturates_instead_of_overflowing() {
        let huge = Money::new(rust_decimal::Decimal::MAX);

        assert_eq!(huge.times(2), huge);
        assert_eq!(huge + huge, huge);

        let mut sum = huge;
        sum += Money::MAX;
        assert_eq!(sum, huge);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_numbers_and_strings() {
        assert_eq!(
            serde_json::from_str::<Money>("12.5").unwrap(),
            money("12.50"),
        );
        assert_eq!(
            serde_json::from_str::<Money>("\"7.25\"").unwrap(),
            money("7.25"),
        );
    }
}
