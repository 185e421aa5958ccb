//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

use crate::Money;

/// Non-negative percentage.
///
/// Values above `100` are allowed, as a markup may exceed the cost it's
/// applied to.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(try_from = "Decimal", into = "Decimal")
)]
pub struct Percent(Decimal);

impl Percent {
    /// Zero percentage.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Percent`] if the provided value is not negative.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (!val.is_sign_negative() || val.is_zero()).then_some(Self(val))
    }

    /// Returns the numeric value of this [`Percent`].
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Calculates this [`Percent`] of the provided [`Money`] amount.
    ///
    /// Saturates at the [`Decimal`] bounds instead of overflowing.
    #[must_use]
    pub fn of(self, amount: Money) -> Money {
        Money::new(
            amount.amount().saturating_mul(self.0) / Decimal::ONE_HUNDRED,
        )
    }
}

impl TryFrom<Decimal> for Percent {
    type Error = &'static str;

    fn try_from(val: Decimal) -> Result<Self, Self::Error> {
        Self::new(val).ok_or("negative percent value")
    }
}

impl From<Percent> for Decimal {
    fn from(p: Percent) -> Self {
        p.0
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Non-negative decimal percentage.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Percent = super::Percent;

    impl Percent {
        fn to_output<S: ScalarValue>(p: &Percent) -> Value<S> {
            Value::scalar(p.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Percent` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Percent` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Money, Percent};

    #[test]
    fn rejects_negative() {
        assert!("-0.5".parse::<Percent>().is_err());
        assert!("abc".parse::<Percent>().is_err());
        assert!("0".parse::<Percent>().is_ok());
        assert!("250".parse::<Percent>().is_ok());
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn applies_to_money() {
        let cost = money("40.00");

        let p: Percent = "50".parse().unwrap();
        assert_eq!(p.of(cost), money("20.00"));

        let p: Percent = "12.5".parse().unwrap();
        assert_eq!(p.of(cost), money("5.00"));

        assert_eq!(Percent::ZERO.of(cost), Money::ZERO);
    }

    #[test]
    fn saturates_on_huge_amounts() {
        use rust_decimal::Decimal;

        let huge = Money::new(Decimal::MAX);
        let p: Percent = "250".parse().unwrap();

        assert_eq!(p.of(huge), Money::new(Decimal::MAX / Decimal::ONE_HUNDRED));
    }
}
