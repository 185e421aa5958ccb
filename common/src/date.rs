//! Calendar [`Date`] definitions.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{util::days_in_year_month, Month, OffsetDateTime};

/// Calendar date without a time zone.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Date(time::Date);

impl Date {
    /// Creates a new [`Date`] out of the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_calendar(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Creates a new [`Date`] in the provided month, clamping the `day` to the
    /// length of that month.
    ///
    /// [`None`] is returned if the `year` or the `month` is out of range.
    #[must_use]
    pub fn clamped(year: i32, month: u8, day: u8) -> Option<Self> {
        let m = Month::try_from(month).ok()?;
        let last = days_in_year_month(year, m);
        Self::from_calendar(year, month, day.clamp(1, last))
    }

    /// Returns the current [`Date`] in UTC.
    #[must_use]
    pub fn today() -> Self {
        Self(OffsetDateTime::now_utc().date())
    }

    /// Returns the year of this [`Date`].
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Returns the month of this [`Date`], in the `1..=12` range.
    #[must_use]
    pub fn month(self) -> u8 {
        self.0.month().into()
    }

    /// Returns the day of the month of this [`Date`].
    #[must_use]
    pub fn day(self) -> u8 {
        self.0.day()
    }
}

impl From<time::Date> for Date {
    fn from(d: time::Date) -> Self {
        Self(d)
    }
}

impl From<Date> for time::Date {
    fn from(d: Date) -> Self {
        d.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl FromStr for Date {
    type Err = &'static str;

    /// Parses a `YYYY-MM-DD` string, ignoring anything after the day (so
    /// full timestamps are accepted as well).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let date = s.get(..10).unwrap_or(s);
        let mut parts = date.splitn(3, '-');
        let mut next = || parts.next().ok_or("expected `YYYY-MM-DD` format");

        let year = next()?.parse().map_err(|_| "invalid year")?;
        let month = next()?.parse().map_err(|_| "invalid month")?;
        let day = next()?.parse().map_err(|_| "invalid day")?;

        Self::from_calendar(year, month, day).ok_or("date out of range")
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Date {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Date {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, w)
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.

    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::Date;

    impl Serialize for Date {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Date {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let s = String::deserialize(d)?;
            s.parse().map_err(de::Error::custom)
        }
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = super::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use super::Date;

    #[test]
    fn parses_and_prints() {
        let d: Date = "2024-01-15".parse().unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2024, 1, 15));
        assert_eq!(d.to_string(), "2024-01-15");

        let d: Date = "2023-11-03T10:00:00Z".parse().unwrap();
        assert_eq!(d.to_string(), "2023-11-03");

        assert!("2024-02-30".parse::<Date>().is_err());
        assert!("2024-13-01".parse::<Date>().is_err());
        assert!("15/01/2024".parse::<Date>().is_err());
        assert!("".parse::<Date>().is_err());
    }

    #[test]
    fn clamps_day_to_month_length() {
        assert_eq!(
            Date::clamped(2024, 2, 31),
            Date::from_calendar(2024, 2, 29),
        );
        assert_eq!(
            Date::clamped(2023, 2, 31),
            Date::from_calendar(2023, 2, 28),
        );
        assert_eq!(
            Date::clamped(2024, 4, 10),
            Date::from_calendar(2024, 4, 10),
        );
        assert_eq!(Date::clamped(2024, 0, 10), None);
    }
}
