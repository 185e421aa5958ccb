//! [`Client`] definitions.

use std::{str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateTimeOf, Money};
use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;

use super::{define_id, define_text};

/// Subscriber of an IPTV plan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Client {
    /// ID of this [`Client`].
    pub id: Id,

    /// [`Name`] of this [`Client`].
    pub name: Name,

    /// [`Phone`] this [`Client`] is reachable by.
    pub phone: Phone,

    /// Price of the [`Plan`] this [`Client`] pays.
    pub plan_price: Money,

    /// [`Kind`] of this [`Client`].
    pub kind: Kind,

    /// [`Plan`] this [`Client`] is subscribed to.
    pub plan: Plan,

    /// [`Date`] the current subscription period ends on.
    pub due_date: Date,

    /// [`Reseller`] this [`Client`] was sold by, if any.
    pub reseller: Option<Reseller>,

    /// [`Server`] this [`Client`] is served from.
    pub server: Server,

    /// Optional [`Notes`] about this [`Client`].
    pub notes: Option<Notes>,

    /// [`Status`] of this [`Client`].
    pub status: Status,

    /// [`DateTime`] when this [`Client`] was registered.
    pub created_at: CreationDateTime,
}

define_id! {
    #[doc = "ID of a [`Client`]."]
    Id
}

define_text! {
    #[doc = "Name of a [`Client`]."]
    Name(max = 512)
}

define_text! {
    #[doc = "Kind of a [`Client`] (direct customer, reseller panel, etc)."]
    Kind(max = 64)
}

define_text! {
    #[doc = "Subscription plan of a [`Client`] (monthly, quarterly, etc)."]
    Plan(max = 64)
}

define_text! {
    #[doc = "Reseller a [`Client`] was sold by."]
    Reseller(max = 256)
}

define_text! {
    #[doc = "Server a [`Client`] is served from."]
    Server(max = 256)
}

define_text! {
    #[doc = "Free-form notes about a [`Client`]."]
    Notes(max = 4096)
}

define_kind! {
    #[doc = "Status of a [`Client`]."]
    enum Status {
        #[doc = "Subscription is in use."]
        Active,

        #[doc = "Subscription is no longer in use."]
        Inactive,
    }
}

/// Phone number of a [`Client`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `phone` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    /// Creates a new [`Phone`] if the given `phone` is valid.
    #[must_use]
    pub fn new(phone: impl Into<String>) -> Option<Self> {
        let phone = phone.into();
        let phone = phone.trim();
        Self::check(phone).then(|| Self(phone.to_owned()))
    }

    /// Checks whether the given `phone` is a valid [`Phone`].
    fn check(phone: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] invariants:
        /// - May start with a `+`;
        /// - Must start and end with a digit;
        /// - May contain spaces, dashes and parentheses between digits;
        /// - Must be between 8 and 24 characters long.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?\(?\d[\d\s()\-]{6,21}\d$").expect("valid regex")
        });

        REGEX.is_match(phone.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

impl TryFrom<String> for Phone {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// [`DateTime`] when a [`Client`] was registered.
pub type CreationDateTime = DateTimeOf<(Client, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Name, Phone};

    #[test]
    fn phone_format() {
        for valid in [
            "11987654321",
            "+55 11 98765-4321",
            "(11) 98765-4321",
            " 2345-6789 ",
        ] {
            assert!(Phone::new(valid).is_some(), "{valid}");
        }

        for invalid in ["", "123", "phone", "+55 11 9876x-4321", "1234567-"] {
            assert!(Phone::new(invalid).is_none(), "{invalid}");
        }
    }

    #[test]
    fn name_is_trimmed() {
        assert_eq!(Name::new("  Maria  ").unwrap().to_string(), "Maria");
        assert!(Name::new("   ").is_none());
    }
}
