//! [`Purchase`] definitions.

mod ledger;

use std::num::NonZeroU16;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateTimeOf, Money};
use derive_more::{Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use super::{define_id, define_text};

#[cfg(test)]
pub(crate) use self::ledger::spec as fixture;
pub use self::ledger::{InvoicePeriod, LedgerError, NextInvoice, Payment};

/// Purchase made on a credit [`Card`] and paid off in monthly installments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Purchase {
    /// ID of this [`Purchase`].
    pub id: Id,

    /// [`Name`] of the bought product.
    pub name: Name,

    /// [`Store`] this [`Purchase`] was made in.
    pub store: Store,

    /// [`Card`] this [`Purchase`] was charged on.
    pub card: Card,

    /// Total amount of this [`Purchase`].
    pub total_amount: Money,

    /// [`Date`] this [`Purchase`] was made on.
    pub purchase_date: Date,

    /// Number of installments this [`Purchase`] is split into.
    pub installment_count: NonZeroU16,

    /// Amount of a single installment.
    pub installment_amount: Money,

    /// Number of already paid installments.
    ///
    /// Never exceeds the [`Purchase::installment_count`].
    pub installments_paid: u16,

    /// Amount still to be paid.
    pub amount_open: Money,

    /// Amount already paid.
    pub amount_paid: Money,

    /// [`Status`] of this [`Purchase`].
    pub status: Status,

    /// First day of the month of the last settled invoice, if any.
    pub last_invoice_paid: Option<Date>,

    /// [`InvoiceDay`] of the [`Card`] this [`Purchase`] was charged on.
    pub invoice_day: InvoiceDay,

    /// Optional [`Notes`] about this [`Purchase`].
    pub notes: Option<Notes>,

    /// [`DateTime`] when this [`Purchase`] was recorded.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Purchase`] was modified last time.
    pub updated_at: ModificationDateTime,
}

define_id! {
    #[doc = "ID of a [`Purchase`]."]
    Id
}

define_text! {
    #[doc = "Name of a product bought in a [`Purchase`]."]
    Name(max = 512)
}

define_text! {
    #[doc = "Store a [`Purchase`] was made in."]
    Store(max = 512)
}

define_text! {
    #[doc = "Name of a credit card a [`Purchase`] is charged on."]
    Card(max = 128)
}

define_text! {
    #[doc = "Free-form notes about a [`Purchase`]."]
    Notes(max = 4096)
}

define_kind! {
    #[doc = "Status of a [`Purchase`]."]
    enum Status {
        #[doc = "Some installments are still to be paid."]
        Pending,

        #[doc = "All the installments are paid."]
        Paid,
    }
}

/// Day of a month a card invoice is due on.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct InvoiceDay(i16);

impl InvoiceDay {
    /// Day used when none is specified.
    pub const DEFAULT: Self = Self(10);

    /// Creates a new [`InvoiceDay`] if the `day` is in `1..=31` range.
    #[must_use]
    pub fn new(day: impl Into<i64>) -> Option<Self> {
        i16::try_from(day.into())
            .ok()
            .filter(|d| (1..=31).contains(d))
            .map(Self)
    }

    /// Returns the day of a month this [`InvoiceDay`] represents.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn day(self) -> u8 {
        u8::try_from(self.0).expect("in `1..=31` range")
    }
}

impl Default for InvoiceDay {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// [`DateTime`] when a [`Purchase`] was recorded.
pub type CreationDateTime = DateTimeOf<(Purchase, unit::Creation)>;

/// [`DateTime`] when a [`Purchase`] was modified last time.
pub type ModificationDateTime = DateTimeOf<(Purchase, unit::Modification)>;
