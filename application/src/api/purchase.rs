//! [`Purchase`]-related definitions.

use std::num::NonZeroU16;

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar};
use service::{command, domain};
use uuid::Uuid;

use crate::{api::scalar, define_error, Context, Error};

/// A purchase made on a credit card and paid off in installments.
#[derive(Clone, Debug, From, Into)]
pub struct Purchase(domain::Purchase);

/// A purchase made on a credit card and paid off in installments.
#[graphql_object(context = Context)]
impl Purchase {
    /// Unique identifier of this `Purchase`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Name of the bought product.
    #[must_use]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Store this `Purchase` was made in.
    #[must_use]
    pub fn store(&self) -> Store {
        self.0.store.clone().into()
    }

    /// Card this `Purchase` was charged on.
    #[must_use]
    pub fn card(&self) -> Card {
        self.0.card.clone().into()
    }

    /// Total amount of this `Purchase`.
    #[must_use]
    pub fn total_amount(&self) -> Money {
        self.0.total_amount
    }

    /// `Date` this `Purchase` was made on.
    #[must_use]
    pub fn purchase_date(&self) -> Date {
        self.0.purchase_date
    }

    /// Number of installments this `Purchase` is split into.
    #[must_use]
    pub fn installment_count(&self) -> i32 {
        self.0.installment_count.get().into()
    }

    /// Amount of a single installment.
    #[must_use]
    pub fn installment_amount(&self) -> Money {
        self.0.installment_amount
    }

    /// Number of already paid installments.
    #[must_use]
    pub fn installments_paid(&self) -> i32 {
        self.0.installments_paid.into()
    }

    /// Number of installments still to be paid.
    #[must_use]
    pub fn installments_remaining(&self) -> i32 {
        self.0.installments_remaining().into()
    }

    /// Amount still to be paid.
    #[must_use]
    pub fn amount_open(&self) -> Money {
        self.0.amount_open
    }

    /// Amount already paid.
    #[must_use]
    pub fn amount_paid(&self) -> Money {
        self.0.amount_paid
    }

    /// Status of this `Purchase`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Day of a month the card invoice is due on.
    #[must_use]
    pub fn invoice_day(&self) -> i32 {
        i32::from(self.0.invoice_day.day())
    }

    /// First day of the month of the last settled invoice, if any.
    #[must_use]
    pub fn last_invoice_paid(&self) -> Option<Date> {
        self.0.last_invoice_paid
    }

    /// Invoice the first installment is billed in.
    #[must_use]
    pub fn first_invoice(&self) -> InvoicePeriod {
        self.0.first_invoice().into()
    }

    /// Invoice the last installment is billed in.
    #[must_use]
    pub fn last_invoice(&self) -> InvoicePeriod {
        self.0.last_invoice().into()
    }

    /// Invoice the next unpaid installment is billed in.
    ///
    /// `null` once this `Purchase` is paid.
    #[must_use]
    pub fn next_invoice(&self) -> Option<NextInvoice> {
        (self.0.status == domain::purchase::Status::Pending).then(|| {
            NextInvoice {
                invoice: domain::purchase::NextInvoice {
                    period: self.0.next_invoice_period(),
                    amount: self.0.installment_amount,
                },
                day: self.0.invoice_day,
            }
        })
    }

    /// Notes about this `Purchase`.
    #[must_use]
    pub fn notes(&self) -> Option<Notes> {
        self.0.notes.clone().map(Into::into)
    }

    /// `DateTime` when this `Purchase` was recorded.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// `DateTime` when this `Purchase` was modified last time.
    #[must_use]
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

/// Invoice of an installment still to be paid.
#[derive(Clone, Copy, Debug)]
pub struct NextInvoice {
    /// Underlying [`domain::purchase::NextInvoice`].
    invoice: domain::purchase::NextInvoice,

    /// Day of a month the invoice is due on.
    day: domain::purchase::InvoiceDay,
}

/// Invoice of an installment still to be paid.
#[graphql_object(name = "PurchaseNextInvoice", context = Context)]
impl NextInvoice {
    /// Period the installment is billed in.
    #[must_use]
    pub fn period(&self) -> InvoicePeriod {
        self.invoice.period.into()
    }

    /// Amount of the installment.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.invoice.amount
    }

    /// `Date` the invoice is due on.
    #[must_use]
    pub fn due_date(&self) -> Date {
        self.invoice.period.due_date(self.day)
    }
}

/// Outcome of paying a single installment of a `Purchase`.
#[derive(Clone, Debug, From)]
pub struct InstallmentPayment(command::pay_purchase_installment::Output);

/// Outcome of paying a single installment of a `Purchase`.
#[graphql_object(context = Context)]
impl InstallmentPayment {
    /// `Purchase` after the payment.
    #[must_use]
    pub fn purchase(&self) -> Purchase {
        self.0.purchase.clone().into()
    }

    /// 1-based number of the paid installment.
    #[must_use]
    pub fn installment(&self) -> i32 {
        self.0.payment.installment.into()
    }

    /// Period the paid installment was billed in.
    #[must_use]
    pub fn period(&self) -> InvoicePeriod {
        self.0.payment.period.into()
    }

    /// Paid amount.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.0.payment.amount
    }

    /// Next invoice to be paid, if the `Purchase` is still pending.
    #[must_use]
    pub fn next_invoice(&self) -> Option<NextInvoice> {
        self.0.payment.next.map(|invoice| NextInvoice {
            invoice,
            day: self.0.purchase.invoice_day,
        })
    }
}

/// Unique identifier of a `Purchase`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::purchase::Id)]
#[into(domain::purchase::Id)]
#[graphql(name = "PurchaseId", transparent)]
pub struct Id(Uuid);

/// Name of a product bought in a `Purchase`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PurchaseName",
    with = scalar::Via::<domain::purchase::Name>,
)]
pub struct Name(domain::purchase::Name);

/// Store a `Purchase` was made in.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PurchaseStore",
    with = scalar::Via::<domain::purchase::Store>,
)]
pub struct Store(domain::purchase::Store);

/// Name of a credit card.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "Card", with = scalar::Via::<domain::purchase::Card>)]
pub struct Card(domain::purchase::Card);

/// Notes about a `Purchase`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PurchaseNotes",
    with = scalar::Via::<domain::purchase::Notes>,
)]
pub struct Notes(domain::purchase::Notes);

/// Calendar month a card invoice is issued for, in `YYYY-MM` format.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(with = scalar::Via::<domain::purchase::InvoicePeriod>)]
pub struct InvoicePeriod(domain::purchase::InvoicePeriod);

/// Status of a `Purchase`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PurchaseStatus")]
pub enum Status {
    /// Some installments are still to be paid.
    Pending,

    /// All the installments are paid.
    Paid,
}

impl From<domain::purchase::Status> for Status {
    fn from(status: domain::purchase::Status) -> Self {
        use domain::purchase::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Paid => Self::Paid,
        }
    }
}

impl From<Status> for domain::purchase::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => Self::Pending,
            Status::Paid => Self::Paid,
        }
    }
}

/// Description of a new `Purchase`.
#[derive(Clone, Debug, Default, GraphQLInputObject)]
#[graphql(name = "PurchaseInput")]
pub struct Input {
    /// Name of the bought product. Required.
    pub name: Option<Name>,

    /// Store the `Purchase` was made in. Required.
    pub store: Option<Store>,

    /// Card the `Purchase` was charged on. Required.
    pub card: Option<Card>,

    /// Total amount of the `Purchase`. Required.
    pub total_amount: Option<Money>,

    /// `Date` the `Purchase` was made on. Required.
    pub purchase_date: Option<Date>,

    /// Number of installments. Required.
    pub installment_count: Option<i32>,

    /// Amount of a single installment. Defaults to the total amount split
    /// into the installments.
    pub installment_amount: Option<Money>,

    /// Day of a month the card invoice is due on. Defaults to `10`.
    pub invoice_day: Option<i32>,

    /// Initial status. A `Purchase` recorded as `PAID` is settled right away.
    pub status: Option<Status>,

    /// Notes about the `Purchase`.
    pub notes: Option<Notes>,
}

impl TryFrom<Input> for command::CreatePurchase {
    type Error = Error;

    fn try_from(input: Input) -> Result<Self, Self::Error> {
        Ok(Self {
            name: input.name.map(Into::into),
            store: input.store.map(Into::into),
            card: input.card.map(Into::into),
            total_amount: input.total_amount,
            purchase_date: input.purchase_date,
            installment_count: input
                .installment_count
                .map(installment_count)
                .transpose()?,
            installment_amount: input.installment_amount,
            invoice_day: input.invoice_day.map(invoice_day).transpose()?,
            status: input.status.map(Into::into),
            notes: input.notes.map(Into::into),
        })
    }
}

/// Changes to be applied to a `Purchase`.
///
/// Omitted fields are kept as they are.
#[derive(Clone, Debug, Default, GraphQLInputObject)]
#[graphql(name = "PurchaseChanges")]
pub struct Changes {
    /// New name of the bought product.
    pub name: Option<Name>,

    /// New store.
    pub store: Option<Store>,

    /// New card.
    pub card: Option<Card>,

    /// New total amount.
    pub total_amount: Option<Money>,

    /// New purchase `Date`.
    pub purchase_date: Option<Date>,

    /// New number of installments.
    pub installment_count: Option<i32>,

    /// New amount of a single installment.
    pub installment_amount: Option<Money>,

    /// New number of already paid installments.
    pub installments_paid: Option<i32>,

    /// New day of a month the card invoice is due on.
    pub invoice_day: Option<i32>,

    /// New notes.
    pub notes: Option<Notes>,
}

impl Changes {
    /// Converts these [`Changes`] into a [`command::UpdatePurchase`] of the
    /// `Purchase` with the provided `id`.
    ///
    /// # Errors
    ///
    /// With an [`InputError`] if any of the numbers is out of range.
    pub fn into_command(self, id: Id) -> Result<command::UpdatePurchase, Error> {
        Ok(command::UpdatePurchase {
            name: self.name.map(Into::into),
            store: self.store.map(Into::into),
            card: self.card.map(Into::into),
            total_amount: self.total_amount,
            purchase_date: self.purchase_date,
            installment_count: self
                .installment_count
                .map(installment_count)
                .transpose()?,
            installment_amount: self.installment_amount,
            installments_paid: self
                .installments_paid
                .map(|paid| {
                    u16::try_from(paid)
                        .map_err(|_| Error::from(InputError::InstallmentsPaid))
                })
                .transpose()?,
            invoice_day: self.invoice_day.map(invoice_day).transpose()?,
            notes: self.notes.map(Into::into),
            ..command::UpdatePurchase::new(id.into())
        })
    }
}

/// Converts the provided GraphQL `count` into an installment count.
///
/// # Errors
///
/// With [`InputError::InstallmentCount`] if the `count` is not positive or
/// is too big.
pub fn installment_count(count: i32) -> Result<NonZeroU16, Error> {
    u16::try_from(count)
        .ok()
        .and_then(NonZeroU16::new)
        .ok_or_else(|| InputError::InstallmentCount.into())
}

/// Converts the provided GraphQL `number` into a 1-based installment number.
///
/// # Errors
///
/// With [`InputError::InstallmentIndex`] if the `number` is out of range.
pub fn installment_number(number: i32) -> Result<u16, Error> {
    u16::try_from(number)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| InputError::InstallmentIndex.into())
}

/// Converts the provided GraphQL `day` into a [`domain::purchase::InvoiceDay`].
///
/// # Errors
///
/// With [`InputError::InvoiceDay`] if the `day` is not in `1..=31` range.
pub fn invoice_day(day: i32) -> Result<domain::purchase::InvoiceDay, Error> {
    domain::purchase::InvoiceDay::new(day)
        .ok_or_else(|| InputError::InvoiceDay.into())
}

define_error! {
    enum InputError {
        #[code = "INVALID_INSTALLMENT_COUNT"]
        #[status = BAD_REQUEST]
        #[message = "Installment count must be a positive number not \
                     exceeding 65535"]
        InstallmentCount,

        #[code = "INVALID_INSTALLMENT_INDEX"]
        #[status = BAD_REQUEST]
        #[message = "Installment number must be a positive number"]
        InstallmentIndex,

        #[code = "INVALID_INSTALLMENTS_PAID"]
        #[status = BAD_REQUEST]
        #[message = "Number of paid installments must not be negative"]
        InstallmentsPaid,

        #[code = "INVALID_INVOICE_DAY"]
        #[status = BAD_REQUEST]
        #[message = "Invoice day must be in `1..=31` range"]
        InvoiceDay,
    }
}


pub mod invoice {
    //! Definitions related to the card invoices.

    use common::Money;
    use derive_more::From;
    use juniper::graphql_object;
    use service::{command, read};

    use super::{Card, Id, InvoicePeriod, Name};
    use crate::{AsError, Context, Error};

    /// Pending card invoice of a single month.
    #[derive(Clone, Debug, From)]
    pub struct Group(read::purchase::invoice::Group);

    /// Pending card invoice of a single month.
    #[graphql_object(name = "InvoiceGroup", context = Context)]
    impl Group {
        /// Card the invoice is issued by.
        #[must_use]
        pub fn card(&self) -> Card {
            self.0.card.clone().into()
        }

        /// Period the invoice is issued for.
        #[must_use]
        pub fn period(&self) -> InvoicePeriod {
            self.0.period.into()
        }

        /// Total amount of the invoice.
        #[must_use]
        pub fn total(&self) -> Money {
            self.0.total
        }

        /// Installments billed in the invoice.
        #[must_use]
        pub fn items(&self) -> Vec<LineItem> {
            self.0.items.iter().cloned().map(LineItem).collect()
        }
    }

    /// Installment of a `Purchase` billed in an `InvoiceGroup`.
    #[derive(Clone, Debug)]
    pub struct LineItem(read::purchase::invoice::LineItem);

    /// Installment of a `Purchase` billed in an `InvoiceGroup`.
    #[graphql_object(name = "InvoiceLineItem", context = Context)]
    impl LineItem {
        /// ID of the `Purchase` the installment belongs to.
        #[must_use]
        pub fn purchase_id(&self) -> Id {
            self.0.purchase_id.into()
        }

        /// Name of the `Purchase` the installment belongs to.
        #[must_use]
        pub fn name(&self) -> Name {
            self.0.name.clone().into()
        }

        /// 1-based number of the installment.
        #[must_use]
        pub fn installment(&self) -> i32 {
            self.0.installment.into()
        }

        /// Total number of installments of the `Purchase`.
        #[must_use]
        pub fn count(&self) -> i32 {
            self.0.count.get().into()
        }

        /// Amount of the installment.
        #[must_use]
        pub fn amount(&self) -> Money {
            self.0.amount
        }
    }

    /// Outcome of paying a whole card invoice.
    #[derive(Clone, Debug, From)]
    pub struct Payment(command::pay_card_invoice::Output);

    /// Outcome of paying a whole card invoice.
    #[graphql_object(name = "InvoicePayment", context = Context)]
    impl Payment {
        /// Sum of the paid installments.
        #[must_use]
        pub fn total_paid(&self) -> Money {
            self.0.total_paid
        }

        /// Number of the `Purchase`s paid.
        pub fn count(&self) -> Result<i32, Error> {
            i32::try_from(self.0.count()).map_err(AsError::into_error)
        }

        /// IDs of the paid `Purchase`s.
        #[must_use]
        pub fn purchase_ids(&self) -> Vec<Id> {
            self.0.purchase_ids.iter().copied().map(Into::into).collect()
        }

        /// `Purchase`s failed to be paid.
        #[must_use]
        pub fn failures(&self) -> Vec<Failure> {
            self.0.failures.iter().cloned().map(Failure).collect()
        }
    }

    /// `Purchase` failed to be paid along with its invoice.
    #[derive(Clone, Debug)]
    pub struct Failure(command::pay_card_invoice::Failure);

    /// `Purchase` failed to be paid along with its invoice.
    #[graphql_object(name = "InvoicePaymentFailure", context = Context)]
    impl Failure {
        /// ID of the `Purchase` failed to be paid.
        #[must_use]
        pub fn purchase_id(&self) -> Id {
            self.0.purchase_id.into()
        }

        /// Reason of the failure.
        #[must_use]
        pub fn reason(&self) -> &str {
            &self.0.reason
        }
    }
}
