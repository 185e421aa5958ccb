//! Installment ledger of a [`Purchase`].
//!
//! The installment with 0-based index `k` is billed in the invoice of the
//! month `month(purchase_date) + k`, so the first installment falls on the
//! invoice of the purchase month itself.

use std::str::FromStr;

use common::{Date, Money};
use derive_more::{Display, Error};

use super::{InvoiceDay, Purchase, Status};

/// Calendar month a card invoice is issued for.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{year:04}-{month:02}")]
pub struct InvoicePeriod {
    /// Year of the invoice.
    year: i32,

    /// Month of the invoice, in `1..=12` range.
    month: u8,
}

impl InvoicePeriod {
    /// Latest [`InvoicePeriod`] every day of which is a valid [`Date`].
    pub const LAST: Self = Self {
        year: 9999,
        month: 12,
    };

    /// Creates a new [`InvoicePeriod`] if the `month` is in `1..=12` range
    /// and the whole month is representable as [`Date`]s.
    #[must_use]
    pub fn new(year: i32, month: u8) -> Option<Self> {
        Date::from_calendar(year, month, 1).map(|_| Self { year, month })
    }

    /// Returns the [`InvoicePeriod`] the installment with the provided 0-based
    /// `index` of a purchase made on the `purchase_date` is billed in.
    ///
    /// [`None`] is returned if that period lies past [`InvoicePeriod::LAST`].
    #[must_use]
    pub fn checked_of(purchase_date: Date, index: u16) -> Option<Self> {
        let months = i32::from(purchase_date.month()) - 1 + i32::from(index);
        Self::new(
            purchase_date.year() + months.div_euclid(12),
            u8::try_from(months.rem_euclid(12) + 1).ok()?,
        )
    }

    /// Returns the [`InvoicePeriod`] the installment with the provided 0-based
    /// `index` of a purchase made on the `purchase_date` is billed in.
    ///
    /// Saturates at [`InvoicePeriod::LAST`].
    #[must_use]
    pub fn of(purchase_date: Date, index: u16) -> Self {
        Self::checked_of(purchase_date, index).unwrap_or(Self::LAST)
    }

    /// Returns the year of this [`InvoicePeriod`].
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Returns the month of this [`InvoicePeriod`], in `1..=12` range.
    #[must_use]
    pub const fn month(self) -> u8 {
        self.month
    }

    /// Returns the first day of this [`InvoicePeriod`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn first_day(self) -> Date {
        Date::from_calendar(self.year, self.month, 1)
            .expect("checked by `InvoicePeriod::new()`")
    }

    /// Returns the [`Date`] the invoice of this [`InvoicePeriod`] is due on.
    ///
    /// The [`InvoiceDay`] is clamped to the length of the month.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn due_date(self, day: InvoiceDay) -> Date {
        Date::clamped(self.year, self.month, day.day())
            .expect("checked by `InvoicePeriod::new()`")
    }
}

impl FromStr for InvoicePeriod {
    type Err = &'static str;

    /// Parses an [`InvoicePeriod`] out of the `YYYY-MM` format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ERR: &str = "expected `YYYY-MM` invoice period";

        let (year, month) = s.trim().split_once('-').ok_or(ERR)?;
        Self::new(
            year.parse().map_err(|_| ERR)?,
            month.parse().map_err(|_| ERR)?,
        )
        .ok_or(ERR)
    }
}

/// Invoice of the next unpaid installment of a [`Purchase`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NextInvoice {
    /// [`InvoicePeriod`] the installment is billed in.
    pub period: InvoicePeriod,

    /// Amount of the installment.
    pub amount: Money,
}

/// Outcome of paying a single installment of a [`Purchase`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Payment {
    /// 1-based number of the paid installment.
    pub installment: u16,

    /// [`InvoicePeriod`] the paid installment was billed in.
    pub period: InvoicePeriod,

    /// Paid amount.
    pub amount: Money,

    /// [`NextInvoice`] to be paid, if the [`Purchase`] is still pending.
    pub next: Option<NextInvoice>,
}

/// Error of applying a payment to a [`Purchase`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum LedgerError {
    /// [`Purchase`] has no installments left to pay.
    #[display("`Purchase` is already settled")]
    AlreadySettled,

    /// Requested installment is not the next payable one.
    #[display(
        "Installment #{number} cannot be paid: {paid} of {count} \
         installments are paid already"
    )]
    InvalidInstallmentIndex {
        /// Requested 1-based installment number.
        number: u16,

        /// Number of already paid installments.
        paid: u16,

        /// Total number of installments.
        count: u16,
    },
}

impl Purchase {
    /// Returns the amount of a single installment when the `total` is split
    /// into `count` installments.
    #[must_use]
    pub fn default_installment_amount(
        total: Money,
        count: std::num::NonZeroU16,
    ) -> Money {
        total.split(count)
    }

    /// Returns the number of installments still to be paid.
    #[must_use]
    pub fn installments_remaining(&self) -> u16 {
        self.installment_count.get().saturating_sub(self.installments_paid)
    }

    /// Returns the [`InvoicePeriod`] of the next unpaid installment.
    #[must_use]
    pub fn next_invoice_period(&self) -> InvoicePeriod {
        InvoicePeriod::of(self.purchase_date, self.installments_paid)
    }

    /// Returns the [`InvoicePeriod`]s of all the installments, in order.
    pub fn invoice_periods(
        &self,
    ) -> impl Iterator<Item = InvoicePeriod> + '_ {
        (0..self.installment_count.get())
            .map(|k| InvoicePeriod::of(self.purchase_date, k))
    }

    /// Returns the [`InvoicePeriod`] of the first installment.
    #[must_use]
    pub fn first_invoice(&self) -> InvoicePeriod {
        InvoicePeriod::of(self.purchase_date, 0)
    }

    /// Returns the [`InvoicePeriod`] of the last installment.
    #[must_use]
    pub fn last_invoice(&self) -> InvoicePeriod {
        InvoicePeriod::of(
            self.purchase_date,
            self.installment_count.get() - 1,
        )
    }

    /// Indicates whether every installment of this [`Purchase`] is billed no
    /// later than [`InvoicePeriod::LAST`].
    #[must_use]
    pub fn fits_calendar(&self) -> bool {
        InvoicePeriod::checked_of(
            self.purchase_date,
            self.installment_count.get() - 1,
        )
        .is_some()
    }

    /// Indicates whether the next invoice of this [`Purchase`] is the one of
    /// the provided [`InvoicePeriod`].
    #[must_use]
    pub fn is_billed_in(&self, period: InvoicePeriod) -> bool {
        self.status == Status::Pending
            && self.installments_remaining() > 0
            && self.next_invoice_period() == period
    }

    /// Pays the next unpaid installment of this [`Purchase`].
    ///
    /// Not idempotent: every call advances the ledger by one installment.
    ///
    /// # Errors
    ///
    /// With [`LedgerError::AlreadySettled`] if there is nothing to pay.
    pub fn pay_next_installment(&mut self) -> Result<Payment, LedgerError> {
        if self.status == Status::Paid || self.installments_remaining() == 0 {
            return Err(LedgerError::AlreadySettled);
        }

        let period = self.next_invoice_period();
        self.installments_paid += 1;
        self.recalculate();
        self.last_invoice_paid = Some(period.first_day());

        let next = (self.status == Status::Pending).then(|| NextInvoice {
            period: self.next_invoice_period(),
            amount: self.installment_amount,
        });
        Ok(Payment {
            installment: self.installments_paid,
            period,
            amount: self.installment_amount,
            next,
        })
    }

    /// Pays the installment with the provided 1-based `number`, which must be
    /// the next unpaid one.
    ///
    /// # Errors
    ///
    /// - With [`LedgerError::AlreadySettled`] if there is nothing to pay.
    /// - With [`LedgerError::InvalidInstallmentIndex`] if the `number` is out
    ///   of `1..=installment_count` range or is not the next unpaid
    ///   installment.
    pub fn pay_installment(
        &mut self,
        number: u16,
    ) -> Result<Payment, LedgerError> {
        if self.status == Status::Paid || self.installments_remaining() == 0 {
            return Err(LedgerError::AlreadySettled);
        }

        let count = self.installment_count.get();
        if number == 0 || number > count || number != self.installments_paid + 1
        {
            return Err(LedgerError::InvalidInstallmentIndex {
                number,
                paid: self.installments_paid,
                count,
            });
        }

        self.pay_next_installment()
    }

    /// Marks this [`Purchase`] as fully paid.
    ///
    /// Idempotent.
    pub fn settle(&mut self) {
        self.installments_paid = self.installment_count.get();
        self.amount_open = Money::ZERO;
        self.amount_paid = self.total_amount;
        self.status = Status::Paid;
    }

    /// Re-derives the balances and the [`Status`] of this [`Purchase`] from
    /// its installment counters.
    pub fn recalculate(&mut self) {
        self.installments_paid =
            self.installments_paid.min(self.installment_count.get());

        let remaining = self.installments_remaining();
        self.amount_open = self.installment_amount.times(remaining.into());
        self.amount_paid =
            self.installment_amount.times(self.installments_paid.into());
        self.status = if remaining == 0 {
            Status::Paid
        } else {
            Status::Pending
        };
    }
}

#[cfg(test)]
pub(crate) mod spec {
    use std::num::NonZeroU16;

    use common::{Date, DateTime, Money};

    use super::{
        super::{Card, Id, InvoiceDay, Name, Purchase, Status, Store},
        InvoicePeriod, LedgerError, NextInvoice,
    };

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn period(year: i32, month: u8) -> InvoicePeriod {
        InvoicePeriod::new(year, month).unwrap()
    }

    /// Creates a fresh pending [`Purchase`] on the provided `card`.
    pub(crate) fn purchase(
        card: &str,
        total: &str,
        count: u16,
        purchase_date: &str,
    ) -> Purchase {
        let total = money(total);
        let count = NonZeroU16::new(count).unwrap();
        let mut p = Purchase {
            id: Id::new(),
            name: Name::new("Notebook").unwrap(),
            store: Store::new("Shopping Center").unwrap(),
            card: Card::new(card).unwrap(),
            total_amount: total,
            purchase_date: date(purchase_date),
            installment_count: count,
            installment_amount: Purchase::default_installment_amount(
                total, count,
            ),
            installments_paid: 0,
            amount_open: Money::ZERO,
            amount_paid: Money::ZERO,
            status: Status::Pending,
            last_invoice_paid: None,
            invoice_day: InvoiceDay::default(),
            notes: None,
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        };
        p.recalculate();
        p
    }

    fn assert_invariants(p: &Purchase) {
        assert_eq!(
            p.installments_paid + p.installments_remaining(),
            p.installment_count.get(),
        );
        assert_eq!(
            p.status == Status::Paid,
            p.installments_remaining() == 0,
        );
        assert!(p.installments_paid <= p.installment_count.get());
    }

    #[test]
    fn first_installment_is_billed_in_purchase_month() {
        let p = purchase("Nubank", "120.00", 4, "2024-05-31");

        assert_eq!(p.next_invoice_period(), period(2024, 5));
        assert_eq!(p.first_invoice(), period(2024, 5));
        assert_eq!(p.last_invoice(), period(2024, 8));
    }

    #[test]
    fn period_rolls_over_year() {
        assert_eq!(InvoicePeriod::of(date("2023-11-20"), 2), period(2024, 1));
        assert_eq!(InvoicePeriod::of(date("2023-12-01"), 1), period(2024, 1));
        assert_eq!(InvoicePeriod::of(date("2023-12-01"), 13), period(2025, 1));
        assert_eq!(InvoicePeriod::of(date("2023-01-01"), 11), period(2023, 12));
        assert_eq!(InvoicePeriod::of(date("2023-01-01"), 24), period(2025, 1));
    }

    #[test]
    fn periods_are_strictly_increasing() {
        let p = purchase("Nubank", "1200.00", 18, "2023-09-10");

        let periods = p.invoice_periods().collect::<Vec<_>>();
        assert_eq!(periods.len(), 18);
        assert!(periods.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(periods[0], period(2023, 9));
        assert_eq!(periods[17], period(2025, 2));
    }

    #[test]
    fn period_parses_from_str() {
        assert_eq!("2024-03".parse::<InvoicePeriod>(), Ok(period(2024, 3)));
        assert_eq!(period(2025, 1).to_string(), "2025-01");

        for invalid in ["2024", "2024-13", "2024-00", "march", "2024-1x"] {
            assert!(invalid.parse::<InvoicePeriod>().is_err(), "{invalid}");
        }
    }

    #[test]
    fn periods_stop_at_calendar_end() {
        assert_eq!(InvoicePeriod::new(10000, 1), None);
        assert!("10000-01".parse::<InvoicePeriod>().is_err());

        let december = date("9999-12-15");
        assert_eq!(InvoicePeriod::checked_of(december, 0), Some(period(9999, 12)));
        assert_eq!(InvoicePeriod::checked_of(december, 1), None);
        assert_eq!(InvoicePeriod::of(december, 1), InvoicePeriod::LAST);
        assert_eq!(
            InvoicePeriod::LAST.due_date(InvoiceDay::new(31).unwrap()),
            date("9999-12-31"),
        );
    }

    #[test]
    fn purchase_must_be_billed_within_calendar() {
        assert!(purchase("Nubank", "100.00", 1, "9999-12-15").fits_calendar());
        assert!(!purchase("Nubank", "100.00", 2, "9999-12-15").fits_calendar());
        assert!(purchase("Nubank", "100.00", 12, "9999-01-01").fits_calendar());
    }

    #[test]
    fn paying_last_calendar_month_does_not_panic() {
        let mut p = purchase("Nubank", "100.00", 1, "9999-12-15");

        let payment = p.pay_next_installment().unwrap();

        assert_eq!(payment.period, InvoicePeriod::LAST);
        assert_eq!(payment.next, None);
        assert_eq!(p.last_invoice_paid, Some(date("9999-12-01")));
        assert_eq!(p.status, Status::Paid);
    }

    #[test]
    fn period_due_date_is_clamped() {
        let day = InvoiceDay::new(31).unwrap();

        assert_eq!(period(2024, 2).due_date(day), date("2024-02-29"));
        assert_eq!(period(2024, 3).due_date(day), date("2024-03-31"));
        assert_eq!(
            period(2024, 6).due_date(InvoiceDay::default()),
            date("2024-06-10"),
        );
        assert_eq!(period(2024, 6).first_day(), date("2024-06-01"));
    }

    #[test]
    fn pays_one_installment() {
        let mut p = purchase("Nubank", "300.00", 3, "2024-01-15");
        assert_eq!(p.installment_amount, money("100.00"));
        assert_eq!(p.amount_open, money("300.00"));

        let payment = p.pay_next_installment().unwrap();

        assert_eq!(p.installments_paid, 1);
        assert_eq!(p.installments_remaining(), 2);
        assert_eq!(p.amount_paid, money("100.00"));
        assert_eq!(p.amount_open, money("200.00"));
        assert_eq!(p.status, Status::Pending);
        assert_eq!(p.last_invoice_paid, Some(date("2024-01-01")));
        assert_eq!(p.next_invoice_period(), period(2024, 2));

        assert_eq!(payment.installment, 1);
        assert_eq!(payment.period, period(2024, 1));
        assert_eq!(payment.amount, money("100.00"));
        assert_eq!(
            payment.next,
            Some(NextInvoice {
                period: period(2024, 2),
                amount: money("100.00"),
            }),
        );
        assert_invariants(&p);
    }

    #[test]
    fn paying_twice_advances_twice() {
        let mut p = purchase("Nubank", "90.00", 3, "2024-01-15");

        let mut remaining = vec![p.installments_remaining()];
        _ = p.pay_next_installment().unwrap();
        remaining.push(p.installments_remaining());
        _ = p.pay_next_installment().unwrap();
        remaining.push(p.installments_remaining());

        assert_eq!(remaining, [3, 2, 1]);
        assert_invariants(&p);
    }

    #[test]
    fn paying_every_installment_settles() {
        let mut p = purchase("Nubank", "100.00", 3, "2024-11-05");

        for _ in 0..3 {
            assert_invariants(&p);
            _ = p.pay_next_installment().unwrap();
        }

        assert_eq!(p.status, Status::Paid);
        assert_eq!(p.amount_open, Money::ZERO);
        assert_eq!(p.amount_paid, money("99.99"));
        assert_eq!(p.last_invoice_paid, Some(date("2025-01-01")));
        assert_invariants(&p);

        assert_eq!(p.pay_next_installment(), Err(LedgerError::AlreadySettled));
    }

    #[test]
    fn last_payment_has_no_next_invoice() {
        let mut p = purchase("Nubank", "50.00", 1, "2024-03-02");

        let payment = p.pay_next_installment().unwrap();

        assert_eq!(payment.next, None);
        assert_eq!(p.status, Status::Paid);
    }

    #[test]
    fn pays_explicit_installment() {
        let mut p = purchase("Nubank", "300.00", 3, "2024-01-15");

        assert_eq!(
            p.pay_installment(0),
            Err(LedgerError::InvalidInstallmentIndex {
                number: 0,
                paid: 0,
                count: 3,
            }),
        );
        assert_eq!(
            p.pay_installment(4),
            Err(LedgerError::InvalidInstallmentIndex {
                number: 4,
                paid: 0,
                count: 3,
            }),
        );
        assert_eq!(
            p.pay_installment(2),
            Err(LedgerError::InvalidInstallmentIndex {
                number: 2,
                paid: 0,
                count: 3,
            }),
        );
        assert_eq!(p.installments_paid, 0);

        let payment = p.pay_installment(1).unwrap();
        assert_eq!(payment.installment, 1);
        assert_eq!(p.installments_paid, 1);

        p.settle();
        assert_eq!(p.pay_installment(2), Err(LedgerError::AlreadySettled));
    }

    #[test]
    fn settling_is_idempotent() {
        let mut p = purchase("Nubank", "100.00", 3, "2024-01-15");
        _ = p.pay_next_installment().unwrap();

        p.settle();
        let once = p.clone();
        p.settle();

        assert_eq!(p, once);
        assert_eq!(p.installments_paid, 3);
        assert_eq!(p.installments_remaining(), 0);
        assert_eq!(p.amount_open, Money::ZERO);
        assert_eq!(p.amount_paid, money("100.00"));
        assert_eq!(p.status, Status::Paid);
        assert_invariants(&p);
    }

    #[test]
    fn recalculation_clamps_paid_installments() {
        let mut p = purchase("Nubank", "400.00", 4, "2024-01-15");
        _ = p.pay_next_installment().unwrap();
        _ = p.pay_next_installment().unwrap();
        _ = p.pay_next_installment().unwrap();

        p.installment_count = NonZeroU16::new(2).unwrap();
        p.recalculate();

        assert_eq!(p.installments_paid, 2);
        assert_eq!(p.status, Status::Paid);
        assert_invariants(&p);
    }

    #[test]
    fn billing_matches_next_period_only() {
        let mut p = purchase("Nubank", "200.00", 2, "2024-02-10");

        assert!(p.is_billed_in(period(2024, 2)));
        assert!(!p.is_billed_in(period(2024, 3)));

        _ = p.pay_next_installment().unwrap();
        assert!(p.is_billed_in(period(2024, 3)));

        _ = p.pay_next_installment().unwrap();
        assert!(!p.is_billed_in(period(2024, 3)));
        assert!(!p.is_billed_in(period(2024, 4)));
    }
}
