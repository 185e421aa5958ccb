//! [`Command`] for editing a [`Purchase`].

use std::num::NonZeroU16;

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date, DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{purchase, Purchase},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for editing a [`Purchase`].
///
/// Only the provided fields are changed. The balances and the
/// [`purchase::Status`] are re-derived afterwards.
#[derive(Clone, Debug)]
pub struct UpdatePurchase {
    /// ID of the [`Purchase`] to be edited.
    pub purchase_id: purchase::Id,

    /// New [`purchase::Name`].
    pub name: Option<purchase::Name>,

    /// New [`purchase::Store`].
    pub store: Option<purchase::Store>,

    /// New [`purchase::Card`].
    pub card: Option<purchase::Card>,

    /// New total amount.
    pub total_amount: Option<Money>,

    /// New purchase [`Date`].
    pub purchase_date: Option<Date>,

    /// New number of installments.
    pub installment_count: Option<NonZeroU16>,

    /// New amount of a single installment.
    ///
    /// If omitted while the total amount or the number of installments
    /// changes, the total amount is split again.
    pub installment_amount: Option<Money>,

    /// New number of paid installments.
    pub installments_paid: Option<u16>,

    /// New [`purchase::InvoiceDay`].
    pub invoice_day: Option<purchase::InvoiceDay>,

    /// New [`purchase::Notes`].
    pub notes: Option<purchase::Notes>,
}

impl UpdatePurchase {
    /// Creates a new [`UpdatePurchase`] [`Command`] changing nothing.
    #[must_use]
    pub fn new(purchase_id: purchase::Id) -> Self {
        Self {
            purchase_id,
            name: None,
            store: None,
            card: None,
            total_amount: None,
            purchase_date: None,
            installment_count: None,
            installment_amount: None,
            installments_paid: None,
            invoice_day: None,
            notes: None,
        }
    }
}

impl<Db> Command<UpdatePurchase> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Purchase, purchase::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Purchase>, purchase::Id>>,
            Ok = Option<Purchase>,
            Err = Traced<database::Error>,
        > + Database<Update<Purchase>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Purchase;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdatePurchase,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdatePurchase {
            purchase_id,
            name,
            store,
            card,
            total_amount,
            purchase_date,
            installment_count,
            installment_amount,
            installments_paid,
            invoice_day,
            notes,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Purchase`.
        tx.execute(Lock(By::new(purchase_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut purchase = tx
            .execute(Select(By::<Option<Purchase>, _>::new(purchase_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PurchaseNotExists(purchase_id))
            .map_err(tracerr::wrap!())?;

        let settled = purchase.status == purchase::Status::Paid;
        let resplit = installment_amount.is_none()
            && (total_amount.is_some_and(|t| t != purchase.total_amount)
                || installment_count
                    .is_some_and(|c| c != purchase.installment_count));

        if let Some(name) = name {
            purchase.name = name;
        }
        if let Some(store) = store {
            purchase.store = store;
        }
        if let Some(card) = card {
            purchase.card = card;
        }
        if let Some(total) = total_amount {
            purchase.total_amount = total;
        }
        if let Some(date) = purchase_date {
            purchase.purchase_date = date;
        }
        if let Some(count) = installment_count {
            purchase.installment_count = count;
        }
        if let Some(amount) = installment_amount {
            purchase.installment_amount = amount;
        } else if resplit {
            purchase.installment_amount = Purchase::default_installment_amount(
                purchase.total_amount,
                purchase.installment_count,
            );
        }
        if let Some(paid) = installments_paid {
            purchase.installments_paid = paid;
        }
        if let Some(day) = invoice_day {
            purchase.invoice_day = day;
        }
        if let Some(notes) = notes {
            purchase.notes = Some(notes);
        }
        if !purchase.fits_calendar() {
            return Err(tracerr::new!(E::BeyondCalendar));
        }
        purchase.recalculate();
        if settled && purchase.status == purchase::Status::Paid {
            // Paid purchases account their whole total as paid.
            purchase.settle();
        }
        purchase.updated_at = DateTime::now().coerce();

        tx.execute(Update(purchase.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(purchase)
    }
}

/// Error of [`UpdatePurchase`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Purchase`] doesn't exist.
    #[display("`Purchase(id: {_0})` does not exist")]
    #[from(ignore)]
    PurchaseNotExists(#[error(not(source))] purchase::Id),

    /// Installments of the [`Purchase`] are billed past the last supported
    /// [`InvoicePeriod`].
    ///
    /// [`InvoicePeriod`]: purchase::InvoicePeriod
    #[display("`Purchase` installments are billed past the year 9999")]
    #[from(ignore)]
    BeyondCalendar,
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroU16;

    use common::Money;

    use crate::{
        command::{update_purchase::ExecutionError, UpdatePurchase},
        domain::purchase::{self, fixture::purchase},
        infra::database::mock::Mock,
        Command as _,
    };

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn resplits_installments() {
        let p = purchase("Nubank", "300.00", 3, "2024-01-15");
        let svc = Mock::default().with_purchase(p.clone()).service();

        let updated = svc
            .execute(UpdatePurchase {
                installment_count: NonZeroU16::new(6),
                notes: purchase::Notes::new("split again"),
                ..UpdatePurchase::new(p.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.installment_amount, money("50.00"));
        assert_eq!(updated.amount_open, money("300.00"));
        assert_eq!(updated.notes.as_ref().unwrap().to_string(), "split again");
        assert_eq!(updated.created_at, p.created_at);
        assert_eq!(svc.database().purchase(p.id), Some(updated));
    }

    #[tokio::test]
    async fn recalculates_ledger() {
        let p = purchase("Nubank", "300.00", 3, "2024-01-15");
        let svc = Mock::default().with_purchase(p.clone()).service();

        let updated = svc
            .execute(UpdatePurchase {
                installments_paid: Some(7),
                ..UpdatePurchase::new(p.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.installments_paid, 3);
        assert_eq!(updated.installments_remaining(), 0);
        assert_eq!(updated.amount_open, Money::ZERO);
        assert_eq!(updated.status, purchase::Status::Paid);
    }

    #[tokio::test]
    async fn keeps_settled_total_on_edit() {
        let mut p = purchase("Nubank", "100.00", 3, "2024-01-15");
        p.settle();
        let svc = Mock::default().with_purchase(p.clone()).service();

        let updated = svc
            .execute(UpdatePurchase {
                notes: purchase::Notes::new("paid off"),
                ..UpdatePurchase::new(p.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.status, purchase::Status::Paid);
        assert_eq!(updated.amount_paid, money("100.00"));
        assert_eq!(updated.amount_open, Money::ZERO);
    }

    #[tokio::test]
    async fn rejects_installments_past_calendar_end() {
        let p = purchase("Nubank", "100.00", 1, "9999-11-15");
        let svc = Mock::default().with_purchase(p.clone()).service();

        let err = svc
            .execute(UpdatePurchase {
                installment_count: NonZeroU16::new(3),
                ..UpdatePurchase::new(p.id)
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::BeyondCalendar));
        assert_eq!(svc.database().purchase(p.id), Some(p));
    }

    #[tokio::test]
    async fn fails_on_unknown_purchase() {
        let svc = Mock::default().service();

        let err = svc
            .execute(UpdatePurchase::new(purchase::Id::new()))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PurchaseNotExists(_)));
    }
}
