//! [`Command`] for recording a new [`Purchase`].

use std::num::NonZeroU16;

use common::{
    operations::{Commit, Insert, Transact, Transacted},
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

/// [`Command`] for recording a new [`Purchase`].
///
/// Every field is optional at this level, so that a missing one is reported
/// as [`ExecutionError::MissingRequiredField`].
#[derive(Clone, Debug, Default)]
pub struct CreatePurchase {
    /// [`purchase::Name`] of the bought product. Required.
    pub name: Option<purchase::Name>,

    /// [`purchase::Store`] the [`Purchase`] was made in. Required.
    pub store: Option<purchase::Store>,

    /// [`purchase::Card`] the [`Purchase`] was charged on. Required.
    pub card: Option<purchase::Card>,

    /// Total amount of the [`Purchase`]. Required.
    pub total_amount: Option<Money>,

    /// [`Date`] the [`Purchase`] was made on. Required.
    pub purchase_date: Option<Date>,

    /// Number of installments. Required.
    pub installment_count: Option<NonZeroU16>,

    /// Amount of a single installment.
    ///
    /// Defaults to the total amount split into the installments.
    pub installment_amount: Option<Money>,

    /// [`purchase::InvoiceDay`] of the [`purchase::Card`].
    pub invoice_day: Option<purchase::InvoiceDay>,

    /// Initial [`purchase::Status`], [`purchase::Status::Pending`] by default.
    ///
    /// A [`Purchase`] recorded as [`purchase::Status::Paid`] is settled right
    /// away.
    pub status: Option<purchase::Status>,

    /// Optional [`purchase::Notes`].
    pub notes: Option<purchase::Notes>,
}

impl<Db> Command<CreatePurchase> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Purchase>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Purchase;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePurchase,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePurchase {
            name,
            store,
            card,
            total_amount,
            purchase_date,
            installment_count,
            installment_amount,
            invoice_day,
            status,
            notes,
        } = cmd;

        let name = name
            .ok_or(E::MissingRequiredField("name"))
            .map_err(tracerr::wrap!())?;
        let store = store
            .ok_or(E::MissingRequiredField("store"))
            .map_err(tracerr::wrap!())?;
        let card = card
            .ok_or(E::MissingRequiredField("card"))
            .map_err(tracerr::wrap!())?;
        let total_amount = total_amount
            .ok_or(E::MissingRequiredField("totalAmount"))
            .map_err(tracerr::wrap!())?;
        let purchase_date = purchase_date
            .ok_or(E::MissingRequiredField("purchaseDate"))
            .map_err(tracerr::wrap!())?;
        let installment_count = installment_count
            .ok_or(E::MissingRequiredField("installmentCount"))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let mut purchase = Purchase {
            id: purchase::Id::new(),
            name,
            store,
            card,
            total_amount,
            purchase_date,
            installment_count,
            installment_amount: installment_amount.unwrap_or_else(|| {
                Purchase::default_installment_amount(
                    total_amount,
                    installment_count,
                )
            }),
            installments_paid: 0,
            amount_open: Money::ZERO,
            amount_paid: Money::ZERO,
            status: purchase::Status::Pending,
            last_invoice_paid: None,
            invoice_day: invoice_day.unwrap_or_default(),
            notes,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        if !purchase.fits_calendar() {
            return Err(tracerr::new!(E::BeyondCalendar));
        }
        if status == Some(purchase::Status::Paid) {
            purchase.settle();
        } else {
            purchase.recalculate();
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(purchase.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(purchase)
    }
}

/// Error of [`CreatePurchase`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Required field is not provided.
    #[display("`{_0}` field is required")]
    MissingRequiredField(#[error(not(source))] &'static str),

    /// Installments of the [`Purchase`] are billed past the last supported
    /// [`InvoicePeriod`].
    ///
    /// [`InvoicePeriod`]: purchase::InvoicePeriod
    #[display("`Purchase` installments are billed past the year 9999")]
    BeyondCalendar,
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroU16;

    use common::Money;

    use crate::{
        command::{create_purchase::ExecutionError, CreatePurchase},
        domain::purchase,
        infra::database::mock::Mock,
        Command as _,
    };

    fn cmd() -> CreatePurchase {
        CreatePurchase {
            name: purchase::Name::new("Notebook"),
            store: purchase::Store::new("Shopping Center"),
            card: purchase::Card::new("Nubank"),
            total_amount: "300.00".parse().ok(),
            purchase_date: "2024-01-15".parse().ok(),
            installment_count: NonZeroU16::new(3),
            ..CreatePurchase::default()
        }
    }

    #[tokio::test]
    async fn records_pending_purchase() {
        let svc = Mock::default().service();

        let p = svc.execute(cmd()).await.unwrap();

        assert_eq!(p.installment_amount, "100.00".parse::<Money>().unwrap());
        assert_eq!(p.installments_remaining(), 3);
        assert_eq!(p.amount_open, "300.00".parse::<Money>().unwrap());
        assert_eq!(p.status, purchase::Status::Pending);
        assert_eq!(p.invoice_day, purchase::InvoiceDay::DEFAULT);
        assert_eq!(svc.database().purchase(p.id), Some(p));
    }

    #[tokio::test]
    async fn records_paid_purchase_settled() {
        let svc = Mock::default().service();

        let p = svc
            .execute(CreatePurchase {
                status: Some(purchase::Status::Paid),
                ..cmd()
            })
            .await
            .unwrap();

        assert_eq!(p.status, purchase::Status::Paid);
        assert_eq!(p.installments_paid, 3);
        assert_eq!(p.amount_open, Money::ZERO);
        assert_eq!(p.amount_paid, p.total_amount);
    }

    #[tokio::test]
    async fn requires_fields() {
        let svc = Mock::default().service();

        let err = svc
            .execute(CreatePurchase {
                card: None,
                ..cmd()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::MissingRequiredField("card"),
        ));

        let err = svc
            .execute(CreatePurchase {
                installment_count: None,
                ..cmd()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::MissingRequiredField("installmentCount"),
        ));
        assert!(svc.database().purchases().is_empty());
    }

    #[tokio::test]
    async fn rejects_installments_past_calendar_end() {
        let svc = Mock::default().service();

        let err = svc
            .execute(CreatePurchase {
                purchase_date: "9999-12-15".parse().ok(),
                installment_count: NonZeroU16::new(2),
                ..cmd()
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::BeyondCalendar));
        assert!(svc.database().purchases().is_empty());

        let p = svc
            .execute(CreatePurchase {
                purchase_date: "9999-12-15".parse().ok(),
                installment_count: NonZeroU16::new(1),
                ..cmd()
            })
            .await
            .unwrap();
        assert_eq!(p.last_invoice(), purchase::InvoicePeriod::LAST);
    }
}
