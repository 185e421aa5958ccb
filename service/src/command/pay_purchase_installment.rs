//! [`Command`] for paying a single installment of a [`Purchase`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        purchase::{self, LedgerError, Payment},
        Purchase,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for paying a single installment of a [`Purchase`].
#[derive(Clone, Copy, Debug)]
pub struct PayPurchaseInstallment {
    /// ID of the [`Purchase`] to pay an installment of.
    pub purchase_id: purchase::Id,

    /// 1-based number of the installment to be paid.
    ///
    /// The next unpaid installment is paid if omitted.
    pub installment: Option<u16>,
}

/// Output of the [`PayPurchaseInstallment`] [`Command`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Updated [`Purchase`].
    pub purchase: Purchase,

    /// Applied [`Payment`].
    pub payment: Payment,
}

impl<Db> Command<PayPurchaseInstallment> for Service<Db>
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
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: PayPurchaseInstallment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PayPurchaseInstallment {
            purchase_id,
            installment,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid paying the same installment twice concurrently.
        tx.execute(Lock(By::new(purchase_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut purchase = tx
            .execute(Select(By::<Option<Purchase>, _>::new(purchase_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PurchaseNotExists(purchase_id))
            .map_err(tracerr::wrap!())?;

        let payment = match installment {
            Some(number) => purchase.pay_installment(number),
            None => purchase.pay_next_installment(),
        }
        .map_err(tracerr::from_and_wrap!(=> E))?;
        purchase.updated_at = DateTime::now().coerce();

        tx.execute(Update(purchase.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output { purchase, payment })
    }
}

/// Error of [`PayPurchaseInstallment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Payment cannot be applied to the [`Purchase`].
    #[display("Payment cannot be applied: {_0}")]
    Ledger(LedgerError),

    /// [`Purchase`] doesn't exist.
    #[display("`Purchase(id: {_0})` does not exist")]
    #[from(ignore)]
    PurchaseNotExists(#[error(not(source))] purchase::Id),
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::{
        command::{
            pay_purchase_installment::ExecutionError, PayPurchaseInstallment,
        },
        domain::purchase::{self, fixture::purchase, InvoicePeriod, LedgerError},
        infra::database::mock::Mock,
        Command as _,
    };

    #[tokio::test]
    async fn pays_next_installment() {
        let p = purchase("Nubank", "300.00", 3, "2024-01-15");
        let svc = Mock::default().with_purchase(p.clone()).service();

        let out = svc
            .execute(PayPurchaseInstallment {
                purchase_id: p.id,
                installment: None,
            })
            .await
            .unwrap();

        assert_eq!(out.purchase.installments_paid, 1);
        assert_eq!(out.purchase.amount_paid, "100.00".parse::<Money>().unwrap());
        assert_eq!(out.payment.period, InvoicePeriod::new(2024, 1).unwrap());
        assert_eq!(
            out.payment.next.map(|n| n.period),
            InvoicePeriod::new(2024, 2),
        );
        assert_eq!(svc.database().purchase(p.id), Some(out.purchase));
    }

    #[tokio::test]
    async fn rejects_wrong_installment() {
        let p = purchase("Nubank", "300.00", 3, "2024-01-15");
        let svc = Mock::default().with_purchase(p.clone()).service();

        let err = svc
            .execute(PayPurchaseInstallment {
                purchase_id: p.id,
                installment: Some(3),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Ledger(LedgerError::InvalidInstallmentIndex {
                number: 3,
                ..
            }),
        ));
        assert_eq!(svc.database().purchase(p.id), Some(p));
    }

    #[tokio::test]
    async fn rejects_settled_purchase() {
        let mut p = purchase("Nubank", "300.00", 3, "2024-01-15");
        p.settle();
        let svc = Mock::default().with_purchase(p.clone()).service();

        let err = svc
            .execute(PayPurchaseInstallment {
                purchase_id: p.id,
                installment: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Ledger(LedgerError::AlreadySettled),
        ));
    }

    #[tokio::test]
    async fn fails_on_unknown_purchase() {
        let svc = Mock::default().service();

        let err = svc
            .execute(PayPurchaseInstallment {
                purchase_id: purchase::Id::new(),
                installment: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PurchaseNotExists(_)));
    }
}
