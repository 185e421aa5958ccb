//! [`Command`] for paying a whole card invoice of a month.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        purchase::{self, InvoicePeriod},
        Purchase,
    },
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for paying the invoice of a [`purchase::Card`] for an
/// [`InvoicePeriod`].
///
/// Pays the next installment of every pending [`Purchase`] billed in the
/// invoice. Each [`Purchase`] is paid in its own transaction, so a failure of
/// one doesn't roll back the others.
#[derive(Clone, Debug)]
pub struct PayCardInvoice {
    /// [`purchase::Card`] to pay the invoice of.
    pub card: purchase::Card,

    /// [`InvoicePeriod`] of the invoice.
    pub period: InvoicePeriod,
}

/// Output of the [`PayCardInvoice`] [`Command`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Output {
    /// Total paid amount.
    pub total_paid: Money,

    /// IDs of the paid [`Purchase`]s.
    pub purchase_ids: Vec<purchase::Id>,

    /// [`Purchase`]s that failed to be paid.
    pub failures: Vec<Failure>,
}

impl Output {
    /// Returns the number of paid [`Purchase`]s.
    #[must_use]
    pub fn count(&self) -> usize {
        self.purchase_ids.len()
    }
}

/// [`Purchase`] of a [`PayCardInvoice`] that failed to be paid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Failure {
    /// ID of the [`Purchase`].
    pub purchase_id: purchase::Id,

    /// Description of the failure.
    pub reason: String,
}

impl<Db> Command<PayCardInvoice> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Purchase>, read::purchase::list::Filter>>,
            Ok = Vec<Purchase>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
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
        cmd: PayCardInvoice,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PayCardInvoice { card, period } = cmd;

        let pending = self
            .database()
            .execute(Select(By::<Vec<Purchase>, _>::new(
                read::purchase::list::Filter {
                    card: Some(card.clone()),
                    status: Some(purchase::Status::Pending),
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let planned = read::purchase::invoice::plan(&pending, &card, period);
        if planned.is_empty() {
            return Err(tracerr::new!(E::NoMatchingInvoice { card, period }));
        }

        let mut out = Output::default();
        for purchase_id in planned {
            let paid: Result<Option<Money>, Traced<database::Error>> = async {
                let tx = self
                    .database()
                    .execute(Transact)
                    .await
                    .map_err(tracerr::wrap!())?;

                tx.execute(Lock(By::<Purchase, _>::new(purchase_id)))
                    .await
                    .map_err(tracerr::wrap!())?;

                // Re-check under the lock, as the `Purchase` might have been
                // paid meanwhile.
                let Some(mut purchase) = tx
                    .execute(Select(By::<Option<Purchase>, _>::new(
                        purchase_id,
                    )))
                    .await
                    .map_err(tracerr::wrap!())?
                    .filter(|p| p.card == card && p.is_billed_in(period))
                else {
                    return Ok(None);
                };
                let Ok(payment) = purchase.pay_next_installment() else {
                    return Ok(None);
                };
                purchase.updated_at = DateTime::now().coerce();

                tx.execute(Update(purchase))
                    .await
                    .map_err(tracerr::wrap!())?;
                tx.execute(Commit).await.map_err(tracerr::wrap!())?;

                Ok(Some(payment.amount))
            }
            .await;

            match paid {
                Ok(Some(amount)) => {
                    out.total_paid += amount;
                    out.purchase_ids.push(purchase_id);
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!(
                        "failed to pay `Purchase(id: {purchase_id})` in \
                         `{card}` invoice of {period}: {e}",
                    );
                    out.failures.push(Failure {
                        purchase_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if out.purchase_ids.is_empty() && out.failures.is_empty() {
            return Err(tracerr::new!(E::NoMatchingInvoice { card, period }));
        }
        Ok(out)
    }
}

/// Error of [`PayCardInvoice`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// No pending [`Purchase`] is billed in the requested invoice.
    #[display("No `{card}` invoice found for {period}")]
    #[from(ignore)]
    NoMatchingInvoice {
        /// Requested [`purchase::Card`].
        card: purchase::Card,

        /// Requested [`InvoicePeriod`].
        period: InvoicePeriod,
    },
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::{
        command::{pay_card_invoice::ExecutionError, PayCardInvoice},
        domain::purchase::{self, fixture::purchase, InvoicePeriod},
        infra::database::mock::Mock,
        Command as _,
    };

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn cmd(card: &str, year: i32, month: u8) -> PayCardInvoice {
        PayCardInvoice {
            card: purchase::Card::new(card).unwrap(),
            period: InvoicePeriod::new(year, month).unwrap(),
        }
    }

    #[tokio::test]
    async fn pays_only_matching_purchases() {
        let due_now = purchase("X", "300.00", 3, "2024-03-10");
        let due_later = purchase("X", "100.00", 2, "2024-04-02");
        let other_card = purchase("Y", "50.00", 1, "2024-03-10");
        let svc = Mock::default()
            .with_purchase(due_now.clone())
            .with_purchase(due_later.clone())
            .with_purchase(other_card.clone())
            .service();

        let out = svc.execute(cmd("X", 2024, 3)).await.unwrap();

        assert_eq!(out.count(), 1);
        assert_eq!(out.purchase_ids, [due_now.id]);
        assert_eq!(out.total_paid, money("100.00"));
        assert!(out.failures.is_empty());

        let db = svc.database();
        assert_eq!(db.purchase(due_now.id).unwrap().installments_paid, 1);
        assert_eq!(db.purchase(due_later.id), Some(due_later));
        assert_eq!(db.purchase(other_card.id), Some(other_card));
    }

    #[tokio::test]
    async fn next_month_follows() {
        let p = purchase("X", "300.00", 3, "2024-03-10");
        let svc = Mock::default().with_purchase(p.clone()).service();

        _ = svc.execute(cmd("X", 2024, 3)).await.unwrap();
        let err = svc.execute(cmd("X", 2024, 3)).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::NoMatchingInvoice { .. },
        ));

        let out = svc.execute(cmd("X", 2024, 4)).await.unwrap();
        assert_eq!(out.purchase_ids, [p.id]);
        assert_eq!(svc.database().purchase(p.id).unwrap().installments_paid, 2);
    }

    #[tokio::test]
    async fn signals_no_matching_invoice() {
        let p = purchase("X", "300.00", 3, "2024-03-10");
        let svc = Mock::default().with_purchase(p.clone()).service();

        let err = svc.execute(cmd("X", 2025, 1)).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NoMatchingInvoice { .. },
        ));
        assert_eq!(svc.database().purchase(p.id), Some(p));
    }

    #[tokio::test]
    async fn reports_failures_per_item() {
        let ok = purchase("X", "200.00", 2, "2024-03-01");
        let broken = purchase("X", "90.00", 3, "2024-03-20");
        let svc = Mock::default()
            .with_purchase(ok.clone())
            .with_purchase(broken.clone())
            .break_purchase(broken.id)
            .service();

        let out = svc.execute(cmd("X", 2024, 3)).await.unwrap();

        assert_eq!(out.purchase_ids, [ok.id]);
        assert_eq!(out.total_paid, money("100.00"));
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].purchase_id, broken.id);

        let db = svc.database();
        assert_eq!(db.purchase(ok.id).unwrap().installments_paid, 1);
        assert_eq!(db.purchase(broken.id), Some(broken));
    }
}
