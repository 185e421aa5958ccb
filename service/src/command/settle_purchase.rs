//! [`Command`] for marking a [`Purchase`] as fully paid.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{purchase, Purchase},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`Purchase`] as fully paid.
///
/// Settling an already settled [`Purchase`] changes nothing.
#[derive(Clone, Copy, Debug, From)]
pub struct SettlePurchase {
    /// ID of the [`Purchase`] to be settled.
    pub purchase_id: purchase::Id,
}

impl<Db> Command<SettlePurchase> for Service<Db>
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
        cmd: SettlePurchase,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SettlePurchase { purchase_id } = cmd;

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

        let before = purchase.clone();
        purchase.settle();
        if purchase == before {
            return Ok(purchase);
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

/// Error of [`SettlePurchase`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Purchase`] doesn't exist.
    #[display("`Purchase(id: {_0})` does not exist")]
    #[from(ignore)]
    PurchaseNotExists(#[error(not(source))] purchase::Id),
}
