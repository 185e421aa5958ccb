//! [`Command`] for deleting a [`Purchase`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{purchase, Purchase},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Purchase`].
#[derive(Clone, Copy, Debug, From)]
pub struct DeletePurchase {
    /// ID of the [`Purchase`] to be deleted.
    pub purchase_id: purchase::Id,
}

impl<Db> Command<DeletePurchase> for Service<Db>
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
        > + Database<
            Delete<By<Purchase, purchase::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Purchase;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeletePurchase,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeletePurchase { purchase_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Purchase`.
        tx.execute(Lock(By::new(purchase_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let purchase = tx
            .execute(Select(By::<Option<Purchase>, _>::new(purchase_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PurchaseNotExists(purchase_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::<Purchase, _>::new(purchase_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(purchase)
    }
}

/// Error of [`DeletePurchase`] [`Command`] execution.
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

#[cfg(test)]
mod spec {
    use crate::{
        command::{delete_purchase::ExecutionError, DeletePurchase},
        domain::purchase::fixture::purchase,
        infra::database::mock::Mock,
        Command as _,
    };

    #[tokio::test]
    async fn deletes_once() {
        let p = purchase("Nubank", "300.00", 3, "2024-01-15");
        let svc = Mock::default().with_purchase(p.clone()).service();

        let deleted = svc.execute(DeletePurchase::from(p.id)).await.unwrap();
        assert_eq!(deleted, p);
        assert_eq!(svc.database().purchase(p.id), None);

        let err = svc.execute(DeletePurchase::from(p.id)).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::PurchaseNotExists(_)));
    }
}
