//! [`Command`] for deleting a [`Product`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{product, Product},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Product`].
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteProduct {
    /// ID of the [`Product`] to be deleted.
    pub product_id: product::Id,
}

impl<Db> Command<DeleteProduct> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Product, product::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Product>, product::Id>>,
            Ok = Option<Product>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Product, product::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Product;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProduct,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProduct { product_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(product_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let product = tx
            .execute(Select(By::<Option<Product>, _>::new(product_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ProductNotExists(product_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::<Product, _>::new(product_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(product)
    }
}

/// Error of [`DeleteProduct`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Product`] doesn't exist.
    #[display("`Product(id: {_0})` does not exist")]
    #[from(ignore)]
    ProductNotExists(#[error(not(source))] product::Id),
}
