//! [`Command`] for marking a [`Product`] batch as sold.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{product, Product},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`Product`] batch as sold.
///
/// Selling an already sold [`Product`] keeps its original sale moment.
#[derive(Clone, Copy, Debug, From)]
pub struct SellProduct {
    /// ID of the sold [`Product`].
    pub product_id: product::Id,
}

impl<Db> Command<SellProduct> for Service<Db>
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
        > + Database<Update<Product>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Product;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SellProduct) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SellProduct { product_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(product_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut product = tx
            .execute(Select(By::<Option<Product>, _>::new(product_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ProductNotExists(product_id))
            .map_err(tracerr::wrap!())?;
        if product.is_sold() {
            return Ok(product);
        }

        product.sell();
        tx.execute(Update(product.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(product)
    }
}

/// Error of [`SellProduct`] [`Command`] execution.
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

#[cfg(test)]
mod spec {
    use crate::{
        command::{sell_product::ExecutionError, SellProduct},
        domain::product::{self, spec::product},
        infra::database::mock::Mock,
        Command as _,
    };

    #[tokio::test]
    async fn marks_sold_once() {
        let p = product("Scarf", "20.00", "35.00", 2);
        let svc = Mock::default().with_product(p.clone()).service();

        let sold = svc.execute(SellProduct::from(p.id)).await.unwrap();
        assert!(sold.is_sold());
        assert_eq!(svc.database().product(p.id).as_ref(), Some(&sold));

        let again = svc.execute(SellProduct::from(p.id)).await.unwrap();
        assert_eq!(again.sold_at, sold.sold_at);
    }

    #[tokio::test]
    async fn errors_on_unknown_product() {
        let svc = Mock::default().service();

        let err = svc
            .execute(SellProduct::from(product::Id::new()))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ProductNotExists(_)));
    }
}
