//! [`Command`] for editing a [`Product`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        product::{self, Draft},
        Product,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for editing a [`Product`].
///
/// The fields set in the [`Draft`] replace the existing ones, while the
/// derived costs and prices are computed again (see [`Product::revise()`]).
#[derive(Clone, Debug)]
pub struct UpdateProduct {
    /// ID of the [`Product`] to be edited.
    pub product_id: product::Id,

    /// Changes to apply.
    pub draft: Draft,
}

impl<Db> Command<UpdateProduct> for Service<Db>
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

    async fn execute(
        &self,
        cmd: UpdateProduct,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProduct { product_id, draft } = cmd;

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
            .map_err(tracerr::wrap!())?
            .revise(draft);

        tx.execute(Update(product.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(product)
    }
}

/// Error of [`UpdateProduct`] [`Command`] execution.
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
    use std::num::NonZeroU32;

    use common::Money;

    use crate::{
        command::{update_product::ExecutionError, UpdateProduct},
        domain::product::{self, spec::product, Draft},
        infra::database::mock::Mock,
        Command as _,
    };

    #[tokio::test]
    async fn revises_product() {
        let p = product("Scarf", "20.00", "35.00", 2);
        let svc = Mock::default().with_product(p.clone()).service();

        let updated = svc
            .execute(UpdateProduct {
                product_id: p.id,
                draft: Draft {
                    unit_price: "40.00".parse().ok(),
                    batch_size: NonZeroU32::new(3),
                    ..Draft::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.name, p.name);
        assert_eq!(updated.unit_profit, "20.00".parse::<Money>().unwrap());
        assert_eq!(updated.batch_total(), "120.00".parse::<Money>().unwrap());
        assert_eq!(svc.database().product(p.id), Some(updated));
    }

    #[tokio::test]
    async fn errors_on_unknown_product() {
        let svc = Mock::default().service();

        let err = svc
            .execute(UpdateProduct {
                product_id: product::Id::new(),
                draft: Draft::default(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ProductNotExists(_)));
    }
}
