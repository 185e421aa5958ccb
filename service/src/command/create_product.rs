//! [`Command`] for registering a new [`Product`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime,
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

/// [`Command`] for registering a new [`Product`] out of its [`Draft`].
#[derive(Clone, Debug, From)]
pub struct CreateProduct {
    /// [`Draft`] describing the [`Product`].
    pub draft: Draft,
}

impl<Db> Command<CreateProduct> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Product>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Product;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProduct,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let product = cmd
            .draft
            .build(product::Id::new(), DateTime::now().coerce())
            .ok_or(E::MissingRequiredField("name"))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(product.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(product)
    }
}

/// Error of [`CreateProduct`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Required field is not provided.
    #[display("`{_0}` field is required")]
    #[from(ignore)]
    MissingRequiredField(#[error(not(source))] &'static str),
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroU32;

    use common::Money;

    use crate::{
        command::{create_product::ExecutionError, CreateProduct},
        domain::product::{self, Draft},
        infra::database::mock::Mock,
        Command as _,
    };

    #[tokio::test]
    async fn registers_product() {
        let svc = Mock::default().service();

        let p = svc
            .execute(CreateProduct::from(Draft {
                name: product::Name::new("Tote bag"),
                labor_cost: "10.00".parse().ok(),
                profit_percent: "50".parse().ok(),
                batch_size: NonZeroU32::new(4),
                ..Draft::default()
            }))
            .await
            .unwrap();

        assert_eq!(p.unit_price, "15.00".parse::<Money>().unwrap());
        assert!(!p.is_sold());
        assert_eq!(svc.database().product(p.id), Some(p));
    }

    #[tokio::test]
    async fn requires_name() {
        let svc = Mock::default().service();

        let err = svc
            .execute(CreateProduct::from(Draft::default()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::MissingRequiredField("name"),
        ));
    }
}
