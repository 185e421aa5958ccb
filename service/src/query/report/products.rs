//! [`Products`] definition.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::Product,
    infra::{database, Database},
    read::{self, product::Statistics},
    Query, Service,
};

/// [`Query`] of the stock and sales statistics of all the [`Product`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Products;

impl<Db> Query<Products> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Product>, read::product::list::Filter>>,
        Ok = Vec<Product>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Statistics;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Products) -> Result<Self::Ok, Self::Err> {
        let products = self
            .database()
            .execute(Select(By::<Vec<Product>, _>::new(
                read::product::list::Filter::default(),
            )))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Statistics::of(&products))
    }
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::{
        domain::product::spec::product, infra::database::mock::Mock,
        query::report::Products, Query as _,
    };

    #[tokio::test]
    async fn splits_stock_and_sales() {
        let mut sold = product("Scarf", "20.00", "35.00", 2);
        sold.sell();
        let stock = product("Apron", "10.00", "25.00", 4);
        let svc = Mock::default()
            .with_product(sold)
            .with_product(stock)
            .service();

        let stats = svc.execute(Products).await.unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.sold, 1);
        assert_eq!(stats.available, 1);
        assert_eq!(stats.stock_value, "100.00".parse::<Money>().unwrap());
        assert_eq!(stats.sold_value, "70.00".parse::<Money>().unwrap());
        assert_eq!(stats.profit, "30.00".parse::<Money>().unwrap());
    }
}
