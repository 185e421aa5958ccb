//! Data store status [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Select<By<read::RowCounts, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::RowCounts;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::RowCounts, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT (SELECT COUNT(*) FROM purchases) AS purchases, \
                   (SELECT COUNT(*) FROM clients) AS clients, \
                   (SELECT COUNT(*) FROM products) AS products";
        let row = self
            .query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?;

        Ok(row.map_or_else(read::RowCounts::default, |row| read::RowCounts {
            purchases: row.get("purchases"),
            clients: row.get("clients"),
            products: row.get("products"),
        }))
    }
}
