//! [`Query`] collection related to the multiple [`Purchase`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{purchase, Purchase},
    infra::{database, Database},
    read, Query, Service,
};

use super::DatabaseQuery;

/// Queries a list of [`Purchase`]s, the most recently made first.
pub type List = DatabaseQuery<By<Vec<Purchase>, read::purchase::list::Filter>>;

/// [`Query`] of the pending card invoices, grouped by [`purchase::Card`] and
/// [`purchase::InvoicePeriod`].
#[derive(Clone, Debug, Default)]
pub struct PendingInvoices {
    /// [`purchase::Card`] to list the invoices of, or all of them if
    /// [`None`].
    pub card: Option<purchase::Card>,
}

impl<Db> Query<PendingInvoices> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Purchase>, read::purchase::list::Filter>>,
        Ok = Vec<Purchase>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<read::purchase::invoice::Group>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        PendingInvoices { card }: PendingInvoices,
    ) -> Result<Self::Ok, Self::Err> {
        let pending = self
            .database()
            .execute(Select(By::<Vec<Purchase>, _>::new(
                read::purchase::list::Filter {
                    card,
                    status: Some(purchase::Status::Pending),
                },
            )))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::purchase::invoice::group(&pending))
    }
}
