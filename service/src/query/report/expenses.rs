//! [`Expenses`] definition.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::Purchase,
    infra::{database, Database},
    read::{self, purchase::summary::Overview},
    Query, Service,
};

/// [`Query`] of the overall spending statistics of all the [`Purchase`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Expenses;

impl<Db> Query<Expenses> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Purchase>, read::purchase::list::Filter>>,
        Ok = Vec<Purchase>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Overview;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Expenses) -> Result<Self::Ok, Self::Err> {
        let purchases = self
            .database()
            .execute(Select(By::<Vec<Purchase>, _>::new(
                read::purchase::list::Filter::default(),
            )))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Overview::of(&purchases))
    }
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::{
        domain::purchase::fixture::purchase, infra::database::mock::Mock,
        query::report::Expenses, Query as _,
    };

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn sums_all_purchases() {
        let mut pending = purchase("X", "300.00", 3, "2024-03-10");
        _ = pending.pay_next_installment().unwrap();
        let mut paid = purchase("Y", "50.00", 2, "2024-01-10");
        paid.settle();
        let svc = Mock::default()
            .with_purchase(pending)
            .with_purchase(paid)
            .service();

        let overview = svc.execute(Expenses).await.unwrap();

        assert_eq!(overview.purchases, 2);
        assert_eq!(overview.pending, 1);
        assert_eq!(overview.paid, 1);
        assert_eq!(overview.total_spent, money("350.00"));
        assert_eq!(overview.total_open, money("200.00"));
        assert_eq!(overview.total_paid, money("150.00"));
        assert_eq!(overview.cards.len(), 2);
    }

    #[tokio::test]
    async fn empty_store_gives_zeros() {
        let svc = Mock::default().service();

        let overview = svc.execute(Expenses).await.unwrap();

        assert_eq!(overview.purchases, 0);
        assert_eq!(overview.total_spent, Money::ZERO);
        assert!(overview.cards.is_empty());
    }
}
