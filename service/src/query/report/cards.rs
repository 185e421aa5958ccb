//! [`Cards`] definition.

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::{domain::purchase, Config};
use crate::{
    domain::Purchase,
    infra::{database, Database},
    read::{self, purchase::summary::CardSummary},
    Query, Service,
};

/// [`Query`] to summarize the [`Purchase`]s of every [`purchase::Card`].
///
/// All the [`Config::known_cards`] are present in the report, even without
/// any [`Purchase`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Cards;

impl<Db> Query<Cards> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Purchase>, read::purchase::list::Filter>>,
        Ok = Vec<Purchase>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<CardSummary>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Cards) -> Result<Self::Ok, Self::Err> {
        let purchases = self
            .database()
            .execute(Select(By::<Vec<Purchase>, _>::new(
                read::purchase::list::Filter::default(),
            )))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::purchase::summary::by_card(
            &self.config().known_cards,
            &purchases,
        ))
    }
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::{
        domain::purchase::{self, fixture::purchase},
        infra::database::mock::Mock,
        query::report::Cards,
        Config, Query as _,
    };

    #[tokio::test]
    async fn seeds_known_cards() {
        let mut p = purchase("Nubank", "300.00", 3, "2024-03-10");
        _ = p.pay_next_installment().unwrap();
        let other = purchase("Inter", "40.00", 1, "2024-03-10");
        let svc = Mock::default()
            .with_purchase(p)
            .with_purchase(other)
            .service_with(Config {
                known_cards: ["Santander", "Nubank"]
                    .into_iter()
                    .filter_map(purchase::Card::new)
                    .collect(),
            });

        let report = svc.execute(Cards).await.unwrap();

        let cards = report
            .iter()
            .map(|s| s.card.to_string())
            .collect::<Vec<_>>();
        assert_eq!(cards, ["Santander", "Nubank", "Inter"]);

        assert_eq!(report[0].purchases, 0);
        assert_eq!(report[0].total, Money::ZERO);

        let nubank = &report[1];
        assert_eq!(nubank.purchases, 1);
        assert_eq!(nubank.installments_total, 3);
        assert_eq!(nubank.installments_paid, 1);
        assert_eq!(nubank.installments_pending, 2);
        assert_eq!(nubank.amount_paid, "100.00".parse::<Money>().unwrap());
        assert_eq!(nubank.amount_open, "200.00".parse::<Money>().unwrap());
    }
}
