//! [`Renewal`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, Date, DateTimeOf, Money};

use super::{client, define_id, Client};

/// Snapshot of a [`Client`] subscription being renewed.
///
/// Never changes once recorded, so the history survives later edits of the
/// [`Client`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Renewal {
    /// ID of this [`Renewal`].
    pub id: Id,

    /// ID of the renewed [`Client`].
    pub client_id: client::Id,

    /// [`client::Name`] of the [`Client`] at the moment of this [`Renewal`].
    pub client_name: client::Name,

    /// [`client::Phone`] of the [`Client`] at the moment of this [`Renewal`].
    pub client_phone: client::Phone,

    /// [`client::Kind`] of the [`Client`] at the moment of this [`Renewal`].
    pub client_kind: client::Kind,

    /// [`client::Plan`] the [`Client`] was subscribed to before.
    pub previous_plan: client::Plan,

    /// [`client::Plan`] the [`Client`] is subscribed to from now on.
    pub new_plan: client::Plan,

    /// Price paid for this [`Renewal`].
    pub price: Money,

    /// Due [`Date`] before this [`Renewal`].
    pub previous_due_date: Date,

    /// Due [`Date`] after this [`Renewal`].
    pub new_due_date: Date,

    /// [`client::Reseller`] of the [`Client`], if any.
    pub reseller: Option<client::Reseller>,

    /// [`client::Server`] of the [`Client`].
    pub server: client::Server,

    /// [`DateTime`] when this [`Renewal`] happened.
    pub renewed_at: RenewalDateTime,
}

impl Renewal {
    /// Applies a renewal to the provided [`Client`], returning the recorded
    /// [`Renewal`].
    ///
    /// The [`Client`] is reactivated, moved to the `plan` (if any) with the
    /// `price` (if any, or the current plan price otherwise) and gets the
    /// `due_date` as the end of its subscription period.
    pub fn apply(
        client: &mut Client,
        plan: Option<client::Plan>,
        price: Option<Money>,
        due_date: Date,
    ) -> Self {
        let previous_plan = client.plan.clone();
        let previous_due_date = client.due_date;

        if let Some(plan) = plan {
            client.plan = plan;
        }
        if let Some(price) = price {
            client.plan_price = price;
        }
        client.due_date = due_date;
        client.status = client::Status::Active;

        Self {
            id: Id::new(),
            client_id: client.id,
            client_name: client.name.clone(),
            client_phone: client.phone.clone(),
            client_kind: client.kind.clone(),
            previous_plan,
            new_plan: client.plan.clone(),
            price: client.plan_price,
            previous_due_date,
            new_due_date: due_date,
            reseller: client.reseller.clone(),
            server: client.server.clone(),
            renewed_at: common::DateTime::now().coerce(),
        }
    }
}

define_id! {
    #[doc = "ID of a [`Renewal`]."]
    Id
}

/// [`DateTime`] when a [`Renewal`] happened.
pub type RenewalDateTime = DateTimeOf<(Renewal, unit::Renewal)>;

#[cfg(test)]
mod spec {
    use common::{Date, DateTime, Money};

    use super::{
        super::client::{self, Client},
        Renewal,
    };

    fn client() -> Client {
        Client {
            id: client::Id::new(),
            name: client::Name::new("Maria").unwrap(),
            phone: client::Phone::new("11987654321").unwrap(),
            plan_price: "35.00".parse().unwrap(),
            kind: client::Kind::new("customer").unwrap(),
            plan: client::Plan::new("monthly").unwrap(),
            due_date: "2024-03-10".parse().unwrap(),
            reseller: None,
            server: client::Server::new("alpha").unwrap(),
            notes: None,
            status: client::Status::Inactive,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn snapshots_previous_subscription() {
        let mut c = client();
        let due: Date = "2024-06-10".parse().unwrap();
        let price: Money = "90.00".parse().unwrap();

        let renewal = Renewal::apply(
            &mut c,
            Some(client::Plan::new("quarterly").unwrap()),
            Some(price),
            due,
        );

        assert_eq!(renewal.client_id, c.id);
        assert_eq!(renewal.previous_plan.to_string(), "monthly");
        assert_eq!(renewal.new_plan.to_string(), "quarterly");
        assert_eq!(renewal.previous_due_date.to_string(), "2024-03-10");
        assert_eq!(renewal.new_due_date, due);
        assert_eq!(renewal.price, price);

        assert_eq!(c.plan.to_string(), "quarterly");
        assert_eq!(c.plan_price, price);
        assert_eq!(c.due_date, due);
        assert_eq!(c.status, client::Status::Active);
    }

    #[test]
    fn keeps_plan_when_not_changed() {
        let mut c = client();

        let renewal =
            Renewal::apply(&mut c, None, None, "2024-04-10".parse().unwrap());

        assert_eq!(renewal.previous_plan, renewal.new_plan);
        assert_eq!(renewal.price, "35.00".parse::<Money>().unwrap());
        assert_eq!(c.plan.to_string(), "monthly");
    }
}
