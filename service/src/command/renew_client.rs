//! [`Command`] for renewing a [`Client`] subscription.

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    Date, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{client, Client, Renewal},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for renewing a [`Client`] subscription.
///
/// Moves the due [`Date`] of the [`Client`], reactivates it and records a
/// [`Renewal`] snapshot in the history.
#[derive(Clone, Debug)]
pub struct RenewClient {
    /// ID of the [`Client`] to be renewed.
    pub client_id: client::Id,

    /// New [`client::Plan`], if it changes.
    pub plan: Option<client::Plan>,

    /// Price paid for the renewal.
    ///
    /// Defaults to the current plan price of the [`Client`].
    pub price: Option<Money>,

    /// New due [`Date`] of the subscription.
    pub due_date: Date,
}

/// Output of the [`RenewClient`] [`Command`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Renewed [`Client`].
    pub client: Client,

    /// Recorded [`Renewal`].
    pub renewal: Renewal,
}

impl<Db> Command<RenewClient> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Client, client::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Client>, client::Id>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<Update<Client>, Ok = (), Err = Traced<database::Error>>
        + Database<Insert<Renewal>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RenewClient) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RenewClient {
            client_id,
            plan,
            price,
            due_date,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut client = tx
            .execute(Select(By::<Option<Client>, _>::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotExists(client_id))
            .map_err(tracerr::wrap!())?;

        let renewal = Renewal::apply(&mut client, plan, price, due_date);

        tx.execute(Update(client.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(renewal.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::debug!(
            "`Client(id: {client_id})` renewed until {}",
            renewal.new_due_date,
        );

        Ok(Output { client, renewal })
    }
}

/// Error of [`RenewClient`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Client`] doesn't exist.
    #[display("`Client(id: {_0})` does not exist")]
    #[from(ignore)]
    ClientNotExists(#[error(not(source))] client::Id),
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::{
        command::{
            create_client::spec::cmd, renew_client::ExecutionError,
            RenewClient, UpdateClient,
        },
        domain::client,
        infra::database::mock::Mock,
        Command as _,
    };

    #[tokio::test]
    async fn reactivates_and_records_history() {
        let svc = Mock::default().service();
        let c = svc.execute(cmd("Maria")).await.unwrap();
        _ = svc
            .execute(UpdateClient {
                status: Some(client::Status::Inactive),
                ..UpdateClient::new(c.id)
            })
            .await
            .unwrap();

        let out = svc
            .execute(RenewClient {
                client_id: c.id,
                plan: client::Plan::new("quarterly"),
                price: Some("90.00".parse().unwrap()),
                due_date: "2024-06-10".parse().unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(out.client.status, client::Status::Active);
        assert_eq!(out.client.due_date.to_string(), "2024-06-10");
        assert_eq!(out.renewal.previous_plan.to_string(), "monthly");
        assert_eq!(out.renewal.new_plan.to_string(), "quarterly");
        assert_eq!(out.renewal.price, "90.00".parse::<Money>().unwrap());
        assert_eq!(out.renewal.previous_due_date.to_string(), "2024-03-10");

        let db = svc.database();
        assert_eq!(db.client(c.id), Some(out.client));
        assert_eq!(db.renewals(), [out.renewal]);
    }

    #[tokio::test]
    async fn errors_on_unknown_client() {
        let svc = Mock::default().service();

        let err = svc
            .execute(RenewClient {
                client_id: client::Id::new(),
                plan: None,
                price: None,
                due_date: "2024-06-10".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ClientNotExists(_)));
        assert!(svc.database().renewals().is_empty());
    }
}
