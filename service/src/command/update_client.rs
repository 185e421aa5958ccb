//! [`Command`] for editing a [`Client`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{client, Client},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for editing a [`Client`].
///
/// Only the provided fields are changed.
#[derive(Clone, Debug)]
pub struct UpdateClient {
    /// ID of the [`Client`] to be edited.
    pub client_id: client::Id,

    /// New [`client::Name`].
    pub name: Option<client::Name>,

    /// New [`client::Phone`].
    pub phone: Option<client::Phone>,

    /// New price of the [`client::Plan`].
    pub plan_price: Option<Money>,

    /// New [`client::Kind`].
    pub kind: Option<client::Kind>,

    /// New [`client::Plan`].
    pub plan: Option<client::Plan>,

    /// New due [`Date`].
    pub due_date: Option<Date>,

    /// New [`client::Reseller`].
    pub reseller: Option<client::Reseller>,

    /// New [`client::Server`].
    pub server: Option<client::Server>,

    /// New [`client::Notes`].
    pub notes: Option<client::Notes>,

    /// New [`client::Status`].
    pub status: Option<client::Status>,
}

impl UpdateClient {
    /// Creates a new [`UpdateClient`] [`Command`] changing nothing.
    #[must_use]
    pub fn new(client_id: client::Id) -> Self {
        Self {
            client_id,
            name: None,
            phone: None,
            plan_price: None,
            kind: None,
            plan: None,
            due_date: None,
            reseller: None,
            server: None,
            notes: None,
            status: None,
        }
    }
}

impl<Db> Command<UpdateClient> for Service<Db>
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
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Client;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateClient) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateClient {
            client_id,
            name,
            phone,
            plan_price,
            kind,
            plan,
            due_date,
            reseller,
            server,
            notes,
            status,
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

        if let Some(name) = name {
            client.name = name;
        }
        if let Some(phone) = phone {
            client.phone = phone;
        }
        if let Some(price) = plan_price {
            client.plan_price = price;
        }
        if let Some(kind) = kind {
            client.kind = kind;
        }
        if let Some(plan) = plan {
            client.plan = plan;
        }
        if let Some(date) = due_date {
            client.due_date = date;
        }
        if let Some(reseller) = reseller {
            client.reseller = Some(reseller);
        }
        if let Some(server) = server {
            client.server = server;
        }
        if let Some(notes) = notes {
            client.notes = Some(notes);
        }
        if let Some(status) = status {
            client.status = status;
        }

        tx.execute(Update(client.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(client)
    }
}

/// Error of [`UpdateClient`] [`Command`] execution.
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
    use crate::{
        command::{
            create_client::spec::cmd, update_client::ExecutionError,
            UpdateClient,
        },
        domain::client,
        infra::database::mock::Mock,
        Command as _,
    };

    #[tokio::test]
    async fn changes_only_provided_fields() {
        let svc = Mock::default().service();
        let c = svc.execute(cmd("Maria")).await.unwrap();

        let updated = svc
            .execute(UpdateClient {
                plan: client::Plan::new("quarterly"),
                status: Some(client::Status::Inactive),
                ..UpdateClient::new(c.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.plan.to_string(), "quarterly");
        assert_eq!(updated.status, client::Status::Inactive);
        assert_eq!(updated.name, c.name);
        assert_eq!(updated.due_date, c.due_date);
        assert_eq!(svc.database().client(c.id), Some(updated));
    }

    #[tokio::test]
    async fn errors_on_unknown_client() {
        let svc = Mock::default().service();
        let id = client::Id::new();

        let err = svc.execute(UpdateClient::new(id)).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ClientNotExists(i) if *i == id,
        ));
    }
}
