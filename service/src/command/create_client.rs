//! [`Command`] for registering a new [`Client`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    Date, DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{client, Client},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`Client`].
///
/// Every field is optional at this level, so that a missing one is reported
/// as [`ExecutionError::MissingRequiredField`].
#[derive(Clone, Debug, Default)]
pub struct CreateClient {
    /// [`client::Name`] of the [`Client`]. Required.
    pub name: Option<client::Name>,

    /// [`client::Phone`] of the [`Client`]. Required.
    pub phone: Option<client::Phone>,

    /// Price of the [`client::Plan`]. Required.
    pub plan_price: Option<Money>,

    /// [`client::Kind`] of the [`Client`]. Required.
    pub kind: Option<client::Kind>,

    /// [`client::Plan`] the [`Client`] subscribes to. Required.
    pub plan: Option<client::Plan>,

    /// [`Date`] the subscription ends on. Required.
    pub due_date: Option<Date>,

    /// [`client::Reseller`] the [`Client`] was sold by.
    pub reseller: Option<client::Reseller>,

    /// [`client::Server`] the [`Client`] is served from. Required.
    pub server: Option<client::Server>,

    /// Optional [`client::Notes`].
    pub notes: Option<client::Notes>,
}

impl<Db> Command<CreateClient> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Client>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Client;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateClient) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateClient {
            name,
            phone,
            plan_price,
            kind,
            plan,
            due_date,
            reseller,
            server,
            notes,
        } = cmd;

        let client = Client {
            id: client::Id::new(),
            name: name
                .ok_or(E::MissingRequiredField("name"))
                .map_err(tracerr::wrap!())?,
            phone: phone
                .ok_or(E::MissingRequiredField("phone"))
                .map_err(tracerr::wrap!())?,
            plan_price: plan_price
                .ok_or(E::MissingRequiredField("planPrice"))
                .map_err(tracerr::wrap!())?,
            kind: kind
                .ok_or(E::MissingRequiredField("kind"))
                .map_err(tracerr::wrap!())?,
            plan: plan
                .ok_or(E::MissingRequiredField("plan"))
                .map_err(tracerr::wrap!())?,
            due_date: due_date
                .ok_or(E::MissingRequiredField("dueDate"))
                .map_err(tracerr::wrap!())?,
            reseller,
            server: server
                .ok_or(E::MissingRequiredField("server"))
                .map_err(tracerr::wrap!())?,
            notes,
            status: client::Status::Active,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(client.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(client)
    }
}

/// Error of [`CreateClient`] [`Command`] execution.
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
