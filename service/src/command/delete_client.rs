//! [`Command`] for deleting a [`Client`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{client, Client},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Client`] along with its renewal history.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteClient {
    /// ID of the [`Client`] to be deleted.
    pub client_id: client::Id,
}

impl<Db> Command<DeleteClient> for Service<Db>
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
        > + Database<
            Delete<By<Client, client::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Client;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteClient) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteClient { client_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let client = tx
            .execute(Select(By::<Option<Client>, _>::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotExists(client_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::<Client, _>::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(client)
    }
}

/// Error of [`DeleteClient`] [`Command`] execution.
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
            create_client::spec::cmd, delete_client::ExecutionError,
            DeleteClient,
        },
        domain::client,
        infra::database::mock::Mock,
        Command as _,
    };

    #[tokio::test]
    async fn deletes_client() {
        let svc = Mock::default().service();
        let c = svc.execute(cmd("Maria")).await.unwrap();

        let deleted = svc.execute(DeleteClient::from(c.id)).await.unwrap();

        assert_eq!(deleted, c);
        assert_eq!(svc.database().client(c.id), None);

        let err = svc.execute(DeleteClient::from(c.id)).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::ClientNotExists(_)));
    }

    #[tokio::test]
    async fn errors_on_unknown_client() {
        let svc = Mock::default().service();

        let err = svc
            .execute(DeleteClient::from(client::Id::new()))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ClientNotExists(_)));
    }
}
