//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio_postgres::{Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{
        connection::{self, Params},
        Connection,
    },
};

use super::NonTx;

/// Transactional Postgres database client.
///
/// The transaction is begun lazily on the first operation, and rolled back if
/// this client is dropped without being committed.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`NonTx`] client to take the [`Connection`] from.
    non_tx: NonTx,

    /// Lazily begun [`connection::Tx`].
    tx: Arc<Mutex<Option<connection::Tx>>>,
}

impl Tx {
    /// Creates a new [`Tx`] client on top of the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(non_tx: NonTx) -> Self {
        Self {
            non_tx,
            tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the underlying [`Connection`] of this [`Tx`] client, beginning
    /// the transaction if not yet.
    async fn connection(
        &self,
    ) -> Result<MappedMutexGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        let mut guard = self.tx.lock().await;
        if guard.is_none() {
            let conn = self
                .non_tx
                .connection()
                .await
                .map_err(tracerr::wrap!())?;
            *guard = Some(
                connection::Tx::begin(conn)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }

        Ok(MutexGuard::map(guard, |tx| {
            tx.as_mut().expect("begun above and kept under the lock")
        }))
    }

    /// Commits the transaction of this [`Tx`] client.
    ///
    /// Does nothing if no operation was performed.
    ///
    /// # Errors
    ///
    /// If failed to commit the transaction.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let tx = self.tx.lock().await.take();
        match tx {
            Some(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            None => Ok(()),
        }
    }
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: Params<'_>,
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .query(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: Params<'_>,
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: Params<'_>,
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .exec(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }
}
