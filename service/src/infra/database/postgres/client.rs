//! Postgres database client definitions.

use std::{future::Future, sync::Arc};

use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Lazily established [`Connection`] shared between clones of a client.
#[derive(Debug)]
struct Slot<C>(Arc<RwLock<Option<C>>>);

impl<C> Clone for Slot<C> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<C> Default for Slot<C> {
    fn default() -> Self {
        Self(Arc::new(RwLock::new(None)))
    }
}

impl<C> Slot<C> {
    /// Returns the [`Connection`] stored in this [`Slot`], establishing it
    /// with the provided `connect` function if there is none yet.
    async fn get_or_connect<F, Fut>(
        &self,
        connect: F,
    ) -> Result<RwLockReadGuard<'_, C>, Traced<database::Error>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, Traced<database::Error>>>,
    {
        let read = self.0.read().await;
        let guard = if read.is_some() {
            read
        } else {
            drop(read);

            let mut write = self.0.write().await;
            if write.is_none() {
                *write = Some(connect().await.map_err(tracerr::wrap!())?);
            }
            write.downgrade()
        };

        Ok(RwLockReadGuard::map(guard, |conn| {
            conn.as_ref()
                .expect("connection cannot be dropped while guard is alive")
        }))
    }

    /// Takes the [`Connection`] out of this [`Slot`], if any.
    async fn take(&self) -> Option<C> {
        self.0.write().await.take()
    }
}

/// Implements [`Connection`] for the provided client by running statements
/// on its lazily established [`Connection`].
macro_rules! impl_connection_for_client {
    ($ty:ty) => {
        impl Connection for $ty {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
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
                params: &[&(dyn ToSql + Sync)],
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
                params: &[&(dyn ToSql + Sync)],
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
    };
}

impl_connection_for_client!(NonTx);
impl_connection_for_client!(Tx);

/// Non-transactional Postgres database client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to take [`Connection`]s from.
    pub(crate) pool: connection::Pool,

    /// [`Connection`] used for non-transactional operations.
    conn: Slot<connection::NonTx>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            conn: Slot::default(),
        }
    }

    /// Returns the [`Connection`] of this [`NonTx`] client, taking one from
    /// the [`connection::Pool`] if needed.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        self.conn
            .get_or_connect(|| pooled(&self.pool))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Transactional Postgres database client.
///
/// The transaction begins lazily on the first statement, reusing the
/// [`Connection`] of the [`NonTx`] client it was created from, if any.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to take a [`Connection`] from, if the origin
    /// [`NonTx`] client has none.
    pool: connection::Pool,

    /// [`NonTx`] client this [`Tx`] client was created from.
    ///
    /// [`None`] once the transaction has begun.
    origin: Arc<Mutex<Option<NonTx>>>,

    /// [`Connection`] running the transaction.
    tx: Slot<connection::Tx>,
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            pool: client.pool.clone(),
            origin: Arc::new(Mutex::new(Some(client))),
            tx: Slot::default(),
        }
    }

    /// Returns the [`Connection`] of this [`Tx`] client, beginning the
    /// transaction if needed.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        self.tx
            .get_or_connect(|| async {
                let reused = match self.origin.lock().await.take() {
                    Some(origin) => origin.conn.take().await,
                    None => None,
                };
                let conn = match reused {
                    Some(conn) => conn,
                    None => pooled(&self.pool).await.map_err(tracerr::wrap!())?,
                };
                connection::Tx::begin(conn).await.map_err(tracerr::wrap!())
            })
            .await
            .map_err(tracerr::wrap!())
    }

    /// Commits the transaction of this [`Tx`] client.
    ///
    /// Does nothing if no statement has been run.
    ///
    /// # Errors
    ///
    /// If failed to commit the transaction.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        match self.tx.take().await {
            Some(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            None => Ok(()),
        }
    }
}

/// Takes a new [`connection::NonTx`] from the provided [`connection::Pool`].
pub(super) async fn pooled(
    pool: &connection::Pool,
) -> Result<connection::NonTx, Traced<database::Error>> {
    pool.get()
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}
