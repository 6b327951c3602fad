//! Postgres [`Database`] implementation.

pub mod client;
pub mod connection;
mod impls;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::{error::SqlState, NoTls};
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

refinery::embed_migrations!("../migrations");

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
};

pub use deadpool_postgres::Config;

/// Postgres [`Database`] client.
#[derive(Clone, Copy, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Creates a new [`Postgres`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to create a new [`Postgres`] client.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self(NonTx::from_pool(pool)))
    }

    /// Applies the pending schema migrations embedded from the `migrations/`
    /// directory.
    ///
    /// Returns the number of applied migrations.
    ///
    /// # Errors
    ///
    /// If any migration fails to apply.
    pub async fn migrate(&mut self) -> Result<usize, Traced<database::Error>> {
        migrations::runner()
            .run_async(self)
            .await
            .map(|report| report.applied_migrations().len())
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// [`Connection`] error.
    #[display("`Connection` error: {_0}")]
    Connection(connection::Error),

    /// Error of creating a new [`connection::Pool`] client.
    #[display("Failed to create a new `connection::Pool`: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// [`connection::Pool`] error.
    #[display("`connection::Pool` error: {_0}")]
    PoolError(connection::PoolError),

    /// Schema migration error.
    #[display("Failed to migrate schema: {_0}")]
    Migration(refinery::Error),
}

impl Error {
    /// Returns the name of the unique constraint violated by this [`Error`],
    /// if it is a unique violation.
    ///
    /// Returns an empty name if the server doesn't report the constraint.
    #[must_use]
    pub fn violated_constraint(&self) -> Option<&str> {
        match self {
            Self::Connection(e) => {
                let unique = e.code() == Some(&SqlState::UNIQUE_VIOLATION);
                unique.then(|| {
                    e.as_db_error()
                        .and_then(|e| e.constraint())
                        .unwrap_or_default()
                })
            }
            Self::Migration(..)
            | Self::PoolError(..)
            | Self::PoolCreationError(..) => None,
        }
    }

    /// Checks if the error is a unique violation of the specified constraint,
    /// or of any unique constraint if [`None`].
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        self.violated_constraint()
            .is_some_and(|c| constraint.map_or(true, |expected| c == expected))
    }
}
