//! [`Database`]-related implementations.

#[cfg(test)]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(test)]
pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// Names of unique constraints guarding identity fields.
pub mod constraint {
    /// Uniqueness of a [`User`]'s username.
    ///
    /// [`User`]: crate::domain::User
    pub const USERS_USERNAME: &str = "users_username_key";

    /// Uniqueness of a [`User`]'s email.
    ///
    /// [`User`]: crate::domain::User
    pub const USERS_EMAIL: &str = "users_email_key";

    /// Uniqueness of a [`User`]'s HMIS ID.
    ///
    /// [`User`]: crate::domain::User
    pub const USERS_HMIS_ID: &str = "users_hmis_id_key";

    /// Uniqueness of a [`Donor`]'s email.
    ///
    /// [`Donor`]: crate::domain::Donor
    pub const DONORS_EMAIL: &str = "donors_email_key";
}

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    #[cfg(test)]
    /// [`Memory`] error.
    Memory(memory::Error),
}

impl Error {
    /// Checks if this [`Error`] is a violation of the specified unique
    /// [`constraint`], or of any unique constraint if [`None`].
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match *self {
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.is_unique_violation(constraint),
            #[cfg(test)]
            Self::Memory(ref e) => e.is_unique_violation(constraint),
        }
    }
}
