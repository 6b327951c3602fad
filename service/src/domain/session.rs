//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumString};
use uuid::Uuid;

use super::{donor, user};
#[cfg(doc)]
use super::{Donor, User};

/// Authenticated session of a [`User`] or a [`Donor`].
///
/// Represented as claims of a [JWT] signed by the service.
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Session {
    /// Unique ID of this [`Session`].
    #[serde(rename = "jti")]
    pub id: Id,

    /// ID of the account this [`Session`] belongs to.
    #[serde(rename = "sub")]
    pub subject: Uuid,

    /// [`Role`] of the account this [`Session`] belongs to.
    pub role: Role,

    /// Display name of the account: username of a [`User`] or email of a
    /// [`Donor`].
    pub username: String,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Session {
    /// Returns ID of the [`User`] this [`Session`] belongs to, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<user::Id> {
        matches!(self.role, Role::User).then(|| self.subject.into())
    }

    /// Returns ID of the [`Donor`] this [`Session`] belongs to, if any.
    #[must_use]
    pub fn donor_id(&self) -> Option<donor::Id> {
        matches!(self.role, Role::Donor).then(|| self.subject.into())
    }
}

/// ID of a [`Session`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Kind of an account a [`Session`] belongs to.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    EnumString,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    StrumDisplay,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// [`User`] account.
    User,

    /// [`Donor`] account.
    Donor,
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }

    /// Computes the [`Fingerprint`] of this [`Token`].
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint(xxhash_rust::xxh3::xxh3_128(self.0.as_bytes()))
    }
}

/// Fixed-size digest identifying a [`Token`] without storing it.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("{_0:032x}")]
pub struct Fingerprint(u128);

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
