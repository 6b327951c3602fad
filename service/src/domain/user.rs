//! [`User`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use super::{
    contact::{Email, Name, Phone},
    password::{Password, PasswordHash},
};

/// Platform user requesting products.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Username`] of this [`User`].
    pub username: Username,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`Name`] of this [`User`].
    pub name: Option<Name>,

    /// [`Phone`] of this [`User`].
    pub phone: Option<Phone>,

    /// [`Role`] of this [`User`].
    pub role: Option<Role>,

    /// [`HmisId`] of this [`User`].
    pub hmis_id: Option<HmisId>,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
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
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Unique username of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Username(String);

impl Username {
    /// Creates a new [`Username`] if the given `username` is valid.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Option<Self> {
        let username = username.into();
        Self::check(&username).then_some(Self(username))
    }

    /// Checks whether the given `username` is a valid [`Username`].
    fn check(username: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Username`] invariants:
        /// - Must be between 2 and 64 characters long;
        /// - Must contain only letters, digits, `_`, `.` and `-`.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[\p{L}\p{N}_.\-]{2,64}$").expect("valid regex")
        });

        REGEX.is_match(username.as_ref())
    }
}

impl FromStr for Username {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Username`")
    }
}

/// Login of a [`User`]: either its [`Username`] or its [`Email`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Login(String);

impl Login {
    /// Creates a new [`Login`] if the given `login` is not blank.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Option<Self> {
        let login = login.into();
        let login = login.trim();
        (!login.is_empty() && login.len() <= 254).then(|| Self(login.into()))
    }

    /// Checks whether this [`Login`] identifies the provided [`User`].
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        let (username, email): (&str, &str) =
            (user.username.as_ref(), user.email.as_ref());
        self.0 == username || self.0 == email
    }
}

impl FromStr for Login {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Login`")
    }
}

/// [HMIS] identifier of a [`User`].
///
/// [HMIS]: https://www.hudexchange.info/programs/hmis
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct HmisId(String);

impl HmisId {
    /// Creates a new [`HmisId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`HmisId`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        !id.is_empty()
            && id.len() <= 64
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

impl FromStr for HmisId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `HmisId`")
    }
}

define_kind! {
    #[doc = "Classification of a [`User`]."]
    enum Role {
        #[doc = "Person experiencing homelessness."]
        Unhoused = 1,

        #[doc = "Caseworker acting on behalf of unhoused people."]
        Caseworker = 2,
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;
