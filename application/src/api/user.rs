//! [`User`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{command, domain};
use uuid::Uuid;

use crate::{api::scalar, define_error, AsError, Context, Error};

/// A [`User`] requesting products.
#[derive(Clone, Debug, From)]
pub struct User(domain::User);

/// A `User` requesting products.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Unique username of this `User`.
    #[must_use]
    pub fn username(&self) -> Username {
        self.0.username.clone().into()
    }

    /// Email of this `User`.
    #[must_use]
    pub fn email(&self) -> Email {
        self.0.email.clone().into()
    }

    /// Name of this `User`, if specified.
    #[must_use]
    pub fn name(&self) -> Option<Name> {
        self.0.name.clone().map(Into::into)
    }

    /// Phone of this `User`, if specified.
    #[must_use]
    pub fn phone(&self) -> Option<Phone> {
        self.0.phone.clone().map(Into::into)
    }

    /// Role of this `User`, if specified.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.0.role.map(Into::into)
    }

    /// HMIS identifier of this `User`, if specified.
    #[must_use]
    pub fn hmis_id(&self) -> Option<HmisId> {
        self.0.hmis_id.clone().map(Into::into)
    }

    /// `DateTime` when this `User` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `User`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::user::Id)]
#[into(domain::user::Id)]
#[graphql(name = "UserId", transparent)]
pub struct Id(Uuid);

/// Username of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserUsername",
    with = scalar::Via::<domain::user::Username>,
)]
pub struct Username(domain::user::Username);

/// Login of a `User`: either its `UserUsername` or its `UserEmail`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserLogin",
    with = scalar::Via::<domain::user::Login>,
)]
pub struct Login(domain::user::Login);

/// Password of a `User`.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserPassword",
    with = scalar::Via::<domain::user::Password>,
)]
pub struct Password(domain::user::Password);

/// Email of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserEmail",
    with = scalar::Via::<domain::user::Email>,
)]
pub struct Email(domain::user::Email);

/// Name of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserName",
    with = scalar::Via::<domain::user::Name>,
)]
pub struct Name(domain::user::Name);

/// Phone of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserPhone",
    with = scalar::Via::<domain::user::Phone>,
)]
pub struct Phone(domain::user::Phone);

/// HMIS identifier of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserHmisId",
    with = scalar::Via::<domain::user::HmisId>,
)]
pub struct HmisId(domain::user::HmisId);

/// Classification of a `User`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "UserRole")]
pub enum Role {
    /// Person experiencing homelessness.
    Unhoused,

    /// Caseworker acting on behalf of unhoused people.
    Caseworker,
}

impl From<domain::user::Role> for Role {
    fn from(role: domain::user::Role) -> Self {
        use domain::user::Role as R;

        match role {
            R::Unhoused => Self::Unhoused,
            R::Caseworker => Self::Caseworker,
        }
    }
}

impl From<Role> for domain::user::Role {
    fn from(role: Role) -> Self {
        match role {
            Role::Unhoused => Self::Unhoused,
            Role::Caseworker => Self::Caseworker,
        }
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(UserError::EmailOccupied.into()),
            Self::HmisIdOccupied(_) => Some(UserError::HmisIdOccupied.into()),
            Self::UsernameOccupied(_) => {
                Some(UserError::UsernameOccupied.into())
            }
            Self::PasswordHash(_) => None,
        }
    }
}

define_error! {
    enum UserError {
        #[code = "EMAIL_OCCUPIED"]
        #[status = BAD_REQUEST]
        #[message = "Provided `UserEmail` is occupied by another `User`"]
        EmailOccupied,

        #[code = "HMIS_ID_OCCUPIED"]
        #[status = BAD_REQUEST]
        #[message = "Provided `UserHmisId` is occupied by another `User`"]
        HmisIdOccupied,

        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` does not exist"]
        NotExists,

        #[code = "USERNAME_OCCUPIED"]
        #[status = BAD_REQUEST]
        #[message = "Provided `UserUsername` is occupied by another `User`"]
        UsernameOccupied,
    }
}

#[cfg(test)]
mod spec {
    use service::{command::create_user::ExecutionError, domain::user};

    use crate::AsError as _;

    #[test]
    fn occupied_identities_are_bad_requests() {
        for (err, code) in [
            (
                ExecutionError::UsernameOccupied(
                    user::Username::new("alice").unwrap(),
                ),
                "USERNAME_OCCUPIED",
            ),
            (
                ExecutionError::EmailOccupied(
                    user::Email::new("alice@example.com").unwrap(),
                ),
                "EMAIL_OCCUPIED",
            ),
            (
                ExecutionError::HmisIdOccupied(
                    user::HmisId::new("HMIS-1").unwrap(),
                ),
                "HMIS_ID_OCCUPIED",
            ),
        ] {
            let err = err.as_error();

            assert_eq!(err.code, code);
            assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        }
    }
}
