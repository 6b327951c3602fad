//! [`Session`]-related definitions.
//!
//! [`Session`]: crate::Session

use common::DateTime;
use derive_more::{AsRef, From, Into};
use juniper::{GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::{command, domain};

use crate::{api::scalar, define_error, AsError, Context, Error};

/// `Session` access token.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "AuthToken",
    with = scalar::Via::<domain::session::Token>,
)]
pub struct Token(domain::session::Token);

/// Kind of an account a `Session` belongs to.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "SessionRole")]
pub enum Role {
    /// `User` account.
    User,

    /// `Donor` account.
    Donor,
}

impl From<domain::session::Role> for Role {
    fn from(role: domain::session::Role) -> Self {
        use domain::session::Role as R;

        match role {
            R::User => Self::User,
            R::Donor => Self::Donor,
        }
    }
}

/// Result of a `Session` creation.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context, name = "CreateSessionResult")]
pub struct CreateResult {
    /// Access token of the created `Session`.
    pub token: Token,

    /// `DateTime` when the created `Session` expires.
    pub expires_at: DateTime,

    /// Kind of the account the created `Session` belongs to.
    pub role: Role,

    /// Username of a `User` or email of a `Donor` the created `Session`
    /// belongs to.
    pub username: String,
}

impl From<command::create_session::Output> for CreateResult {
    fn from(output: command::create_session::Output) -> Self {
        let command::create_session::Output { token, session } = output;
        Self {
            token: token.into(),
            expires_at: session.expires_at.coerce(),
            role: session.role.into(),
            username: session.username,
        }
    }
}

impl AsError for command::create_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::WrongCredentials => {
                Some(SessionError::WrongCredentials.into())
            }
            Self::JsonWebTokenEncodeError(_) => None,
        }
    }
}

define_error! {
    enum SessionError {
        #[code = "WRONG_CREDENTIALS"]
        #[status = BAD_REQUEST]
        #[message = "Provided credentials do not match any account"]
        WrongCredentials,
    }
}
