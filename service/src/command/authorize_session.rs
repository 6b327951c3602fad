//! [`Command`] for authorizing a [`Session`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::{errors::ErrorKind, Validation};
use tracerr::Traced;
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::session::Token;
use crate::{
    domain::{donor, session, user, Donor, Session, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`Session`] by its [`Token`].
///
/// A revoked [`Token`] is reported as [`ExecutionError::Revoked`] even if it
/// has expired already.
#[derive(Clone, Debug, From)]
pub struct AuthorizeSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db, Ir> Command<AuthorizeSession> for Service<Db, Ir>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Donor>, donor::Id>>,
            Ok = Option<Donor>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeSession { token } = cmd;

        if self.revocations().is_revoked(&token.fingerprint()) {
            return Err(tracerr::new!(E::Revoked));
        }

        let mut validation = Validation::default();
        validation.leeway = 0;
        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &validation,
        )
        .map_err(|e| {
            if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                tracerr::new!(E::Expired)
            } else {
                tracerr::new!(E::Invalid(e))
            }
        })?
        .claims;

        let exists = match session.role {
            session::Role::User => self
                .database()
                .execute(Select(By::new(user::Id::from(session.subject))))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .is_some(),
            session::Role::Donor => self
                .database()
                .execute(Select(By::new(donor::Id::from(session.subject))))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .is_some(),
        };
        if !exists {
            return Err(tracerr::new!(E::AccountNotExists(session.subject)));
        }

        Ok(session)
    }
}

/// Error of [`AuthorizeSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Account the [`Session`] belongs to does not exist.
    #[display("Account(id: {_0}) does not exist")]
    #[from(ignore)]
    AccountNotExists(#[error(not(source))] Uuid),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Session`] has expired.
    #[display("`Session` has expired")]
    Expired,

    /// [`Token`] is malformed or its signature is wrong.
    #[display("Invalid JSON Web Token: {_0}")]
    #[from(ignore)]
    Invalid(jsonwebtoken::errors::Error),

    /// [`Session`] has been revoked.
    #[display("`Session` has been revoked")]
    Revoked,
}
