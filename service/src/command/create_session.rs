//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::SecretBox;
use subtle::ConstantTimeEq as _;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{
    session::Token,
    user::{HmisId, Login, Name, Password},
};
use crate::{
    domain::{donor, session, user, Donor, Session, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Debug)]
pub enum CreateSession {
    /// Create a new [`Session`] of a [`User`] by its [`Login`] and
    /// [`Password`].
    UserByCredentials {
        /// [`Login`] of a [`User`].
        login: user::Login,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new [`Session`] of a [`User`] by its [`HmisId`] and
    /// registered [`Name`].
    UserByHmis {
        /// [`HmisId`] of a [`User`].
        hmis_id: user::HmisId,

        /// [`Name`] the [`User`] has been registered with.
        name: user::Name,
    },

    /// Create a new [`Session`] of a [`Donor`] by its email and password.
    DonorByCredentials {
        /// Email of a [`Donor`].
        email: donor::Email,

        /// Password of a [`Donor`].
        password: SecretBox<donor::Password>,
    },
}

/// Output of [`CreateSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// Created [`Session`].
    pub session: Session,
}

impl<Db, Ir> Command<CreateSession> for Service<Db, Ir>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Login>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::HmisId>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<Donor>, &'l donor::Email>>,
            Ok = Option<Donor>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateSession) -> Result<Self::Ok, Self::Err> {
        use CreateSession as Cmd;
        use ExecutionError as E;

        let (subject, role, username) = match cmd {
            Cmd::UserByCredentials { login, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(&login)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                let verified = user::PasswordHash::matches(
                    user.as_ref().map(|u| u.password_hash.clone()),
                    password,
                )
                .await;
                let Some(user) = user.filter(|_| verified) else {
                    return Err(tracerr::new!(E::WrongCredentials));
                };
                (user.id.into(), session::Role::User, user.username.to_string())
            }
            Cmd::UserByHmis { hmis_id, name } => {
                let user = self
                    .database()
                    .execute(Select(By::new(&hmis_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .filter(|u| {
                        u.name.as_ref().is_some_and(|n| {
                            let (registered, provided): (&str, &str) =
                                (n.as_ref(), name.as_ref());
                            registered
                                .as_bytes()
                                .ct_eq(provided.as_bytes())
                                .into()
                        })
                    })
                    .ok_or_else(|| E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;
                (user.id.into(), session::Role::User, user.username.to_string())
            }
            Cmd::DonorByCredentials { email, password } => {
                let donor = self
                    .database()
                    .execute(Select(By::new(&email)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                let verified = donor::PasswordHash::matches(
                    donor.as_ref().map(|d| d.password_hash.clone()),
                    password,
                )
                .await;
                let Some(donor) = donor.filter(|_| verified) else {
                    return Err(tracerr::new!(E::WrongCredentials));
                };
                (donor.id.into(), session::Role::Donor, donor.email.to_string())
            }
        };

        let session = Session {
            id: session::Id::new(),
            subject,
            role,
            username,
            expires_at: (DateTime::now() + self.config().session_ttl).coerce(),
        };
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &session,
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        log::debug!(
            "issued `Session(id: {})` for `{role}` `{}`",
            session.id,
            session.username,
        );

        Ok(Output { token, session })
    }
}

/// Error of [`CreateSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`CreateSession`] contains wrong credentials.
    #[display("Wrong credentials")]
    WrongCredentials,
}
