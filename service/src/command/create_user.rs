//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::SecretBox;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{
    Email, HmisId, Name, Password, Phone, Role, Username,
};
use crate::{
    domain::{password, user, User},
    infra::{
        database::{self, constraint},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Username`] of a new [`User`].
    pub username: user::Username,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Name`] of a new [`User`].
    pub name: Option<user::Name>,

    /// [`Phone`] of a new [`User`].
    pub phone: Option<user::Phone>,

    /// [`Role`] of a new [`User`].
    pub role: Option<user::Role>,

    /// [`HmisId`] of a new [`User`].
    pub hmis_id: Option<user::HmisId>,
}

impl<Db, Ir> Command<CreateUser> for Service<Db, Ir>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Username>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::HmisId>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            username,
            email,
            password,
            name,
            phone,
            role,
            hmis_id,
        } = cmd;

        if self
            .database()
            .execute(Select(By::new(&username)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .is_some()
        {
            return Err(tracerr::new!(E::UsernameOccupied(username)));
        }
        if self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .is_some()
        {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }
        if let Some(id) = &hmis_id {
            if self
                .database()
                .execute(Select(By::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .is_some()
            {
                return Err(tracerr::new!(E::HmisIdOccupied(id.clone())));
            }
        }

        let user = User {
            id: user::Id::new(),
            password_hash: user::PasswordHash::hash(password)
                .await
                .map_err(tracerr::from_and_wrap!(=> E))?,
            username,
            email,
            name,
            phone,
            role,
            hmis_id,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        // Concurrent duplicates passing the checks above are rejected here.
        tx.execute(Insert(user.clone()))
            .await
            .map_err(|e| occupied(e, &user))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(user)
    }
}

/// Converts a [`database::Error`] of inserting the provided [`User`] into an
/// [`ExecutionError`], recognizing unique constraint violations.
fn occupied(
    err: Traced<database::Error>,
    user: &User,
) -> Traced<ExecutionError> {
    use ExecutionError as E;

    let db = err.as_ref();
    if db.is_unique_violation(Some(constraint::USERS_USERNAME)) {
        tracerr::new!(E::UsernameOccupied(user.username.clone()))
    } else if db.is_unique_violation(Some(constraint::USERS_EMAIL)) {
        tracerr::new!(E::EmailOccupied(user.email.clone()))
    } else if let Some(id) = user
        .hmis_id
        .as_ref()
        .filter(|_| db.is_unique_violation(Some(constraint::USERS_HMIS_ID)))
    {
        tracerr::new!(E::HmisIdOccupied(id.clone()))
    } else {
        tracerr::map_from_and_wrap!(=> E)(err)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Email`] is already occupied.
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`HmisId`] is already occupied.
    #[display("`{_0}` HMIS ID is occupied")]
    #[from(ignore)]
    HmisIdOccupied(#[error(not(source))] user::HmisId),

    /// Failed to hash a [`Password`].
    #[display("Failed to hash `Password`: {_0}")]
    PasswordHash(password::HashError),

    /// [`Username`] is already occupied.
    #[display("`{_0}` username is occupied")]
    #[from(ignore)]
    UsernameOccupied(#[error(not(source))] user::Username),
}
