//! [`Command`] for creating a new [`Donor`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::SecretBox;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::donor::{ContactMethod, Email, Name, Note, Password, Phone};
use crate::{
    domain::{donor, password, Donor},
    infra::{
        database::{self, constraint},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Donor`].
#[derive(Debug)]
pub struct CreateDonor {
    /// [`Name`] of a new [`Donor`].
    pub name: donor::Name,

    /// [`Email`] of a new [`Donor`].
    pub email: donor::Email,

    /// [`Password`] of a new [`Donor`].
    pub password: SecretBox<donor::Password>,

    /// [`Phone`] of a new [`Donor`].
    pub phone: Option<donor::Phone>,

    /// Shelter affiliation [`Note`] of a new [`Donor`].
    pub shelter_affiliation: Option<donor::Note>,

    /// Social media handle [`Note`] of a new [`Donor`].
    pub social_media_handle: Option<donor::Note>,

    /// Causes of interest [`Note`] of a new [`Donor`].
    pub causes_of_interest: Option<donor::Note>,

    /// Preferred [`ContactMethod`] of a new [`Donor`].
    ///
    /// [`ContactMethod::Email`] if [`None`].
    pub preferred_contact: Option<donor::ContactMethod>,
}

impl<Db, Ir> Command<CreateDonor> for Service<Db, Ir>
where
    Db: for<'l> Database<
            Select<By<Option<Donor>, &'l donor::Email>>,
            Ok = Option<Donor>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Donor>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Donor;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateDonor) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateDonor {
            name,
            email,
            password,
            phone,
            shelter_affiliation,
            social_media_handle,
            causes_of_interest,
            preferred_contact,
        } = cmd;

        if self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .is_some()
        {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let donor = Donor {
            id: donor::Id::new(),
            password_hash: donor::PasswordHash::hash(password)
                .await
                .map_err(tracerr::from_and_wrap!(=> E))?,
            name,
            email,
            phone,
            shelter_affiliation,
            social_media_handle,
            causes_of_interest,
            preferred_contact: preferred_contact.unwrap_or_default(),
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(donor.clone()))
            .await
            .map_err(|e| {
                if e.as_ref()
                    .is_unique_violation(Some(constraint::DONORS_EMAIL))
                {
                    tracerr::new!(E::EmailOccupied(donor.email.clone()))
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(donor)
    }
}

/// Error of [`CreateDonor`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Email`] is already occupied by another [`Donor`].
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] donor::Email),

    /// Failed to hash a [`Password`].
    #[display("Failed to hash `Password`: {_0}")]
    PasswordHash(password::HashError),
}
