//! [`Donor`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{command, domain};
use uuid::Uuid;

use crate::{api::scalar, define_error, AsError, Context, Error};

/// A [`Donor`] supplying requested products.
#[derive(Clone, Debug, From)]
pub struct Donor(domain::Donor);

/// A `Donor` supplying requested products.
#[graphql_object(context = Context)]
impl Donor {
    /// Unique identifier of this `Donor`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Name of this `Donor`.
    #[must_use]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Email of this `Donor`.
    #[must_use]
    pub fn email(&self) -> Email {
        self.0.email.clone().into()
    }

    /// Phone of this `Donor`, if specified.
    #[must_use]
    pub fn phone(&self) -> Option<Phone> {
        self.0.phone.clone().map(Into::into)
    }

    /// Shelter this `Donor` is affiliated with, if any.
    #[must_use]
    pub fn shelter_affiliation(&self) -> Option<Note> {
        self.0.shelter_affiliation.clone().map(Into::into)
    }

    /// Social media handle of this `Donor`, if any.
    #[must_use]
    pub fn social_media_handle(&self) -> Option<Note> {
        self.0.social_media_handle.clone().map(Into::into)
    }

    /// Causes this `Donor` is interested in, if any.
    #[must_use]
    pub fn causes_of_interest(&self) -> Option<Note> {
        self.0.causes_of_interest.clone().map(Into::into)
    }

    /// Preferred way of contacting this `Donor`.
    #[must_use]
    pub fn preferred_contact(&self) -> ContactMethod {
        self.0.preferred_contact.into()
    }

    /// `DateTime` when this `Donor` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Donor`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::donor::Id)]
#[into(domain::donor::Id)]
#[graphql(name = "DonorId", transparent)]
pub struct Id(Uuid);

/// Name of a `Donor`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "DonorName",
    with = scalar::Via::<domain::donor::Name>,
)]
pub struct Name(domain::donor::Name);

/// Email of a `Donor`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "DonorEmail",
    with = scalar::Via::<domain::donor::Email>,
)]
pub struct Email(domain::donor::Email);

/// Password of a `Donor`.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "DonorPassword",
    with = scalar::Via::<domain::donor::Password>,
)]
pub struct Password(domain::donor::Password);

/// Phone of a `Donor`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "DonorPhone",
    with = scalar::Via::<domain::donor::Phone>,
)]
pub struct Phone(domain::donor::Phone);

/// Free-form profile note of a `Donor`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "DonorNote",
    with = scalar::Via::<domain::donor::Note>,
)]
pub struct Note(domain::donor::Note);

/// Preferred way of contacting a `Donor`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "DonorContactMethod")]
pub enum ContactMethod {
    /// Contact via email.
    Email,

    /// Contact via phone.
    Phone,

    /// Contact via social media.
    SocialMedia,
}

impl From<domain::donor::ContactMethod> for ContactMethod {
    fn from(method: domain::donor::ContactMethod) -> Self {
        use domain::donor::ContactMethod as M;

        match method {
            M::Email => Self::Email,
            M::Phone => Self::Phone,
            M::SocialMedia => Self::SocialMedia,
        }
    }
}

impl From<ContactMethod> for domain::donor::ContactMethod {
    fn from(method: ContactMethod) -> Self {
        match method {
            ContactMethod::Email => Self::Email,
            ContactMethod::Phone => Self::Phone,
            ContactMethod::SocialMedia => Self::SocialMedia,
        }
    }
}

impl AsError for command::create_donor::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(DonorError::EmailOccupied.into()),
            Self::PasswordHash(_) => None,
        }
    }
}

define_error! {
    enum DonorError {
        #[code = "EMAIL_OCCUPIED"]
        #[status = BAD_REQUEST]
        #[message = "Provided `DonorEmail` is occupied by another `Donor`"]
        EmailOccupied,

        #[code = "NOT_DONOR"]
        #[status = FORBIDDEN]
        #[message = "Authenticated account must be a `Donor`"]
        NotDonor,

        #[code = "DONOR_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Donor` does not exist"]
        NotExists,
    }
}
