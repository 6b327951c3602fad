//! [`Donor`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use super::{
    contact::{Email, Name, Phone},
    password::{Password, PasswordHash},
};

/// Donor supplying requested products.
#[derive(Clone, Debug)]
pub struct Donor {
    /// ID of this [`Donor`].
    pub id: Id,

    /// [`Name`] of this [`Donor`].
    pub name: Name,

    /// [`Email`] of this [`Donor`], unique among [`Donor`]s.
    pub email: Email,

    /// [`PasswordHash`] of this [`Donor`].
    pub password_hash: PasswordHash,

    /// [`Phone`] of this [`Donor`].
    pub phone: Option<Phone>,

    /// Shelter this [`Donor`] is affiliated with.
    pub shelter_affiliation: Option<Note>,

    /// Social media handle of this [`Donor`].
    pub social_media_handle: Option<Note>,

    /// Causes this [`Donor`] is interested in.
    pub causes_of_interest: Option<Note>,

    /// Preferred [`ContactMethod`] of this [`Donor`].
    pub preferred_contact: ContactMethod,

    /// [`DateTime`] when this [`Donor`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Donor`].
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

/// Free-form profile note of a [`Donor`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Note(String);

impl Note {
    /// Creates a new [`Note`] if the given `note` is valid.
    ///
    /// Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(note: impl Into<String>) -> Option<Self> {
        let note = note.into();
        let note = note.trim();
        (!note.is_empty() && note.len() <= 1024).then(|| Self(note.into()))
    }
}

impl FromStr for Note {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Note`")
    }
}

define_kind! {
    #[doc = "Preferred way of contacting a [`Donor`]."]
    enum ContactMethod {
        #[doc = "Contact via email."]
        Email = 1,

        #[doc = "Contact via phone."]
        Phone = 2,

        #[doc = "Contact via social media."]
        SocialMedia = 3,
    }
}

impl Default for ContactMethod {
    fn default() -> Self {
        Self::Email
    }
}

/// [`DateTime`] when a [`Donor`] was created.
pub type CreationDateTime = DateTimeOf<(Donor, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{ContactMethod, Note};

    #[test]
    fn note_is_trimmed() {
        assert_eq!(
            Note::new("  Hope Shelter ").unwrap().to_string(),
            "Hope Shelter",
        );

        assert!(Note::new("").is_none());
        assert!(Note::new("   ").is_none());
    }

    #[test]
    fn contact_method_defaults_to_email() {
        assert_eq!(ContactMethod::default(), ContactMethod::Email);
        assert_eq!(ContactMethod::SocialMedia.to_string(), "SOCIAL_MEDIA");
    }
}
