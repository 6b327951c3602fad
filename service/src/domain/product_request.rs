//! [`ProductRequest`] definitions.

use std::{str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{unit, Date, DateTimeOf};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user;
#[cfg(doc)]
use super::User;

/// Request of a product made by a [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProductRequest {
    /// ID of this [`ProductRequest`].
    pub id: Id,

    /// ID of the [`User`] owning this [`ProductRequest`].
    pub owner_id: user::Id,

    /// [`ProductUrl`] of the requested product.
    pub product_url: ProductUrl,

    /// [`ImageUrl`] representing the requested product.
    pub image_url: ImageUrl,

    /// [`Priority`] of this [`ProductRequest`].
    pub priority: Priority,

    /// [`DateTime`] when this [`ProductRequest`] was made.
    pub requested_at: RequestDateTime,

    /// [`Date`] the requested product is required by.
    pub required_by: Date,
}

/// [`Id`] of a [`ProductRequest`] along with its expected owner.
///
/// Identifies a [`ProductRequest`] only if it's owned by the specified
/// [`User`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OwnedId {
    /// ID of the [`ProductRequest`].
    pub id: Id,

    /// ID of the [`User`] expected to own the [`ProductRequest`].
    pub owner_id: user::Id,
}

impl OwnedId {
    /// Checks whether the provided [`ProductRequest`] is identified by this
    /// [`OwnedId`].
    #[must_use]
    pub fn matches(&self, request: &ProductRequest) -> bool {
        request.id == self.id && request.owner_id == self.owner_id
    }
}

/// Change of the mutable fields of an [`OwnedId`]entified
/// [`ProductRequest`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Patch {
    /// [`ProductRequest`] to change.
    pub target: OwnedId,

    /// New [`Priority`] of the [`ProductRequest`].
    pub priority: Priority,

    /// New [`Date`] the requested product is required by.
    pub required_by: Date,
}

/// ID of a [`ProductRequest`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
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

impl FromStr for Id {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Checks whether the provided `url` is an absolute HTTP(S) URL.
fn is_http_url(url: &str) -> bool {
    /// Regular expression checking an absolute HTTP(S) URL.
    static REGEX: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^(?i)https?://[^\s/?#]+\S*$").expect("valid regex")
    });

    url.len() <= 2048 && REGEX.is_match(url)
}

/// URL of a requested product page.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ProductUrl(String);

impl ProductUrl {
    /// Creates a new [`ProductUrl`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        is_http_url(&url).then_some(Self(url))
    }
}

impl FromStr for ProductUrl {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ProductUrl`")
    }
}

/// URL of an image representing a requested product.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Creates a new [`ImageUrl`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        is_http_url(&url).then_some(Self(url))
    }
}

impl FromStr for ImageUrl {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ImageUrl`")
    }
}

/// Priority of a [`ProductRequest`] in `1..=10` range.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Priority(u8);

impl Priority {
    /// Lowest allowed [`Priority`] value.
    pub const MIN: u8 = 1;

    /// Highest allowed [`Priority`] value.
    pub const MAX: u8 = 10;

    /// Creates a new [`Priority`] if the given `value` is in range.
    #[must_use]
    pub fn new<Num: TryInto<u8>>(value: Num) -> Option<Self> {
        let value = value.try_into().ok()?;
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    /// Returns the numeric value of this [`Priority`].
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl FromStr for Priority {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Priority`")
    }
}

#[cfg(feature = "postgres")]
impl<'a> FromSql<'a> for Priority {
    postgres_types::accepts!(INT2);

    fn from_sql(
        ty: &postgres_types::Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        let v = <i16 as FromSql>::from_sql(ty, raw)?;
        Self::new(v).ok_or_else(|| format!("invalid `Priority`: {v}").into())
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Priority {
    postgres_types::accepts!(INT2);
    postgres_types::to_sql_checked!();

    fn to_sql(
        &self,
        ty: &postgres_types::Type,
        w: &mut postgres_types::private::BytesMut,
    ) -> Result<
        postgres_types::IsNull,
        Box<dyn std::error::Error + Sync + Send>,
    > {
        i16::from(self.0).to_sql(ty, w)
    }
}

/// [`DateTime`] when a [`ProductRequest`] was made.
pub type RequestDateTime = DateTimeOf<(ProductRequest, unit::Creation)>;
