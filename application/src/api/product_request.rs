//! [`ProductRequest`]-related definitions.

use common::{Date, DateTime};
use derive_more::{AsRef, Display, From, Into};
use juniper::{
    graphql_object, GraphQLEnum, GraphQLScalar, InputValue, ScalarValue,
    Value,
};
use service::{command, domain, query, read};
use uuid::Uuid;

use crate::{api::scalar, define_error, AsError, Context, Error};

/// A [`ProductRequest`] made by a `User`.
#[derive(Clone, Debug, From)]
pub struct ProductRequest(domain::ProductRequest);

/// A `ProductRequest` made by a `User`.
#[graphql_object(context = Context)]
impl ProductRequest {
    /// Unique identifier of this `ProductRequest`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// URL of the requested product page.
    #[must_use]
    pub fn product_url(&self) -> ProductUrl {
        self.0.product_url.clone().into()
    }

    /// URL of the image representing the requested product.
    #[must_use]
    pub fn image_url(&self) -> ImageUrl {
        self.0.image_url.clone().into()
    }

    /// Priority of this `ProductRequest`.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.0.priority.into()
    }

    /// `DateTime` when this `ProductRequest` was made.
    #[must_use]
    pub fn requested_at(&self) -> DateTime {
        self.0.requested_at.coerce()
    }

    /// `Date` the requested product is required by.
    #[must_use]
    pub fn required_by_date(&self) -> Date {
        self.0.required_by
    }
}

/// Unique identifier of a `ProductRequest`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::product_request::Id)]
#[into(domain::product_request::Id)]
#[graphql(name = "ProductRequestId", transparent)]
pub struct Id(Uuid);

/// URL of a requested product page.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ProductUrl",
    with = scalar::Via::<domain::product_request::ProductUrl>,
)]
pub struct ProductUrl(domain::product_request::ProductUrl);

/// URL of an image representing a requested product.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ImageUrl",
    with = scalar::Via::<domain::product_request::ImageUrl>,
)]
pub struct ImageUrl(domain::product_request::ImageUrl);

/// Priority of a `ProductRequest`: an integer in `1..=10` range.
#[derive(Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ProductRequestPriority",
    with = Self,
    parse_token(i32),
)]
pub struct Priority(domain::product_request::Priority);

impl Priority {
    /// Converts this [`Priority`] into an integer scalar [`Value`].
    fn to_output<S: ScalarValue>(&self) -> Value<S> {
        Value::scalar(i32::from(self.0.get()))
    }

    /// Parses a [`Priority`] from an integer scalar [`InputValue`].
    fn from_input<S: ScalarValue>(
        input: &InputValue<S>,
    ) -> Result<Self, String> {
        let value = input.as_int_value().ok_or_else(|| {
            format!(
                "Cannot parse input scalar `ProductRequestPriority`: \
                 expected integer input value, found: {input}",
            )
        })?;
        domain::product_request::Priority::new(value)
            .map(Self)
            .ok_or_else(|| {
                format!(
                    "Cannot parse input scalar `ProductRequestPriority`: \
                     {value} is out of {}..={} range",
                    domain::product_request::Priority::MIN,
                    domain::product_request::Priority::MAX,
                )
            })
    }
}

/// Field to sort `ProductRequest`s by in ascending order.
#[derive(Clone, Copy, Debug, Default, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ProductRequestSort")]
pub enum Sort {
    /// Sort by `ProductRequestPriority`.
    Priority,

    /// Sort by the `DateTime` the request was made.
    #[default]
    RequestDate,

    /// Sort by the `Date` the product is required by.
    RequiredByDate,

    /// Sort by `ProductUrl`.
    ProductUrl,
}

impl From<Sort> for read::product_request::list::Sort {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::Priority => Self::Priority,
            Sort::RequestDate => Self::RequestDate,
            Sort::RequiredByDate => Self::RequiredByDate,
            Sort::ProductUrl => Self::ProductUrl,
        }
    }
}

pub mod list {
    //! Definitions related to [`ProductRequest`] list.

    use derive_more::{From, Into};
    use juniper::graphql_object;
    use service::read;

    use crate::Context;

    use super::ProductRequest;

    /// A [`Page`] of [`ProductRequest`]s.
    ///
    /// [`Page`]: read::product_request::list::Page
    #[derive(Clone, Debug, From, Into)]
    pub struct Page(read::product_request::list::Page);

    /// A page of `ProductRequest`s.
    #[graphql_object(name = "ProductRequestPage", context = Context)]
    impl Page {
        /// `ProductRequest`s on this page.
        #[must_use]
        pub fn items(&self) -> Vec<ProductRequest> {
            self.0.items.iter().cloned().map(Into::into).collect()
        }

        /// Number of this page, starting from `1`.
        #[must_use]
        pub fn current_page(&self) -> i32 {
            saturate(self.0.current_page())
        }

        /// Total number of pages.
        #[must_use]
        pub fn total_pages(&self) -> i32 {
            saturate(self.0.total_pages())
        }

        /// Total number of `ProductRequest`s across all pages.
        #[must_use]
        pub fn total_count(&self) -> i32 {
            saturate(self.0.total_count)
        }
    }

    /// Converts the provided `count` into a GraphQL `Int`, saturating on
    /// overflow.
    fn saturate(count: usize) -> i32 {
        i32::try_from(count).unwrap_or(i32::MAX)
    }
}

impl AsError for command::create_product_request::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ImageNotFound(_) => Some(ImageError::NotFound.into()),
        }
    }
}

impl AsError for command::update_product_request::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotExists(_) => Some(ProductRequestError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_product_request::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotExists(_) => Some(ProductRequestError::NotExists.into()),
        }
    }
}

impl AsError for query::resolve_product_image::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::NotFound(_) => Some(ImageError::NotFound.into()),
            Self::Resolver(_) | Self::Timeout(_) => {
                Some(ImageError::ResolutionFailed.into())
            }
        }
    }
}

define_error! {
    enum ProductRequestError {
        #[code = "PRODUCT_REQUEST_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`ProductRequest` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum ImageError {
        #[code = "IMAGE_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "No image found for the provided `ProductUrl`"]
        NotFound,

        #[code = "IMAGE_RESOLUTION_FAILED"]
        #[status = INTERNAL_SERVER_ERROR]
        #[message = "Failed to resolve an image for the provided `ProductUrl`"]
        ResolutionFailed,
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use juniper::{DefaultScalarValue, InputValue};
    use service::{
        command::create_product_request,
        domain::product_request::ProductUrl,
        query::resolve_product_image,
    };

    use crate::AsError as _;

    use super::Priority;

    fn parse(input: InputValue<DefaultScalarValue>) -> Option<u8> {
        Priority::from_input(&input).ok().map(|p| p.0.get())
    }

    #[test]
    fn parses_priority_in_range() {
        assert_eq!(parse(InputValue::scalar(1)), Some(1));
        assert_eq!(parse(InputValue::scalar(10)), Some(10));

        assert_eq!(parse(InputValue::scalar(0)), None);
        assert_eq!(parse(InputValue::scalar(11)), None);
        assert_eq!(parse(InputValue::scalar("abc".to_owned())), None);
    }

    #[test]
    fn unresolved_image_is_not_found() {
        let url = ProductUrl::new("https://shop.example.com/1").unwrap();

        let err = create_product_request::ExecutionError::ImageNotFound(
            resolve_product_image::ExecutionError::Timeout(
                Duration::from_secs(10),
            ),
        )
        .as_error();
        assert_eq!(err.code, "IMAGE_NOT_FOUND");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);

        let err =
            resolve_product_image::ExecutionError::NotFound(url).as_error();
        assert_eq!(err.code, "IMAGE_NOT_FOUND");

        let err = resolve_product_image::ExecutionError::Timeout(
            Duration::from_secs(10),
        )
        .as_error();
        assert_eq!(err.code, "IMAGE_RESOLUTION_FAILED");
        assert_eq!(err.status_code, http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
