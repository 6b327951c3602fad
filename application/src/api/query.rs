//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Greets the account owning the current session.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request carries no token;
    /// - `SESSION_REVOKED` - the session has been revoked;
    /// - `SESSION_EXPIRED` - the session has expired;
    /// - `INVALID_TOKEN` - the token is malformed, has a wrong signature, or
    ///                     its account doesn't exist anymore.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "protected",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn protected(ctx: &Context) -> Result<String, Error> {
        let session = ctx.current_session().await?;
        Ok(format!(
            "Hello, {}. Welcome to the protected route!",
            session.claims.username,
        ))
    }

    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_USER` - the current session belongs to a `Donor`;
    /// - `USER_NOT_EXISTS` - the authenticated `User` doesn't exist anymore.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_user_id().await?;
        ctx.service()
            .execute(query::user::ById::by(my_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::user::UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the currently authenticated `Donor`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_DONOR` - the current session belongs to a `User`;
    /// - `DONOR_NOT_EXISTS` - the authenticated `Donor` doesn't exist
    ///                        anymore.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myDonor",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_donor(ctx: &Context) -> Result<api::Donor, Error> {
        let my_id = ctx
            .current_session()
            .await?
            .claims
            .donor_id()
            .ok_or_else(|| api::donor::DonorError::NotDonor.into())
            .map_err(ctx.error())?;
        ctx.service()
            .execute(query::donor::ById::by(my_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::donor::DonorError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches a page of `ProductRequest`s made by the current `User`.
    ///
    /// Pages are numbered from `1`, a page beyond the last one is empty.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_PAGINATION_ARGUMENTS` - `page` is not positive or `limit`
    ///                                    is out of `1..=100` range;
    /// - `NOT_USER` - the current session belongs to a `Donor`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "productRequests",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
            page = ?page,
            priority = ?priority.map(|p| p.to_string()),
            sort = ?sort,
        ),
    )]
    pub async fn product_requests(
        page: Option<i32>,
        limit: Option<i32>,
        sort: Option<api::product_request::Sort>,
        priority: Option<api::product_request::Priority>,
        ctx: &Context,
    ) -> Result<api::product_request::list::Page, Error> {
        use read::product_request::list;

        let arguments = list::Arguments::new(
            page,
            limit,
            i32::try_from(list::DEFAULT_PER_PAGE).unwrap_or(i32::MAX),
        )
        .ok_or_else(|| api::PaginationError::Invalid.into())
        .map_err(ctx.error())?;

        let my_id = ctx.current_user_id().await?;
        ctx.service()
            .execute(query::product_requests::List::by(list::Selector {
                arguments,
                filter: list::Filter {
                    owner_id: my_id,
                    priority: priority.map(Into::into),
                },
                sort: sort.unwrap_or_default().into(),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Resolves an image representing the product at the provided
    /// `ProductUrl`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `IMAGE_NOT_FOUND` - the product page doesn't advertise any image;
    /// - `IMAGE_RESOLUTION_FAILED` - the product page cannot be fetched in
    ///                               time.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "productImage",
            otel.name = Self::SPAN_NAME,
            product_url = %product_url,
        ),
    )]
    pub async fn product_image(
        product_url: api::product_request::ProductUrl,
        ctx: &Context,
    ) -> Result<api::product_request::ImageUrl, Error> {
        ctx.service()
            .execute(query::ResolveProductImage {
                product_url: product_url.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}
