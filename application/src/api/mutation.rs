//! GraphQL [`Mutation`]s definitions.

use common::{Date, DateTime};
use juniper::graphql_object;
use secrecy::SecretBox;
use service::{command, Command as _};

use crate::{api, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers a new `User` with the provided credentials and profile.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USERNAME_OCCUPIED` - provided `UserUsername` is occupied by another
    ///                         `User`;
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is occupied by another
    ///                      `User`;
    /// - `HMIS_ID_OCCUPIED` - provided `UserHmisId` is occupied by another
    ///                        `User`.
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "registerUser",
            hmis_id = ?hmis_id.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
            username = %username,
        ),
    )]
    pub async fn register_user(
        username: api::user::Username,
        email: api::user::Email,
        password: api::user::Password,
        name: Option<api::user::Name>,
        phone: Option<api::user::Phone>,
        role: Option<api::user::Role>,
        hmis_id: Option<api::user::HmisId>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let user = ctx
            .service()
            .execute(command::CreateUser {
                username: username.into(),
                email: email.into(),
                password: SecretBox::init_with(move || password.into()),
                name: name.map(Into::into),
                phone: phone.map(Into::into),
                role: role.map(Into::into),
                hmis_id: hmis_id.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.created();
        Ok(user.into())
    }

    /// Registers a new `Donor` with the provided credentials and profile.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMAIL_OCCUPIED` - provided `DonorEmail` is occupied by another
    ///                      `Donor`.
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "registerDonor",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn register_donor(
        name: api::donor::Name,
        email: api::donor::Email,
        password: api::donor::Password,
        phone: Option<api::donor::Phone>,
        shelter_affiliation: Option<api::donor::Note>,
        social_media_handle: Option<api::donor::Note>,
        causes_of_interest: Option<api::donor::Note>,
        preferred_contact: Option<api::donor::ContactMethod>,
        ctx: &Context,
    ) -> Result<api::Donor, Error> {
        let donor = ctx
            .service()
            .execute(command::CreateDonor {
                name: name.into(),
                email: email.into(),
                password: SecretBox::init_with(move || password.into()),
                phone: phone.map(Into::into),
                shelter_affiliation: shelter_affiliation.map(Into::into),
                social_media_handle: social_media_handle.map(Into::into),
                causes_of_interest: causes_of_interest.map(Into::into),
                preferred_contact: preferred_contact.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.created();
        Ok(donor.into())
    }

    /// Creates a new `User` session with the provided credentials.
    ///
    /// `login` is either a `UserUsername` or a `UserEmail`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials do not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUserSession",
            login = %login,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        login: api::user::Login,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::session::CreateResult, Error> {
        Self::create_session(
            command::CreateSession::UserByCredentials {
                login: login.into(),
                password: SecretBox::init_with(move || password.into()),
            },
            ctx,
        )
        .await
    }

    /// Creates a new `User` session by the `UserHmisId` and the `UserName`
    /// the `User` has been registered with.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials do not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUserSessionByHmis",
            hmis_id = %hmis_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session_by_hmis(
        hmis_id: api::user::HmisId,
        name: api::user::Name,
        ctx: &Context,
    ) -> Result<api::session::CreateResult, Error> {
        Self::create_session(
            command::CreateSession::UserByHmis {
                hmis_id: hmis_id.into(),
                name: name.into(),
            },
            ctx,
        )
        .await
    }

    /// Creates a new `Donor` session with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials do not match any `Donor`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createDonorSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_donor_session(
        email: api::donor::Email,
        password: api::donor::Password,
        ctx: &Context,
    ) -> Result<api::session::CreateResult, Error> {
        Self::create_session(
            command::CreateSession::DonorByCredentials {
                email: email.into(),
                password: SecretBox::init_with(move || password.into()),
            },
            ctx,
        )
        .await
    }

    /// Revokes the current session.
    ///
    /// The revoked token is rejected with `SESSION_REVOKED` until it expires.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request carries no token;
    /// - `SESSION_REVOKED` - the session has already been revoked;
    /// - `SESSION_EXPIRED` - the session has expired;
    /// - `INVALID_TOKEN` - the provided token is invalid.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_session(ctx: &Context) -> Result<bool, Error> {
        let Session { token, claims } = ctx.current_session().await?;

        ctx.service()
            .execute(command::RevokeSession {
                token,
                session: claims,
            })
            .await
            .unwrap_or_else(|e| match e {});

        Ok(true)
    }

    /// Creates a new `ProductRequest` of the current `User`.
    ///
    /// An image of the product is resolved before the `ProductRequest` is
    /// stored. `requestedAt` defaults to the current `DateTime`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_USER` - the current session belongs to a `Donor`;
    /// - `IMAGE_NOT_FOUND` - no image can be resolved for the `ProductUrl`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createProductRequest",
            otel.name = Self::SPAN_NAME,
            priority = %priority,
            product_url = %product_url,
            required_by_date = %required_by_date,
        ),
    )]
    pub async fn create_product_request(
        product_url: api::product_request::ProductUrl,
        priority: api::product_request::Priority,
        required_by_date: Date,
        requested_at: Option<DateTime>,
        ctx: &Context,
    ) -> Result<api::ProductRequest, Error> {
        let my_id = ctx.current_user_id().await?;

        let request = ctx
            .service()
            .execute(command::CreateProductRequest {
                owner_id: my_id,
                product_url: product_url.into(),
                priority: priority.into(),
                requested_at: requested_at.map(DateTime::coerce),
                required_by: required_by_date,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.created();
        Ok(request.into())
    }

    /// Updates the priority and the required-by `Date` of a `ProductRequest`
    /// of the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_USER` - the current session belongs to a `Donor`;
    /// - `PRODUCT_REQUEST_NOT_EXISTS` - the `ProductRequest` with the
    ///                                  specified ID does not exist or is
    ///                                  made by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateProductRequest",
            id = %id,
            otel.name = Self::SPAN_NAME,
            priority = %priority,
            required_by_date = %required_by_date,
        ),
    )]
    pub async fn update_product_request(
        id: api::product_request::Id,
        priority: api::product_request::Priority,
        required_by_date: Date,
        ctx: &Context,
    ) -> Result<api::ProductRequest, Error> {
        let my_id = ctx.current_user_id().await?;

        ctx.service()
            .execute(command::UpdateProductRequest {
                id: id.into(),
                owner_id: my_id,
                priority: priority.into(),
                required_by: required_by_date,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes a `ProductRequest` of the current `User`.
    ///
    /// Returns ID of the deleted `ProductRequest`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_USER` - the current session belongs to a `Donor`;
    /// - `PRODUCT_REQUEST_NOT_EXISTS` - the `ProductRequest` with the
    ///                                  specified ID does not exist or is
    ///                                  made by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteProductRequest",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_product_request(
        id: api::product_request::Id,
        ctx: &Context,
    ) -> Result<api::product_request::Id, Error> {
        let my_id = ctx.current_user_id().await?;

        ctx.service()
            .execute(command::DeleteProductRequest {
                id: id.into(),
                owner_id: my_id,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl Mutation {
    /// Executes the provided [`command::CreateSession`] and makes the created
    /// [`Session`] the current one of the [`Context`].
    async fn create_session(
        cmd: command::CreateSession,
        ctx: &Context,
    ) -> Result<api::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(cmd)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(output.clone().into()).await;

        Ok(output.into())
    }
}
