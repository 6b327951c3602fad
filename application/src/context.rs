//! [`Context`]-related definitions.

use std::{
    future,
    sync::atomic::{self, AtomicU16},
};

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use common::DateTime;
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::{
    command::{self, Command as _},
    domain::{session, user},
};
use tokio::sync::OnceCell;

#[cfg(doc)]
use crate::api::{Donor, User};
use crate::{define_error, AsError, Error, JuniperResponse, Service};

/// Application context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// [`ResponseStatus`] of the HTTP response.
    status: ResponseStatus,

    /// Parts of the HTTP request.
    parts: http::request::Parts,

    /// Current [`Session`].
    current_session: OnceCell<Session>,

    /// Last authentication [`Error`].
    auth_error: OnceCell<Error>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the status code of the response produced in this [`Context`].
    ///
    /// See [`ResponseStatus::resolve()`] for details.
    #[must_use]
    pub fn status_code(&self, is_ok: bool) -> http::StatusCode {
        self.status.resolve(is_ok)
    }

    /// Marks the response of this [`Context`] as the one having created a
    /// new resource.
    pub fn created(&self) {
        self.status.created();
    }

    /// Sets the error status code for this [`Context`].
    ///
    /// Provided [`http::StatusCode`] will be applied to the response.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.status.set_error(status_code);
    }

    /// Helper method calling [`Context::set_error_status_code()`] inside
    /// [`Result::map_err()`] closure.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Sets the current [`Session`] for this [`Context`].
    pub async fn set_current_session(&self, session: Session) {
        _ = self
            .current_session
            .get_or_init(|| future::ready(session))
            .await;
    }

    /// Returns the current [`Session`] for this [`Context`].
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the provided authentication token is invalid.
    pub async fn current_session(&self) -> Result<Session, Error> {
        self.current_session
            .get_or_try_init(|| async {
                match self
                    .auth_error
                    .get_or_try_init(|| async {
                        match self.do_authentication().await {
                            Ok(u) => Err(u),
                            Err(e) => Ok(e),
                        }
                    })
                    .await
                {
                    Ok(e) => Err(e),
                    Err(u) => Ok(u),
                }
            })
            .await
            .cloned()
            .map_err(Clone::clone)
    }

    /// Returns ID of the [`User`] owning the current [`Session`].
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the provided authentication token is invalid;
    /// - the current [`Session`] belongs to a [`Donor`].
    pub async fn current_user_id(&self) -> Result<user::Id, Error> {
        self.current_session()
            .await?
            .user_id()
            .ok_or_else(|| AuthError::NotUser.into())
            .map_err(self.error())
    }

    /// Applies the [`juniper::Variables`] provided by the client on GraphQL
    /// subscription initialization.
    ///
    /// # Errors
    ///
    /// Errors if the provided variables are invalid.
    pub(crate) fn apply_subscription_variables(
        &mut self,
        vars: &juniper::Variables,
    ) -> Result<(), Error> {
        if let Some(token) = vars.get("authToken") {
            let token = token
                .as_string_value()
                .ok_or_else(|| Error::from(AuthError::InvalidVariables))?;
            let token = format!("Bearer {token}")
                .parse()
                .map_err(|_| Error::from(AuthError::InvalidVariables))?;
            drop(
                self.parts
                    .headers
                    .insert(http::header::AUTHORIZATION, token),
            );
        }

        Ok(())
    }

    /// Performs the [`Session`] authentication.
    ///
    /// # Errors
    ///
    /// Errors if the provided authentication token is invalid.
    async fn do_authentication(&self) -> Result<Session, Error> {
        let res = self
            .parts
            .clone()
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await;
        match res {
            Ok(TypedHeader(Authorization(bearer))) => {
                #[expect(unsafe_code, reason = "specified in correct header")]
                let token = unsafe {
                    session::Token::new_unchecked(bearer.token().to_owned())
                };
                self.service
                    .execute(command::AuthorizeSession {
                        token: token.clone(),
                    })
                    .await
                    .map(|s| Session::new(token, s))
                    .map_err(AsError::into_error)
            }
            Err(e) => {
                if e.is_missing() {
                    Err(AuthError::AuthorizationRequired.into())
                } else {
                    Err(e.into_error())
                }
            }
        }
        .map_err(self.error())
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service =
            parts.extensions.get::<Service>().cloned().ok_or_else(|| {
                JuniperResponse {
                    status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
                    response: GraphQLBatchResponse::Single(
                        GraphQLResponse::error(
                            Error::internal(&"missing `Service` extension")
                                .into_field_error(),
                        ),
                    ),
                }
            })?;

        Ok(Self {
            service,
            status: ResponseStatus::default(),
            parts: parts.clone(),
            current_session: OnceCell::new(),
            auth_error: OnceCell::new(),
        })
    }
}

/// Status code of an HTTP response being produced in a [`Context`].
#[derive(Debug)]
struct ResponseStatus {
    /// Success status code.
    success: AtomicU16,

    /// Error status code, or `0` if no error occurred.
    error: AtomicU16,
}

impl Default for ResponseStatus {
    fn default() -> Self {
        Self {
            success: AtomicU16::new(http::StatusCode::OK.as_u16()),
            error: AtomicU16::new(0),
        }
    }
}

impl ResponseStatus {
    /// Marks the response as the one having created a new resource.
    fn created(&self) {
        self.success.store(
            http::StatusCode::CREATED.as_u16(),
            atomic::Ordering::Relaxed,
        );
    }

    /// Records the provided error [`http::StatusCode`].
    fn set_error(&self, status_code: http::StatusCode) {
        self.error.store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Resolves the final [`http::StatusCode`] of the response.
    ///
    /// A recorded error status code takes precedence. A failed response
    /// without one has been rejected before the execution, so it's considered
    /// a bad request.
    fn resolve(&self, is_ok: bool) -> http::StatusCode {
        let code = match self.error.load(atomic::Ordering::Relaxed) {
            0 if is_ok => self.success.load(atomic::Ordering::Relaxed),
            0 => http::StatusCode::BAD_REQUEST.as_u16(),
            code => code,
        };
        http::StatusCode::from_u16(code)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Authenticated session of a [`User`] or a [`Donor`].
#[derive(Clone, Debug)]
pub struct Session {
    /// Authentication token.
    pub token: session::Token,

    /// Verified claims of the token.
    pub claims: service::domain::Session,
}

impl Session {
    /// Creates a new [`Session`] out of the provided `token` and its verified
    /// `claims`.
    #[must_use]
    pub fn new(
        token: session::Token,
        claims: service::domain::Session,
    ) -> Self {
        Self { token, claims }
    }

    /// Returns ID of the [`User`] this [`Session`] belongs to, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<user::Id> {
        self.claims.user_id()
    }

    /// Returns [`DateTime`] when this [`Session`] expires.
    #[must_use]
    pub fn expires_at(&self) -> DateTime {
        self.claims.expires_at.coerce()
    }
}

impl From<command::create_session::Output> for Session {
    fn from(output: command::create_session::Output) -> Self {
        Self::new(output.token, output.session)
    }
}

impl AsError for command::authorize_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Revoked => Some(AuthError::SessionRevoked.into()),
            Self::Expired => Some(AuthError::SessionExpired.into()),
            Self::Invalid(_) | Self::AccountNotExists(_) => {
                Some(AuthError::InvalidToken.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_TOKEN"]
        #[status = FORBIDDEN]
        #[message = "Provided token is invalid"]
        InvalidToken,

        #[code = "INVALID_VARIABLES"]
        #[status = BAD_REQUEST]
        #[message = "Invalid subscription authorization variables"]
        InvalidVariables,

        #[code = "NOT_USER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated account must be a `User`"]
        NotUser,

        #[code = "SESSION_EXPIRED"]
        #[status = FORBIDDEN]
        #[message = "Session has expired"]
        SessionExpired,

        #[code = "SESSION_REVOKED"]
        #[status = FORBIDDEN]
        #[message = "Session has been revoked"]
        SessionRevoked,
    }
}

#[cfg(test)]
mod spec {
    use service::command::authorize_session::ExecutionError;
    use uuid::Uuid;

    use crate::{AsError as _, Error};

    use super::{AuthError, ResponseStatus};

    #[test]
    fn resolves_success_status() {
        let status = ResponseStatus::default();
        assert_eq!(status.resolve(true), http::StatusCode::OK);

        status.created();
        assert_eq!(status.resolve(true), http::StatusCode::CREATED);
    }

    #[test]
    fn rejected_request_is_bad() {
        let status = ResponseStatus::default();
        status.created();

        assert_eq!(status.resolve(false), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn recorded_error_takes_precedence() {
        for (err, expected) in [
            (AuthError::AuthorizationRequired, http::StatusCode::UNAUTHORIZED),
            (AuthError::SessionRevoked, http::StatusCode::FORBIDDEN),
        ] {
            let status = ResponseStatus::default();
            status.created();
            status.set_error(Error::from(err).status_code);

            assert_eq!(status.resolve(false), expected);
            assert_eq!(status.resolve(true), expected);
        }
    }

    #[test]
    fn maps_verification_failures() {
        for (err, code, status) in [
            (ExecutionError::Revoked, "SESSION_REVOKED", 403),
            (ExecutionError::Expired, "SESSION_EXPIRED", 403),
            (
                ExecutionError::AccountNotExists(Uuid::nil()),
                "INVALID_TOKEN",
                403,
            ),
        ] {
            let err = err.as_error();

            assert_eq!(err.code, code);
            assert_eq!(err.status_code.as_u16(), status);
        }
    }
}
