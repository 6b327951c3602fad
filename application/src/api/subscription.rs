//! GraphQL [`Subscription`]s definitions.

use std::time::Duration;

use common::DateTime;
use futures::{
    stream::{self, BoxStream},
    FutureExt as _, StreamExt as _,
};
use juniper::graphql_subscription;

use crate::{context, Context, Error};

/// Root of all GraphQL subscription.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Subscription waiting for the current authenticated session to expire.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the current session is not
    ///                              authenticated or session expired;
    /// - `SESSION_REVOKED` - if the current session has been revoked;
    /// - `SESSION_EXPIRED` - if the current session has already expired;
    /// - `INVALID_TOKEN` - if the provided token is invalid.
    pub async fn wait_session(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<bool, Error>>, Error> {
        let expires_at = ctx.current_session().await?.expires_at();
        let now = DateTime::now();
        let timeout = if expires_at > now {
            expires_at - now
        } else {
            Duration::ZERO
        };
        Ok(stream::once(
            tokio::time::sleep(timeout).map(|()| {
                Err(context::AuthError::AuthorizationRequired.into())
            }),
        )
        .boxed())
    }
}
