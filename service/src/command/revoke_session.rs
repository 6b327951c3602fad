//! [`Command`] for revoking a [`Session`].

use std::convert::Infallible;

use tracing as log;

#[cfg(doc)]
use crate::{
    command::AuthorizeSession, domain::session::Token,
    task::PurgeRevokedSessions,
};
use crate::{
    domain::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for revoking an authorized [`Session`], so its [`Token`] is
/// never accepted again.
///
/// Expired revocations are evicted by [`PurgeRevokedSessions`] task only.
#[derive(Clone, Debug)]
pub struct RevokeSession {
    /// [`Token`] of the [`Session`] to revoke.
    pub token: session::Token,

    /// [`Session`] returned by [`AuthorizeSession`] for the `token`.
    pub session: Session,
}

impl<Db, Ir> Command<RevokeSession> for Service<Db, Ir> {
    type Ok = ();
    type Err = Infallible;

    async fn execute(&self, cmd: RevokeSession) -> Result<Self::Ok, Self::Err> {
        let RevokeSession { token, session } = cmd;

        self.revocations()
            .revoke(token.fingerprint(), session.expires_at);
        log::debug!("revoked `Session(id: {})`", session.id);

        Ok(())
    }
}
