//! [`PurgeRevokedSessions`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start};
use tokio::time::interval;
use tracing as log;

#[cfg(doc)]
use crate::{domain::Session, infra::Revocations};
use crate::{domain::session, Service};

use super::Task;

/// Configuration for [`PurgeRevokedSessions`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between purges of expired [`Revocations`].
    pub interval: time::Duration,
}

/// [`Task`] for purging [`Revocations`] of already expired [`Session`]s.
#[derive(Clone, Copy, Debug)]
pub struct PurgeRevokedSessions<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Ir> Task<Start<By<PurgeRevokedSessions<Self>, Config>>>
    for Service<Db, Ir>
where
    PurgeRevokedSessions<Service<Db, Ir>>:
        Task<Perform<()>, Ok = usize, Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<PurgeRevokedSessions<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = PurgeRevokedSessions {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(0) => {}
                Ok(n) => log::debug!("purged {n} expired session revocations"),
                Err(e) => {
                    log::error!("`task::PurgeRevokedSessions` failed: {e}");
                }
            }
        }
    }
}

impl<Db, Ir> Task<Perform<()>> for PurgeRevokedSessions<Service<Db, Ir>> {
    type Ok = usize;
    type Err = Infallible;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .service
            .revocations()
            .purge(session::ExpirationDateTime::now()))
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::operations::Perform;

    use crate::{
        domain::session::{ExpirationDateTime, Token},
        spec::service,
        Task as _,
    };

    use super::{Config, PurgeRevokedSessions};

    #[tokio::test]
    async fn purges_only_expired_revocations() {
        let svc = service();
        let expired: Token = "expired".parse().unwrap();
        let live: Token = "live".parse().unwrap();
        svc.revocations().revoke(
            expired.fingerprint(),
            ExpirationDateTime::now() - Duration::from_secs(1),
        );
        svc.revocations().revoke(
            live.fingerprint(),
            ExpirationDateTime::now() + Duration::from_secs(60),
        );

        let task = PurgeRevokedSessions {
            config: Config {
                interval: Duration::from_secs(60),
            },
            service: svc.clone(),
        };

        assert_eq!(task.execute(Perform(())).await.unwrap(), 1);
        assert!(!svc.revocations().is_revoked(&expired.fingerprint()));
        assert!(svc.revocations().is_revoked(&live.fingerprint()));
    }
}
