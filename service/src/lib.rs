//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::{error::Error, time::Duration};

use common::operations::{By, Start};
use derive_more::Debug;

#[cfg(doc)]
use domain::Session;
#[cfg(doc)]
use infra::{Database, ImageResolver};

use self::infra::Revocations;
pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Time-to-live of a newly created [`Session`].
    pub session_ttl: Duration,

    /// Timeout of resolving a product image via [`ImageResolver`].
    pub image_resolution_timeout: Duration,

    /// [`task::PurgeRevokedSessions`] configuration.
    pub purge_revoked_sessions: task::purge_revoked_sessions::Config,
}

impl Config {
    /// Creates a new [`Config`] signing [`Session`]s with the provided HMAC
    /// `secret`.
    #[must_use]
    pub fn with_secret(
        secret: &[u8],
        session_ttl: Duration,
        image_resolution_timeout: Duration,
        purge_revoked_sessions: task::purge_revoked_sessions::Config,
    ) -> Self {
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            session_ttl,
            image_resolution_timeout,
            purge_revoked_sessions,
        }
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Ir> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`ImageResolver`] of this [`Service`].
    image_resolver: Ir,

    /// [`Revocations`] of [`Session`]s issued by this [`Service`].
    revocations: Revocations,
}

impl<Db, Ir> Service<Db, Ir> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        image_resolver: Ir,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::PurgeRevokedSessions<Self>,
                        task::purge_revoked_sessions::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Self::without_tasks(config, database, image_resolver);

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn("PurgeRevokedSessions", async move {
            svc.execute(Start(By::new(svc.config().purge_revoked_sessions)))
                .await
        });

        (this, bg)
    }

    /// Creates a new [`Service`] without spawning its background [`Task`]s.
    #[must_use]
    pub fn without_tasks(
        config: Config,
        database: Db,
        image_resolver: Ir,
    ) -> Self {
        Self {
            config,
            database,
            image_resolver,
            revocations: Revocations::default(),
        }
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`ImageResolver`] of this [`Service`].
    #[must_use]
    pub fn image_resolver(&self) -> &Ir {
        &self.image_resolver
    }

    /// Returns [`Revocations`] of this [`Service`].
    #[must_use]
    pub fn revocations(&self) -> &Revocations {
        &self.revocations
    }
}

#[cfg(test)]
mod spec;
