//! [`Revocations`] store definitions.

use std::sync::Arc;

use dashmap::DashMap;

#[cfg(doc)]
use crate::domain::{session::Token, Session};
use crate::domain::session::{ExpirationDateTime, Fingerprint};

/// In-process store of revoked [`Session`]s.
///
/// Keeps a [`Fingerprint`] of every revoked [`Token`] until the moment the
/// [`Token`] would expire on its own.
#[derive(Clone, Debug, Default)]
pub struct Revocations(Arc<DashMap<Fingerprint, ExpirationDateTime>>);

impl Revocations {
    /// Records the [`Token`] with the provided [`Fingerprint`] as revoked
    /// until its `expires_at` moment.
    pub fn revoke(
        &self,
        fingerprint: Fingerprint,
        expires_at: ExpirationDateTime,
    ) {
        drop(self.0.insert(fingerprint, expires_at));
    }

    /// Checks whether the [`Token`] with the provided [`Fingerprint`] has been
    /// revoked.
    #[must_use]
    pub fn is_revoked(&self, fingerprint: &Fingerprint) -> bool {
        self.0.contains_key(fingerprint)
    }

    /// Removes all the entries whose [`Token`]s have expired by the `now`
    /// moment.
    ///
    /// [`Token`] expiration has a whole second precision and a [`Token`] is
    /// still accepted during its expiration second, so an entry is kept until
    /// that second has fully passed.
    ///
    /// Returns the number of removed entries.
    pub fn purge(&self, now: ExpirationDateTime) -> usize {
        let now = now.unix_timestamp();
        let before = self.0.len();
        self.0.retain(|_, expires_at| expires_at.unix_timestamp() >= now);
        before.saturating_sub(self.0.len())
    }

    /// Returns the number of currently stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks whether no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::domain::session::{ExpirationDateTime, Token};

    use super::Revocations;

    #[test]
    fn keeps_revoked_until_expiry() {
        let store = Revocations::default();
        let now = ExpirationDateTime::now();
        let live: Token = "live".parse().unwrap();
        let stale: Token = "stale".parse().unwrap();

        store.revoke(live.fingerprint(), now + Duration::from_secs(60));
        store.revoke(stale.fingerprint(), now - Duration::from_secs(1));
        assert!(store.is_revoked(&live.fingerprint()));
        assert!(store.is_revoked(&stale.fingerprint()));

        assert_eq!(store.purge(now), 1);
        assert!(store.is_revoked(&live.fingerprint()));
        assert!(!store.is_revoked(&stale.fingerprint()));
        assert_eq!(store.len(), 1);

        assert_eq!(store.purge(now + Duration::from_secs(61)), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn keeps_revoked_during_expiration_second() {
        let store = Revocations::default();
        let now = ExpirationDateTime::now();
        let token: Token = "token".parse().unwrap();

        store.revoke(token.fingerprint(), now);

        assert_eq!(store.purge(now), 0);
        assert!(store.is_revoked(&token.fingerprint()));

        assert_eq!(store.purge(now + Duration::from_secs(1)), 1);
        assert!(!store.is_revoked(&token.fingerprint()));
    }

    #[test]
    fn is_shared_between_clones() {
        let store = Revocations::default();
        let clone = store.clone();
        let token: Token = "token".parse().unwrap();

        clone.revoke(
            token.fingerprint(),
            ExpirationDateTime::now() + Duration::from_secs(60),
        );

        assert!(store.is_revoked(&token.fingerprint()));
    }
}
