//! [`Password`] definitions.

use std::{str::FromStr, sync::LazyLock};

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHasher as _, PasswordVerifier as _,
        SaltString,
    },
    Argon2,
};
use derive_more::{Display, Error, From};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use secrecy::{zeroize::Zeroize, CloneableSecret, ExposeSecret, SecretBox};
use tokio::task;

/// Password of an account.
#[derive(Clone, Debug, Display, Eq, From, PartialEq)]
#[from(&str, String)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        password.chars().count() >= 6 && password.len() <= 128
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Salted one-way hash of a [`Password`] in a [PHC string format].
///
/// [PHC string format]: https://github.com/P-H-C/phc-string-format
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the given [`Password`] with [Argon2id] and a random salt.
    ///
    /// # Errors
    ///
    /// If the hashing algorithm fails.
    ///
    /// [Argon2id]: https://en.wikipedia.org/wiki/Argon2
    pub fn new(password: &Password) -> Result<Self, password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.0.as_bytes(), &salt)
            .map(|h| Self(h.to_string()))
    }

    /// Verifies whether the given [`Password`] matches this [`PasswordHash`].
    ///
    /// Comparison is performed in constant time.
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        password_hash::PasswordHash::new(&self.0).is_ok_and(|hash| {
            Argon2::default()
                .verify_password(password.0.as_bytes(), &hash)
                .is_ok()
        })
    }

    /// Hashes the given [`Password`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// If the hashing algorithm fails, or the blocking task doesn't complete.
    pub async fn hash(
        password: SecretBox<Password>,
    ) -> Result<Self, HashError> {
        Ok(task::spawn_blocking(move || Self::new(password.expose_secret()))
            .await??)
    }

    /// Verifies the given [`Password`] against the provided [`PasswordHash`]
    /// on the blocking thread pool.
    ///
    /// Without a [`PasswordHash`] a throwaway one is verified instead, and
    /// `false` is returned.
    pub async fn matches(
        hash: Option<Self>,
        password: SecretBox<Password>,
    ) -> bool {
        task::spawn_blocking(move || {
            let password = password.expose_secret();
            match hash {
                Some(hash) => hash.verify(password),
                None => {
                    Self::verify_dummy(password);
                    false
                }
            }
        })
        .await
        .unwrap_or(false)
    }

    /// Verifies the given [`Password`] against a throwaway [`PasswordHash`].
    ///
    /// Used when no account matches the provided login, so a failed lookup
    /// costs as much time as a failed password check.
    pub fn verify_dummy(password: &Password) {
        static DUMMY: LazyLock<Option<PasswordHash>> = LazyLock::new(|| {
            PasswordHash::new(&Password("dummy-password".into())).ok()
        });

        if let Some(hash) = DUMMY.as_ref() {
            _ = hash.verify(password);
        }
    }
}

/// Error of hashing a [`Password`].
#[derive(Debug, Display, Error, From)]
pub enum HashError {
    /// Hashing algorithm failed.
    #[display("Hashing algorithm failed: {_0}")]
    Algorithm(password_hash::Error),

    /// Blocking hashing task failed to complete.
    #[display("Hashing task failed: {_0}")]
    Task(task::JoinError),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use super::{Password, PasswordHash};

    fn secret(password: &str) -> SecretBox<Password> {
        SecretBox::new(Box::new(Password::new(password).unwrap()))
    }

    #[test]
    fn password_length() {
        assert!(Password::new("secret1").is_some());
        assert!(Password::new("123456").is_some());

        assert!(Password::new("").is_none());
        assert!(Password::new("12345").is_none());
        assert!(Password::new("a".repeat(129)).is_none());
    }

    #[test]
    fn hash_verifies() {
        let password = Password::new("secret1").unwrap();
        let hash = PasswordHash::new(&password).unwrap();

        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("secret2").unwrap()));
        assert_ne!(hash.to_string(), "secret1");
    }

    #[test]
    fn hash_is_salted() {
        let password = Password::new("secret1").unwrap();

        assert_ne!(
            PasswordHash::new(&password).unwrap(),
            PasswordHash::new(&password).unwrap(),
        );
    }

    #[tokio::test]
    async fn hashes_and_matches_off_the_runtime() {
        let hash = PasswordHash::hash(secret("secret1")).await.unwrap();

        assert!(hash.verify(&Password::new("secret1").unwrap()));
        assert!(
            PasswordHash::matches(Some(hash.clone()), secret("secret1")).await
        );
        assert!(!PasswordHash::matches(Some(hash), secret("secret2")).await);
        assert!(!PasswordHash::matches(None, secret("secret1")).await);
    }
}
