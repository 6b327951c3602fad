//! Scenarios spanning multiple [`Command`]s and [`Query`]s of a [`Service`].
//!
//! [`Query`]: crate::Query

use std::time::Duration;

use common::{Date, DateTime};
use secrecy::SecretBox;

use crate::{
    command::{
        authorize_session, create_donor, create_product_request,
        create_session, create_user, delete_product_request,
        update_product_request, AuthorizeSession, CreateDonor,
        CreateProductRequest, CreateSession, CreateUser,
        DeleteProductRequest, RevokeSession, UpdateProductRequest,
    },
    domain::{password::Password, product_request::Priority, user, Session},
    infra::{image::stub::Outcome, Memory, Stub},
    query::{self, resolve_product_image},
    read::product_request::list,
    task::purge_revoked_sessions,
    Command as _, Config, Service,
};

/// Secret the [`Session`]s of a test [`Service`] are signed with.
const SECRET: &[u8] = b"test-secret";

/// Creates a new test [`Service`] over an empty [`Memory`] database, resolving
/// every product image successfully.
pub(crate) fn service() -> Service<Memory, Stub> {
    service_with(Stub::found("https://cdn.example.com/item.png"))
}

/// Creates a new test [`Service`] over an empty [`Memory`] database with the
/// provided [`Stub`] image resolver.
pub(crate) fn service_with(resolver: Stub) -> Service<Memory, Stub> {
    Service::without_tasks(
        Config::with_secret(
            SECRET,
            Duration::from_secs(60 * 60),
            Duration::from_millis(100),
            purge_revoked_sessions::Config {
                interval: Duration::from_secs(60),
            },
        ),
        Memory::default(),
        resolver,
    )
}

fn secret(password: &str) -> SecretBox<Password> {
    SecretBox::new(Box::new(password.parse().unwrap()))
}

fn register(username: &str, email: &str) -> CreateUser {
    CreateUser {
        username: username.parse().unwrap(),
        email: email.parse().unwrap(),
        password: secret("correct horse"),
        name: None,
        phone: None,
        role: None,
        hmis_id: None,
    }
}

fn login(login: &str, password: &str) -> CreateSession {
    CreateSession::UserByCredentials {
        login: login.parse().unwrap(),
        password: secret(password),
    }
}

fn product_request(owner_id: user::Id, priority: u8) -> CreateProductRequest {
    CreateProductRequest {
        owner_id,
        product_url: "https://shop.example.com/boots".parse().unwrap(),
        priority: Priority::new(priority).unwrap(),
        requested_at: None,
        required_by: Date::from_ymd(2030, 1, 1).unwrap(),
    }
}

fn page_of(owner_id: user::Id, page: usize) -> query::product_requests::List {
    let per_page = list::DEFAULT_PER_PAGE;
    query::product_requests::List::by(list::Selector {
        arguments: list::Arguments::new(Some(page), None, per_page).unwrap(),
        filter: list::Filter {
            owner_id,
            priority: None,
        },
        sort: list::Sort::default(),
    })
}

mod registration {
    use super::{create_user, register, service};
    use crate::Command as _;

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let svc = service();

        drop(svc.execute(register("alice", "a@example.com")).await.unwrap());
        let err = svc
            .execute(register("alice2", "a@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            create_user::ExecutionError::EmailOccupied(_),
        ));
    }

    #[tokio::test]
    async fn rejects_duplicate_username() {
        let svc = service();

        drop(svc.execute(register("alice", "a@example.com")).await.unwrap());
        let err = svc
            .execute(register("alice", "b@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            create_user::ExecutionError::UsernameOccupied(_),
        ));
    }

    #[tokio::test]
    async fn concurrent_duplicates_have_single_winner() {
        let svc = service();

        let (first, second) = tokio::join!(
            svc.execute(register("alice", "same@example.com")),
            svc.execute(register("bob", "same@example.com")),
        );

        assert_eq!(
            [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
            1,
        );
        let err = first.err().or(second.err()).unwrap();
        assert!(matches!(
            err.as_ref(),
            create_user::ExecutionError::EmailOccupied(_),
        ));
    }
}

mod sessions {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use common::DateTime;

    use super::{
        authorize_session, create_donor, create_session, login, register,
        secret, service, CreateDonor, CreateSession, RevokeSession,
        AuthorizeSession, Session, SECRET,
    };
    use crate::{
        domain::session::{self, Role},
        Command as _,
    };

    #[tokio::test]
    async fn issued_token_is_active() {
        let svc = service();
        let user =
            svc.execute(register("alice", "a@example.com")).await.unwrap();

        let out = svc
            .execute(login("a@example.com", "correct horse"))
            .await
            .unwrap();
        let session = svc
            .execute(AuthorizeSession { token: out.token })
            .await
            .unwrap();

        assert_eq!(session.user_id(), Some(user.id));
        assert_eq!(session.role, Role::User);
        assert_eq!(session.username, "alice");
        assert!(
            session.expires_at.unix_timestamp()
                > DateTime::now().unix_timestamp() + 59 * 60,
        );
    }

    #[tokio::test]
    async fn wrong_credentials_are_indistinguishable() {
        let svc = service();
        drop(svc.execute(register("alice", "a@example.com")).await.unwrap());

        for cmd in [login("alice", "wrong password"), login("nobody", "x12345")]
        {
            let err = svc.execute(cmd).await.unwrap_err();
            assert!(matches!(
                err.as_ref(),
                create_session::ExecutionError::WrongCredentials,
            ));
        }
    }

    #[tokio::test]
    async fn logs_in_by_hmis_id_and_name() {
        let svc = service();
        let mut cmd = register("alice", "a@example.com");
        cmd.name = Some("Alice Smith".parse().unwrap());
        cmd.hmis_id = Some("HMIS-42".parse().unwrap());
        drop(svc.execute(cmd).await.unwrap());

        let out = svc
            .execute(CreateSession::UserByHmis {
                hmis_id: "HMIS-42".parse().unwrap(),
                name: "Alice Smith".parse().unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(out.session.username, "alice");

        let err = svc
            .execute(CreateSession::UserByHmis {
                hmis_id: "HMIS-42".parse().unwrap(),
                name: "Alice Smyth".parse().unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            create_session::ExecutionError::WrongCredentials,
        ));
    }

    #[tokio::test]
    async fn donor_session_has_no_user() {
        let svc = service();
        let donor = svc
            .execute(CreateDonor {
                name: "Bob".parse().unwrap(),
                email: "bob@example.com".parse().unwrap(),
                password: secret("donor password"),
                phone: None,
                shelter_affiliation: None,
                social_media_handle: None,
                causes_of_interest: None,
                preferred_contact: None,
            })
            .await
            .unwrap();

        let out = svc
            .execute(CreateSession::DonorByCredentials {
                email: "bob@example.com".parse().unwrap(),
                password: secret("donor password"),
            })
            .await
            .unwrap();
        let session = svc
            .execute(AuthorizeSession { token: out.token })
            .await
            .unwrap();

        assert_eq!(session.role, Role::Donor);
        assert_eq!(session.donor_id(), Some(donor.id));
        assert_eq!(session.user_id(), None);
    }

    #[tokio::test]
    async fn donor_email_is_unique_among_donors() {
        let svc = service();
        let cmd = || CreateDonor {
            name: "Bob".parse().unwrap(),
            email: "bob@example.com".parse().unwrap(),
            password: secret("donor password"),
            phone: None,
            shelter_affiliation: None,
            social_media_handle: None,
            causes_of_interest: None,
            preferred_contact: None,
        };

        drop(svc.execute(cmd()).await.unwrap());
        let err = svc.execute(cmd()).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            create_donor::ExecutionError::EmailOccupied(_),
        ));
    }

    #[tokio::test]
    async fn revoked_token_stays_revoked() {
        let svc = service();
        drop(svc.execute(register("alice", "a@example.com")).await.unwrap());
        let out = svc.execute(login("alice", "correct horse")).await.unwrap();

        svc.execute(RevokeSession {
            token: out.token.clone(),
            session: out.session,
        })
        .await
        .unwrap();

        for _ in 0..2 {
            let err = svc
                .execute(AuthorizeSession {
                    token: out.token.clone(),
                })
                .await
                .unwrap_err();
            assert!(matches!(
                err.as_ref(),
                authorize_session::ExecutionError::Revoked,
            ));
        }
    }

    fn forge(session: &Session, secret: &[u8]) -> session::Token {
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            session,
            &jsonwebtoken::EncodingKey::from_secret(secret),
        )
        .unwrap();
        token.parse().unwrap()
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let svc = service();
        drop(svc.execute(register("alice", "a@example.com")).await.unwrap());
        let mut session = svc
            .execute(login("alice", "correct horse"))
            .await
            .unwrap()
            .session;
        session.expires_at =
            (DateTime::now() - Duration::from_secs(10)).coerce();
        let token = forge(&session, SECRET);

        let err = svc
            .execute(AuthorizeSession {
                token: token.clone(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            authorize_session::ExecutionError::Expired,
        ));

        svc.revocations()
            .revoke(token.fingerprint(), session.expires_at);
        let err = svc.execute(AuthorizeSession { token }).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            authorize_session::ExecutionError::Revoked,
        ));
    }

    #[tokio::test]
    async fn foreign_signature_is_invalid() {
        let svc = service();
        drop(svc.execute(register("alice", "a@example.com")).await.unwrap());
        let session = svc
            .execute(login("alice", "correct horse"))
            .await
            .unwrap()
            .session;

        let err = svc
            .execute(AuthorizeSession {
                token: forge(&session, b"another-secret"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            authorize_session::ExecutionError::Invalid(_),
        ));

        let err = svc
            .execute(AuthorizeSession {
                token: "not-a-jwt".parse().unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            authorize_session::ExecutionError::Invalid(_),
        ));
    }

    #[tokio::test]
    async fn session_of_missing_account_is_rejected() {
        let svc = service();
        drop(svc.execute(register("alice", "a@example.com")).await.unwrap());
        let mut session = svc
            .execute(login("alice", "correct horse"))
            .await
            .unwrap()
            .session;
        session.subject = uuid::Uuid::new_v4();

        let err = svc
            .execute(AuthorizeSession {
                token: forge(&session, SECRET),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            authorize_session::ExecutionError::AccountNotExists(_),
        ));
    }

    /// Waits for the first half of a wall-clock second, so the following
    /// steps happen within a single second.
    async fn second_start() {
        while SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_millis()
            >= 500
        {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn revocation_outlives_expiration_second() {
        let svc = service();
        drop(svc.execute(register("alice", "a@example.com")).await.unwrap());
        let mut session = svc
            .execute(login("alice", "correct horse"))
            .await
            .unwrap()
            .session;

        second_start().await;
        session.expires_at = DateTime::now().coerce();
        let token = forge(&session, SECRET);
        let session = svc
            .execute(AuthorizeSession {
                token: token.clone(),
            })
            .await
            .unwrap();

        svc.execute(RevokeSession {
            token: token.clone(),
            session,
        })
        .await
        .unwrap();
        assert_eq!(
            svc.revocations().purge(session::ExpirationDateTime::now()),
            0,
        );

        let err = svc.execute(AuthorizeSession { token }).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            authorize_session::ExecutionError::Revoked,
        ));
    }

    #[tokio::test]
    async fn revoke_leaves_purging_to_task() {
        let svc = service();
        let stale: session::Token = "stale".parse().unwrap();
        svc.revocations().revoke(
            stale.fingerprint(),
            (DateTime::now() - Duration::from_secs(2)).coerce(),
        );
        drop(svc.execute(register("alice", "a@example.com")).await.unwrap());
        let out = svc.execute(login("alice", "correct horse")).await.unwrap();

        svc.execute(RevokeSession {
            token: out.token.clone(),
            session: out.session,
        })
        .await
        .unwrap();
        assert_eq!(svc.revocations().len(), 2);

        assert_eq!(
            svc.revocations().purge(session::ExpirationDateTime::now()),
            1,
        );
        assert!(!svc.revocations().is_revoked(&stale.fingerprint()));
        assert!(svc.revocations().is_revoked(&out.token.fingerprint()));
    }
}

mod product_requests {
    use super::{
        create_product_request, delete_product_request, page_of,
        product_request, register, resolve_product_image, service,
        service_with, update_product_request, DeleteProductRequest, Outcome,
        Priority, Stub, UpdateProductRequest,
    };
    use crate::Command as _;

    #[tokio::test]
    async fn stores_resolved_image() {
        let svc = service();
        let user =
            svc.execute(register("alice", "a@example.com")).await.unwrap();

        let created = svc.execute(product_request(user.id, 3)).await.unwrap();

        assert_eq!(
            created.image_url.to_string(),
            "https://cdn.example.com/item.png",
        );
        assert_eq!(created.owner_id, user.id);
        assert_eq!(svc.database().product_requests_count(), 1);
        assert_eq!(svc.image_resolver().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unresolved_image_stores_nothing() {
        for outcome in [Outcome::NotFound, Outcome::Fail, Outcome::Hang] {
            let svc = service_with(Stub::new(outcome));
            let user =
                svc.execute(register("alice", "a@example.com")).await.unwrap();

            let err = svc
                .execute(product_request(user.id, 3))
                .await
                .unwrap_err();

            assert!(matches!(
                err.as_ref(),
                create_product_request::ExecutionError::ImageNotFound(_),
            ));
            assert_eq!(svc.database().product_requests_count(), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn image_resolution_times_out() {
        let svc = service_with(Stub::new(Outcome::Hang));
        let user =
            svc.execute(register("alice", "a@example.com")).await.unwrap();

        let err = svc
            .execute(product_request(user.id, 3))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            create_product_request::ExecutionError::ImageNotFound(
                resolve_product_image::ExecutionError::Timeout(_),
            ),
        ));
    }

    #[tokio::test]
    async fn only_owner_mutates() {
        let svc = service();
        let owner =
            svc.execute(register("alice", "a@example.com")).await.unwrap();
        let stranger =
            svc.execute(register("bob", "b@example.com")).await.unwrap();
        let created = svc.execute(product_request(owner.id, 3)).await.unwrap();

        let err = svc
            .execute(UpdateProductRequest {
                id: created.id,
                owner_id: stranger.id,
                priority: Priority::new(9).unwrap(),
                required_by: created.required_by,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            update_product_request::ExecutionError::NotExists(id)
                if *id == created.id,
        ));

        let err = svc
            .execute(DeleteProductRequest {
                id: created.id,
                owner_id: stranger.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            delete_product_request::ExecutionError::NotExists(_),
        ));
        assert_eq!(svc.database().product_requests_count(), 1);

        let updated = svc
            .execute(UpdateProductRequest {
                id: created.id,
                owner_id: owner.id,
                priority: Priority::new(9).unwrap(),
                required_by: created.required_by,
            })
            .await
            .unwrap();
        assert_eq!(updated.priority, Priority::new(9).unwrap());
        assert_eq!(updated.product_url, created.product_url);

        let deleted = svc
            .execute(DeleteProductRequest {
                id: created.id,
                owner_id: owner.id,
            })
            .await
            .unwrap();
        assert_eq!(deleted, created.id);
        assert_eq!(svc.database().product_requests_count(), 0);
    }

    #[tokio::test]
    async fn missing_id_is_not_exists() {
        let svc = service();
        let owner =
            svc.execute(register("alice", "a@example.com")).await.unwrap();

        let err = svc
            .execute(DeleteProductRequest {
                id: crate::domain::product_request::Id::new(),
                owner_id: owner.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            delete_product_request::ExecutionError::NotExists(_),
        ));
    }

    #[tokio::test]
    async fn lists_owned_pages() {
        let svc = service();
        let owner =
            svc.execute(register("alice", "a@example.com")).await.unwrap();
        let stranger =
            svc.execute(register("bob", "b@example.com")).await.unwrap();
        for priority in 1..=7 {
            let cmd = product_request(owner.id, priority);
            drop(svc.execute(cmd).await.unwrap());
        }
        drop(svc.execute(product_request(stranger.id, 5)).await.unwrap());

        let page = svc.execute(page_of(owner.id, 1)).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_count, 7);
        assert_eq!(page.total_pages(), 2);
        assert!(page.items.iter().all(|r| r.owner_id == owner.id));

        let page = svc.execute(page_of(owner.id, 2)).await.unwrap();
        assert_eq!(page.items.len(), 2);

        let page = svc.execute(page_of(owner.id, 3)).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 7);
    }
}

#[tokio::test]
async fn request_lifecycle() {
    let svc = service();

    let user = svc
        .execute(register("alice", "alice@example.com"))
        .await
        .unwrap();
    let out = svc.execute(login("alice", "correct horse")).await.unwrap();
    let session = svc
        .execute(AuthorizeSession {
            token: out.token.clone(),
        })
        .await
        .unwrap();
    let owner_id = session.user_id().unwrap();
    assert_eq!(owner_id, user.id);

    let created = svc
        .execute(CreateProductRequest {
            requested_at: Some(DateTime::now().coerce()),
            ..product_request(owner_id, 7)
        })
        .await
        .unwrap();
    let page = svc.execute(page_of(owner_id, 1)).await.unwrap();
    assert_eq!(page.items, [created]);

    svc.execute(RevokeSession {
        token: out.token.clone(),
        session,
    })
    .await
    .unwrap();
    let err = svc
        .execute(AuthorizeSession { token: out.token })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        authorize_session::ExecutionError::Revoked,
    ));
}
