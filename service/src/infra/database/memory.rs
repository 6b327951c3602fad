//! In-memory [`Database`] implementation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use common::operations::{By, Commit, Delete, Insert, Select, Transact, Update};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{donor, product_request, user, Donor, ProductRequest, User},
    infra::database::{self, constraint, Database},
    read,
};

/// In-memory [`Database`] keeping everything in a lock-protected state.
///
/// [`Transact`] returns a handle to the same state and [`Commit`] does
/// nothing, so every write is visible immediately.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Mutex<State>>);

/// State of a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,

    /// Stored [`Donor`]s.
    donors: HashMap<donor::Id, Donor>,

    /// Stored [`ProductRequest`]s.
    product_requests: HashMap<product_request::Id, ProductRequest>,
}

impl Memory {
    /// Locks the state of this [`Memory`] database.
    ///
    /// Must never be held across an `.await` point.
    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of stored [`ProductRequest`]s.
    #[must_use]
    pub fn product_requests_count(&self) -> usize {
        self.state().product_requests.len()
    }
}

/// [`Memory`] database error.
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// Unique constraint is violated.
    #[display("unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if this [`Error`] is a violation of the specified unique
    /// constraint, or of any unique constraint if [`None`].
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation(c) => constraint.map_or(true, |x| x == *c),
        }
    }
}

/// Creates a new [`Traced`] unique violation of the provided `constraint`.
macro_rules! unique_violation {
    ($constraint:expr) => {
        tracerr::new!(database::Error::Memory(Error::UniqueViolation(
            $constraint
        )))
    };
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().users.get(by.inner()).cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Login>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();
        Ok(self
            .state()
            .users
            .values()
            .find(|u| login.matches(u))
            .cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Username>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();
        Ok(self
            .state()
            .users
            .values()
            .find(|u| &u.username == username)
            .cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .state()
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::HmisId>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::HmisId>>,
    ) -> Result<Self::Ok, Self::Err> {
        let hmis_id = by.into_inner();
        Ok(self
            .state()
            .users
            .values()
            .find(|u| u.hmis_id.as_ref() == Some(hmis_id))
            .cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        for u in state.users.values() {
            if u.username == user.username {
                return Err(unique_violation!(constraint::USERS_USERNAME));
            }
            if u.email == user.email {
                return Err(unique_violation!(constraint::USERS_EMAIL));
            }
            if user.hmis_id.is_some() && u.hmis_id == user.hmis_id {
                return Err(unique_violation!(constraint::USERS_HMIS_ID));
            }
        }
        drop(state.users.insert(user.id, user));
        Ok(())
    }
}

impl Database<Select<By<Option<Donor>, donor::Id>>> for Memory {
    type Ok = Option<Donor>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Donor>, donor::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().donors.get(by.inner()).cloned())
    }
}

impl<'l> Database<Select<By<Option<Donor>, &'l donor::Email>>> for Memory {
    type Ok = Option<Donor>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Donor>, &'l donor::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .state()
            .donors
            .values()
            .find(|d| &d.email == email)
            .cloned())
    }
}

impl Database<Insert<Donor>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(donor): Insert<Donor>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if state.donors.values().any(|d| d.email == donor.email) {
            return Err(unique_violation!(constraint::DONORS_EMAIL));
        }
        drop(state.donors.insert(donor.id, donor));
        Ok(())
    }
}

impl Database<Insert<ProductRequest>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(request): Insert<ProductRequest>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().product_requests.insert(request.id, request));
        Ok(())
    }
}

impl Database<Update<product_request::Patch>> for Memory {
    type Ok = Option<ProductRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(patch): Update<product_request::Patch>,
    ) -> Result<Self::Ok, Self::Err> {
        let product_request::Patch {
            target,
            priority,
            required_by,
        } = patch;

        Ok(self
            .state()
            .product_requests
            .get_mut(&target.id)
            .filter(|r| target.matches(r))
            .map(|r| {
                r.priority = priority;
                r.required_by = required_by;
                r.clone()
            }))
    }
}

impl Database<Delete<product_request::OwnedId>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(target): Delete<product_request::OwnedId>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        let owned = state
            .product_requests
            .get(&target.id)
            .is_some_and(|r| target.matches(r));
        if owned {
            drop(state.product_requests.remove(&target.id));
        }
        Ok(owned)
    }
}

impl
    Database<
        Select<
            By<
                read::product_request::list::Page,
                read::product_request::list::Selector,
            >,
        >,
    > for Memory
{
    type Ok = read::product_request::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::product_request::list::Page,
                read::product_request::list::Selector,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::product_request::list::Selector {
            arguments,
            filter,
            sort,
        } = by.into_inner();

        let mut matched = self
            .state()
            .product_requests
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect::<Vec<_>>();
        matched.sort_by(|a, b| sort.compare(a, b));

        let total_count = matched.len();
        let items = matched
            .into_iter()
            .skip(arguments.offset())
            .take(arguments.limit());

        Ok(read::product_request::list::Page::new(
            arguments,
            items,
            total_count,
        ))
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Delete, Insert, Select, Update},
        Date, DateTime,
    };

    use crate::{
        domain::{
            product_request::{self, OwnedId, Patch, Priority},
            user, ProductRequest,
        },
        infra::{database::constraint, Database as _},
        read::product_request::list,
    };

    use super::Memory;

    fn request(owner_id: user::Id, priority: u8) -> ProductRequest {
        ProductRequest {
            id: product_request::Id::new(),
            owner_id,
            product_url: "https://shop.example.com/item".parse().unwrap(),
            image_url: "https://cdn.example.com/item.png".parse().unwrap(),
            priority: Priority::new(priority).unwrap(),
            requested_at: DateTime::now().coerce(),
            required_by: Date::from_ymd(2030, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn scopes_mutations_by_owner() {
        let db = Memory::default();
        let owner = user::Id::new();
        let stranger = user::Id::new();
        let req = request(owner, 3);
        db.execute(Insert(req.clone())).await.unwrap();

        let patch = |owner_id| Patch {
            target: OwnedId {
                id: req.id,
                owner_id,
            },
            priority: Priority::new(9).unwrap(),
            required_by: Date::from_ymd(2031, 2, 3).unwrap(),
        };

        assert!(db.execute(Update(patch(stranger))).await.unwrap().is_none());
        let updated = db.execute(Update(patch(owner))).await.unwrap().unwrap();
        assert_eq!(updated.priority.get(), 9);
        assert_eq!(updated.product_url, req.product_url);

        let target = OwnedId {
            id: req.id,
            owner_id: stranger,
        };
        assert!(!db.execute(Delete(target)).await.unwrap());
        let target = OwnedId {
            id: req.id,
            owner_id: owner,
        };
        assert!(db.execute(Delete(target)).await.unwrap());
        assert!(!db.execute(Delete(target)).await.unwrap());
    }

    #[tokio::test]
    async fn lists_owned_page() {
        let db = Memory::default();
        let owner = user::Id::new();
        for p in [5, 1, 9, 3, 7, 2, 5] {
            db.execute(Insert(request(owner, p))).await.unwrap();
        }
        db.execute(Insert(request(user::Id::new(), 4))).await.unwrap();

        let select = |page, priority| {
            Select(By::new(list::Selector {
                arguments: list::Arguments::new(Some(page), None, 5).unwrap(),
                filter: list::Filter {
                    owner_id: owner,
                    priority,
                },
                sort: list::Sort::Priority,
            }))
        };

        let first = db.execute(select(1, None)).await.unwrap();
        assert_eq!(first.total_count, 7);
        assert_eq!(first.total_pages(), 2);
        assert_eq!(
            first.items.iter().map(|r| r.priority.get()).collect::<Vec<_>>(),
            [1, 2, 3, 5, 5],
        );

        let second = db.execute(select(2, None)).await.unwrap();
        assert_eq!(second.items.len(), 2);

        let beyond = db.execute(select(3, None)).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_count, 7);

        let filtered = db
            .execute(select(1, Some(Priority::new(5).unwrap())))
            .await
            .unwrap();
        assert_eq!(filtered.total_count, 2);
    }

    #[tokio::test]
    async fn rejects_duplicate_identity() {
        use crate::domain::{
            user::{Email, Password, PasswordHash, Username},
            User,
        };

        let user = |username: &str, email: &str| User {
            id: user::Id::new(),
            username: Username::new(username).unwrap(),
            email: Email::new(email).unwrap(),
            password_hash: PasswordHash::new(
                &Password::new("secret1").unwrap(),
            )
            .unwrap(),
            name: None,
            phone: None,
            role: None,
            hmis_id: None,
            created_at: DateTime::now().coerce(),
        };

        let db = Memory::default();
        db.execute(Insert(user("alice", "a@x.com"))).await.unwrap();

        let err = db
            .execute(Insert(user("bob", "a@x.com")))
            .await
            .unwrap_err();
        assert!(err
            .as_ref()
            .is_unique_violation(Some(constraint::USERS_EMAIL)));

        let err = db
            .execute(Insert(user("alice", "b@x.com")))
            .await
            .unwrap_err();
        assert!(err
            .as_ref()
            .is_unique_violation(Some(constraint::USERS_USERNAME)));
    }
}
