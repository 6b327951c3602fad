//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of a [`User`] row.
const COLUMNS: &str = "\
    id, username, email, password_hash, \
    name, phone, role, hmis_id, \
    created_at";

/// Converts the provided [`Row`] into a [`User`].
fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        name: row.get("name"),
        phone: row.get("phone"),
        role: row.get("role"),
        hmis_id: row.get("hmis_id"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1::UUID");
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Login>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login: &str = by.into_inner().as_ref();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE username = $1::VARCHAR \
                OR email = $1::VARCHAR \
             ORDER BY username = $1::VARCHAR DESC \
             LIMIT 1",
        );
        self.query_opt(&sql, &[&login])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Username>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();

        let sql =
            format!("SELECT {COLUMNS} FROM users WHERE username = $1::VARCHAR");
        self.query_opt(&sql, &[username])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Email>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        let sql =
            format!("SELECT {COLUMNS} FROM users WHERE email = $1::VARCHAR");
        self.query_opt(&sql, &[email])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::HmisId>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::HmisId>>,
    ) -> Result<Self::Ok, Self::Err> {
        let hmis_id = by.into_inner();

        let sql =
            format!("SELECT {COLUMNS} FROM users WHERE hmis_id = $1::VARCHAR");
        self.query_opt(&sql, &[hmis_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            username,
            email,
            password_hash,
            name,
            phone,
            role,
            hmis_id,
            created_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (\
                id, username, email, password_hash, \
                name, phone, role, hmis_id, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::VARCHAR, $6::VARCHAR, $7::INT2, $8::VARCHAR, \
                $9::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &username,
                &email,
                &password_hash,
                &name,
                &phone,
                &role,
                &hmis_id,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
