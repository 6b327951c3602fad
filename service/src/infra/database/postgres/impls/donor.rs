//! [`Donor`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{donor, Donor},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of a [`Donor`] row.
const COLUMNS: &str = "\
    id, name, email, password_hash, phone, \
    shelter_affiliation, social_media_handle, causes_of_interest, \
    preferred_contact, created_at";

/// Converts the provided [`Row`] into a [`Donor`].
fn from_row(row: &Row) -> Donor {
    Donor {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        phone: row.get("phone"),
        shelter_affiliation: row.get("shelter_affiliation"),
        social_media_handle: row.get("social_media_handle"),
        causes_of_interest: row.get("causes_of_interest"),
        preferred_contact: row.get("preferred_contact"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Donor>, donor::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Donor>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Donor>, donor::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: donor::Id = by.into_inner();

        let sql = format!("SELECT {COLUMNS} FROM donors WHERE id = $1::UUID");
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<'l, C> Database<Select<By<Option<Donor>, &'l donor::Email>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Donor>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Donor>, &'l donor::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        let sql =
            format!("SELECT {COLUMNS} FROM donors WHERE email = $1::VARCHAR");
        self.query_opt(&sql, &[email])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Insert<Donor>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(donor): Insert<Donor>,
    ) -> Result<Self::Ok, Self::Err> {
        let Donor {
            id,
            name,
            email,
            password_hash,
            phone,
            shelter_affiliation,
            social_media_handle,
            causes_of_interest,
            preferred_contact,
            created_at,
        } = donor;

        const SQL: &str = "\
            INSERT INTO donors (\
                id, name, email, password_hash, phone, \
                shelter_affiliation, social_media_handle, causes_of_interest, \
                preferred_contact, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, \
                $6::VARCHAR, $7::VARCHAR, $8::VARCHAR, \
                $9::INT2, $10::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &email,
                &password_hash,
                &phone,
                &shelter_affiliation,
                &social_media_handle,
                &causes_of_interest,
                &preferred_contact,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
