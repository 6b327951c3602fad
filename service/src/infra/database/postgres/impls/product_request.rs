//! [`ProductRequest`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{product_request, ProductRequest},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::product_request::list,
};

/// Columns of a [`ProductRequest`] row.
const COLUMNS: &str = "\
    id, owner_id, product_url, image_url, \
    priority, requested_at, required_by";

/// Converts the provided [`Row`] into a [`ProductRequest`].
fn from_row(row: &Row) -> ProductRequest {
    ProductRequest {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        product_url: row.get("product_url"),
        image_url: row.get("image_url"),
        priority: row.get("priority"),
        requested_at: row.get("requested_at"),
        required_by: row.get("required_by"),
    }
}

/// Returns the SQL column the provided [`list::Sort`] orders by.
const fn sort_column(sort: list::Sort) -> &'static str {
    match sort {
        list::Sort::Priority => "priority",
        list::Sort::RequestDate => "requested_at",
        list::Sort::RequiredByDate => "required_by",
        list::Sort::ProductUrl => "product_url",
    }
}

impl<C> Database<Insert<ProductRequest>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(request): Insert<ProductRequest>,
    ) -> Result<Self::Ok, Self::Err> {
        let ProductRequest {
            id,
            owner_id,
            product_url,
            image_url,
            priority,
            requested_at,
            required_by,
        } = request;

        const SQL: &str = "\
            INSERT INTO product_requests (\
                id, owner_id, product_url, image_url, \
                priority, requested_at, required_by\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::VARCHAR, \
                $5::INT2, $6::TIMESTAMPTZ, $7::DATE\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &product_url,
                &image_url,
                &priority,
                &requested_at,
                &required_by,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<product_request::Patch>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<ProductRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(patch): Update<product_request::Patch>,
    ) -> Result<Self::Ok, Self::Err> {
        let product_request::Patch {
            target: product_request::OwnedId { id, owner_id },
            priority,
            required_by,
        } = patch;

        let sql = format!(
            "UPDATE product_requests \
             SET priority = $3::INT2, \
                 required_by = $4::DATE \
             WHERE id = $1::UUID \
               AND owner_id = $2::UUID \
             RETURNING {COLUMNS}",
        );
        self.query_opt(&sql, &[&id, &owner_id, &priority, &required_by])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Delete<product_request::OwnedId>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(target): Delete<product_request::OwnedId>,
    ) -> Result<Self::Ok, Self::Err> {
        let product_request::OwnedId { id, owner_id } = target;

        const SQL: &str = "\
            DELETE FROM product_requests \
            WHERE id = $1::UUID \
              AND owner_id = $2::UUID";
        self.exec(SQL, &[&id, &owner_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected > 0)
    }
}

impl<C> Database<Select<By<list::Page, list::Selector>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::Page, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Selector {
            arguments,
            filter: list::Filter { owner_id, priority },
            sort,
        } = by.into_inner();

        let limit = i64::try_from(arguments.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&owner_id];
        let priority_idx = priority.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let filtering = format!(
            "WHERE owner_id = $1::UUID {priority}",
            priority = priority_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND priority = ${idx}::INT2"))
            }),
        );

        let count_sql = format!(
            "SELECT COUNT(*) \
             FROM product_requests \
             {filtering}",
        );
        let total_count = self
            .query_opt(&count_sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .map_or(0, |row| row.get::<_, i64>(0));

        ps.push(&limit);
        let limit_idx = ps.len();
        ps.push(&offset);
        let offset_idx = ps.len();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM product_requests \
             {filtering} \
             ORDER BY {column} ASC, id ASC \
             LIMIT ${limit_idx}::INT8 \
             OFFSET ${offset_idx}::INT8",
            column = sort_column(sort),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        Ok(list::Page::new(
            arguments,
            rows.iter().map(from_row),
            usize::try_from(total_count).unwrap_or_default(),
        ))
    }
}
