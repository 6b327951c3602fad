//! [`Command`] for creating a new [`ProductRequest`].

use common::{
    operations::{By, Insert, Select},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{
    product_request::{Priority, ProductUrl},
    User,
};
use crate::{
    domain::{
        product_request::{self, ImageUrl},
        user, ProductRequest,
    },
    infra::{database, image, Database, ImageResolver},
    query::{resolve_product_image, ResolveProductImage},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`ProductRequest`].
///
/// [`ImageUrl`] of the product is resolved before anything is stored, so no
/// [`ProductRequest`] is created if the resolution fails.
#[derive(Clone, Debug)]
pub struct CreateProductRequest {
    /// ID of the [`User`] making the [`ProductRequest`].
    pub owner_id: user::Id,

    /// [`ProductUrl`] of the requested product.
    pub product_url: product_request::ProductUrl,

    /// [`Priority`] of the new [`ProductRequest`].
    pub priority: product_request::Priority,

    /// [`DateTime`] when the [`ProductRequest`] was made.
    ///
    /// [`DateTime::now()`] if [`None`].
    pub requested_at: Option<product_request::RequestDateTime>,

    /// [`Date`] the requested product is required by.
    pub required_by: Date,
}

impl<Db, Ir> Command<CreateProductRequest> for Service<Db, Ir>
where
    Db: Database<Insert<ProductRequest>, Err = Traced<database::Error>>,
    Ir: ImageResolver<
        Select<By<Option<ImageUrl>, product_request::ProductUrl>>,
        Ok = Option<ImageUrl>,
        Err = Traced<image::Error>,
    >,
{
    type Ok = ProductRequest;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProductRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProductRequest {
            owner_id,
            product_url,
            priority,
            requested_at,
            required_by,
        } = cmd;

        let image_url = self
            .execute(ResolveProductImage {
                product_url: product_url.clone(),
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let request = ProductRequest {
            id: product_request::Id::new(),
            owner_id,
            product_url,
            image_url,
            priority,
            requested_at: requested_at
                .unwrap_or_else(|| DateTime::now().coerce()),
            required_by,
        };
        self.database()
            .execute(Insert(request.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(request)
    }
}

/// Error of [`CreateProductRequest`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`ImageUrl`] of the product cannot be resolved.
    #[display("Failed to resolve product image: {_0}")]
    ImageNotFound(resolve_product_image::ExecutionError),
}
