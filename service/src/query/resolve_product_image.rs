//! [`Query`] for resolving an image of a product.

use std::time::Duration;

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::Config;
use crate::{
    domain::product_request::{ImageUrl, ProductUrl},
    infra::{image, ImageResolver},
    Service,
};

use super::Query;

/// [`Query`] for resolving an [`ImageUrl`] representing the product located
/// at the provided [`ProductUrl`].
///
/// Bounded by [`Config::image_resolution_timeout`].
#[derive(Clone, Debug, From)]
pub struct ResolveProductImage {
    /// [`ProductUrl`] to resolve an image of.
    pub product_url: ProductUrl,
}

impl<Db, Ir> Query<ResolveProductImage> for Service<Db, Ir>
where
    Ir: ImageResolver<
        Select<By<Option<ImageUrl>, ProductUrl>>,
        Ok = Option<ImageUrl>,
        Err = Traced<image::Error>,
    >,
{
    type Ok = ImageUrl;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: ResolveProductImage,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ResolveProductImage { product_url } = query;
        let timeout = self.config().image_resolution_timeout;

        let resolution = self
            .image_resolver()
            .execute(Select(By::new(product_url.clone())));
        let image = tokio::time::timeout(timeout, resolution)
            .await
            .map_err(|_| {
                log::warn!(
                    "image resolution of `{product_url}` timed out after \
                     {timeout:?}",
                );
                tracerr::new!(E::Timeout(timeout))
            })?
            .map_err(|e| {
                log::warn!("image resolution of `{product_url}` failed: {e}");
                tracerr::map_from_and_wrap!(=> E)(e)
            })?;

        image
            .ok_or_else(|| E::NotFound(product_url))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`ResolveProductImage`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// No image is advertised for the product.
    #[display("No image found for `{_0}`")]
    #[from(ignore)]
    NotFound(#[error(not(source))] ProductUrl),

    /// [`ImageResolver`] error.
    #[display("`ImageResolver` failed: {_0}")]
    Resolver(image::Error),

    /// [`ImageResolver`] didn't respond in time.
    #[display("`ImageResolver` timed out after {_0:?}")]
    #[from(ignore)]
    Timeout(#[error(not(source))] Duration),
}
